//! Domain error types.
//!
//! These errors represent validation failures when assembling journeys
//! from timetable data. They are distinct from dataset and routing errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Journey has no stop-times
    #[error("journey must have at least one board/alight pair")]
    EmptyJourney,

    /// Stop-times do not form board/alight pairs
    #[error("journey has {0} stop-times, expected an even number")]
    UnpairedStopTimes(usize),

    /// Arrival precedes departure
    #[error("journey arrives before it departs")]
    ArrivalBeforeDeparture,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            DomainError::EmptyJourney.to_string(),
            "journey must have at least one board/alight pair"
        );
        assert_eq!(
            DomainError::UnpairedStopTimes(3).to_string(),
            "journey has 3 stop-times, expected an even number"
        );
        assert_eq!(
            DomainError::ArrivalBeforeDeparture.to_string(),
            "journey arrives before it departs"
        );
    }
}
