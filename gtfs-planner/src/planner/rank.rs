//! Journey ranking across all candidate paths.
//!
//! Journeys from every evaluated path are pooled, deduplicated by
//! fingerprint, pruned against the global earliest arrival and sorted so
//! the most useful options come first.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Duration;

use crate::domain::Journey;

/// Pool, deduplicate, prune and sort journeys.
///
/// Returns journeys sorted best-first; none arrives later than the
/// earliest arrival plus `slack`.
pub fn rank(journeys: Vec<Journey>, slack: Duration) -> Vec<Journey> {
    let journeys = deduplicate(journeys);
    let journeys = prune_late(journeys, slack);
    rank_journeys(journeys)
}

/// Compare journeys by preference.
///
/// Journeys are ordered by:
/// 1. Arrival time (earlier is better)
/// 2. Number of transfers (fewer is better)
/// 3. Departure time (later is better: less time spent travelling)
/// 4. Fingerprint, for a stable order
pub fn compare(a: &Journey, b: &Journey) -> Ordering {
    a.arrival_time()
        .cmp(&b.arrival_time())
        .then_with(|| a.transfer_count().cmp(&b.transfer_count()))
        .then_with(|| b.departure_time().cmp(&a.departure_time()))
        .then_with(|| a.fingerprint().cmp(&b.fingerprint()))
}

/// Sort journeys best-first.
pub fn rank_journeys(mut journeys: Vec<Journey>) -> Vec<Journey> {
    journeys.sort_by(compare);
    journeys
}

/// Keep the first journey of each fingerprint.
pub fn deduplicate(journeys: Vec<Journey>) -> Vec<Journey> {
    let mut seen = HashSet::with_capacity(journeys.len());
    journeys
        .into_iter()
        .filter(|j| seen.insert(j.fingerprint()))
        .collect()
}

/// Drop journeys arriving more than `slack` after the earliest arrival.
pub fn prune_late(mut journeys: Vec<Journey>, slack: Duration) -> Vec<Journey> {
    let Some(earliest) = journeys.iter().map(Journey::arrival_time).min() else {
        return journeys;
    };
    // Nothing can arrive later than the end of the calendar.
    if let Some(cutoff) = earliest.checked_add(slack) {
        journeys.retain(|j| j.arrival_time() <= cutoff);
    }
    journeys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::time;
    use crate::domain::{RailTime, StopTimeId};
    use chrono::NaiveDateTime;

    fn journey(stop_times: &[u32], dep: &str, arr: &str) -> Journey {
        Journey::new(
            stop_times.iter().copied().map(StopTimeId).collect(),
            time(dep),
            time(arr),
        )
        .unwrap()
    }

    #[test]
    fn rank_by_arrival() {
        let late = journey(&[1, 2], "10:15", "10:40");
        let early = journey(&[3, 4], "10:00", "10:30");

        let ranked = rank_journeys(vec![late, early]);

        assert_eq!(ranked[0].arrival_time(), time("10:30"));
        assert_eq!(ranked[1].arrival_time(), time("10:40"));
    }

    #[test]
    fn rank_by_transfers_when_same_arrival() {
        let change = journey(&[1, 2, 3, 4], "10:00", "11:30");
        let direct = journey(&[5, 6], "10:00", "11:30");

        let ranked = rank_journeys(vec![change, direct]);

        assert_eq!(ranked[0].transfer_count(), 0);
        assert_eq!(ranked[1].transfer_count(), 1);
    }

    #[test]
    fn prefer_later_departure_for_same_arrival() {
        let early = journey(&[1, 2], "10:00", "11:00");
        let late = journey(&[3, 4], "10:20", "11:00");

        let ranked = rank_journeys(vec![early, late]);

        assert_eq!(ranked[0].departure_time(), time("10:20"));
    }

    #[test]
    fn deduplicate_by_fingerprint() {
        let a = journey(&[1, 2], "10:00", "10:30");
        let same = journey(&[1, 2], "10:00", "10:30");
        let other = journey(&[1, 3], "10:00", "10:30");

        let result = deduplicate(vec![a, same, other]);

        assert_eq!(result.len(), 2);
    }

    #[test]
    fn prune_against_earliest() {
        let result = prune_late(
            vec![
                journey(&[1, 2], "10:00", "11:00"),
                journey(&[3, 4], "10:00", "10:30"),
                journey(&[5, 6], "10:00", "11:01"),
            ],
            Duration::minutes(30),
        );

        let arrivals: Vec<_> = result.iter().map(Journey::arrival_time).collect();
        assert_eq!(arrivals, vec![time("11:00"), time("10:30")]);
    }

    #[test]
    fn rank_pools_dedups_and_prunes() {
        let ranked = rank(
            vec![
                journey(&[1, 2], "10:00", "10:50"),
                journey(&[3, 4, 5, 6], "10:05", "10:40"),
                journey(&[1, 2], "10:00", "10:50"),
                journey(&[7, 8], "10:10", "11:30"),
            ],
            Duration::minutes(30),
        );

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].arrival_time(), time("10:40"));
        assert_eq!(ranked[1].arrival_time(), time("10:50"));
    }

    #[test]
    fn prune_keeps_arrivals_at_end_of_calendar() {
        let end = RailTime::from_datetime(NaiveDateTime::MAX);
        let journeys = vec![
            Journey::new(vec![StopTimeId(1), StopTimeId(2)], end, end).unwrap(),
            Journey::new(vec![StopTimeId(3), StopTimeId(4)], end, end).unwrap(),
        ];

        assert_eq!(prune_late(journeys, Duration::minutes(30)).len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(rank(vec![], Duration::minutes(30)).is_empty());
        assert!(deduplicate(vec![]).is_empty());
        assert!(prune_late(vec![], Duration::minutes(30)).is_empty());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::dataset::fixtures::date;
    use crate::domain::{RailTime, StopTimeId};
    use chrono::NaiveTime;
    use proptest::prelude::*;

    fn at_minute(mins: u32) -> RailTime {
        let time = NaiveTime::from_hms_opt(mins / 60, mins % 60, 0).unwrap();
        RailTime::new(date(), time)
    }

    /// A journey over `rides` trips. Stop-time ids overlap between seeds,
    /// and times are a function of the ids, so equal fingerprints always
    /// come from equal journeys.
    fn journey_strategy() -> impl Strategy<Value = Journey> {
        (1u32..4, 0u32..40).prop_map(|(rides, seed)| {
            let stop_times = (0..rides * 2).map(|i| StopTimeId(seed + i)).collect();
            let dep = 360 + (seed * 7) % 120;
            let duration = 20 + (seed * 13 + rides * 11) % 90;
            Journey::new(stop_times, at_minute(dep), at_minute(dep + duration)).unwrap()
        })
    }

    fn journeys_strategy() -> impl Strategy<Value = Vec<Journey>> {
        prop::collection::vec(journey_strategy(), 0..15)
    }

    proptest! {
        /// Ordering law: arrival ascending, then transfers ascending.
        #[test]
        fn ranked_output_is_ordered(journeys in journeys_strategy()) {
            let ranked = rank(journeys, Duration::minutes(30));

            for window in ranked.windows(2) {
                let (a, b) = (&window[0], &window[1]);
                prop_assert!(a.arrival_time() <= b.arrival_time());
                if a.arrival_time() == b.arrival_time() {
                    prop_assert!(a.transfer_count() <= b.transfer_count());
                }
            }
        }

        /// Pruning law: nothing arrives later than earliest + slack.
        #[test]
        fn ranked_output_is_pruned(journeys in journeys_strategy()) {
            let earliest = journeys.iter().map(Journey::arrival_time).min();
            let ranked = rank(journeys, Duration::minutes(30));

            prop_assert_eq!(ranked.is_empty(), earliest.is_none());
            if let Some(earliest) = earliest {
                let cutoff = earliest.checked_add(Duration::minutes(30)).unwrap();
                for journey in &ranked {
                    prop_assert!(journey.arrival_time() <= cutoff);
                }
            }
        }

        /// Fingerprints are unique after ranking, and every input
        /// fingerprint within the slack survives.
        #[test]
        fn ranked_output_is_deduplicated(journeys in journeys_strategy()) {
            let ranked = rank(journeys.clone(), Duration::minutes(30));

            let unique: HashSet<_> = ranked.iter().map(Journey::fingerprint).collect();
            prop_assert_eq!(unique.len(), ranked.len());

            if let Some(earliest) = journeys.iter().map(Journey::arrival_time).min() {
                let cutoff = earliest.checked_add(Duration::minutes(30)).unwrap();
                let expected: HashSet<_> = journeys
                    .iter()
                    .filter(|j| j.arrival_time() <= cutoff)
                    .map(Journey::fingerprint)
                    .collect();
                prop_assert_eq!(unique, expected);
            }
        }
    }
}
