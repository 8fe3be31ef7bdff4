//! Dataset construction error types.

use crate::domain::TimeError;

/// Errors raised while building a `Dataset` from a feed snapshot.
///
/// Any of these aborts construction: a dataset is either fully consistent
/// or not built at all.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Reading or writing the snapshot file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot is not valid JSON for a feed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record refers to an id that does not exist
    #[error("unknown {kind} {id:?}")]
    UnknownReference { kind: &'static str, id: String },

    /// Two records share an id
    #[error("duplicate {kind} {id:?}")]
    DuplicateId { kind: &'static str, id: String },

    /// Two stop-times of one trip share a sequence number
    #[error("trip {trip:?} has duplicate stop sequence {sequence}")]
    DuplicateSequence { trip: String, sequence: u32 },

    /// A stop-time has neither arrival nor departure
    #[error("trip {trip:?} stop sequence {sequence} has no arrival or departure time")]
    MissingTime { trip: String, sequence: u32 },

    /// A stop-time carries an unparseable time
    #[error("trip {trip:?} stop sequence {sequence}: {source}")]
    InvalidTime {
        trip: String,
        sequence: u32,
        source: TimeError,
    },
}
