//! Typed identifiers for dataset and graph records.
//!
//! Records are stored in dense vectors, so every identifier is an index into
//! the vector that owns the record. Distinct types keep a stop index from
//! being used where a trip index is expected.

use std::fmt;

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the identifier as a vector index.
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_id!(
    /// A merged station (routing graph node).
    StationId,
    "Station"
);
index_id!(
    /// A physical stop or platform.
    StopId,
    "Stop"
);
index_id!(
    /// A rail route.
    RouteId,
    "Route"
);
index_id!(
    /// One scheduled run of a route.
    TripId,
    "Trip"
);
index_id!(
    /// One visit of a trip at a stop.
    StopTimeId,
    "StopTime"
);
