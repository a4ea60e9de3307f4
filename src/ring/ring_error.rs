use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingError {
    StaleReader {
        requested: u64,
        pending: u64,
    },
    StaleWriter {
        requested: u64,
        available: u64,
    },
    Bounds {
        requested: u64,
        capacity: u64,
    },
    OffsetTooOld {
        offset: u64,
        cycle_start: u64,
    },
    StorageWrite {
        index: u64,
        samples: u64,
    },
    InvalidConfig {
        value: u64,
        reason: &'static str,
    },
}

impl fmt::Display for RingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleReader { requested, pending } => {
                write!(
                    f,
                    "Stale reader: requested {} samples but only {} are recoverable, unread samples were overwritten",
                    requested, pending
                )
            }
            Self::StaleWriter { requested, available } => {
                write!(
                    f,
                    "Stale writer: {} samples do not fit, only {} slots are free of unread data",
                    requested, available
                )
            }
            Self::Bounds { requested, capacity } => {
                write!(
                    f,
                    "Request of {} samples can never be satisfied by a buffer of capacity {}",
                    requested, capacity
                )
            }
            Self::OffsetTooOld { offset, cycle_start } => {
                write!(
                    f,
                    "Write offset {} lies before the current cycle start {}",
                    offset, cycle_start
                )
            }
            Self::StorageWrite { index, samples } => {
                write!(
                    f,
                    "Backing storage rejected write of {} samples at slot {}",
                    samples, index
                )
            }
            Self::InvalidConfig { value, reason } => {
                write!(f, "Invalid buffer parameter {}: {}", value, reason)
            }
        }
    }
}

impl std::error::Error for RingError {}
