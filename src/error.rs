//! Failure modes surfaced by the containers.
//!
//! Every detected violation is reported to the caller; none is ever
//! downgraded to a no-op.
use std::fmt;

pub type Result<T, E = DequeError> = std::result::Result<T, E>;

/// The logical end of a container an operation was applied to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum End {
    Front,
    Back,
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            End::Front => f.write_str("front"),
            End::Back => f.write_str("back"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DequeError {
    /// Popped from `end` of an empty container.
    Underflow { end: End },

    /// Indexed access at `index` when only `len` elements are live.
    IndexOutOfBounds { index: usize, len: usize },

    /// Could not allocate a buffer of `capacity` elements.  Growth is a
    /// one-shot attempt, there is no retry.
    AllocationFailed { capacity: usize },
}

impl fmt::Display for DequeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DequeError::Underflow { end } => {
                write!(f, "pop_{} on an empty container", end)
            }
            DequeError::IndexOutOfBounds { index, len } => {
                write!(f, "index out of bounds: index={} len={}", index, len)
            }
            DequeError::AllocationFailed { capacity } => {
                write!(f, "failed to allocate buffer. capacity={}", capacity)
            }
        }
    }
}

impl std::error::Error for DequeError {}

#[test]
fn test_display_miri() {
    assert_eq!(
        DequeError::Underflow { end: End::Front }.to_string(),
        "pop_front on an empty container"
    );
    assert_eq!(
        DequeError::Underflow { end: End::Back }.to_string(),
        "pop_back on an empty container"
    );
    assert_eq!(
        DequeError::IndexOutOfBounds { index: 4, len: 2 }.to_string(),
        "index out of bounds: index=4 len=2"
    );
    assert!(DequeError::AllocationFailed { capacity: 12 }
        .to_string()
        .contains("capacity=12"));
}
