//! Errors raised by the simulated heap

use thiserror::Error;

/// Error from a heap operation
///
/// `OutOfMemory` is always recoverable: the heap is left exactly as it was
/// before the call. `InvalidArgument` means the caller broke the contract
/// (zero size or zero capacity) and nothing was changed either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The allocation does not fit in the remaining capacity
    #[error("out of memory: requested {requested}, only {available} available")]
    OutOfMemory { requested: usize, available: usize },

    /// A size or capacity argument was not positive
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = HeapError::OutOfMemory {
            requested: 50,
            available: 40,
        };
        assert_eq!(
            err.to_string(),
            "out of memory: requested 50, only 40 available"
        );

        let err = HeapError::InvalidArgument("size must be positive");
        assert_eq!(err.to_string(), "invalid argument: size must be positive");
    }
}
