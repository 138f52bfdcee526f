//! DMA mapping error types.

use core::fmt;

/// Errors returned by mapping and allocation operations.
///
/// Every variant is a retryable resource or request problem, never fatal to
/// the firmware: the driver above decides whether to retry with different
/// parameters or abort its own operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaError {
    /// Requested a zero-length mapping or allocation.
    ZeroLength,
    /// Requested alignment is not a power of two.
    BadAlignment,
    /// Physical memory of the requested size/alignment is unavailable.
    OutOfMemory,
    /// The address cannot be made visible to the device (e.g. translation
    /// address space exhausted). Never produced by the flat backend.
    Unmappable,
}

impl fmt::Display for DmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroLength => write!(f, "zero-length request"),
            Self::BadAlignment => write!(f, "alignment not a power of two"),
            Self::OutOfMemory => write!(f, "out of physical memory"),
            Self::Unmappable => write!(f, "address not mappable for device"),
        }
    }
}

/// Result type for DMA operations.
pub type Result<T> = core::result::Result<T, DmaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        extern crate std;
        use std::string::ToString;

        assert_eq!(DmaError::ZeroLength.to_string(), "zero-length request");
        assert_eq!(DmaError::OutOfMemory.to_string(), "out of physical memory");
    }
}
