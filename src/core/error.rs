use std::io;
use thiserror::Error;

/// Custom error types for the port agent packet protocol
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid sync marker: {found:02X?}")]
    InvalidSync {
        /// The three bytes found where the marker was expected
        found: [u8; 3],
    },

    #[error("Truncated frame: stream ended while {state} with {buffered} of {expected} bytes")]
    TruncatedFrame {
        /// Assembler state when the stream ended
        state: &'static str,
        /// Bytes of the frame buffered so far
        buffered: usize,
        /// Bytes needed to complete the current step
        expected: usize,
    },

    #[error("Invalid packet size: {size}")]
    InvalidPacketSize {
        /// The packet size read from the header
        size: u16,
    },

    #[error("Checksum mismatch: header says {expected:#06x}, frame computes {actual:#06x}")]
    ChecksumMismatch {
        /// Checksum stored in the frame header
        expected: u16,
        /// Checksum recomputed over the frame
        actual: u16,
    },

    #[error("Unknown message type: {0}")]
    UnknownMessageType(u8),

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Requested payload length
        size: usize,
        /// Largest payload a frame can carry
        max: usize,
    },

    #[error("Timestamp error: {0}")]
    Timestamp(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new timestamp error
    pub fn timestamp(msg: impl Into<String>) -> Self {
        Error::Timestamp(msg.into())
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Returns true if the error only concerns the frame being assembled.
    ///
    /// Every protocol error is scoped to one frame attempt. A stream codec
    /// yields these as items and keeps decoding.
    pub fn is_frame_error(&self) -> bool {
        !matches!(self, Error::Io(_) | Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("bad limit");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: bad limit");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::Other, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_frame_error());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::ChecksumMismatch { expected: 0x12, actual: 0x34 };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: header says 0x0012, frame computes 0x0034"
        );
        assert!(err.is_frame_error());

        let err = Error::InvalidSync { found: [0xFF, 0x00, 0x7A] };
        assert_eq!(err.to_string(), "Invalid sync marker: [FF, 00, 7A]");

        assert_eq!(Error::UnknownMessageType(42).to_string(), "Unknown message type: 42");
    }
}
