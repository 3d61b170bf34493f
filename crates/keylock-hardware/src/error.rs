//! Error types for hardware operations.
//!
//! This module defines error types specific to keypad and actuator devices,
//! covering disconnection and invalid data.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Invalid data received from or sent to a device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Check if this error means the device is gone for good.
    ///
    /// The lock runner treats a disconnected keypad as the end of input.
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HardwareError::disconnected("Console Keypad");
        assert_eq!(err.to_string(), "Device disconnected: Console Keypad");

        let err = HardwareError::invalid_data("Digit must be 0-9, got 12");
        assert_eq!(err.to_string(), "Invalid data: Digit must be 0-9, got 12");
    }

    #[test]
    fn test_is_disconnected() {
        assert!(HardwareError::disconnected("x").is_disconnected());
        assert!(!HardwareError::invalid_data("x").is_disconnected());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: HardwareError = io.into();
        assert!(matches!(err, HardwareError::Io(_)));
    }
}
