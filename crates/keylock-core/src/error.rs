use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Value errors
    #[error("Digit must be 0-9, got {0}")]
    InvalidDigit(u8),

    #[error("Passcode slot must be 0-{max}, got {0}", max = crate::constants::MAX_PASSCODE_SLOTS - 1)]
    InvalidSlotIndex(u8),

    #[error("Code must have {expected} digits, got {actual}")]
    InvalidCodeLength { expected: usize, actual: usize },

    #[error("Invalid code: {0}")]
    InvalidCode(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
