use keylock_hardware::HardwareError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("Core error: {0}")]
    Core(#[from] keylock_core::Error),

    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),
}

pub type Result<T> = std::result::Result<T, EmulatorError>;
