//! Mock device implementations for testing and development.
//!
//! This module provides simulated device implementations that can be controlled
//! and observed programmatically without requiring physical hardware.

pub mod actuator;
pub mod keypad;

// Re-export commonly used types
pub use actuator::{MockActuator, MockActuatorHandle};
pub use keypad::{MockKeypad, MockKeypadHandle};
