//! Hardware device abstraction layer for the keylock controller.
//!
//! This crate provides trait-based abstractions for the two peripherals of a
//! keypad lock: the keypad that delivers key presses and the actuator that
//! drives the bolt and the buzzer. The traits let the controller run
//! unchanged against mock devices in tests, console devices in a terminal,
//! or real drivers on a board.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All I/O operations are asynchronous using native `async fn`
//!   in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Timing-free drivers**: Devices never sleep. Every duration belongs to
//!   the controller's timer bank, so a driver only applies commands.
//! - **Filtered input**: Keypads deliver only digits and the three bound
//!   control keys; raw bytes never reach the controller.
//!
//! # Keypad
//!
//! ```no_run
//! use keylock_hardware::traits::{KeypadDevice, KeypadInput};
//! use keylock_hardware::error::Result;
//!
//! async fn wait_for_enter<K: KeypadDevice>(keypad: &mut K) -> Result<()> {
//!     while keypad.read_input().await? != KeypadInput::Enter {}
//!     Ok(())
//! }
//! ```
//!
//! # Actuator
//!
//! ```no_run
//! use keylock_hardware::traits::ActuatorDevice;
//! use keylock_hardware::types::{ActuatorCommand, SignalLine};
//! use keylock_hardware::error::Result;
//!
//! async fn pulse<A: ActuatorDevice>(actuator: &mut A) -> Result<()> {
//!     actuator.apply(ActuatorCommand::Assert { line: SignalLine::Unlock }).await?;
//!     actuator.apply(ActuatorCommand::Release { line: SignalLine::Unlock }).await
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] which uses the
//! [`HardwareError`] error type. A disconnected keypad is reported as
//! [`HardwareError::Disconnected`] and marks the end of input.

pub mod console;
pub mod devices;
pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{ActuatorDevice, KeypadDevice, KeypadInput};
pub use types::{ActuatorCommand, DeviceInfo, SignalLine};
