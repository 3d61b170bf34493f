//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT) are not object-safe, so
//! `Box<dyn KeypadDevice>` is unavailable. These enums give concrete type
//! dispatch over every device the crate ships, letting a binary choose its
//! devices at runtime while the runner stays monomorphic.
//!
//! # Examples
//!
//! ```
//! use keylock_hardware::devices::AnyKeypadDevice;
//! use keylock_hardware::mock::MockKeypad;
//!
//! let (keypad, _handle) = MockKeypad::new();
//! let any_keypad = AnyKeypadDevice::Mock(keypad);
//! ```

use crate::console::{ConsoleActuator, ConsoleKeypad, TerminalWriter};
use crate::mock::{MockActuator, MockKeypad};
use crate::traits::{ActuatorDevice, KeypadDevice};
use crate::{ActuatorCommand, DeviceInfo, KeypadInput, Result};

/// Enum wrapper for keypad device dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyKeypadDevice {
    /// Mock keypad for development and testing.
    Mock(MockKeypad),

    /// Keypad fed from a terminal.
    Console(ConsoleKeypad),
}

impl KeypadDevice for AnyKeypadDevice {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        match self {
            Self::Mock(device) => device.read_input().await,
            Self::Console(device) => device.read_input().await,
        }
    }

    async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_backlight(enabled).await,
            Self::Console(device) => device.set_backlight(enabled).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            Self::Console(device) => device.get_info().await,
        }
    }
}

/// Enum wrapper for actuator device dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyActuatorDevice {
    /// Mock actuator for development and testing.
    Mock(MockActuator),

    /// Actuator printing to the terminal.
    Console(ConsoleActuator<TerminalWriter<std::io::Stdout>>),
}

impl ActuatorDevice for AnyActuatorDevice {
    async fn apply(&mut self, command: ActuatorCommand) -> Result<()> {
        match self {
            Self::Mock(device) => device.apply(command).await,
            Self::Console(device) => device.apply(command).await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            Self::Console(device) => device.get_info().await,
        }
    }
}
