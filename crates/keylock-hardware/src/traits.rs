//! Hardware device trait definitions.
//!
//! This module defines the contract between the lock controller and its
//! peripherals: a keypad that delivers one key at a time and an actuator
//! that drives the bolt signal lines and the buzzer. Mock and console
//! implementations live in [`mock`](crate::mock) and
//! [`console`](crate::console).
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use keylock_core::{Digit, KeyBindings};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{ActuatorCommand, DeviceInfo};

/// A key accepted by the lock.
///
/// Only decimal digits and the three bound control keys exist; every other
/// byte is filtered out by [`from_byte`](KeypadInput::from_byte) before it
/// can reach the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypadInput {
    /// Numeric digit (0-9).
    Digit(Digit),

    /// Program-enable key: starts an admin use-case, aborts any other session.
    ProgramEnable,

    /// Clear key: abandons the current entry.
    Clear,

    /// Enter key: submits the current entry.
    Enter,
}

impl KeypadInput {
    /// Create a digit input.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use keylock_hardware::traits::KeypadInput;
    ///
    /// let input = KeypadInput::digit(5).unwrap();
    /// assert_eq!(input.as_digit(), Some(5));
    ///
    /// assert!(KeypadInput::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        Digit::new(d)
            .map(Self::Digit)
            .map_err(|e| crate::error::HardwareError::invalid_data(e.to_string()))
    }

    /// Map a raw input byte to a key.
    ///
    /// ASCII `0`-`9` become digits, the bound control characters become
    /// control keys, and everything else is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use keylock_core::{Digit, KeyBindings};
    /// use keylock_hardware::traits::KeypadInput;
    ///
    /// let keys = KeyBindings::default();
    /// assert_eq!(KeypadInput::from_byte(b'7', &keys), KeypadInput::digit(7).ok());
    /// assert_eq!(KeypadInput::from_byte(b'*', &keys), Some(KeypadInput::ProgramEnable));
    /// assert_eq!(KeypadInput::from_byte(b'\n', &keys), None);
    /// ```
    pub fn from_byte(byte: u8, keys: &KeyBindings) -> Option<Self> {
        let c = char::from(byte);
        if let Some(digit) = Digit::from_ascii(byte) {
            Some(Self::Digit(digit))
        } else if c == keys.program_enable {
            Some(Self::ProgramEnable)
        } else if c == keys.clear {
            Some(Self::Clear)
        } else if c == keys.enter {
            Some(Self::Enter)
        } else {
            None
        }
    }

    /// The character this key is typed as under `keys`.
    pub fn to_char(&self, keys: &KeyBindings) -> char {
        match self {
            Self::Digit(d) => d.to_char(),
            Self::ProgramEnable => keys.program_enable,
            Self::Clear => keys.clear,
            Self::Enter => keys.enter,
        }
    }

    /// Check if this input is a digit.
    pub fn is_digit(&self) -> bool {
        matches!(self, Self::Digit(_))
    }

    /// Get the digit value if this is a digit input.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(d.value()),
            _ => None,
        }
    }
}

/// Keypad device abstraction.
///
/// Represents the lock's keypad. Each call to
/// [`read_input`](KeypadDevice::read_input) yields exactly one accepted key,
/// already filtered.
///
/// # Dynamic Dispatch
///
/// Native async traits are not object-safe, so `Box<dyn KeypadDevice>` is
/// not available. Use generic type parameters, or
/// [`AnyKeypadDevice`](crate::devices::AnyKeypadDevice) when the concrete
/// device is chosen at runtime.
///
/// # Examples
///
/// ```no_run
/// use keylock_hardware::traits::{KeypadDevice, KeypadInput};
/// use keylock_hardware::error::Result;
///
/// async fn read_code<K: KeypadDevice>(keypad: &mut K) -> Result<Vec<u8>> {
///     let mut code = Vec::new();
///
///     loop {
///         match keypad.read_input().await? {
///             KeypadInput::Digit(d) => code.push(d.value()),
///             KeypadInput::Enter => break,
///             KeypadInput::Clear => code.clear(),
///             KeypadInput::ProgramEnable => {}
///         }
///     }
///
///     Ok(code)
/// }
/// ```
pub trait KeypadDevice: Send + Sync {
    /// Read the next key from the keypad.
    ///
    /// This method waits asynchronously until a key is available. It must be
    /// cancel-safe: dropping the future before it completes loses no key.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected (end of input)
    /// - A communication error occurs
    async fn read_input(&mut self) -> Result<KeypadInput>;

    /// Set the keypad backlight (the activity LED).
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs.
    async fn set_backlight(&mut self, enabled: bool) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Bolt actuator and buzzer abstraction.
///
/// Applies [`ActuatorCommand`]s in the order the controller emits them.
/// Timing is owned by the controller's timer bank; a driver never sleeps.
pub trait ActuatorDevice: Send + Sync {
    /// Apply a single command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be delivered to the device.
    async fn apply(&mut self, command: ActuatorCommand) -> Result<()>;

    /// Get device information.
    ///
    /// # Errors
    ///
    /// Returns an error if a communication error occurs while querying
    /// device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
