//! Mock keypad implementation for testing and development.
//!
//! This module provides a simulated keypad device that can be controlled
//! programmatically for testing without requiring physical hardware.

use keylock_core::KeyBindings;
use tokio::sync::mpsc;

use crate::{
    Result,
    traits::{KeypadDevice, KeypadInput},
    types::DeviceInfo,
};

/// Mock keypad device for testing and development.
///
/// This device simulates the lock keypad by receiving input through
/// an internal channel. Tests and applications can send key presses
/// programmatically using a `MockKeypadHandle`.
///
/// # Examples
///
/// ```
/// use keylock_hardware::mock::MockKeypad;
/// use keylock_hardware::traits::{KeypadDevice, KeypadInput};
///
/// #[tokio::main]
/// async fn main() -> keylock_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     tokio::spawn(async move {
///         handle.send_input(KeypadInput::digit(1).unwrap()).await.unwrap();
///         handle.send_input(KeypadInput::Enter).await.unwrap();
///     });
///
///     assert_eq!(keypad.read_input().await?, KeypadInput::digit(1).unwrap());
///     assert_eq!(keypad.read_input().await?, KeypadInput::Enter);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    /// Channel receiver for simulated input
    input_rx: mpsc::Receiver<KeypadInput>,

    /// Device name
    name: String,

    /// Backlight state
    backlight_enabled: bool,
}

impl MockKeypad {
    /// Create a new mock keypad with the default name.
    ///
    /// Returns a tuple of (MockKeypad, MockKeypadHandle) where the handle
    /// can be used to simulate input to the keypad.
    pub fn new() -> (Self, MockKeypadHandle) {
        Self::with_name("Mock Keypad".to_string())
    }

    /// Create a new mock keypad with a custom name.
    pub fn with_name(name: String) -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(32);

        let keypad = Self {
            input_rx,
            name: name.clone(),
            backlight_enabled: false,
        };

        let handle = MockKeypadHandle {
            input_tx,
            name,
            keys: KeyBindings::default(),
        };

        (keypad, handle)
    }

    /// Check if the backlight is currently enabled.
    ///
    /// This is useful for testing the idle timeout.
    pub fn is_backlight_enabled(&self) -> bool {
        self.backlight_enabled
    }
}

impl Default for MockKeypad {
    fn default() -> Self {
        Self::new().0
    }
}

impl KeypadDevice for MockKeypad {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        self.input_rx
            .recv()
            .await
            .ok_or_else(|| crate::HardwareError::disconnected("Keypad input channel closed"))
    }

    async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        self.backlight_enabled = enabled;
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Keypad v1.0").with_firmware_version("1.0.0"))
    }
}

/// Handle for controlling a mock keypad.
///
/// This handle allows programmatic control of the mock keypad by sending
/// key events. It can be cloned and shared across tasks; dropping every
/// handle disconnects the keypad.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    /// Channel sender for simulated input
    input_tx: mpsc::Sender<KeypadInput>,

    /// Device name
    name: String,

    /// Bindings used to decode typed sequences
    keys: KeyBindings,
}

impl MockKeypadHandle {
    /// Use custom control-key bindings for [`type_keys`](Self::type_keys).
    pub fn with_bindings(mut self, keys: KeyBindings) -> Self {
        self.keys = keys;
        self
    }

    /// Send an input event to the mock keypad.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn send_input(&self, input: KeypadInput) -> Result<()> {
        self.input_tx
            .send(input)
            .await
            .map_err(|_| crate::HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Send a sequence of digit inputs.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any digit is greater than 9
    /// - The keypad has been dropped and the channel is closed
    ///
    /// # Examples
    ///
    /// ```
    /// use keylock_hardware::mock::MockKeypad;
    ///
    /// #[tokio::main]
    /// async fn main() -> keylock_hardware::Result<()> {
    ///     let (_keypad, handle) = MockKeypad::new();
    ///
    ///     handle.send_digits(&[3, 3, 3, 3, 3, 3]).await?;
    ///
    ///     Ok(())
    /// }
    /// ```
    pub async fn send_digits(&self, digits: &[u8]) -> Result<()> {
        for &digit in digits {
            let input = KeypadInput::digit(digit)?;
            self.send_input(input).await?;
        }
        Ok(())
    }

    /// Send a full code followed by Enter.
    ///
    /// # Errors
    ///
    /// Same as [`send_digits`](Self::send_digits).
    pub async fn send_code(&self, digits: &[u8]) -> Result<()> {
        self.send_digits(digits).await?;
        self.send_input(KeypadInput::Enter).await?;
        Ok(())
    }

    /// Type a string of key characters, e.g. `"*012345+"`.
    ///
    /// Characters that do not map to a key are skipped, exactly as the
    /// input collector would drop them.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn type_keys(&self, keys: &str) -> Result<()> {
        for byte in keys.bytes() {
            if let Some(input) = KeypadInput::from_byte(byte, &self.keys) {
                self.send_input(input).await?;
            }
        }
        Ok(())
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
