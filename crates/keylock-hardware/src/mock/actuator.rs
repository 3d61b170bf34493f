//! Mock actuator implementation for testing and development.
//!
//! The mock records every command it is given and forwards a copy to a
//! [`MockActuatorHandle`], so a test can observe the bolt and buzzer while
//! the runner owns the device.

use tokio::sync::mpsc;

use crate::{
    Result,
    traits::ActuatorDevice,
    types::{ActuatorCommand, DeviceInfo, SignalLine},
};

/// Mock bolt actuator and buzzer.
///
/// # Examples
///
/// ```
/// use keylock_hardware::mock::MockActuator;
/// use keylock_hardware::traits::ActuatorDevice;
/// use keylock_hardware::types::ActuatorCommand;
///
/// #[tokio::main]
/// async fn main() -> keylock_hardware::Result<()> {
///     let (mut actuator, mut handle) = MockActuator::new();
///
///     actuator.apply(ActuatorCommand::ToneOn { pitch_hz: 250 }).await?;
///     actuator.apply(ActuatorCommand::ToneOff).await?;
///
///     assert_eq!(handle.drain().len(), 2);
///     assert_eq!(actuator.commands().len(), 2);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockActuator {
    /// Channel sender mirroring applied commands
    command_tx: mpsc::UnboundedSender<ActuatorCommand>,

    /// Every command applied so far, in order
    applied: Vec<ActuatorCommand>,

    /// Device name
    name: String,
}

impl MockActuator {
    /// Create a new mock actuator with the default name.
    pub fn new() -> (Self, MockActuatorHandle) {
        Self::with_name("Mock Actuator".to_string())
    }

    /// Create a new mock actuator with a custom name.
    pub fn with_name(name: String) -> (Self, MockActuatorHandle) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let actuator = Self {
            command_tx,
            applied: Vec::new(),
            name,
        };

        (actuator, MockActuatorHandle { command_rx })
    }

    /// Every command applied so far, in order.
    pub fn commands(&self) -> &[ActuatorCommand] {
        &self.applied
    }

    /// Number of times the unlock line was asserted.
    pub fn unlock_count(&self) -> usize {
        self.applied
            .iter()
            .filter(|c| {
                **c == ActuatorCommand::Assert {
                    line: SignalLine::Unlock,
                }
            })
            .count()
    }
}

impl Default for MockActuator {
    fn default() -> Self {
        Self::new().0
    }
}

impl ActuatorDevice for MockActuator {
    async fn apply(&mut self, command: ActuatorCommand) -> Result<()> {
        self.applied.push(command);
        // The observer is optional; a dropped handle is not a device fault.
        let _ = self.command_tx.send(command);
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Actuator v1.0").with_firmware_version("1.0.0"))
    }
}

/// Observer side of a [`MockActuator`].
#[derive(Debug)]
pub struct MockActuatorHandle {
    command_rx: mpsc::UnboundedReceiver<ActuatorCommand>,
}

impl MockActuatorHandle {
    /// Wait for the next applied command.
    ///
    /// Returns `None` once the actuator is dropped and every command has
    /// been received.
    pub async fn recv(&mut self) -> Option<ActuatorCommand> {
        self.command_rx.recv().await
    }

    /// Take every command applied since the last call without waiting.
    pub fn drain(&mut self) -> Vec<ActuatorCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = self.command_rx.try_recv() {
            commands.push(command);
        }
        commands
    }
}
