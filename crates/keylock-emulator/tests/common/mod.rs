//! Common test utilities for integration tests.
//!
//! Key sequences are written the way an operator types them, using the
//! default bindings: `*` program-enable, `-` clear, `+` enter. Any other
//! non-digit character is dropped, so spaces can be used to group keys:
//!
//! ```ignore
//! let commands = common::press(&mut controller, "* 012345 + 987654 + 987654 +");
//! ```

#![allow(dead_code)]

use keylock_core::{Code, KeyBindings, SlotIndex};
use keylock_emulator::LockController;
use keylock_hardware::{ActuatorCommand, KeypadInput, SignalLine};

/// Translate an operator key string into keys.
pub fn keys(typed: &str) -> Vec<KeypadInput> {
    let bindings = KeyBindings::default();
    typed
        .bytes()
        .filter_map(|b| KeypadInput::from_byte(b, &bindings))
        .collect()
}

/// Type `typed` into the controller, returning the actuator commands issued.
pub fn press(controller: &mut LockController, typed: &str) -> Vec<ActuatorCommand> {
    keys(typed)
        .into_iter()
        .flat_map(|key| controller.handle_key(key))
        .collect()
}

/// Tick until no unlock sequence is running, returning the commands issued.
pub fn tick_until_locked(controller: &mut LockController) -> Vec<ActuatorCommand> {
    let mut commands = Vec::new();
    for _ in 0..100 {
        if !controller.is_unlocking() {
            break;
        }
        commands.extend(controller.on_tick().commands);
    }
    assert!(!controller.is_unlocking(), "unlock sequence never completed");
    commands
}

/// Count unlock-line assertions in a command list.
pub fn unlocks(commands: &[ActuatorCommand]) -> usize {
    commands
        .iter()
        .filter(|c| {
            **c == ActuatorCommand::Assert {
                line: SignalLine::Unlock,
            }
        })
        .count()
}

pub fn slot(index: u8) -> SlotIndex {
    SlotIndex::new(index).unwrap()
}

pub fn code(digits: &str) -> Code {
    digits.parse().unwrap()
}

/// Assert every slot holds `{i,i,i,i,i,i}`.
pub fn assert_factory_slots(controller: &LockController) {
    for index in 0..10u8 {
        let expected = Code::new([index; 6]).unwrap();
        assert_eq!(
            controller.store().slot(slot(index)).code(),
            Some(&expected),
            "slot {} is not at its factory passcode",
            index
        );
    }
}
