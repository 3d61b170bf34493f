//! The lock controller aggregate.
//!
//! [`LockController`] owns everything the lock remembers: the current
//! [`LockState`], the [`CodeStore`], the [`TimerBank`], and a running
//! [`UnlockSequence`] if there is one. It has two entry points, one per
//! event source:
//!
//! - [`handle_key`](LockController::handle_key) for each accepted key
//! - [`on_tick`](LockController::on_tick) once per tick period
//!
//! Both return the [`ActuatorCommand`]s the caller must forward to the
//! actuator, in order.
//!
//! # Key Ordering
//!
//! Keys are processed strictly one at a time in arrival order. While an
//! unlock sequence is running, keys are queued and replayed once it
//! completes, so no key is interpreted mid-sequence. The queue holds at most
//! [`KEY_QUEUE_CAPACITY`] keys; further keys are dropped.
//!
//! # Idle Timeout
//!
//! A key that leaves a session open arms the LED-idle timer. When that timer
//! finishes without another key the session is reset, as if the keypad had
//! gone to sleep.
//!
//! # Examples
//!
//! ```
//! use keylock_emulator::LockController;
//! use keylock_emulator::state_machine::StateKind;
//! use keylock_hardware::KeypadInput;
//!
//! let mut controller = LockController::default();
//! for d in [5, 5, 5, 5, 5, 5] {
//!     controller.handle_key(KeypadInput::digit(d).unwrap());
//! }
//! let commands = controller.handle_key(KeypadInput::Enter);
//!
//! assert!(!commands.is_empty());
//! assert!(controller.is_unlocking());
//! assert_eq!(controller.state_kind(), StateKind::Idle);
//! ```

use std::collections::VecDeque;

use keylock_core::{LockConfig, constants::KEY_QUEUE_CAPACITY};
use keylock_hardware::{ActuatorCommand, KeypadInput};
use tracing::{debug, info, warn};

use crate::actuator::UnlockSequence;
use crate::code_store::CodeStore;
use crate::error::Result;
use crate::state_machine::{Effect, LockState, StateKind, StateTransition, transition};
use crate::timer::{Activity, TimerBank, TimerId, TimerStatus};

/// Maximum number of state transitions to keep in history.
const MAX_HISTORY_SIZE: usize = 100;

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Actuator commands to forward, in order.
    pub commands: Vec<ActuatorCommand>,

    /// Every timer was idle at this tick and was not at the previous one.
    pub went_to_sleep: bool,

    /// The idle timeout fired and the session was reset.
    pub timed_out: bool,
}

/// Keypad lock controller.
#[derive(Debug)]
pub struct LockController {
    state: LockState,
    store: CodeStore,
    timers: TimerBank,
    unlock: Option<UnlockSequence>,
    pending_keys: VecDeque<KeypadInput>,
    history: VecDeque<StateTransition>,
    config: LockConfig,
    sleeping: bool,
    unlock_count: u64,
}

impl LockController {
    /// Create a controller with factory codes.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: LockConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: LockConfig) -> Self {
        Self {
            state: LockState::Idle,
            store: CodeStore::new(),
            timers: TimerBank::new(),
            unlock: None,
            pending_keys: VecDeque::new(),
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            config,
            sleeping: false,
            unlock_count: 0,
        }
    }

    /// Feed one key to the lock.
    pub fn handle_key(&mut self, key: KeypadInput) -> Vec<ActuatorCommand> {
        if self.unlock.is_some() {
            if self.pending_keys.len() >= KEY_QUEUE_CAPACITY {
                warn!("Key queue full, dropping {:?}", key);
            } else {
                debug!("Unlock in progress, queueing {:?}", key);
                self.pending_keys.push_back(key);
            }
            return Vec::new();
        }

        self.process_key(key)
    }

    /// Advance the timer bank by one tick and react to finished timers.
    pub fn on_tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        match self.timers.tick() {
            Activity::Quiet if !self.sleeping => {
                info!("Going to sleep");
                self.sleeping = true;
                outcome.went_to_sleep = true;
            }
            Activity::Quiet => {}
            Activity::Busy => self.sleeping = false,
        }

        if let Some(sequence) = self.unlock.as_mut() {
            outcome.commands = sequence.advance(&mut self.timers);

            if sequence.is_complete() {
                debug!("Unlock sequence complete");
                self.unlock = None;

                while self.unlock.is_none() {
                    let Some(key) = self.pending_keys.pop_front() else {
                        break;
                    };
                    let commands = self.process_key(key);
                    outcome.commands.extend(commands);
                }
            }
        }

        if self.timers.poll(TimerId::LedIdle) == TimerStatus::Done {
            info!("Idle timeout in {}, resetting session", self.state.kind());
            self.reset();
            outcome.timed_out = true;
        }

        outcome
    }

    /// Abandon the current session and return to idle.
    ///
    /// Stored codes are kept. A running unlock sequence is not interrupted.
    pub fn reset(&mut self) {
        let from = self.state.kind();
        self.state = LockState::Idle;
        self.reset_timers();
        self.record(from, None);
    }

    fn process_key(&mut self, key: KeypadInput) -> Vec<ActuatorCommand> {
        let from = self.state.kind();
        let step = transition(std::mem::take(&mut self.state), key, &self.store);
        debug!("{} --{:?}--> {}", from, key, step.next.kind());

        let mut unlock_slot = None;
        for effect in step.effects {
            match effect {
                Effect::ResetSession => self.reset_timers(),
                Effect::RestoreFactoryAdmin => {
                    info!("Admin code restored to factory default");
                    self.store.init_admin();
                }
                Effect::RestoreFactorySlots => {
                    info!("All passcodes restored to factory defaults");
                    self.store.init_all_slots();
                }
                Effect::RestoreFactorySlot(slot) => {
                    info!("Passcode slot {} restored to factory default", slot);
                    self.store.init_slot(slot);
                }
                Effect::SaveAdmin(code) => {
                    info!("Admin code changed");
                    self.store.save_admin(code);
                }
                Effect::SavePasscode { slot, code } => {
                    info!("Passcode stored in slot {}", slot);
                    self.store.save_passcode_at(code, slot);
                }
                Effect::Unlock { slot } => unlock_slot = Some(slot),
            }
        }

        self.state = step.next;
        if !self.state.is_idle() {
            self.timers
                .arm(TimerId::LedIdle, self.config.timing.led_idle_ticks);
            self.sleeping = false;
        }
        self.record(from, Some(key));

        match unlock_slot {
            Some(slot) => {
                info!("Passcode slot {} accepted, unlocking", slot);
                self.unlock_count += 1;
                self.sleeping = false;

                let (sequence, commands) =
                    UnlockSequence::start(&self.config.timing, &self.config.tones, &mut self.timers);
                self.unlock = Some(sequence);
                commands
            }
            None => Vec::new(),
        }
    }

    /// Idle the timer bank, sparing the timers of a running unlock sequence.
    fn reset_timers(&mut self) {
        if self.unlock.is_some() {
            for timer in [TimerId::Debounce, TimerId::KeyFunction, TimerId::LedIdle] {
                self.timers.clear(timer, 0, false);
            }
        } else {
            self.timers.clear(TimerId::LedIdle, 0, true);
        }
    }

    fn record(&mut self, from: StateKind, key: Option<KeypadInput>) {
        self.history
            .push_back(StateTransition::new(from, self.state.kind(), key));
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }

    /// Current state, with its entry data.
    pub fn state(&self) -> &LockState {
        &self.state
    }

    /// Name of the current state.
    pub fn state_kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn store(&self) -> &CodeStore {
        &self.store
    }

    pub fn timers(&self) -> &TimerBank {
        &self.timers
    }

    pub fn config(&self) -> &LockConfig {
        &self.config
    }

    /// Check if an unlock sequence is running.
    pub fn is_unlocking(&self) -> bool {
        self.unlock.is_some()
    }

    /// Number of keys waiting for the unlock sequence to finish.
    pub fn pending_key_count(&self) -> usize {
        self.pending_keys.len()
    }

    /// Number of unlock sequences started since creation.
    pub fn unlock_count(&self) -> u64 {
        self.unlock_count
    }

    /// Check if the last tick found every timer idle.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Recent state transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// The last `count` state transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        let skip = self.history.len().saturating_sub(count);
        self.history.iter().skip(skip).cloned().collect()
    }
}

impl Default for LockController {
    fn default() -> Self {
        Self::with_valid_config(LockConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keylock_core::{Code, SlotIndex};
    use keylock_hardware::SignalLine;

    fn press(controller: &mut LockController, keys: &str) -> Vec<ActuatorCommand> {
        let bindings = controller.config().keys;
        keys.bytes()
            .filter_map(|b| KeypadInput::from_byte(b, &bindings))
            .flat_map(|key| controller.handle_key(key))
            .collect()
    }

    fn tick_until_locked(controller: &mut LockController) -> Vec<ActuatorCommand> {
        let mut commands = Vec::new();
        for _ in 0..50 {
            let outcome = controller.on_tick();
            commands.extend(outcome.commands);
            if !controller.is_unlocking() {
                break;
            }
        }
        commands
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = LockConfig::default();
        config.timing.unlock_ticks = 0;

        assert!(LockController::new(config).is_err());
        assert!(LockController::new(LockConfig::default()).is_ok());
    }

    #[test]
    fn test_passcode_runs_sequence_to_completion() {
        let mut controller = LockController::default();

        let first = press(&mut controller, "333333+");
        assert_eq!(
            first,
            vec![ActuatorCommand::Assert {
                line: SignalLine::Unlock
            }]
        );
        assert_eq!(controller.unlock_count(), 1);

        let rest = tick_until_locked(&mut controller);
        assert!(!controller.is_unlocking());
        assert_eq!(
            rest.last(),
            Some(&ActuatorCommand::Release {
                line: SignalLine::Lock
            })
        );
    }

    #[test]
    fn test_keys_queued_during_unlock() {
        let mut controller = LockController::default();
        press(&mut controller, "333333+");

        assert!(press(&mut controller, "444444+").is_empty());
        assert_eq!(controller.pending_key_count(), 7);
        assert_eq!(controller.state_kind(), StateKind::Idle);

        let commands = tick_until_locked(&mut controller);

        // The queued passcode ran a second sequence after the first
        let unlocks = commands
            .iter()
            .filter(|c| {
                **c == ActuatorCommand::Assert {
                    line: SignalLine::Unlock,
                }
            })
            .count();
        assert_eq!(unlocks, 1);
        assert_eq!(controller.unlock_count(), 2);
        assert_eq!(controller.pending_key_count(), 0);
        assert!(!controller.is_unlocking());
    }

    #[test]
    fn test_key_queue_is_bounded() {
        let mut controller = LockController::default();
        press(&mut controller, "333333+");

        let flood = "4".repeat(KEY_QUEUE_CAPACITY + 10);
        press(&mut controller, &flood);
        assert_eq!(controller.pending_key_count(), KEY_QUEUE_CAPACITY);

        // Replayed as nine overflowing entries plus one digit
        tick_until_locked(&mut controller);
        assert_eq!(controller.pending_key_count(), 0);
        assert_eq!(controller.unlock_count(), 1);
        assert_eq!(controller.state_kind(), StateKind::GetPasscode);
        assert_eq!(controller.state().entry().map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_queued_keys_after_second_unlock_stay_ordered() {
        let mut controller = LockController::default();
        press(&mut controller, "333333+");
        press(&mut controller, "444444+12");

        tick_until_locked(&mut controller);

        assert_eq!(controller.unlock_count(), 2);
        assert_eq!(controller.state_kind(), StateKind::GetPasscode);
        assert_eq!(
            controller.state().entry().map(|e| e.as_slice().to_vec()),
            Some(vec![1, 2])
        );
    }

    #[test]
    fn test_idle_timeout_resets_session() {
        let mut controller = LockController::default();
        press(&mut controller, "*01");
        assert_eq!(controller.state_kind(), StateKind::GetAdminCode);

        let led_ticks = controller.config().timing.led_idle_ticks;
        for _ in 1..led_ticks - 1 {
            assert!(!controller.on_tick().timed_out);
        }

        let outcome = controller.on_tick();
        assert!(outcome.timed_out);
        assert_eq!(controller.state_kind(), StateKind::Idle);
        assert_eq!(controller.history().back().and_then(|t| t.key), None);

        assert!(controller.on_tick().went_to_sleep);
        assert!(controller.is_sleeping());
    }

    #[test]
    fn test_key_rearms_idle_timer() {
        let mut controller = LockController::default();
        press(&mut controller, "1");

        for _ in 0..20 {
            controller.on_tick();
        }
        press(&mut controller, "2");
        for _ in 0..20 {
            assert!(!controller.on_tick().timed_out);
        }

        assert_eq!(controller.state_kind(), StateKind::GetPasscode);
    }

    #[test]
    fn test_sleep_reported_once_per_quiet_edge() {
        let mut controller = LockController::default();

        assert!(controller.on_tick().went_to_sleep);
        assert!(!controller.on_tick().went_to_sleep);

        press(&mut controller, "5");
        assert!(!controller.on_tick().went_to_sleep);

        press(&mut controller, "-");
        assert!(controller.on_tick().went_to_sleep);
    }

    #[test]
    fn test_program_and_use_passcode() {
        let mut controller = LockController::default();
        press(&mut controller, "012345+7+246810+");

        let slot = SlotIndex::new(7).unwrap();
        assert_eq!(
            controller.store().slot(slot).code(),
            Some(&"246810".parse::<Code>().unwrap())
        );

        assert!(press(&mut controller, "777777+").is_empty());
        assert_eq!(controller.unlock_count(), 0);

        press(&mut controller, "246810+");
        assert_eq!(controller.unlock_count(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut controller = LockController::default();
        for _ in 0..(MAX_HISTORY_SIZE + 20) {
            press(&mut controller, "-");
        }

        assert_eq!(controller.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(controller.last_transitions(3).len(), 3);
        assert_eq!(controller.last_transitions(1000).len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_history_records_keys() {
        let mut controller = LockController::default();
        press(&mut controller, "*0");

        let history = controller.last_transitions(2);
        assert_eq!(history[0].from, StateKind::Idle);
        assert_eq!(history[0].to, StateKind::GetAdminCode);
        assert_eq!(history[0].key, Some(KeypadInput::ProgramEnable));
        assert_eq!(history[1].key, Some(KeypadInput::digit(0).unwrap()));
    }

    #[test]
    fn test_reset_spares_running_sequence() {
        let mut controller = LockController::default();
        press(&mut controller, "333333+");

        controller.reset();
        assert!(controller.is_unlocking());

        tick_until_locked(&mut controller);
        assert!(!controller.is_unlocking());
    }
}
