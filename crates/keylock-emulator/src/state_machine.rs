//! Lock state machine.
//!
//! The machine is a pure function from the current [`LockState`] and one
//! [`KeypadInput`] to the next state plus a list of [`Effect`]s for the
//! owner to apply. It reads the [`CodeStore`] to validate entries but never
//! writes to it; every mutation is expressed as an effect.
//!
//! # States
//!
//! - `Idle`: waiting for the first key of a session
//! - `GetPasscode`: collecting a passcode (or the admin code) from idle
//! - `GetAdminCode`: collecting the admin code after program-enable
//! - `GotAdminCode`: admin accepted, collecting a new admin code
//! - `AdminCodeRepeat`: collecting the new admin code a second time
//! - `SlotIndexOrClear`: admin accepted from idle, waiting for a slot digit
//! - `ClearConfirm`: waiting for Enter to erase every passcode
//! - `SlotPasscodeEntry`: collecting the passcode for the selected slot
//!
//! # Use Cases
//!
//! | Keys | Outcome |
//! |---|---|
//! | `* -` | factory admin code restored |
//! | `* admin + new + new +` | admin code changed (slots re-seeded on the first `+`) |
//! | `admin + + +` | every slot restored to its factory passcode |
//! | `admin + slot + code +` | passcode stored in `slot` |
//! | `admin + slot + +` | `slot` restored to its factory passcode |
//! | `code +` | unlock |
//!
//! Program-enable pressed in any state other than `Idle` aborts the session
//! before it is interpreted, so it always lands in `GetAdminCode`.
//!
//! # Examples
//!
//! ```
//! use keylock_emulator::code_store::CodeStore;
//! use keylock_emulator::state_machine::{Effect, LockState, StateKind, transition};
//! use keylock_hardware::KeypadInput;
//!
//! let store = CodeStore::new();
//! let mut state = LockState::Idle;
//!
//! for d in [3, 3, 3, 3, 3, 3] {
//!     state = transition(state, KeypadInput::digit(d).unwrap(), &store).next;
//! }
//! assert_eq!(state.kind(), StateKind::GetPasscode);
//!
//! let step = transition(state, KeypadInput::Enter, &store);
//! assert_eq!(step.next.kind(), StateKind::Idle);
//! assert!(step.effects.iter().any(|e| matches!(e, Effect::Unlock { .. })));
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use keylock_core::{Code, SlotIndex};
use keylock_hardware::KeypadInput;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::buffer::{EntryBuffer, Push};
use crate::code_store::{Classification, CodeStore, Comparison, compare_buffers};

/// Current state of the lock, carrying the data each state needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LockState {
    #[default]
    Idle,

    GetPasscode {
        entry: EntryBuffer,
    },

    GetAdminCode {
        entry: EntryBuffer,
    },

    GotAdminCode {
        entry: EntryBuffer,
    },

    /// `pending` is the new admin code typed in `GotAdminCode`.
    AdminCodeRepeat {
        pending: Code,
        entry: EntryBuffer,
    },

    /// `slot` is set once the single index digit has been typed.
    SlotIndexOrClear {
        slot: Option<SlotIndex>,
    },

    ClearConfirm,

    SlotPasscodeEntry {
        slot: SlotIndex,
        entry: EntryBuffer,
    },
}

impl LockState {
    /// The state's name without its data.
    pub fn kind(&self) -> StateKind {
        match self {
            LockState::Idle => StateKind::Idle,
            LockState::GetPasscode { .. } => StateKind::GetPasscode,
            LockState::GetAdminCode { .. } => StateKind::GetAdminCode,
            LockState::GotAdminCode { .. } => StateKind::GotAdminCode,
            LockState::AdminCodeRepeat { .. } => StateKind::AdminCodeRepeat,
            LockState::SlotIndexOrClear { .. } => StateKind::SlotIndexOrClear,
            LockState::ClearConfirm => StateKind::ClearConfirm,
            LockState::SlotPasscodeEntry { .. } => StateKind::SlotPasscodeEntry,
        }
    }

    /// Check if the machine is waiting for a new session.
    pub fn is_idle(&self) -> bool {
        matches!(self, LockState::Idle)
    }

    /// Digits typed so far in the current data-entry state.
    pub fn entry(&self) -> Option<&EntryBuffer> {
        match self {
            LockState::GetPasscode { entry }
            | LockState::GetAdminCode { entry }
            | LockState::GotAdminCode { entry }
            | LockState::AdminCodeRepeat { entry, .. }
            | LockState::SlotPasscodeEntry { entry, .. } => Some(entry),
            LockState::Idle | LockState::SlotIndexOrClear { .. } | LockState::ClearConfirm => None,
        }
    }
}

/// Name of a [`LockState`], for logs and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    Idle,
    GetPasscode,
    GetAdminCode,
    GotAdminCode,
    AdminCodeRepeat,
    SlotIndexOrClear,
    ClearConfirm,
    SlotPasscodeEntry,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Idle => "Idle",
            StateKind::GetPasscode => "GetPasscode",
            StateKind::GetAdminCode => "GetAdminCode",
            StateKind::GotAdminCode => "GotAdminCode",
            StateKind::AdminCodeRepeat => "AdminCodeRepeat",
            StateKind::SlotIndexOrClear => "SlotIndexOrClear",
            StateKind::ClearConfirm => "ClearConfirm",
            StateKind::SlotPasscodeEntry => "SlotPasscodeEntry",
        };
        write!(f, "{}", name)
    }
}

/// A change the owner of the machine must carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Session ended: idle the timer bank.
    ResetSession,

    /// Put the factory admin code back.
    RestoreFactoryAdmin,

    /// Put every slot back to its factory passcode.
    RestoreFactorySlots,

    /// Put one slot back to its factory passcode.
    RestoreFactorySlot(SlotIndex),

    /// Store a new admin code.
    SaveAdmin(Code),

    /// Store a passcode in a slot.
    SavePasscode { slot: SlotIndex, code: Code },

    /// Run the unlock actuator sequence; `slot` is the passcode that matched.
    Unlock { slot: SlotIndex },
}

/// Result of feeding one key to the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the key.
    pub next: LockState,

    /// Effects to apply, in order.
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: LockState) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    fn reset() -> Self {
        Self::reset_with(Vec::new())
    }

    /// End the session after `effects`.
    fn reset_with(mut effects: Vec<Effect>) -> Self {
        effects.push(Effect::ResetSession);
        Self {
            next: LockState::Idle,
            effects,
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Compute the machine's response to one key.
pub fn transition(state: LockState, key: KeypadInput, store: &CodeStore) -> Transition {
    if key == KeypadInput::ProgramEnable && !state.is_idle() {
        // Abort, then start over as if from idle
        let restart = from_idle(key);
        let mut effects = vec![Effect::ResetSession];
        effects.extend(restart.effects);
        return Transition {
            next: restart.next,
            effects,
        };
    }

    match state {
        LockState::Idle => from_idle(key),

        LockState::GetPasscode { entry } => match key {
            KeypadInput::Digit(d) => {
                append(entry, d.value(), |entry| LockState::GetPasscode { entry })
            }
            KeypadInput::Enter => match store.classify(entry.as_slice()) {
                Classification::Admin => LockState::SlotIndexOrClear { slot: None }.into(),
                Classification::Passcode(slot) => Transition::reset().with_effect(Effect::Unlock { slot }),
                Classification::Unknown => {
                    warn!("Rejected code ({} digits)", entry.len());
                    Transition::reset()
                }
            },
            KeypadInput::Clear | KeypadInput::ProgramEnable => Transition::reset(),
        },

        LockState::GetAdminCode { entry } => match key {
            KeypadInput::Digit(d) => {
                append(entry, d.value(), |entry| LockState::GetAdminCode { entry })
            }
            KeypadInput::Enter => {
                if store.classify(entry.as_slice()) == Classification::Admin {
                    Transition {
                        next: LockState::GotAdminCode {
                            entry: EntryBuffer::new(),
                        },
                        effects: vec![Effect::RestoreFactorySlots],
                    }
                } else {
                    LockState::GetAdminCode { entry }.into()
                }
            }
            KeypadInput::Clear if entry.is_empty() => {
                Transition::reset_with(vec![Effect::RestoreFactoryAdmin])
            }
            KeypadInput::Clear | KeypadInput::ProgramEnable => Transition::reset(),
        },

        LockState::GotAdminCode { entry } => match key {
            KeypadInput::Digit(d) => {
                append(entry, d.value(), |entry| LockState::GotAdminCode { entry })
            }
            KeypadInput::Enter => match entry.as_code() {
                Some(pending) => LockState::AdminCodeRepeat {
                    pending,
                    entry: EntryBuffer::new(),
                }
                .into(),
                None => LockState::GotAdminCode { entry }.into(),
            },
            KeypadInput::Clear | KeypadInput::ProgramEnable => Transition::reset(),
        },

        LockState::AdminCodeRepeat { pending, entry } => match key {
            KeypadInput::Digit(d) => append(entry, d.value(), |entry| LockState::AdminCodeRepeat {
                pending,
                entry,
            }),
            KeypadInput::Enter => {
                if compare_buffers(entry.as_slice(), pending.digits()) == Comparison::Match {
                    Transition::reset_with(vec![Effect::SaveAdmin(pending)])
                } else {
                    warn!("New admin code not confirmed");
                    Transition::reset()
                }
            }
            KeypadInput::Clear | KeypadInput::ProgramEnable => Transition::reset(),
        },

        LockState::SlotIndexOrClear { slot } => match (key, slot) {
            (KeypadInput::Digit(d), None) => match SlotIndex::new(d.value()) {
                Ok(slot) => LockState::SlotIndexOrClear { slot: Some(slot) }.into(),
                Err(_) => Transition::reset(),
            },
            // Only one index digit is accepted
            (KeypadInput::Digit(_), Some(_)) => Transition::reset(),
            (KeypadInput::Enter, None) => LockState::ClearConfirm.into(),
            (KeypadInput::Enter, Some(slot)) => LockState::SlotPasscodeEntry {
                slot,
                entry: EntryBuffer::new(),
            }
            .into(),
            (KeypadInput::Clear | KeypadInput::ProgramEnable, _) => Transition::reset(),
        },

        LockState::ClearConfirm => match key {
            KeypadInput::Enter => Transition::reset_with(vec![Effect::RestoreFactorySlots]),
            _ => Transition::reset(),
        },

        LockState::SlotPasscodeEntry { slot, entry } => match key {
            KeypadInput::Digit(d) => append(entry, d.value(), |entry| LockState::SlotPasscodeEntry {
                slot,
                entry,
            }),
            KeypadInput::Enter => {
                if entry.is_empty() {
                    Transition::reset_with(vec![Effect::RestoreFactorySlot(slot)])
                } else if let Some(code) = entry.as_code() {
                    Transition::reset_with(vec![Effect::SavePasscode { slot, code }])
                } else {
                    warn!(
                        "Passcode for slot {} has {} digits, not stored",
                        slot,
                        entry.len()
                    );
                    Transition::reset()
                }
            }
            KeypadInput::Clear | KeypadInput::ProgramEnable => Transition::reset(),
        },
    }
}

fn from_idle(key: KeypadInput) -> Transition {
    match key {
        KeypadInput::ProgramEnable => LockState::GetAdminCode {
            entry: EntryBuffer::new(),
        }
        .into(),
        KeypadInput::Digit(d) => LockState::GetPasscode {
            entry: EntryBuffer::with_digit(d.value()),
        }
        .into(),
        KeypadInput::Clear | KeypadInput::Enter => Transition::reset(),
    }
}

/// Append a digit, ending the session if the entry outgrows a code.
fn append(
    mut entry: EntryBuffer,
    digit: u8,
    rebuild: impl FnOnce(EntryBuffer) -> LockState,
) -> Transition {
    match entry.push(digit) {
        Push::Accepted => rebuild(entry).into(),
        Push::Overflow => Transition::reset(),
    }
}

impl From<LockState> for Transition {
    fn from(next: LockState) -> Self {
        Transition::to(next)
    }
}

/// One recorded state change.
///
/// The `timestamp` is not serialized as `Instant` is process-specific; a
/// deserialized record carries the time of deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: StateKind,

    /// The state transitioned to.
    pub to: StateKind,

    /// The key that caused it, or `None` for an idle-timeout reset.
    pub key: Option<KeypadInput>,

    /// When the transition occurred.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    /// Create a record stamped with the current time.
    pub fn new(from: StateKind, to: StateKind, key: Option<KeypadInput>) -> Self {
        Self {
            from,
            to,
            key,
            timestamp: Instant::now(),
        }
    }

    /// Time since the transition.
    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}
