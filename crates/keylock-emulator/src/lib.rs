//! Keylock emulator crate providing the combination-lock controller.
//!
//! This crate contains the timer bank, the code store, the unlock actuator
//! sequence and the lock state machine, tied together by
//! [`LockController`] and driven by [`run_lock`].

pub mod actuator;
pub mod buffer;
pub mod code_store;
pub mod controller;
pub mod error;
pub mod runner;
pub mod state_machine;
pub mod timer;

pub use code_store::{Classification, CodeSlot, CodeStore, Comparison};
pub use controller::{LockController, TickOutcome};
pub use error::{EmulatorError, Result};
pub use runner::{run_lock, run_lock_until};
pub use state_machine::{Effect, LockState, StateKind, StateTransition, Transition, transition};
pub use timer::{Activity, TimerBank, TimerId, TimerStatus};
