//! Fixed dimensions and reference timings of the keypad lock.
//!
//! The lock stores one admin code and a fixed bank of passcode slots, every
//! code being a fixed-length run of decimal digits. Timings are expressed in
//! ticks: one tick is one period of whatever tick source drives the timer
//! bank (one second in the reference console build).
//!
//! # Usage
//!
//! ```
//! use keylock_core::constants::*;
//!
//! assert_eq!(MAX_CODE_SIZE, 6);
//! assert_eq!(ENTRY_BUFFER_CAPACITY, MAX_CODE_SIZE + 1);
//! assert_eq!(FACTORY_ADMIN_CODE, [0, 1, 2, 3, 4, 5]);
//! ```
//!
//! The tick counts here are the defaults of [`TimingConfig`](crate::TimingConfig)
//! and [`ToneConfig`](crate::ToneConfig); a deployment may override them.

// ============================================================================
// Code Storage
// ============================================================================

/// Number of digits in every admin code and passcode.
pub const MAX_CODE_SIZE: usize = 6;

/// Number of independent passcode slots (indices 0-9).
pub const MAX_PASSCODE_SLOTS: usize = 10;

/// Backing size of an entry buffer.
///
/// One position larger than a code so that the digit that overflows a code
/// can be written and detected. The extra position is never usable capacity:
/// writing it forces a session reset.
pub const ENTRY_BUFFER_CAPACITY: usize = MAX_CODE_SIZE + 1;

/// Admin code installed at start-up and by the factory-reset use-case.
pub const FACTORY_ADMIN_CODE: [u8; MAX_CODE_SIZE] = [0, 1, 2, 3, 4, 5];

// ============================================================================
// Control Keys
// ============================================================================

/// Default character of the program-enable key.
///
/// Starts every administrative use-case and aborts any session in progress.
pub const KEY_PROGRAM_ENABLE: char = '*';

/// Default character of the clear key.
pub const KEY_CLEAR: char = '-';

/// Default character of the enter key.
pub const KEY_ENTER: char = '+';

/// Keys buffered between the keypad and the controller.
///
/// Bounds both the console input channel and the queue of keys held back
/// while an unlock sequence runs; keys beyond it are dropped.
pub const KEY_QUEUE_CAPACITY: usize = 64;

// ============================================================================
// Tick Source
// ============================================================================

/// Default tick period in milliseconds.
///
/// The reference console build counts whole wall-clock seconds.
pub const DEFAULT_TICK_PERIOD_MS: u64 = 1000;

// ============================================================================
// Actuator Timing (ticks)
// ============================================================================

/// Ticks the unlock signal is held asserted.
///
/// A timer armed with 1 reports done on its first poll, so 2 is the
/// smallest count that spans a tick boundary.
pub const UNLOCK_TICK_COUNT: u32 = 2;

/// Ticks the lock signal is held asserted when re-locking.
pub const LOCK_TICK_COUNT: u32 = 2;

/// Ticks between the confirmation tones and re-locking.
pub const PUSH_BACK_TICK_COUNT: u32 = 2;

/// Ticks of keypad inactivity before the session is dropped.
pub const LED_TURNOFF_TICK_COUNT: u32 = 23;

// ============================================================================
// Confirmation Tones
// ============================================================================

/// Pitch of the first confirmation tone.
pub const CONFIRM_TONE_LOW_HZ: u16 = 250;

/// Pitch of the second confirmation tone.
pub const CONFIRM_TONE_HIGH_HZ: u16 = 650;

/// Ticks each confirmation tone sounds.
pub const CONFIRM_TONE_ON_TICKS: u32 = 3;

/// Ticks of silence after each confirmation tone.
pub const CONFIRM_TONE_OFF_TICKS: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_admin_code_has_code_length() {
        assert_eq!(FACTORY_ADMIN_CODE.len(), MAX_CODE_SIZE);
        assert!(FACTORY_ADMIN_CODE.iter().all(|d| *d <= 9));
    }

    #[test]
    fn test_control_keys_are_distinct_non_digits() {
        let keys = [KEY_PROGRAM_ENABLE, KEY_CLEAR, KEY_ENTER];
        assert!(keys.iter().all(|k| !k.is_ascii_digit()));
        assert_ne!(KEY_PROGRAM_ENABLE, KEY_CLEAR);
        assert_ne!(KEY_PROGRAM_ENABLE, KEY_ENTER);
        assert_ne!(KEY_CLEAR, KEY_ENTER);
    }
}
