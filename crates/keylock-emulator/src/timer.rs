//! Software countdown timers standing in for a hardware timer interrupt.
//!
//! The bank holds five named counters. A tick source calls
//! [`TimerBank::tick`] once per tick period (the interrupt half); everything
//! else only reads or sets counters (the foreground half) and never
//! decrements.
//!
//! # Counter Semantics
//!
//! - `0` is idle.
//! - `1` is "done": the counter reached the end of its run and is waiting to
//!   be observed. A tick never decrements it further.
//! - `n > 1` is running with `n` ticks remaining.
//!
//! [`TimerBank::poll`] reports [`TimerStatus::Done`] exactly once for each
//! run, idling the counter as it does so.
//!
//! # Examples
//!
//! ```
//! use keylock_emulator::timer::{TimerBank, TimerId, TimerStatus};
//!
//! let mut timers = TimerBank::new();
//! timers.arm(TimerId::Unlock, 2);
//! assert_eq!(timers.poll(TimerId::Unlock), TimerStatus::Running(2));
//!
//! timers.tick();
//! assert_eq!(timers.poll(TimerId::Unlock), TimerStatus::Done);
//! assert_eq!(timers.poll(TimerId::Unlock), TimerStatus::Idle);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Counter value meaning "not running".
const TIMER_IDLE: u32 = 0;

/// Counter value meaning "run finished, not yet observed".
const TIMER_DONE: u32 = 1;

/// Names of the timers in the bank.
///
/// Declared from most ephemeral to most persistent; a prefix clear
/// ([`TimerBank::clear`] with `all_up_to`) relies on this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerId {
    /// Buzzer tone on/off spacing.
    Buzz,

    /// Key debounce.
    Debounce,

    /// Bolt signal hold times.
    Unlock,

    /// Key-function timing.
    KeyFunction,

    /// Keypad LED / session idle timeout.
    LedIdle,
}

impl TimerId {
    /// Number of timers in the bank.
    pub const COUNT: usize = 5;

    /// Every timer, in bank order.
    pub const ALL: [TimerId; Self::COUNT] = [
        TimerId::Buzz,
        TimerId::Debounce,
        TimerId::Unlock,
        TimerId::KeyFunction,
        TimerId::LedIdle,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerId::Buzz => "Buzz",
            TimerId::Debounce => "Debounce",
            TimerId::Unlock => "Unlock",
            TimerId::KeyFunction => "KeyFunction",
            TimerId::LedIdle => "LedIdle",
        };
        write!(f, "{}", name)
    }
}

/// Result of polling a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    /// Not running.
    Idle,

    /// The run just finished. Reported once; the timer is idle afterwards.
    Done,

    /// Running with this many ticks remaining.
    Running(u32),
}

/// Whether any timer was running at a tick boundary.
///
/// This is the bank's only observable side effect: the owner uses it to
/// notice the device going quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// At least one timer was non-idle.
    Busy,

    /// Every timer was idle.
    Quiet,
}

/// Fixed bank of countdown timers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerBank {
    counters: [u32; TimerId::COUNT],
}

impl TimerBank {
    /// Create a bank with every timer idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a timer to run for `ticks`.
    ///
    /// Arming with 1 makes the timer done immediately; arming with 0 idles it.
    pub fn arm(&mut self, timer: TimerId, ticks: u32) {
        self.counters[timer.index()] = ticks;
    }

    /// Reset one timer, or every timer up to and including it, to `ticks`.
    ///
    /// The prefix form is meant for `ticks = 0` with [`TimerId::LedIdle`]
    /// to idle the whole bank.
    pub fn clear(&mut self, timer: TimerId, ticks: u32, all_up_to: bool) {
        if all_up_to {
            for counter in &mut self.counters[..=timer.index()] {
                *counter = ticks;
            }
        } else {
            self.counters[timer.index()] = ticks;
        }
    }

    /// Advance every running timer by one tick.
    ///
    /// Counters above 1 are decremented; done and idle counters are left as
    /// they are. Returns whether anything was running before the decrement.
    pub fn tick(&mut self) -> Activity {
        let mut busy = false;

        for counter in &mut self.counters {
            if *counter != TIMER_IDLE {
                busy = true;
            }
            if *counter > TIMER_DONE {
                *counter -= 1;
            }
        }

        if busy { Activity::Busy } else { Activity::Quiet }
    }

    /// Read a timer, consuming a finished run.
    pub fn poll(&mut self, timer: TimerId) -> TimerStatus {
        let counter = &mut self.counters[timer.index()];
        match *counter {
            TIMER_IDLE => TimerStatus::Idle,
            TIMER_DONE => {
                *counter = TIMER_IDLE;
                TimerStatus::Done
            }
            remaining => TimerStatus::Running(remaining),
        }
    }

    /// Read a timer's raw counter without consuming anything.
    pub fn remaining(&self, timer: TimerId) -> u32 {
        self.counters[timer.index()]
    }

    /// Check if every timer is idle.
    pub fn is_idle(&self) -> bool {
        self.counters.iter().all(|c| *c == TIMER_IDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_bank_is_idle() {
        let mut timers = TimerBank::new();
        assert!(timers.is_idle());
        for timer in TimerId::ALL {
            assert_eq!(timers.poll(timer), TimerStatus::Idle);
        }
    }

    #[rstest]
    #[case(2, 1)]
    #[case(3, 2)]
    #[case(23, 22)]
    fn test_done_after_armed_ticks(#[case] armed: u32, #[case] ticks_to_done: u32) {
        let mut timers = TimerBank::new();
        timers.arm(TimerId::LedIdle, armed);

        for _ in 1..ticks_to_done {
            timers.tick();
            assert!(matches!(
                timers.poll(TimerId::LedIdle),
                TimerStatus::Running(_)
            ));
        }

        timers.tick();
        assert_eq!(timers.poll(TimerId::LedIdle), TimerStatus::Done);
    }

    #[test]
    fn test_done_reported_exactly_once() {
        let mut timers = TimerBank::new();
        timers.arm(TimerId::Buzz, 2);
        timers.tick();

        assert_eq!(timers.poll(TimerId::Buzz), TimerStatus::Done);
        assert_eq!(timers.poll(TimerId::Buzz), TimerStatus::Idle);

        timers.tick();
        assert_eq!(timers.poll(TimerId::Buzz), TimerStatus::Idle);
    }

    #[test]
    fn test_done_survives_further_ticks_until_polled() {
        let mut timers = TimerBank::new();
        timers.arm(TimerId::Unlock, 2);

        for _ in 0..5 {
            timers.tick();
        }

        assert_eq!(timers.remaining(TimerId::Unlock), 1);
        assert_eq!(timers.poll(TimerId::Unlock), TimerStatus::Done);
    }

    #[test]
    fn test_arm_one_is_done_immediately() {
        let mut timers = TimerBank::new();
        timers.arm(TimerId::Debounce, 1);
        assert_eq!(timers.poll(TimerId::Debounce), TimerStatus::Done);
    }

    #[test]
    fn test_timers_are_independent() {
        let mut timers = TimerBank::new();
        timers.arm(TimerId::Buzz, 2);
        timers.arm(TimerId::LedIdle, 5);
        timers.tick();

        assert_eq!(timers.poll(TimerId::Buzz), TimerStatus::Done);
        assert_eq!(timers.poll(TimerId::LedIdle), TimerStatus::Running(4));
        assert_eq!(timers.poll(TimerId::Unlock), TimerStatus::Idle);
    }

    #[test]
    fn test_clear_single_timer() {
        let mut timers = TimerBank::new();
        timers.arm(TimerId::Buzz, 4);
        timers.arm(TimerId::Unlock, 4);

        timers.clear(TimerId::Unlock, 0, false);

        assert_eq!(timers.remaining(TimerId::Buzz), 4);
        assert_eq!(timers.remaining(TimerId::Unlock), 0);
    }

    #[test]
    fn test_clear_prefix_up_to_led_idles_bank() {
        let mut timers = TimerBank::new();
        for timer in TimerId::ALL {
            timers.arm(timer, 7);
        }

        timers.clear(TimerId::LedIdle, 0, true);
        assert!(timers.is_idle());
    }

    #[test]
    fn test_clear_prefix_leaves_later_timers() {
        let mut timers = TimerBank::new();
        for timer in TimerId::ALL {
            timers.arm(timer, 7);
        }

        timers.clear(TimerId::Unlock, 0, true);

        assert_eq!(timers.remaining(TimerId::Buzz), 0);
        assert_eq!(timers.remaining(TimerId::Debounce), 0);
        assert_eq!(timers.remaining(TimerId::Unlock), 0);
        assert_eq!(timers.remaining(TimerId::KeyFunction), 7);
        assert_eq!(timers.remaining(TimerId::LedIdle), 7);
    }

    #[test]
    fn test_tick_reports_activity() {
        let mut timers = TimerBank::new();
        assert_eq!(timers.tick(), Activity::Quiet);

        timers.arm(TimerId::KeyFunction, 2);
        assert_eq!(timers.tick(), Activity::Busy);

        // Done but unobserved still counts as busy
        assert_eq!(timers.tick(), Activity::Busy);

        timers.poll(TimerId::KeyFunction);
        assert_eq!(timers.tick(), Activity::Quiet);
    }

    #[test]
    fn test_bank_order() {
        let mut sorted = TimerId::ALL;
        sorted.sort();
        assert_eq!(sorted, TimerId::ALL);
        assert_eq!(TimerId::ALL.last(), Some(&TimerId::LedIdle));
    }

    #[test]
    fn test_timer_display() {
        assert_eq!(TimerId::LedIdle.to_string(), "LedIdle");
        assert_eq!(TimerId::Buzz.to_string(), "Buzz");
    }
}
