//! Raw terminal mode, so every keystroke reaches the lock as one key.
//!
//! In raw mode the terminal stops echoing and stops turning Ctrl-C into a
//! signal; the console keypad sees it as a byte and ends input instead.

use std::io;
use std::panic;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::tty::IsTty;

/// Holds stdin in raw mode until dropped.
#[derive(Debug)]
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    /// Switch the terminal to raw mode if stdin is a terminal.
    ///
    /// Piped input is left alone and the guard is inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if stdin is a terminal but raw mode cannot be set.
    pub fn enable() -> io::Result<Self> {
        if !io::stdin().is_tty() {
            return Ok(Self { active: false });
        }

        enable_raw_mode()?;
        restore_on_panic();
        Ok(Self { active: true })
    }

    /// Whether the terminal is in raw mode.
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = disable_raw_mode();
        }
    }
}

fn restore_on_panic() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        previous(info);
    }));
}
