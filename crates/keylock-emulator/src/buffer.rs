//! Digit entry buffer.

use keylock_core::{
    Code,
    constants::{ENTRY_BUFFER_CAPACITY, MAX_CODE_SIZE},
};

/// Digits typed during one data-entry step.
///
/// Backed by [`ENTRY_BUFFER_CAPACITY`] positions, one more than a code, so
/// the digit that overflows a code can be written and detected. The state
/// machine resets the session as soon as [`push`](Self::push) reports an
/// overflow; the spare position is never usable capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryBuffer {
    digits: [u8; ENTRY_BUFFER_CAPACITY],
    len: usize,
}

/// Outcome of appending a digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    /// The buffer still holds at most a code's worth of digits.
    Accepted,

    /// The buffer now holds more digits than a code.
    Overflow,
}

impl EntryBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding a single digit.
    pub fn with_digit(digit: u8) -> Self {
        let mut buffer = Self::new();
        buffer.push(digit);
        buffer
    }

    /// Append a digit.
    ///
    /// Once the buffer overflows further digits are dropped; the caller is
    /// expected to discard the buffer.
    pub fn push(&mut self, digit: u8) -> Push {
        if self.len < ENTRY_BUFFER_CAPACITY {
            self.digits[self.len] = digit;
            self.len += 1;
        }

        if self.len > MAX_CODE_SIZE {
            Push::Overflow
        } else {
            Push::Accepted
        }
    }

    /// Number of digits entered.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no digit has been entered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if exactly one code's worth of digits has been entered.
    pub fn is_complete(&self) -> bool {
        self.len == MAX_CODE_SIZE
    }

    /// The entered digits.
    pub fn as_slice(&self) -> &[u8] {
        &self.digits[..self.len]
    }

    /// The entry as a code, if it is exactly a code long.
    pub fn as_code(&self) -> Option<Code> {
        if !self.is_complete() {
            return None;
        }
        Code::from_digits(self.as_slice()).ok()
    }
}
