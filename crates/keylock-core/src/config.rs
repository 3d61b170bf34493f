//! Runtime configuration of the lock.
//!
//! Every field has a default equal to the reference constants in
//! [`constants`](crate::constants), so an empty JSON object is a complete
//! configuration.
//!
//! # Examples
//!
//! ```
//! use keylock_core::LockConfig;
//!
//! let config = LockConfig::from_json_str(r#"{ "tick_period_ms": 250 }"#).unwrap();
//! assert_eq!(config.tick_period_ms, 250);
//! assert_eq!(config.timing.led_idle_ticks, 23);
//! assert_eq!(config.keys.enter, '+');
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIRM_TONE_HIGH_HZ, CONFIRM_TONE_LOW_HZ, CONFIRM_TONE_OFF_TICKS, CONFIRM_TONE_ON_TICKS,
    DEFAULT_TICK_PERIOD_MS, KEY_CLEAR, KEY_ENTER, KEY_PROGRAM_ENABLE, LED_TURNOFF_TICK_COUNT,
    LOCK_TICK_COUNT, PUSH_BACK_TICK_COUNT, UNLOCK_TICK_COUNT,
};
use crate::{Error, Result};

/// Top-level lock configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Length of one tick in milliseconds.
    pub tick_period_ms: u64,

    /// Actuator and idle-timeout durations.
    pub timing: TimingConfig,

    /// Confirmation tones played on unlock.
    pub tones: ToneConfig,

    /// Characters bound to the control keys.
    pub keys: KeyBindings,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            timing: TimingConfig::default(),
            tones: ToneConfig::default(),
            keys: KeyBindings::default(),
        }
    }
}

impl LockConfig {
    /// Parse and validate a configuration from JSON text.
    ///
    /// # Errors
    /// Returns `Error::Json` for malformed JSON and `Error::Config` if the
    /// parsed values fail [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LockConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    /// Returns `Error::Io` if the file cannot be read, otherwise the errors of
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Check that the configuration can drive the lock.
    ///
    /// # Errors
    /// Returns `Error::Config` if:
    /// - The tick period or any tick count is zero (a timer armed with zero
    ///   never reports done)
    /// - A control key is a decimal digit or two control keys share a character
    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(Error::Config("tick_period_ms must be at least 1".to_string()));
        }

        let counts = [
            ("timing.unlock_ticks", self.timing.unlock_ticks),
            ("timing.push_back_ticks", self.timing.push_back_ticks),
            ("timing.lock_ticks", self.timing.lock_ticks),
            ("timing.led_idle_ticks", self.timing.led_idle_ticks),
            ("tones.on_ticks", self.tones.on_ticks),
            ("tones.off_ticks", self.tones.off_ticks),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, ticks)| *ticks == 0) {
            return Err(Error::Config(format!("{name} must be at least 1")));
        }

        self.keys.validate()
    }
}

/// Tick counts of the actuator sequence and the idle timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Ticks the unlock signal is held.
    pub unlock_ticks: u32,

    /// Ticks between the confirmation tones and re-locking.
    pub push_back_ticks: u32,

    /// Ticks the lock signal is held.
    pub lock_ticks: u32,

    /// Ticks of inactivity before the session is dropped.
    pub led_idle_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            unlock_ticks: UNLOCK_TICK_COUNT,
            push_back_ticks: PUSH_BACK_TICK_COUNT,
            lock_ticks: LOCK_TICK_COUNT,
            led_idle_ticks: LED_TURNOFF_TICK_COUNT,
        }
    }
}

/// The two confirmation tones, played low then high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToneConfig {
    pub low_pitch_hz: u16,
    pub high_pitch_hz: u16,
    pub on_ticks: u32,
    pub off_ticks: u32,
}

impl ToneConfig {
    /// Pitches in playing order.
    #[must_use]
    pub fn pitches(&self) -> [u16; 2] {
        [self.low_pitch_hz, self.high_pitch_hz]
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            low_pitch_hz: CONFIRM_TONE_LOW_HZ,
            high_pitch_hz: CONFIRM_TONE_HIGH_HZ,
            on_ticks: CONFIRM_TONE_ON_TICKS,
            off_ticks: CONFIRM_TONE_OFF_TICKS,
        }
    }
}

/// Characters the input collector maps to the control keys.
///
/// Decimal digits are always data and cannot be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub program_enable: char,
    pub clear: char,
    pub enter: char,
}

impl KeyBindings {
    /// Check the bindings are pairwise distinct ASCII non-digits.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first offending binding.
    pub fn validate(&self) -> Result<()> {
        let keys = [
            ("program_enable", self.program_enable),
            ("clear", self.clear),
            ("enter", self.enter),
        ];

        for (name, key) in keys {
            if !key.is_ascii() || key.is_ascii_digit() {
                return Err(Error::Config(format!(
                    "keys.{name} must be an ASCII non-digit, got {key:?}"
                )));
            }
        }

        if self.program_enable == self.clear
            || self.program_enable == self.enter
            || self.clear == self.enter
        {
            return Err(Error::Config("control keys must be distinct".to_string()));
        }

        Ok(())
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            program_enable: KEY_PROGRAM_ENABLE,
            clear: KEY_CLEAR,
            enter: KEY_ENTER,
        }
    }
}
