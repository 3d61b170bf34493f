//! Common types shared across hardware device implementations.
//!
//! This module defines device information and the commands the lock
//! controller sends to its actuator: the lock/unlock signal lines and the
//! buzzer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a keypad or actuator, logged at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Console Keypad", "Mock Actuator").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            firmware_version: None,
        }
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}

/// Output line driving the bolt.
///
/// The bolt motor has one line per direction; exactly one is pulsed at a
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLine {
    /// Retracts the bolt.
    Unlock,

    /// Drives the bolt back out.
    Lock,
}

impl fmt::Display for SignalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalLine::Unlock => write!(f, "unlock"),
            SignalLine::Lock => write!(f, "lock"),
        }
    }
}

/// A single instruction for the actuator/buzzer driver.
///
/// The controller emits these in order; the driver applies them as they
/// arrive and reports nothing back (there is no position sensor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ActuatorCommand {
    /// Drive a signal line high.
    Assert { line: SignalLine },

    /// Drive a signal line low.
    Release { line: SignalLine },

    /// Start the buzzer at the given pitch.
    ToneOn { pitch_hz: u16 },

    /// Silence the buzzer.
    ToneOff,
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuatorCommand::Assert { line } => write!(f, "assert {line}"),
            ActuatorCommand::Release { line } => write!(f, "release {line}"),
            ActuatorCommand::ToneOn { pitch_hz } => write!(f, "tone on {pitch_hz}Hz"),
            ActuatorCommand::ToneOff => write!(f, "tone off"),
        }
    }
}
