//! Unlock actuator sequence.
//!
//! One successful passcode runs, in order:
//!
//! 1. assert the unlock line for `unlock_ticks`, then release it
//! 2. two confirmation tones (low then high), each `on_ticks` long and
//!    followed by `off_ticks` of silence
//! 3. a `push_back_ticks` pause
//! 4. assert the lock line for `lock_ticks`, then release it
//!
//! The sequence never blocks. It arms the [`TimerId::Unlock`] and
//! [`TimerId::Buzz`] timers and moves to its next phase when the armed timer
//! reports done, handing back the [`ActuatorCommand`]s to drive at each step.
//! Once started it always runs to completion.

use keylock_core::{TimingConfig, ToneConfig};
use keylock_hardware::{ActuatorCommand, SignalLine};

use crate::timer::{TimerBank, TimerId, TimerStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unlocking,
    ToneOn(usize),
    ToneGap(usize),
    PushBack,
    Locking,
    Complete,
}

/// A running unlock sequence.
///
/// # Examples
///
/// ```
/// use keylock_core::LockConfig;
/// use keylock_emulator::actuator::UnlockSequence;
/// use keylock_emulator::timer::TimerBank;
///
/// let config = LockConfig::default();
/// let mut timers = TimerBank::new();
/// let (mut sequence, first) = UnlockSequence::start(&config.timing, &config.tones, &mut timers);
/// assert_eq!(first.len(), 1);
///
/// while !sequence.is_complete() {
///     timers.tick();
///     sequence.advance(&mut timers);
/// }
/// assert!(timers.is_idle());
/// ```
#[derive(Debug, Clone)]
pub struct UnlockSequence {
    phase: Phase,
    timing: TimingConfig,
    pitches: [u16; 2],
    tone_on_ticks: u32,
    tone_off_ticks: u32,
}

impl UnlockSequence {
    /// Begin the sequence: assert the unlock line and arm its hold time.
    pub fn start(
        timing: &TimingConfig,
        tones: &ToneConfig,
        timers: &mut TimerBank,
    ) -> (Self, Vec<ActuatorCommand>) {
        timers.arm(TimerId::Unlock, timing.unlock_ticks);

        let sequence = Self {
            phase: Phase::Unlocking,
            timing: *timing,
            pitches: tones.pitches(),
            tone_on_ticks: tones.on_ticks,
            tone_off_ticks: tones.off_ticks,
        };

        let commands = vec![ActuatorCommand::Assert {
            line: SignalLine::Unlock,
        }];
        (sequence, commands)
    }

    /// Move through every phase whose timer has finished.
    ///
    /// Call once per tick, after [`TimerBank::tick`].
    pub fn advance(&mut self, timers: &mut TimerBank) -> Vec<ActuatorCommand> {
        let mut commands = Vec::new();

        while let Some(timer) = self.waiting_on() {
            if timers.poll(timer) != TimerStatus::Done {
                break;
            }
            self.step(timers, &mut commands);
        }

        commands
    }

    /// Check if the lock line has been released.
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    fn waiting_on(&self) -> Option<TimerId> {
        match self.phase {
            Phase::Unlocking | Phase::PushBack | Phase::Locking => Some(TimerId::Unlock),
            Phase::ToneOn(_) | Phase::ToneGap(_) => Some(TimerId::Buzz),
            Phase::Complete => None,
        }
    }

    fn step(&mut self, timers: &mut TimerBank, commands: &mut Vec<ActuatorCommand>) {
        self.phase = match self.phase {
            Phase::Unlocking => {
                commands.push(ActuatorCommand::Release {
                    line: SignalLine::Unlock,
                });
                self.tone_on(0, timers, commands)
            }
            Phase::ToneOn(i) => {
                commands.push(ActuatorCommand::ToneOff);
                timers.arm(TimerId::Buzz, self.tone_off_ticks);
                Phase::ToneGap(i)
            }
            Phase::ToneGap(i) if i + 1 < self.pitches.len() => self.tone_on(i + 1, timers, commands),
            Phase::ToneGap(_) => {
                timers.arm(TimerId::Unlock, self.timing.push_back_ticks);
                Phase::PushBack
            }
            Phase::PushBack => {
                commands.push(ActuatorCommand::Assert {
                    line: SignalLine::Lock,
                });
                timers.arm(TimerId::Unlock, self.timing.lock_ticks);
                Phase::Locking
            }
            Phase::Locking => {
                commands.push(ActuatorCommand::Release {
                    line: SignalLine::Lock,
                });
                Phase::Complete
            }
            Phase::Complete => Phase::Complete,
        };
    }

    fn tone_on(
        &self,
        index: usize,
        timers: &mut TimerBank,
        commands: &mut Vec<ActuatorCommand>,
    ) -> Phase {
        commands.push(ActuatorCommand::ToneOn {
            pitch_hz: self.pitches[index],
        });
        timers.arm(TimerId::Buzz, self.tone_on_ticks);
        Phase::ToneOn(index)
    }
}
