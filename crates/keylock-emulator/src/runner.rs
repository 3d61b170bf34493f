//! Cooperative event loop joining a [`LockController`] to its devices.
//!
//! One task multiplexes keypad input and a periodic tick with
//! `tokio::select!`. The controller is only ever touched from this loop, so
//! keys and ticks are serialized without locking.
//!
//! The keypad backlight is switched on by every key and off when the
//! controller reports going to sleep.
//!
//! However the loop ends, an unlock sequence already started is driven to
//! completion first, so the buzzer is silenced and the lock line released.

use std::future::{Future, pending};
use std::time::Duration;

use keylock_hardware::{ActuatorCommand, ActuatorDevice, KeypadDevice};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::controller::LockController;
use crate::error::Result;

/// Run the lock until the keypad disconnects.
///
/// Equivalent to [`run_lock_until`] with a shutdown that never fires.
///
/// # Errors
///
/// Returns an error if a device fails with anything other than a keypad
/// disconnect.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use keylock_emulator::{LockController, run_lock};
/// use keylock_hardware::mock::{MockActuator, MockKeypad};
///
/// #[tokio::main(flavor = "current_thread", start_paused = true)]
/// async fn main() -> keylock_emulator::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///     let (mut actuator, _observer) = MockActuator::new();
///     let mut controller = LockController::default();
///
///     handle.type_keys("222222+").await?;
///     drop(handle);
///
///     run_lock(&mut controller, &mut keypad, &mut actuator, Duration::from_secs(1)).await?;
///     assert_eq!(actuator.unlock_count(), 1);
///     Ok(())
/// }
/// ```
pub async fn run_lock<K, A>(
    controller: &mut LockController,
    keypad: &mut K,
    actuator: &mut A,
    tick_period: Duration,
) -> Result<()>
where
    K: KeypadDevice,
    A: ActuatorDevice,
{
    run_lock_until(controller, keypad, actuator, tick_period, pending()).await
}

/// Run the lock until the keypad disconnects or `shutdown` completes.
///
/// Input stops being read as soon as either happens. An unlock sequence
/// still running at that point is ticked to completion before returning.
///
/// # Errors
///
/// Returns an error if a device fails with anything other than a keypad
/// disconnect. A keypad error is returned only after the running sequence
/// has finished.
pub async fn run_lock_until<K, A, S>(
    controller: &mut LockController,
    keypad: &mut K,
    actuator: &mut A,
    tick_period: Duration,
    shutdown: S,
) -> Result<()>
where
    K: KeypadDevice,
    A: ActuatorDevice,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(tick_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    info!("Lock running, tick period {:?}", tick_period);

    let mut failure = None;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            input = keypad.read_input() => match input {
                Ok(key) => {
                    keypad.set_backlight(true).await?;
                    let commands = controller.handle_key(key);
                    drive(actuator, commands).await?;
                }
                Err(e) if e.is_disconnected() => {
                    info!("Keypad disconnected: {}", e);
                    break;
                }
                Err(e) => {
                    error!("Keypad failed: {}", e);
                    failure = Some(e);
                    break;
                }
            },
            _ = ticker.tick() => {
                if tick(controller, actuator).await? {
                    keypad.set_backlight(false).await?;
                }
            }
        }
    }

    finish_unlock(controller, actuator, &mut ticker).await?;

    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Tick until no unlock sequence is running.
async fn finish_unlock<A: ActuatorDevice>(
    controller: &mut LockController,
    actuator: &mut A,
    ticker: &mut Interval,
) -> Result<()> {
    if controller.is_unlocking() {
        debug!("Finishing unlock sequence before stopping");
    }

    while controller.is_unlocking() {
        ticker.tick().await;
        tick(controller, actuator).await?;
    }

    Ok(())
}

/// Run one tick, returning whether the controller went to sleep.
async fn tick<A: ActuatorDevice>(controller: &mut LockController, actuator: &mut A) -> Result<bool> {
    let outcome = controller.on_tick();
    drive(actuator, outcome.commands).await?;
    Ok(outcome.went_to_sleep)
}

async fn drive<A: ActuatorDevice>(actuator: &mut A, commands: Vec<ActuatorCommand>) -> Result<()> {
    for command in commands {
        debug!("Actuator: {}", command);
        actuator.apply(command).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::StateKind;
    use keylock_core::SlotIndex;
    use crate::error::EmulatorError;
    use keylock_core::KeyBindings;
    use keylock_hardware::console::ConsoleKeypad;
    use keylock_hardware::mock::{MockActuator, MockKeypad};
    use keylock_hardware::{HardwareError, SignalLine};
    use tokio::io::{AsyncRead, AsyncReadExt};

    const TICK: Duration = Duration::from_secs(1);

    /// Stdin stand-in that fails once its buffered keys are consumed.
    struct BrokenTerminal;

    impl AsyncRead for BrokenTerminal {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Err(std::io::Error::other("terminal gone")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unlock_through_runner() {
        let (mut keypad, handle) = MockKeypad::new();
        let (mut actuator, mut observer) = MockActuator::new();
        let mut controller = LockController::default();

        let operator = async move {
            handle.type_keys("333333+").await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        };

        let (result, ()) = tokio::join!(
            run_lock(&mut controller, &mut keypad, &mut actuator, TICK),
            operator
        );

        result.unwrap();
        assert_eq!(actuator.unlock_count(), 1);
        assert_eq!(
            observer.drain().last(),
            Some(&ActuatorCommand::Release {
                line: SignalLine::Lock
            })
        );
        assert!(!keypad.is_backlight_enabled());
        assert!(controller.is_sleeping());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_finishes_unlock() {
        let (mut keypad, handle) = MockKeypad::new();
        let (mut actuator, _observer) = MockActuator::new();
        let mut controller = LockController::default();

        handle.type_keys("444444+").await.unwrap();
        drop(handle);

        run_lock(&mut controller, &mut keypad, &mut actuator, TICK)
            .await
            .unwrap();

        assert!(!controller.is_unlocking());
        assert_eq!(
            actuator.commands().last(),
            Some(&ActuatorCommand::Release {
                line: SignalLine::Lock
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_mid_sequence_finishes_unlock() {
        let (mut keypad, handle) = MockKeypad::new();
        let (mut actuator, _observer) = MockActuator::new();
        let mut controller = LockController::default();

        handle.type_keys("333333+").await.unwrap();
        let shutdown = tokio::time::sleep(Duration::from_millis(2500));

        run_lock_until(&mut controller, &mut keypad, &mut actuator, TICK, shutdown)
            .await
            .unwrap();

        assert!(!controller.is_unlocking());
        assert_eq!(actuator.unlock_count(), 1);
        assert!(actuator.commands().contains(&ActuatorCommand::ToneOff));
        assert_eq!(
            actuator.commands().last(),
            Some(&ActuatorCommand::Release {
                line: SignalLine::Lock
            })
        );

        // Keys typed after shutdown are never read
        handle.type_keys("444444+").await.unwrap();
        assert_eq!(controller.unlock_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_when_idle_returns_promptly() {
        let (mut keypad, _handle) = MockKeypad::new();
        let (mut actuator, _observer) = MockActuator::new();
        let mut controller = LockController::default();

        let started = tokio::time::Instant::now();
        let shutdown = tokio::time::sleep(Duration::from_millis(1500));

        run_lock_until(&mut controller, &mut keypad, &mut actuator, TICK, shutdown)
            .await
            .unwrap();

        assert_eq!(started.elapsed(), Duration::from_millis(1500));
        assert!(actuator.commands().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keypad_failure_finishes_unlock_then_errors() {
        let reader = (&b"555555+"[..]).chain(BrokenTerminal);
        let mut keypad = ConsoleKeypad::from_reader(reader, KeyBindings::default());
        let (mut actuator, _observer) = MockActuator::new();
        let mut controller = LockController::default();

        let result = run_lock(&mut controller, &mut keypad, &mut actuator, TICK).await;

        assert!(matches!(
            result,
            Err(EmulatorError::Hardware(HardwareError::Io(_)))
        ));
        assert!(!controller.is_unlocking());
        assert_eq!(
            actuator.commands().last(),
            Some(&ActuatorCommand::Release {
                line: SignalLine::Lock
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_through_runner() {
        let (mut keypad, handle) = MockKeypad::new();
        let (mut actuator, _observer) = MockActuator::new();
        let mut controller = LockController::default();

        let operator = async move {
            handle.type_keys("012345+6+").await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
            // Session timed out; these digits start a fresh passcode entry
            handle.type_keys("12").await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
        };

        let (result, ()) = tokio::join!(
            run_lock(&mut controller, &mut keypad, &mut actuator, TICK),
            operator
        );

        result.unwrap();
        assert_eq!(controller.state_kind(), StateKind::GetPasscode);
        assert!(controller.store().slots_are_factory());
        assert!(
            controller
                .history()
                .iter()
                .any(|t| t.key.is_none() && t.from == StateKind::SlotPasscodeEntry)
        );
        assert!(actuator.commands().is_empty());
        assert!(keypad.is_backlight_enabled());

        let slot = SlotIndex::new(6).unwrap();
        assert!(controller.store().slot(slot).is_valid());
    }
}
