//! Console-backed devices for running the lock from a terminal.
//!
//! [`ConsoleKeypad`] turns a byte stream (normally stdin) into keys, dropping
//! every byte that is neither a digit nor a bound control character.
//! [`ConsoleActuator`] renders actuator commands as text lines in place of
//! the bolt motor and buzzer.
//!
//! Putting the terminal into raw mode is left to the caller; in cooked mode
//! keys arrive once the line is submitted. In raw mode the terminal no longer
//! translates `\n` to `\r\n`, so output meant for it goes through a
//! [`TerminalWriter`] that does the translation itself.

use std::io::{self, Write};

use keylock_core::{KeyBindings, constants::KEY_QUEUE_CAPACITY};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::{
    HardwareError, Result,
    traits::{ActuatorDevice, KeypadDevice, KeypadInput},
    types::{ActuatorCommand, DeviceInfo, SignalLine},
};

/// Keypad fed from an async byte stream.
///
/// A background task reads the stream and forwards accepted keys over a
/// channel, so [`read_input`](KeypadDevice::read_input) is cancel-safe.
/// End of stream, or an end-of-text/end-of-transmission byte (Ctrl-C or
/// Ctrl-D on a raw terminal), disconnects the keypad. A read error is
/// returned once and then the keypad is disconnected.
///
/// # Examples
///
/// ```
/// use keylock_core::{KeyBindings, constants::KEY_QUEUE_CAPACITY};
/// use keylock_hardware::console::ConsoleKeypad;
/// use keylock_hardware::traits::{KeypadDevice, KeypadInput};
///
/// #[tokio::main]
/// async fn main() -> keylock_hardware::Result<()> {
///     let mut keypad = ConsoleKeypad::from_reader(&b"4 2\n+"[..], KeyBindings::default());
///
///     assert_eq!(keypad.read_input().await?, KeypadInput::digit(4).unwrap());
///     assert_eq!(keypad.read_input().await?, KeypadInput::digit(2).unwrap());
///     assert_eq!(keypad.read_input().await?, KeypadInput::Enter);
///     assert!(keypad.read_input().await.is_err());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ConsoleKeypad {
    input_rx: mpsc::Receiver<Result<KeypadInput>>,
    backlight_enabled: bool,
}

impl ConsoleKeypad {
    /// Read keys from the process's standard input.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn stdin(keys: KeyBindings) -> Self {
        Self::from_reader(tokio::io::stdin(), keys)
    }

    /// Read keys from any async byte stream.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_reader<R>(reader: R, keys: KeyBindings) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (input_tx, input_rx) = mpsc::channel(KEY_QUEUE_CAPACITY);
        tokio::spawn(collect_keys(reader, keys, input_tx));

        Self {
            input_rx,
            backlight_enabled: false,
        }
    }
}

/// Ctrl-C as delivered by a terminal in raw mode.
const END_OF_TEXT: u8 = 0x03;

/// Ctrl-D as delivered by a terminal in raw mode.
const END_OF_TRANSMISSION: u8 = 0x04;

/// Input collector loop: one accepted key per valid byte, in arrival order.
async fn collect_keys<R>(
    mut reader: R,
    keys: KeyBindings,
    input_tx: mpsc::Sender<Result<KeypadInput>>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 64];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                debug!("Console input closed");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("Console read failed: {}", e);
                let _ = input_tx.send(Err(HardwareError::Io(e))).await;
                return;
            }
        };

        for &byte in &buf[..n] {
            if matches!(byte, END_OF_TEXT | END_OF_TRANSMISSION) {
                debug!("Console input ended by 0x{:02x}", byte);
                return;
            }

            match KeypadInput::from_byte(byte, &keys) {
                Some(input) => {
                    if input_tx.send(Ok(input)).await.is_err() {
                        return;
                    }
                }
                None => trace!("Ignoring byte 0x{:02x}", byte),
            }
        }
    }
}

impl KeypadDevice for ConsoleKeypad {
    async fn read_input(&mut self) -> Result<KeypadInput> {
        match self.input_rx.recv().await {
            Some(input) => input,
            None => Err(HardwareError::disconnected("Console keypad input closed")),
        }
    }

    async fn set_backlight(&mut self, enabled: bool) -> Result<()> {
        if enabled != self.backlight_enabled {
            debug!("Keypad LED {}", if enabled { "on" } else { "off" });
        }
        self.backlight_enabled = enabled;
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Console Keypad", "stdin"))
    }
}

/// Actuator that prints what the bolt and buzzer would do.
///
/// # Examples
///
/// ```
/// use keylock_hardware::console::ConsoleActuator;
/// use keylock_hardware::traits::ActuatorDevice;
/// use keylock_hardware::types::{ActuatorCommand, SignalLine};
///
/// #[tokio::main]
/// async fn main() -> keylock_hardware::Result<()> {
///     let mut actuator = ConsoleActuator::new(Vec::new());
///     actuator.apply(ActuatorCommand::Assert { line: SignalLine::Unlock }).await?;
///
///     let text = String::from_utf8(actuator.into_inner()).unwrap();
///     assert_eq!(text, "Unlocking Door!!\n");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ConsoleActuator<W> {
    out: W,
}

impl ConsoleActuator<TerminalWriter<io::Stdout>> {
    /// Print to the process's standard output.
    ///
    /// Pass `raw` when stdout is a terminal in raw mode.
    pub fn stdout(raw: bool) -> Self {
        Self::new(TerminalWriter::new(io::stdout(), raw))
    }
}

impl<W: Write> ConsoleActuator<W> {
    /// Print to any writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + Sync> ActuatorDevice for ConsoleActuator<W> {
    async fn apply(&mut self, command: ActuatorCommand) -> Result<()> {
        let line = match command {
            ActuatorCommand::Assert {
                line: SignalLine::Unlock,
            } => "Unlocking Door!!".to_string(),
            ActuatorCommand::Assert {
                line: SignalLine::Lock,
            } => "Locking Door!!".to_string(),
            ActuatorCommand::Release { line } => format!("Release {line}"),
            ActuatorCommand::ToneOn { pitch_hz } => format!("\x07Beep {pitch_hz}"),
            ActuatorCommand::ToneOff => return Ok(()),
        };

        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new("Console Actuator", "stdout"))
    }
}

/// Line-oriented writer for a terminal that may be in raw mode.
///
/// In raw mode every `\n` is written as `\r\n`; otherwise bytes pass
/// through unchanged.
///
/// # Examples
///
/// ```
/// use std::io::Write;
///
/// use keylock_hardware::console::TerminalWriter;
///
/// let mut out = TerminalWriter::new(Vec::new(), true);
/// writeln!(out, "Locking Door!!").unwrap();
/// assert_eq!(out.into_inner(), b"Locking Door!!\r\n");
/// ```
#[derive(Debug)]
pub struct TerminalWriter<W> {
    inner: W,
    raw: bool,
}

impl<W: Write> TerminalWriter<W> {
    /// Wrap a writer, translating line endings when `raw` is set.
    pub fn new(inner: W, raw: bool) -> Self {
        Self { inner, raw }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for TerminalWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.raw {
            return self.inner.write(buf);
        }

        for chunk in buf.split_inclusive(|b| *b == b'\n') {
            match chunk.strip_suffix(b"\n") {
                Some(line) => {
                    self.inner.write_all(line)?;
                    self.inner.write_all(b"\r\n")?;
                }
                None => self.inner.write_all(chunk)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
