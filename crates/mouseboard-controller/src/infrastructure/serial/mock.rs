//! Simulated serial devices for tests.
//!
//! # Why simulated devices?
//!
//! Discovery and recovery depend on what sits behind each device path: no
//! file at all, a device that never answers, a device that answers with the
//! wrong byte, or a mouseboard that gets unplugged halfway through a session.
//! Real hardware cannot be arranged like that in a test run.
//!
//! [`SimulatedPortOpener`] maps paths to [`SimulatedDevice`]s. Each device
//! parses the bytes written to it with the same codec the firmware follows,
//! records the decoded commands, and queues the reply byte its behaviour
//! dictates. Reads with nothing queued fail with `TimedOut`, like a serial
//! port whose read timeout expired.
//!
//! # Usage in tests
//!
//! ```ignore
//! let opener = SimulatedPortOpener::new();
//! let device = SimulatedDevice::peripheral();
//! opener.attach("/dev/sim0", device.clone());
//!
//! // ... run discovery and send commands through a session ...
//!
//! device.unplug(); // every further write fails with BrokenPipe
//! assert_eq!(device.commands().last(), Some(&Command::KeyPress(b'a')));
//! ```

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mouseboard_core::{decode_command, Command, ProtocolError, Response, MAGIC};

use super::{LineSettings, OpenError, PortOpener, SerialLink};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Simulated device ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Behaviour {
    /// Mouseboard firmware: magic to `Ping`, scripted or default replies to
    /// everything else.
    Peripheral { default_reply: Response },
    /// Answers every complete command with the same byte.
    Answering(u8),
    /// Never answers.
    Silent,
}

#[derive(Debug)]
struct DeviceState {
    behaviour: Behaviour,
    scripted: VecDeque<Response>,
    inbound: Vec<u8>,
    outbound: VecDeque<u8>,
    commands: Vec<Command>,
    open_handles: usize,
    unplugged: bool,
}

impl DeviceState {
    fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            scripted: VecDeque::new(),
            inbound: Vec::new(),
            outbound: VecDeque::new(),
            commands: Vec::new(),
            open_handles: 0,
            unplugged: false,
        }
    }

    /// Decodes every complete command in the inbound buffer and queues replies.
    fn process_inbound(&mut self) {
        loop {
            match decode_command(&self.inbound) {
                Ok((command, consumed)) => {
                    self.inbound.drain(..consumed);
                    self.commands.push(command);
                    if let Some(reply) = self.reply_to(&command) {
                        self.outbound.push_back(reply);
                    }
                }
                Err(ProtocolError::UnknownHeader(_)) => {
                    self.inbound.remove(0);
                    if matches!(self.behaviour, Behaviour::Peripheral { .. }) {
                        self.outbound.push_back(Response::InvalidCommand.to_byte());
                    }
                }
                Err(_) => break,
            }
        }
    }

    fn reply_to(&mut self, command: &Command) -> Option<u8> {
        match self.behaviour {
            Behaviour::Silent => None,
            Behaviour::Answering(byte) => Some(byte),
            Behaviour::Peripheral { .. } if *command == Command::Ping => Some(MAGIC),
            Behaviour::Peripheral { default_reply } => Some(
                self.scripted
                    .pop_front()
                    .unwrap_or(default_reply)
                    .to_byte(),
            ),
        }
    }
}

/// A device behind a simulated path. Clones share the same state.
#[derive(Debug, Clone)]
pub struct SimulatedDevice {
    state: Arc<Mutex<DeviceState>>,
}

impl SimulatedDevice {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState::new(behaviour))),
        }
    }

    /// A mouseboard with an active Bluetooth host: every command gets `Ok`.
    pub fn peripheral() -> Self {
        Self::with_behaviour(Behaviour::Peripheral {
            default_reply: Response::Ok,
        })
    }

    /// A device that answers every command with `byte`.
    pub fn answering(byte: u8) -> Self {
        Self::with_behaviour(Behaviour::Answering(byte))
    }

    /// A device that opens fine but never answers.
    pub fn silent() -> Self {
        Self::with_behaviour(Behaviour::Silent)
    }

    /// Queues replies for the next non-`Ping` commands, in order.
    pub fn reply_next(&self, replies: impl IntoIterator<Item = Response>) {
        lock(&self.state).scripted.extend(replies);
    }

    /// Changes the reply used once the scripted replies run out.
    pub fn set_default_reply(&self, reply: Response) {
        let mut state = lock(&self.state);
        if let Behaviour::Peripheral { default_reply } = &mut state.behaviour {
            *default_reply = reply;
        }
    }

    /// Stops answering from now on; the device stays openable.
    pub fn mute(&self) {
        lock(&self.state).behaviour = Behaviour::Silent;
    }

    /// Makes writes on open handles fail and refuses new opens.
    pub fn unplug(&self) {
        lock(&self.state).unplugged = true;
    }

    /// Undoes [`SimulatedDevice::unplug`].
    pub fn replug(&self) {
        lock(&self.state).unplugged = false;
    }

    /// Every command decoded so far, including discovery pings.
    pub fn commands(&self) -> Vec<Command> {
        lock(&self.state).commands.clone()
    }

    /// Whether any handle to this device is open.
    pub fn is_open(&self) -> bool {
        lock(&self.state).open_handles > 0
    }

    fn is_unplugged(&self) -> bool {
        lock(&self.state).unplugged
    }

    fn connect(&self) -> SimulatedPort {
        let mut state = lock(&self.state);
        state.open_handles += 1;
        state.inbound.clear();
        state.outbound.clear();
        SimulatedPort {
            device: self.clone(),
        }
    }
}

/// An open handle to a [`SimulatedDevice`].
#[derive(Debug)]
pub struct SimulatedPort {
    device: SimulatedDevice,
}

impl io::Write for SimulatedPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = lock(&self.device.state);
        if state.unplugged {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        state.inbound.extend_from_slice(buf);
        state.process_inbound();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for SimulatedPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match lock(&self.device.state).outbound.pop_front() {
            Some(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            None => Err(io::Error::new(io::ErrorKind::TimedOut, "operation timed out")),
        }
    }
}

impl Drop for SimulatedPort {
    fn drop(&mut self) {
        let mut state = lock(&self.device.state);
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}

// ── Simulated opener ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct OpenerState {
    devices: HashMap<String, SimulatedDevice>,
    attempts: Vec<String>,
}

/// [`PortOpener`] serving [`SimulatedDevice`]s. Clones share the same table,
/// so a test can keep one clone after boxing another into a locator.
#[derive(Debug, Default, Clone)]
pub struct SimulatedPortOpener {
    state: Arc<Mutex<OpenerState>>,
}

impl SimulatedPortOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `device` available at `path`.
    pub fn attach(&self, path: impl Into<String>, device: SimulatedDevice) {
        lock(&self.state).devices.insert(path.into(), device);
    }

    /// Every path passed to [`PortOpener::open`], in order.
    pub fn open_attempts(&self) -> Vec<String> {
        lock(&self.state).attempts.clone()
    }

    pub fn clear_attempts(&self) {
        lock(&self.state).attempts.clear();
    }
}

impl PortOpener for SimulatedPortOpener {
    fn open(&self, path: &str, _settings: &LineSettings) -> Result<Box<dyn SerialLink>, OpenError> {
        let device = {
            let mut state = lock(&self.state);
            state.attempts.push(path.to_string());
            state.devices.get(path).cloned()
        };

        match device {
            Some(device) if !device.is_unplugged() => Ok(Box::new(device.connect())),
            _ => Err(OpenError::Open {
                path: path.to_string(),
                source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
