//! Device discovery by probing candidate serial paths.
//!
//! # How discovery works (for beginners)
//!
//! USB serial adapters show up as numbered device files (`/dev/ttyUSB0`,
//! `/dev/ttyUSB1`, ...) in the order they were plugged in, so the controller
//! cannot know in advance which number the mouseboard got. The locator walks
//! the indices in ascending order and, for each path that opens, sends the
//! one-byte `Ping` command. Only the mouseboard firmware answers with the
//! magic byte `0x42`; anything else (a silent device, a modem echoing bytes,
//! a different microcontroller) is closed again and skipped.
//!
//! Scanning is synchronous. Each silent candidate costs one read timeout.

use mouseboard_core::{encode_command, Command, MAGIC};
use tracing::debug;

use super::{
    Connection, DeviceTemplate, LineSettings, PortOpener, SerialLink, DEFAULT_MAX_INDEX,
};

/// Outcome of probing a single candidate path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Nothing could be opened or configured at this path.
    Unavailable,
    /// The device did not answer, or the write failed.
    NoReply,
    /// The device answered with something other than the magic byte.
    WrongReply(u8),
    /// The device is a mouseboard.
    Found,
}

/// Scans the device template for a peripheral that answers the probe.
pub struct DeviceLocator {
    template: DeviceTemplate,
    settings: LineSettings,
    max_index: u8,
    opener: Box<dyn PortOpener>,
}

impl DeviceLocator {
    /// Creates a locator probing indices `0..=9` of `template`.
    pub fn new(template: DeviceTemplate, settings: LineSettings, opener: Box<dyn PortOpener>) -> Self {
        Self {
            template,
            settings,
            max_index: DEFAULT_MAX_INDEX,
            opener,
        }
    }

    /// Changes the highest probed index.
    pub fn with_max_index(mut self, max_index: u8) -> Self {
        self.max_index = max_index;
        self
    }

    /// Probes every index in ascending order and returns the first device that
    /// answers the `Ping` with the magic byte.
    ///
    /// Returns `None` if no index answers. Handles of rejected candidates are
    /// closed before the next index is tried.
    pub fn discover(&self) -> Option<Connection> {
        for index in 0..=self.max_index {
            let path = self.template.render(index);
            if let Some(link) = self.probe(&path).1 {
                debug!("device found at {path}");
                return Some(Connection::new(link, index, path));
            }
        }
        debug!(
            "no device answered on {} (indices 0..={})",
            self.template, self.max_index
        );
        None
    }

    /// Probes one path. On [`ProbeOutcome::Found`] the open link is returned
    /// alongside.
    pub fn probe(&self, path: &str) -> (ProbeOutcome, Option<Box<dyn SerialLink>>) {
        let mut link = match self.opener.open(path, &self.settings) {
            Ok(link) => link,
            Err(err) => {
                debug!("skipping {path}: {err}");
                return (ProbeOutcome::Unavailable, None);
            }
        };

        debug!("ping device {path}");

        let outcome = ping(link.as_mut());
        match outcome {
            ProbeOutcome::Found => (outcome, Some(link)),
            ProbeOutcome::WrongReply(byte) => {
                debug!("received invalid response 0x{byte:02X} from {path}");
                (outcome, None)
            }
            ProbeOutcome::NoReply | ProbeOutcome::Unavailable => {
                debug!("received no response from {path}");
                (outcome, None)
            }
        }
    }
}

/// Writes a `Ping` and waits for exactly one reply byte.
fn ping(link: &mut dyn SerialLink) -> ProbeOutcome {
    let frame = encode_command(&Command::Ping);
    if link.write_all(frame.as_bytes()).and_then(|()| link.flush()).is_err() {
        return ProbeOutcome::NoReply;
    }

    let mut reply = [0u8; 1];
    match link.read_exact(&mut reply) {
        Ok(()) if reply[0] == MAGIC => ProbeOutcome::Found,
        Ok(()) => ProbeOutcome::WrongReply(reply[0]),
        Err(_) => ProbeOutcome::NoReply,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
