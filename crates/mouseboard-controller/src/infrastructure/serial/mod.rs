//! Serial transport to the mouseboard peripheral.
//!
//! # Layout
//!
//! - [`PortOpener`] opens and configures one candidate device path and hands
//!   back a [`SerialLink`]. [`native::NativePortOpener`] does this with the
//!   `serialport` crate; [`mock::SimulatedPortOpener`] serves simulated
//!   devices in tests.
//! - [`locator::DeviceLocator`] renders the [`DeviceTemplate`] for each index
//!   and probes the result with a `Ping`.
//! - [`session::TransportSession`] owns the single [`Connection`] and performs
//!   one blocking exchange per command, rediscovering after write failures.
//!
//! # Line settings
//!
//! The link is raw 8N1 without flow control. Reads block for at most
//! [`LineSettings::read_timeout`]; a read that times out with no byte counts
//! as a `NotConnected` reply.

pub mod locator;
pub mod mock;
pub mod native;
pub mod session;

use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use locator::DeviceLocator;
pub use native::NativePortOpener;
pub use session::TransportSession;

/// Placeholder replaced by the device index in a [`DeviceTemplate`].
pub const INDEX_PLACEHOLDER: &str = "{}";

/// Highest device index probed by default (`/dev/ttyUSB0` .. `/dev/ttyUSB9`).
pub const DEFAULT_MAX_INDEX: u8 = 9;

/// Default per-read timeout, matching a termios `VTIME` of 5 deciseconds.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Default line speed of the peripheral firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

// ── Link traits ───────────────────────────────────────────────────────────────

/// A byte stream to the peripheral. Closing happens on drop.
pub trait SerialLink: Read + Write + Send {}

impl<T: Read + Write + Send + ?Sized> SerialLink for T {}

/// Opens and configures candidate device paths.
pub trait PortOpener: Send {
    /// Opens `path` read/write and applies `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError`] if the path cannot be opened or configured. The
    /// locator treats both as "no device here".
    fn open(&self, path: &str, settings: &LineSettings) -> Result<Box<dyn SerialLink>, OpenError>;
}

/// Error type for opening a candidate device.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("cannot configure {path}: {source}")]
    Configure {
        path: String,
        #[source]
        source: serialport::Error,
    },
}

/// Line parameters applied to every opened device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

// ── Device path template ──────────────────────────────────────────────────────

/// Returned when a path template does not contain exactly one placeholder.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("device path template must contain exactly one `{{}}` placeholder: {0:?}")]
pub struct InvalidTemplate(pub String);

/// Device path pattern with one index placeholder, e.g. `/dev/ttyUSB{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceTemplate(String);

impl DeviceTemplate {
    /// Validates and wraps a template string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTemplate`] unless `{}` occurs exactly once.
    pub fn new(template: impl Into<String>) -> Result<Self, InvalidTemplate> {
        let template = template.into();
        if template.matches(INDEX_PLACEHOLDER).count() == 1 {
            Ok(Self(template))
        } else {
            Err(InvalidTemplate(template))
        }
    }

    /// The device path for `index`.
    pub fn render(&self, index: u8) -> String {
        self.0.replacen(INDEX_PLACEHOLDER, &index.to_string(), 1)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceTemplate {
    fn default() -> Self {
        Self("/dev/ttyUSB{}".to_string())
    }
}

impl TryFrom<String> for DeviceTemplate {
    type Error = InvalidTemplate;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeviceTemplate> for String {
    fn from(value: DeviceTemplate) -> Self {
        value.0
    }
}

impl fmt::Display for DeviceTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Connection ────────────────────────────────────────────────────────────────

/// The one open link to a discovered peripheral.
///
/// `connected` mirrors the last reply: `false` after a `NotConnected` reply,
/// `true` after any other. The serial handle stays open either way.
pub struct Connection {
    link: Box<dyn SerialLink>,
    index: u8,
    path: String,
    connected: bool,
}

impl Connection {
    /// Wraps a link that has just answered the discovery probe.
    pub fn new(link: Box<dyn SerialLink>, index: u8, path: String) -> Self {
        Self {
            link,
            index,
            path,
            connected: true,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub(crate) fn link_mut(&mut self) -> &mut dyn SerialLink {
        self.link.as_mut()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("index", &self.index)
            .field("path", &self.path)
            .field("connected", &self.connected)
            .finish_non_exhaustive()
    }
}

// ── Link events ───────────────────────────────────────────────────────────────

/// Notification emitted by the transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Discovery accepted the device at `path`.
    DeviceFound { index: u8, path: String },
    /// The handle of the device at `index` was closed.
    DeviceLost { index: u8 },
    /// The connected flag changed.
    ConnectedChanged(bool),
}

/// Receives [`LinkEvent`]s. Called synchronously on the sending thread.
pub trait LinkObserver: Send {
    fn on_link_event(&self, event: &LinkEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LinkObserver for NoopObserver {
    fn on_link_event(&self, _event: &LinkEvent) {}
}

/// Forwards events over a channel; a dropped receiver is ignored.
impl LinkObserver for std::sync::mpsc::Sender<LinkEvent> {
    fn on_link_event(&self, event: &LinkEvent) {
        let _ = self.send(event.clone());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_renders_index() {
        let template = DeviceTemplate::new("/dev/ttyACM{}").unwrap();
        assert_eq!(template.render(3), "/dev/ttyACM3");
    }

    #[test]
    fn test_template_placeholder_may_be_in_the_middle() {
        let template = DeviceTemplate::new("/tmp/dev{}.sock").unwrap();
        assert_eq!(template.render(0), "/tmp/dev0.sock");
    }

    #[test]
    fn test_template_without_placeholder_is_rejected() {
        assert_eq!(
            DeviceTemplate::new("/dev/ttyUSB0"),
            Err(InvalidTemplate("/dev/ttyUSB0".into()))
        );
    }

    #[test]
    fn test_template_with_two_placeholders_is_rejected() {
        assert!(DeviceTemplate::new("/dev/{}/tty{}").is_err());
    }

    #[test]
    fn test_default_template_is_usb_serial() {
        assert_eq!(DeviceTemplate::default().render(9), "/dev/ttyUSB9");
    }

    #[test]
    fn test_default_line_settings() {
        let settings = LineSettings::default();
        assert_eq!(settings.baud_rate, 115_200);
        assert_eq!(settings.read_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_channel_observer_forwards_events() {
        // Arrange
        let (tx, rx) = std::sync::mpsc::channel();

        // Act
        tx.on_link_event(&LinkEvent::ConnectedChanged(true));

        // Assert
        assert_eq!(rx.try_recv(), Ok(LinkEvent::ConnectedChanged(true)));
    }

    #[test]
    fn test_channel_observer_ignores_dropped_receiver() {
        let (tx, rx) = std::sync::mpsc::channel::<LinkEvent>();
        drop(rx);
        tx.on_link_event(&LinkEvent::DeviceLost { index: 0 });
    }
}
