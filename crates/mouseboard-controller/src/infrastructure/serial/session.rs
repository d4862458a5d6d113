//! TransportSession: the single owner of the peripheral connection.
//!
//! # Exchange model
//!
//! Every command is one blocking round trip: write the header byte, write the
//! payload bytes, read exactly one reply byte. There is never more than one
//! command in flight.
//!
//! # Connection health
//!
//! ```text
//!              discovery finds a device
//!   ┌──────────────┐ ─────────────────────────> ┌───────────┐
//!   │ Disconnected │                            │ Connected │
//!   └──────────────┘ <───────────────────────── └───────────┘
//!           write failure (handle closed, rescan inline)
//!           or NotConnected reply (handle kept)
//! ```
//!
//! A `NotConnected` reply means the serial link is fine but the peripheral
//! has no Bluetooth host; the handle stays open and the next successful reply
//! flips the flag back. A failed write means the serial link itself is gone,
//! so the handle is closed and all indices are scanned again before `send`
//! returns. `InvalidKey` and `InvalidCommand` leave everything as it is.

use std::io;

use mouseboard_core::{
    button_command, decode_response, encode_command, key_command, Command, Frame, Response,
    ScrollDistance,
};
use tracing::{debug, info, warn};

use super::{Connection, DeviceLocator, LinkEvent, LinkObserver, SerialLink};
use crate::application::forward_input::{PeripheralLink, Rejection, TransportError};

/// Owns the connection and performs command exchanges.
pub struct TransportSession {
    locator: DeviceLocator,
    connection: Option<Connection>,
    scroll: ScrollDistance,
    observer: Box<dyn LinkObserver>,
}

impl TransportSession {
    /// Creates a session without touching any device. Call
    /// [`start`](Self::start) to run the first discovery.
    pub fn new(locator: DeviceLocator, scroll: ScrollDistance, observer: Box<dyn LinkObserver>) -> Self {
        Self {
            locator,
            connection: None,
            scroll,
            observer,
        }
    }

    /// Runs discovery, replacing any existing connection. Returns whether a
    /// device was found.
    pub fn start(&mut self) -> bool {
        self.teardown();
        self.rediscover();
        self.connection.is_some()
    }

    /// Whether the last completed exchange reported an active connection.
    /// Always `false` without an open device.
    pub fn connected(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_connected)
    }

    /// Index of the open device, if any.
    pub fn device_index(&self) -> Option<u8> {
        self.connection.as_ref().map(Connection::index)
    }

    /// Path of the open device, if any.
    pub fn device_path(&self) -> Option<&str> {
        self.connection.as_ref().map(Connection::path)
    }

    pub fn scroll_distance(&self) -> ScrollDistance {
        self.scroll
    }

    /// Performs one command exchange.
    ///
    /// Without an open device this scans for one and returns `NotConnected`
    /// without sending anything; the command is dropped.
    ///
    /// # Errors
    ///
    /// - [`TransportError::NotConnected`] if there is no device, the write
    ///   failed (the device is closed and rediscovered before returning), no
    ///   reply arrived within the read timeout, or the peripheral replied
    ///   `NotConnected`.
    /// - [`TransportError::Rejected`] for `InvalidKey`, `InvalidCommand`, or a
    ///   reply byte that makes no sense for a regular command.
    pub fn send(&mut self, command: Command) -> Result<Response, TransportError> {
        let header = command.header();

        let Some(connection) = self.connection.as_mut() else {
            debug!("no device for {header}, scanning");
            self.rediscover();
            return Err(TransportError::NotConnected);
        };

        let frame = encode_command(&command);
        if let Err(err) = write_frame(connection.link_mut(), &frame) {
            warn!("write to {} failed: {err}", connection.path());
            self.teardown();
            self.rediscover();
            return Err(TransportError::NotConnected);
        }

        let byte = match read_reply(connection.link_mut()) {
            Ok(byte) => byte,
            Err(err) => {
                debug!("no reply to {header} from {}: {err}", connection.path());
                Response::NotConnected.to_byte()
            }
        };
        let response = decode_response(byte).ok();

        debug!(
            "send command {header}: {}",
            response.map_or("unknown", Response::name)
        );

        let connected = response != Some(Response::NotConnected);
        if connection.is_connected() != connected {
            connection.set_connected(connected);
            self.observer
                .on_link_event(&LinkEvent::ConnectedChanged(connected));
        }

        match response {
            Some(Response::Ok) => Ok(Response::Ok),
            Some(Response::NotConnected) => Err(TransportError::NotConnected),
            Some(Response::InvalidKey) => Err(TransportError::Rejected {
                command: header,
                reason: Rejection::InvalidKey,
            }),
            Some(Response::InvalidCommand) => Err(TransportError::Rejected {
                command: header,
                reason: Rejection::InvalidCommand,
            }),
            Some(Response::Magic) | None => Err(TransportError::Rejected {
                command: header,
                reason: Rejection::Unexpected(byte),
            }),
        }
    }

    /// Sends a key press or release.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn key(&mut self, code: u8, pressed: bool) -> Result<(), TransportError> {
        self.send(key_command(code, pressed)).map(drop)
    }

    /// Sends a pointer button event; wheel buttons 4..=7 are sent as scroll
    /// commands of the configured distance.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn button(&mut self, code: u8, pressed: bool) -> Result<(), TransportError> {
        self.send(button_command(code, pressed, self.scroll)).map(drop)
    }

    /// Sends one relative motion.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub fn move_relative(&mut self, dx: i8, dy: i8) -> Result<(), TransportError> {
        self.send(Command::Move { dx, dy }).map(drop)
    }

    /// Asks the peripheral to release all keys and buttons. Best-effort: the
    /// outcome is only logged. Without an open device this scans for one like
    /// any other [`send`](Self::send), and the `Close` is dropped.
    pub fn stop(&mut self) {
        if let Err(err) = self.send(Command::Close) {
            debug!("close request failed: {err}");
        }
    }

    /// Sends `Close` and closes the device without rescanning.
    pub fn shutdown(mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };

        let frame = encode_command(&Command::Close);
        match write_frame(connection.link_mut(), &frame) {
            Ok(()) => {
                let _ = read_reply(connection.link_mut());
            }
            Err(err) => debug!("close request to {} failed: {err}", connection.path()),
        }

        info!("closing {}", connection.path());
        self.close(connection);
    }

    /// Closes the current device, if any, and notifies the observer.
    fn teardown(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.close(connection);
        }
    }

    fn close(&self, connection: Connection) {
        let index = connection.index();
        let was_connected = connection.is_connected();
        drop(connection);

        self.observer.on_link_event(&LinkEvent::DeviceLost { index });
        if was_connected {
            self.observer
                .on_link_event(&LinkEvent::ConnectedChanged(false));
        }
    }

    fn rediscover(&mut self) {
        let Some(connection) = self.locator.discover() else {
            return;
        };

        info!("using device {}", connection.path());
        let found = LinkEvent::DeviceFound {
            index: connection.index(),
            path: connection.path().to_string(),
        };
        self.connection = Some(connection);

        self.observer.on_link_event(&found);
        self.observer
            .on_link_event(&LinkEvent::ConnectedChanged(true));
    }
}

impl PeripheralLink for TransportSession {
    fn key(&mut self, code: u8, pressed: bool) -> Result<(), TransportError> {
        TransportSession::key(self, code, pressed)
    }

    fn button(&mut self, code: u8, pressed: bool) -> Result<(), TransportError> {
        TransportSession::button(self, code, pressed)
    }

    fn move_relative(&mut self, dx: i8, dy: i8) -> Result<(), TransportError> {
        TransportSession::move_relative(self, dx, dy)
    }

    fn stop(&mut self) {
        TransportSession::stop(self);
    }

    fn connected(&self) -> bool {
        TransportSession::connected(self)
    }
}

/// Writes the header byte, then the payload bytes if there are any.
fn write_frame(link: &mut dyn SerialLink, frame: &Frame) -> io::Result<()> {
    link.write_all(frame.header())?;
    if !frame.payload().is_empty() {
        link.write_all(frame.payload())?;
    }
    link.flush()
}

/// Reads exactly one reply byte.
fn read_reply(link: &mut dyn SerialLink) -> io::Result<u8> {
    let mut reply = [0u8; 1];
    link.read_exact(&mut reply)?;
    Ok(reply[0])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
