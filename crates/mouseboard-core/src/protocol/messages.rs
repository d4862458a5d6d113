//! All mouseboard protocol command and response types.
//!
//! Every exchange on the serial link is one command frame from the controller
//! followed by exactly one signed response byte from the peripheral.
//!
//! ```text
//! controller -> peripheral   [header:1][payload:0..=2]
//! peripheral -> controller   [response:1]
//! ```
//!
//! There is no length field: the payload length is fixed per header value,
//! so both sides know how many bytes follow the header.

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Reply byte to a discovery [`Header::Ping`], identifying the peripheral.
pub const MAGIC: u8 = 0x42;

/// Largest payload carried by any command (the two deltas of [`Command::Move`]).
pub const MAX_PAYLOAD_LEN: usize = 2;

/// Largest frame on the wire: header plus the largest payload.
pub const MAX_FRAME_LEN: usize = 1 + MAX_PAYLOAD_LEN;

// ── Header codes ──────────────────────────────────────────────────────────────

/// Leading byte of every command frame, identifying the command type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Header {
    Ping = 1,
    Close = 2,
    KeyPress = 3,
    KeyRelease = 4,
    ButtonPress = 5,
    ButtonRelease = 6,
    VScroll = 7,
    HScroll = 8,
    Move = 9,
}

impl Header {
    /// Number of payload bytes that follow this header on the wire.
    pub fn payload_len(self) -> usize {
        match self {
            Header::Ping | Header::Close => 0,
            Header::KeyPress
            | Header::KeyRelease
            | Header::ButtonPress
            | Header::ButtonRelease
            | Header::VScroll
            | Header::HScroll => 1,
            Header::Move => 2,
        }
    }

    /// Short lowercase name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            Header::Ping => "ping",
            Header::Close => "close",
            Header::KeyPress => "key-press",
            Header::KeyRelease => "key-release",
            Header::ButtonPress => "button-press",
            Header::ButtonRelease => "button-release",
            Header::VScroll => "vscroll",
            Header::HScroll => "hscroll",
            Header::Move => "move",
        }
    }
}

impl TryFrom<u8> for Header {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Header::Ping),
            2 => Ok(Header::Close),
            3 => Ok(Header::KeyPress),
            4 => Ok(Header::KeyRelease),
            5 => Ok(Header::ButtonPress),
            6 => Ok(Header::ButtonRelease),
            7 => Ok(Header::VScroll),
            8 => Ok(Header::HScroll),
            9 => Ok(Header::Move),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Response codes ────────────────────────────────────────────────────────────

/// Single signed byte the peripheral sends back after every command.
///
/// Negative values are failures. [`Response::Magic`] is only ever valid as the
/// answer to a discovery ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i8)]
pub enum Response {
    InvalidKey = -3,
    InvalidCommand = -2,
    NotConnected = -1,
    Ok = 0,
    Magic = 0x42,
}

impl Response {
    /// The raw byte as it appears on the wire.
    pub fn to_byte(self) -> u8 {
        self as i8 as u8
    }

    /// Short lowercase name used in log lines.
    pub fn name(self) -> &'static str {
        match self {
            Response::InvalidKey => "invalid key",
            Response::InvalidCommand => "invalid command",
            Response::NotConnected => "not connected",
            Response::Ok => "ok",
            Response::Magic => "magic",
        }
    }
}

impl TryFrom<u8> for Response {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value as i8 {
            -3 => Ok(Response::InvalidKey),
            -2 => Ok(Response::InvalidCommand),
            -1 => Ok(Response::NotConnected),
            0 => Ok(Response::Ok),
            0x42 => Ok(Response::Magic),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// A complete command, header and payload together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Discovery probe; answered with [`MAGIC`].
    Ping,
    /// Asks the peripheral to release everything and close its HID session.
    Close,
    /// Protocol key code (see [`crate::keymap::ProtocolKey`]).
    KeyPress(u8),
    KeyRelease(u8),
    /// Pointer button code as delivered by the input source.
    ButtonPress(u8),
    ButtonRelease(u8),
    /// Signed wheel delta; positive scrolls up.
    VScroll(i8),
    /// Signed wheel delta; positive scrolls right.
    HScroll(i8),
    /// Relative pointer motion.
    Move { dx: i8, dy: i8 },
}

impl Command {
    /// Returns the [`Header`] discriminant for this command.
    pub fn header(&self) -> Header {
        match self {
            Command::Ping => Header::Ping,
            Command::Close => Header::Close,
            Command::KeyPress(_) => Header::KeyPress,
            Command::KeyRelease(_) => Header::KeyRelease,
            Command::ButtonPress(_) => Header::ButtonPress,
            Command::ButtonRelease(_) => Header::ButtonRelease,
            Command::VScroll(_) => Header::VScroll,
            Command::HScroll(_) => Header::HScroll,
            Command::Move { .. } => Header::Move,
        }
    }

    /// Number of payload bytes this command carries.
    pub fn payload_len(&self) -> usize {
        self.header().payload_len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
