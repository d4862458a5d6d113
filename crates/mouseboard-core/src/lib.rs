//! # mouseboard-core
//!
//! Shared library for the mouseboard controller containing the serial wire
//! format, the mapping from input events to protocol commands, and key code
//! translation tables.
//!
//! It has no dependencies on OS APIs, serial ports, or UI frameworks.
//!
//! # Architecture overview
//!
//! The mouseboard is a small serial peripheral that re-emits keyboard and
//! mouse input as a Bluetooth HID device. The controller grabs local input
//! and forwards it over the serial link, one command at a time.
//!
//! - **`protocol`** – Bytes on the wire. Each command is a one-byte header
//!   plus a fixed-length payload; each reply is one signed byte.
//!
//! - **`domain`** – Turning input events into commands: key press/release,
//!   pointer buttons (with the scroll-wheel substitution), and relative
//!   motion.
//!
//! - **`keymap`** – Translation from platform key identifiers to the
//!   peripheral's one-byte key codes, behind a swappable [`KeyMapper`] trait.

pub mod domain;
pub mod keymap;
pub mod protocol;

pub use domain::buttons::{button_command, key_command, ButtonKind, ScrollDistance};
pub use domain::pointer::{motion_steps, PointerTracker};
pub use keymap::{KeyMapper, ProtocolKey, X11KeyMapper, X11LayoutOptions};
pub use protocol::codec::{decode_command, decode_response, encode_command, Frame, ProtocolError};
pub use protocol::messages::{Command, Header, Response, MAGIC};
