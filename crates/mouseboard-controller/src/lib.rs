//! mouseboard-controller library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the controller do? (for beginners)
//!
//! The *mouseboard* is a small microcontroller board plugged into this
//! machine over USB serial. It pretends to be a Bluetooth keyboard and mouse
//! towards another device (a tablet, a phone, a second computer). The
//! controller is the program on this side of the cable:
//!
//! 1. Scans `/dev/ttyUSB0` .. `/dev/ttyUSB9` for a board that answers a
//!    `Ping` with the magic byte `0x42`.
//! 2. Reads already-classified input events (key, button, pointer motion).
//! 3. Translates each event into one or more protocol commands and sends them
//!    one at a time, waiting for the board's one-byte reply.
//! 4. Tracks whether the board reports an active Bluetooth connection and
//!    reconnects on its own if the serial link breaks.

/// Application layer: the input forwarding use case and its seams.
pub mod application;

/// Infrastructure layer: serial transport, configuration, input sources, and
/// the status board.
pub mod infrastructure;
