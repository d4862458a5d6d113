//! Infrastructure layer for the controller.
//!
//! Contains OS-facing adapters: the serial transport, the configuration file,
//! input event sources, and the status board read by the presentation side.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `mouseboard_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`serial`** – Device discovery over `/dev/ttyUSB*`-style paths and the
//!   transport session that owns the one open link. Implements
//!   `PeripheralLink`. Simulated devices for tests live in `serial::mock`.
//!
//! - **`storage`** – TOML configuration file.
//!
//! - **`input_source`** – `InputSource` implementations: a line-oriented text
//!   reader (stdin in the binary) and a scripted mock.
//!
//! - **`status`** – Connection snapshot, redraw mark, and the bounded log ring
//!   fed from `tracing`.

pub mod input_source;
pub mod serial;
pub mod status;
pub mod storage;
