//! Input-to-command mapping for the mouseboard peripheral.
//!
//! Pure logic, no I/O: given an already-classified input event, decide which
//! protocol [`Command`](crate::protocol::Command)s describe it. The transport
//! session in the controller calls into this module before framing anything.

/// Key and pointer-button mapping, including the scroll-wheel substitution.
pub mod buttons;

/// Absolute-to-relative pointer motion.
pub mod pointer;
