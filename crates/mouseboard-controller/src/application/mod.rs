//! Application layer use cases for the controller.
//!
//! # What use cases does the controller have?
//!
//! - **`forward_input`** – Takes classified input events from an
//!   [`InputSource`](forward_input::InputSource), turns them into protocol
//!   commands, and hands them to a [`PeripheralLink`](forward_input::PeripheralLink).
//!   The link is the transport session in production and a mock in tests.

pub mod forward_input;
