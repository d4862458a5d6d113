//! Input event sources.
//!
//! Both implement [`InputSource`](crate::application::forward_input::InputSource):
//!
//! - [`text::TextEventSource`] reads one event per line from any `BufRead`
//!   (stdin in the binary), so any program that can classify platform input
//!   can drive the controller through a pipe.
//! - [`mock::MockInputSource`] replays a fixed list of events in tests.

pub mod mock;
pub mod text;

pub use mock::MockInputSource;
pub use text::{parse_event, ParseEventError, TextEventSource};
