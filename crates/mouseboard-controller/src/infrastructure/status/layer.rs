//! `tracing` layer feeding the status board's log ring.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use super::StatusBoard;

/// Copies every event that passes the subscriber's filter into the board.
#[derive(Debug, Clone)]
pub struct StatusLayer {
    board: StatusBoard,
}

impl StatusLayer {
    pub fn new(board: StatusBoard) -> Self {
        Self { board }
    }
}

impl<S: Subscriber> Layer<S> for StatusLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.board.log(*event.metadata().level(), visitor.buf);
    }
}

/// Formats the `message` field followed by any other fields as `name=value`.
#[derive(Default)]
struct MessageVisitor {
    buf: String,
}

impl MessageVisitor {
    fn separator(&mut self) {
        if !self.buf.is_empty() {
            self.buf.push_str(", ");
        }
    }
}

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let fields = std::mem::take(&mut self.buf);
            let _ = write!(self.buf, "{value:?}");
            if !fields.is_empty() {
                self.buf.push_str(", ");
                self.buf.push_str(&fields);
            }
        } else {
            self.separator();
            let _ = write!(self.buf, "{field}={value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.record_debug(field, &format_args!("{value}"));
        } else {
            self.separator();
            let _ = write!(self.buf, "{field}={value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[test]
    fn test_events_are_copied_into_the_board() {
        // Arrange
        let board = StatusBoard::new(10);
        let subscriber = tracing_subscriber::registry().with(board.layer());

        // Act
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("device found at {}", "/dev/ttyUSB0");
            tracing::warn!(index = 3, "device lost");
        });

        // Assert
        let entries = board.recent(10);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Level::INFO);
        assert_eq!(entries[0].text, "device found at /dev/ttyUSB0");
        assert_eq!(entries[1].level, Level::WARN);
        assert_eq!(entries[1].text, "device lost, index=3");
    }
}
