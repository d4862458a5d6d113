//! Status board shared between the transport session and the presentation.
//!
//! # What is the status board? (for beginners)
//!
//! The transport session runs on the main thread and must never wait for a
//! display. Instead it reports [`LinkEvent`]s to an observer; the
//! [`StatusBoard`] is that observer. It keeps a small snapshot of the link
//! (which device is open and whether it reports a connected host) plus a
//! ring of recent log lines, and raises a *redraw mark* whenever anything
//! changed.
//!
//! A presentation layer polls [`StatusBoard::take_redraw`] and only repaints
//! when the mark was set. [`presenter::TerminalPresenter`] is the one the
//! binary uses.
//!
//! Log lines get into the ring through [`layer::StatusLayer`], a `tracing`
//! layer installed next to (or instead of) the stdout formatter.
//!
//! `StatusBoard` is a cheap handle: clones share the same state.

pub mod layer;
pub mod log;
pub mod presenter;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::Level;

use crate::infrastructure::serial::{LinkEvent, LinkObserver};

pub use layer::StatusLayer;
pub use log::{LogEntry, LogRing};
pub use presenter::TerminalPresenter;

/// What the presentation shows about the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSnapshot {
    pub connected: bool,
    pub device_index: Option<u8>,
    pub device_path: Option<String>,
}

impl fmt::Display for LinkSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.device_path, self.device_index) {
            (Some(path), Some(index)) => {
                let state = if self.connected {
                    "connected"
                } else {
                    "not connected"
                };
                write!(f, "{state} via {path} (device {index})")
            }
            _ => f.write_str("no device"),
        }
    }
}

#[derive(Debug)]
struct BoardState {
    snapshot: LinkSnapshot,
    redraw: bool,
    log: LogRing,
}

/// Shared link snapshot, redraw mark, and log ring.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    inner: Arc<Mutex<BoardState>>,
}

impl StatusBoard {
    /// Creates a board keeping at most `log_capacity` log lines.
    pub fn new(log_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BoardState {
                snapshot: LinkSnapshot::default(),
                redraw: true,
                log: LogRing::new(log_capacity),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        self.state().snapshot.clone()
    }

    /// Returns whether a redraw is due and clears the mark.
    pub fn take_redraw(&self) -> bool {
        std::mem::take(&mut self.state().redraw)
    }

    /// Appends a log line and marks a redraw.
    pub fn log(&self, level: Level, text: impl Into<String>) {
        let mut state = self.state();
        state.log.push(level, text);
        state.redraw = true;
    }

    /// The newest `max` log lines, oldest first.
    pub fn recent(&self, max: usize) -> Vec<LogEntry> {
        self.state().log.recent(max)
    }

    /// Retained log lines with sequence number `from` or later.
    pub fn log_since(&self, from: u64) -> Vec<LogEntry> {
        self.state().log.since(from)
    }

    /// A `tracing` layer that feeds this board's log ring.
    pub fn layer(&self) -> StatusLayer {
        StatusLayer::new(self.clone())
    }
}

impl LinkObserver for StatusBoard {
    fn on_link_event(&self, event: &LinkEvent) {
        let mut state = self.state();
        let snapshot = &mut state.snapshot;
        match event {
            LinkEvent::DeviceFound { index, path } => {
                snapshot.device_index = Some(*index);
                snapshot.device_path = Some(path.clone());
            }
            LinkEvent::DeviceLost { index } => {
                if snapshot.device_index == Some(*index) {
                    snapshot.device_index = None;
                    snapshot.device_path = None;
                }
            }
            LinkEvent::ConnectedChanged(connected) => snapshot.connected = *connected,
        }
        state.redraw = true;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_requests_initial_draw() {
        let board = StatusBoard::new(10);

        assert!(board.take_redraw());
        assert!(!board.take_redraw());
        assert_eq!(board.snapshot(), LinkSnapshot::default());
    }

    #[test]
    fn test_link_events_update_snapshot_and_mark_redraw() {
        // Arrange
        let board = StatusBoard::new(10);
        board.take_redraw();

        // Act
        board.on_link_event(&LinkEvent::DeviceFound {
            index: 2,
            path: "/dev/ttyUSB2".into(),
        });
        board.on_link_event(&LinkEvent::ConnectedChanged(true));

        // Assert
        assert!(board.take_redraw());
        assert_eq!(
            board.snapshot(),
            LinkSnapshot {
                connected: true,
                device_index: Some(2),
                device_path: Some("/dev/ttyUSB2".into()),
            }
        );
    }

    #[test]
    fn test_device_lost_clears_device() {
        let board = StatusBoard::new(10);
        board.on_link_event(&LinkEvent::DeviceFound {
            index: 0,
            path: "/dev/ttyUSB0".into(),
        });

        board.on_link_event(&LinkEvent::DeviceLost { index: 0 });
        board.on_link_event(&LinkEvent::ConnectedChanged(false));

        assert_eq!(board.snapshot(), LinkSnapshot::default());
    }

    #[test]
    fn test_log_marks_redraw_and_is_shared_between_clones() {
        let board = StatusBoard::new(2);
        let other = board.clone();
        board.take_redraw();

        other.log(Level::INFO, "one");
        other.log(Level::INFO, "two");
        other.log(Level::INFO, "three");

        assert!(board.take_redraw());
        let texts: Vec<_> = board.recent(5).into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["two", "three"]);
    }

    #[test]
    fn test_snapshot_display() {
        let mut snapshot = LinkSnapshot::default();
        assert_eq!(snapshot.to_string(), "no device");

        snapshot.device_index = Some(1);
        snapshot.device_path = Some("/dev/ttyUSB1".into());
        assert_eq!(snapshot.to_string(), "not connected via /dev/ttyUSB1 (device 1)");

        snapshot.connected = true;
        assert_eq!(snapshot.to_string(), "connected via /dev/ttyUSB1 (device 1)");
    }
}
