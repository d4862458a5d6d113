//! Plain terminal presentation of the status board.

use std::io::{self, Write};

use super::{LinkSnapshot, StatusBoard};

/// Writes status changes and new log lines to a terminal stream.
///
/// Only repaints when the board's redraw mark is set, and only prints the
/// status line when the link snapshot differs from the last one shown.
#[derive(Debug)]
pub struct TerminalPresenter {
    board: StatusBoard,
    cursor: u64,
    show_log: bool,
    last: Option<LinkSnapshot>,
}

impl TerminalPresenter {
    /// `show_log` controls whether captured log lines are echoed too.
    pub fn new(board: StatusBoard, show_log: bool) -> Self {
        Self {
            board,
            cursor: 0,
            show_log,
            last: None,
        }
    }

    /// Writes whatever changed since the previous call.
    ///
    /// # Errors
    ///
    /// Returns the first write error from `out`.
    pub fn refresh(&mut self, out: &mut impl Write) -> io::Result<()> {
        if !self.board.take_redraw() {
            return Ok(());
        }

        if self.show_log {
            for entry in self.board.log_since(self.cursor) {
                writeln!(out, "{entry}")?;
                self.cursor = entry.seq + 1;
            }
        }

        let snapshot = self.board.snapshot();
        if self.last.as_ref() != Some(&snapshot) {
            writeln!(out, "mouseboard: {snapshot}")?;
            self.last = Some(snapshot);
        }
        out.flush()
    }
}
