//! Scripted input source for tests.

use std::collections::VecDeque;

use crate::application::forward_input::{InputEvent, InputSource, SourceError};

/// Replays a fixed list of events, then reports exhaustion.
#[derive(Debug, Default, Clone)]
pub struct MockInputSource {
    events: VecDeque<InputEvent>,
    /// Number of events handed out so far.
    pub consumed: usize,
}

impl MockInputSource {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Events not yet handed out.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputSource for MockInputSource {
    fn next_event(&mut self) -> Result<Option<InputEvent>, SourceError> {
        let event = self.events.pop_front();
        if event.is_some() {
            self.consumed += 1;
        }
        Ok(event)
    }
}
