//! ForwardInputUseCase: turns classified input events into peripheral commands.
//!
//! This use case sits at the application layer and delegates to two seams:
//!
//! - an [`InputSource`] that yields [`InputEvent`]s (stdin text lines in the
//!   binary, a scripted list in tests);
//! - a [`PeripheralLink`] that performs the blocking command exchange (the
//!   serial transport session in the binary, a mock in tests).
//!
//! Key symbols are translated by a [`KeyMapper`] supplied by the caller, so
//! the use case never knows which keyboard layout the events came from.

use std::fmt;

use mouseboard_core::{motion_steps, Command, Header, KeyMapper, PointerTracker};
use thiserror::Error;
use tracing::{debug, error, info, warn};

// ── Transport seam ────────────────────────────────────────────────────────────

/// Why the peripheral refused a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The key code is not in the firmware's key table.
    InvalidKey,
    /// The header byte was not understood.
    InvalidCommand,
    /// The reply byte is not a valid answer to a regular command.
    Unexpected(u8),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvalidKey => f.write_str("invalid key"),
            Rejection::InvalidCommand => f.write_str("invalid command"),
            Rejection::Unexpected(byte) => write!(f, "unexpected reply 0x{byte:02X}"),
        }
    }
}

/// Classified outcome of a failed command exchange.
///
/// Neither variant is fatal. `NotConnected` covers a missing device, a broken
/// serial link, a silent device, and a device whose Bluetooth host is gone.
/// `Rejected` means the link is healthy but the command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("peripheral not connected")]
    NotConnected,

    #[error("{command} rejected by peripheral: {reason}")]
    Rejected { command: Header, reason: Rejection },
}

/// Command-level access to the peripheral.
///
/// Every method performs at most one complete exchange per command and
/// returns once the reply has been read.
#[cfg_attr(test, mockall::automock)]
pub trait PeripheralLink {
    /// Sends a key press or release for a protocol key code.
    fn key(&mut self, code: u8, pressed: bool) -> Result<(), TransportError>;

    /// Sends a pointer button event. Wheel buttons become scroll commands.
    fn button(&mut self, code: u8, pressed: bool) -> Result<(), TransportError>;

    /// Sends one relative pointer motion.
    fn move_relative(&mut self, dx: i8, dy: i8) -> Result<(), TransportError>;

    /// Asks the peripheral to release everything. Failures are ignored.
    fn stop(&mut self);

    /// Whether the last completed exchange reported an active connection.
    fn connected(&self) -> bool;
}

// ── Input seam ────────────────────────────────────────────────────────────────

/// An already-classified input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Key press or release, identified by a platform key symbol.
    Key { sym: u32, pressed: bool },
    /// Pointer button press or release; 4..=7 are the wheel directions.
    Button { code: u8, pressed: bool },
    /// Absolute pointer position inside the capture area.
    Motion { x: i32, y: i32 },
    /// The pointer entered the capture area at this position.
    Enter { x: i32, y: i32 },
    /// The capture area was hidden; the peripheral should release all input.
    Hide,
    /// The user asked to quit.
    Quit,
}

/// Error type for input sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// One event could not be parsed; the source is still usable.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The underlying reader failed; no further events can be read.
    #[error("failed to read input events: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces input events one at a time.
pub trait InputSource {
    /// Returns the next event, or `None` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Parse`] for a malformed event and
    /// [`SourceError::Io`] when reading fails.
    fn next_event(&mut self) -> Result<Option<InputEvent>, SourceError>;
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// Error type for forwarding a single event.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ForwardError {
    /// The key mapper has no protocol code for this symbol; nothing was sent.
    #[error("unsupported key symbol 0x{0:04X}")]
    UnsupportedKey(u32),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What the dispatch loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The Forward Input use case.
pub struct ForwardInputUseCase<L, M> {
    link: L,
    mapper: M,
    pointer: PointerTracker,
}

impl<L: PeripheralLink, M: KeyMapper> ForwardInputUseCase<L, M> {
    /// Creates a new use case over the given link and key mapper.
    pub fn new(link: L, mapper: M) -> Self {
        Self {
            link,
            mapper,
            pointer: PointerTracker::new(),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Gives the link back, e.g. to shut it down after the loop ends.
    pub fn into_link(self) -> L {
        self.link
    }

    /// Forwards one event.
    ///
    /// Pointer motion is converted from absolute positions to deltas; a delta
    /// larger than one byte per axis is sent as several `Move` commands, and
    /// the first failing step aborts the rest.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::UnsupportedKey`] if the key symbol cannot be
    /// mapped, or the [`TransportError`] of the failing exchange.
    pub fn handle(&mut self, event: InputEvent) -> Result<Flow, ForwardError> {
        match event {
            InputEvent::Key { sym, pressed } => {
                debug!("key {}: keysym=0x{sym:04X}", press_str(pressed));
                let code = self
                    .mapper
                    .protocol_key(sym)
                    .ok_or(ForwardError::UnsupportedKey(sym))?;
                self.link.key(code, pressed)?;
            }
            InputEvent::Button { code, pressed } => {
                debug!("button {}: button {code}", press_str(pressed));
                self.link.button(code, pressed)?;
            }
            InputEvent::Motion { x, y } => {
                let (dx, dy) = self.pointer.motion_to(x, y);
                debug!("mouse move: abs=({x}, {y}), rel=({dx}, {dy})");
                for step in motion_steps(dx, dy) {
                    if let Command::Move { dx, dy } = step {
                        self.link.move_relative(dx, dy)?;
                    }
                }
            }
            InputEvent::Enter { x, y } => {
                debug!("pointer entered at ({x}, {y})");
                self.pointer.reset_to(x, y);
            }
            InputEvent::Hide => {
                debug!("capture hidden, releasing peripheral input");
                self.link.stop();
            }
            InputEvent::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Runs the dispatch loop until the source is exhausted or a `Quit`
    /// event arrives.
    ///
    /// Per-event failures are logged and the loop continues. `after_event` is
    /// called after every event so the caller can refresh its presentation.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Io`] if the source can no longer be read.
    pub fn run<S>(&mut self, source: &mut S, mut after_event: impl FnMut()) -> Result<(), SourceError>
    where
        S: InputSource + ?Sized,
    {
        loop {
            let event = match source.next_event() {
                Ok(Some(event)) => event,
                Ok(None) => {
                    info!("input source closed");
                    return Ok(());
                }
                Err(err @ SourceError::Parse { .. }) => {
                    warn!("ignoring input: {err}");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let outcome = self.handle(event);
            after_event();

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => {
                    info!("quit requested");
                    return Ok(());
                }
                Err(ForwardError::UnsupportedKey(sym)) => {
                    error!("unsupported key: keysym=0x{sym:04X}");
                }
                Err(ForwardError::Transport(TransportError::NotConnected)) => {
                    debug!("event dropped, peripheral not connected");
                }
                Err(ForwardError::Transport(err)) => warn!("{err}"),
            }
        }
    }
}

fn press_str(pressed: bool) -> &'static str {
    if pressed {
        "press"
    } else {
        "release"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use mockall::predicate::eq;
    use mockall::Sequence;
    use mouseboard_core::{ProtocolKey, X11KeyMapper};

    use super::*;

    struct Scripted(VecDeque<Result<Option<InputEvent>, SourceError>>);

    impl InputSource for Scripted {
        fn next_event(&mut self) -> Result<Option<InputEvent>, SourceError> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    fn scripted(events: &[InputEvent]) -> Scripted {
        Scripted(events.iter().map(|e| Ok(Some(*e))).collect())
    }

    fn use_case(link: MockPeripheralLink) -> ForwardInputUseCase<MockPeripheralLink, X11KeyMapper> {
        ForwardInputUseCase::new(link, X11KeyMapper::default())
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_key_event_sends_mapped_code() {
        // Arrange
        let mut link = MockPeripheralLink::new();
        link.expect_key()
            .with(eq(ProtocolKey::Enter.code()), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut uc = use_case(link);

        // Act
        let flow = uc.handle(InputEvent::Key {
            sym: 0xFF0D,
            pressed: true,
        });

        // Assert
        assert_eq!(flow, Ok(Flow::Continue));
    }

    #[test]
    fn test_unsupported_key_sends_nothing() {
        // Arrange: no expectations, so any call would panic.
        let link = MockPeripheralLink::new();
        let mut uc = use_case(link);

        // Act
        let result = uc.handle(InputEvent::Key {
            sym: 0x1008_FF13,
            pressed: true,
        });

        // Assert
        assert_eq!(result, Err(ForwardError::UnsupportedKey(0x1008_FF13)));
    }

    #[test]
    fn test_key_rejection_is_reported() {
        let mut link = MockPeripheralLink::new();
        link.expect_key().returning(|_, _| {
            Err(TransportError::Rejected {
                command: Header::KeyPress,
                reason: Rejection::InvalidKey,
            })
        });
        let mut uc = use_case(link);

        let result = uc.handle(InputEvent::Key {
            sym: u32::from(b'a'),
            pressed: true,
        });

        assert!(matches!(
            result,
            Err(ForwardError::Transport(TransportError::Rejected {
                reason: Rejection::InvalidKey,
                ..
            }))
        ));
    }

    // ── Buttons and pointer ───────────────────────────────────────────────────

    #[test]
    fn test_button_event_is_passed_through_unchanged() {
        let mut link = MockPeripheralLink::new();
        link.expect_button()
            .with(eq(5), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut uc = use_case(link);

        assert_eq!(
            uc.handle(InputEvent::Button {
                code: 5,
                pressed: false
            }),
            Ok(Flow::Continue)
        );
    }

    #[test]
    fn test_first_motion_after_enter_sends_delta() {
        // Arrange
        let mut link = MockPeripheralLink::new();
        link.expect_move_relative()
            .with(eq(4), eq(-2))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut uc = use_case(link);

        // Act
        uc.handle(InputEvent::Enter { x: 100, y: 100 }).unwrap();
        let flow = uc.handle(InputEvent::Motion { x: 104, y: 98 });

        // Assert
        assert_eq!(flow, Ok(Flow::Continue));
    }

    #[test]
    fn test_motion_without_delta_sends_nothing() {
        let link = MockPeripheralLink::new();
        let mut uc = use_case(link);

        uc.handle(InputEvent::Enter { x: 10, y: 10 }).unwrap();
        assert_eq!(uc.handle(InputEvent::Motion { x: 10, y: 10 }), Ok(Flow::Continue));
    }

    #[test]
    fn test_large_motion_is_split_into_steps() {
        // Arrange
        let mut seq = Sequence::new();
        let mut link = MockPeripheralLink::new();
        link.expect_move_relative()
            .with(eq(127), eq(0))
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        link.expect_move_relative()
            .with(eq(46), eq(0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let mut uc = use_case(link);

        // Act
        uc.handle(InputEvent::Enter { x: 0, y: 0 }).unwrap();
        let flow = uc.handle(InputEvent::Motion { x: 300, y: 0 });

        // Assert
        assert_eq!(flow, Ok(Flow::Continue));
    }

    #[test]
    fn test_failed_motion_step_aborts_remaining_steps() {
        let mut link = MockPeripheralLink::new();
        link.expect_move_relative()
            .times(1)
            .returning(|_, _| Err(TransportError::NotConnected));
        let mut uc = use_case(link);

        uc.handle(InputEvent::Enter { x: 0, y: 0 }).unwrap();
        let result = uc.handle(InputEvent::Motion { x: 1000, y: 0 });

        assert_eq!(
            result,
            Err(ForwardError::Transport(TransportError::NotConnected))
        );
    }

    #[test]
    fn test_hide_stops_the_peripheral() {
        let mut link = MockPeripheralLink::new();
        link.expect_stop().times(1).return_const(());
        let mut uc = use_case(link);

        assert_eq!(uc.handle(InputEvent::Hide), Ok(Flow::Continue));
    }

    // ── Dispatch loop ─────────────────────────────────────────────────────────

    #[test]
    fn test_run_stops_at_quit() {
        // Arrange: the button after Quit must never be forwarded.
        let mut link = MockPeripheralLink::new();
        link.expect_button()
            .with(eq(1), eq(true))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut uc = use_case(link);
        let mut source = scripted(&[
            InputEvent::Button {
                code: 1,
                pressed: true,
            },
            InputEvent::Quit,
            InputEvent::Button {
                code: 2,
                pressed: true,
            },
        ]);
        let mut refreshes = 0;

        // Act
        let result = uc.run(&mut source, || refreshes += 1);

        // Assert
        assert!(result.is_ok());
        assert_eq!(refreshes, 2);
    }

    #[test]
    fn test_run_continues_after_event_errors() {
        // Arrange
        let mut link = MockPeripheralLink::new();
        link.expect_button()
            .times(2)
            .returning(|_, _| Err(TransportError::NotConnected));
        let mut uc = use_case(link);
        let mut source = Scripted(VecDeque::from(vec![
            Ok(Some(InputEvent::Button {
                code: 1,
                pressed: true,
            })),
            Err(SourceError::Parse {
                line: 2,
                reason: "bad".into(),
            }),
            Ok(Some(InputEvent::Key {
                sym: 0x1008_FF13,
                pressed: true,
            })),
            Ok(Some(InputEvent::Button {
                code: 1,
                pressed: false,
            })),
        ]));

        // Act / Assert: ends normally when the source is exhausted.
        assert!(uc.run(&mut source, || {}).is_ok());
    }

    #[test]
    fn test_run_returns_io_errors() {
        let link = MockPeripheralLink::new();
        let mut uc = use_case(link);
        let mut source = Scripted(VecDeque::from(vec![Err(SourceError::Io(
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"),
        ))]));

        let result = uc.run(&mut source, || {});

        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[test]
    fn test_into_link_returns_the_link() {
        let mut link = MockPeripheralLink::new();
        link.expect_connected().return_const(true);
        let uc = use_case(link);

        assert!(uc.link().connected());
        let link = uc.into_link();
        assert!(link.connected());
    }
}
