//! Integration tests for the input dispatch pipeline.
//!
//! Text events -> `ForwardInputUseCase` -> `TransportSession` -> simulated
//! board, with the status board observing the link and capturing logs.

use std::io::Cursor;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use mouseboard_controller::application::forward_input::{ForwardInputUseCase, InputEvent};
use mouseboard_controller::infrastructure::input_source::{MockInputSource, TextEventSource};
use mouseboard_controller::infrastructure::serial::mock::{SimulatedDevice, SimulatedPortOpener};
use mouseboard_controller::infrastructure::serial::{
    DeviceLocator, DeviceTemplate, LineSettings, TransportSession,
};
use mouseboard_controller::infrastructure::status::StatusBoard;
use mouseboard_core::{Command, ProtocolKey, ScrollDistance, X11KeyMapper, X11LayoutOptions};

fn board_session(opener: &SimulatedPortOpener, board: &StatusBoard) -> TransportSession {
    let locator = DeviceLocator::new(
        DeviceTemplate::new("/dev/sim{}").expect("template must be valid"),
        LineSettings::default(),
        Box::new(opener.clone()),
    );
    let mut session = TransportSession::new(
        locator,
        ScrollDistance::new(2).expect("scroll distance must be valid"),
        Box::new(board.clone()),
    );
    session.start();
    session
}

fn sent(device: &SimulatedDevice) -> Vec<Command> {
    device
        .commands()
        .into_iter()
        .filter(|c| *c != Command::Ping)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_text_events_are_forwarded_to_the_board() {
    // Arrange
    let opener = SimulatedPortOpener::new();
    let device = SimulatedDevice::peripheral();
    opener.attach("/dev/sim1", device.clone());
    let board = StatusBoard::new(50);
    let session = board_session(&opener, &board);
    let mut use_case = ForwardInputUseCase::new(session, X11KeyMapper::default());

    let script = "\
        # pointer enters the capture window
        enter 100 100
        motion 110 95
        key 0x79 press     # y on a German keyboard
        key 0x79 release
        key 0xff0d press
        this line is not an event
        key 0x12345678 press
        button 5 press
        button 5 release
        hide
        quit
        key 0x61 press
    ";
    let mut source = TextEventSource::new(Cursor::new(script));
    let mut refreshes = 0;

    // Act
    let subscriber = tracing_subscriber::registry().with(board.layer());
    let result = tracing::subscriber::with_default(subscriber, || {
        use_case.run(&mut source, || refreshes += 1)
    });

    // Assert
    assert!(result.is_ok());
    assert_eq!(
        sent(&device),
        vec![
            Command::Move { dx: 10, dy: -5 },
            Command::KeyPress(b'z'),
            Command::KeyRelease(b'z'),
            Command::KeyPress(ProtocolKey::Enter.code()),
            Command::VScroll(-2),
            Command::VScroll(-2),
            Command::Close,
        ]
    );
    assert_eq!(refreshes, 10, "one refresh per parsed event up to quit");

    let snapshot = board.snapshot();
    assert!(snapshot.connected);
    assert_eq!(snapshot.device_index, Some(1));

    let log = board.recent(50);
    assert!(log
        .iter()
        .any(|e| e.level == Level::ERROR && e.text.contains("unsupported key")));
    assert!(log
        .iter()
        .any(|e| e.level == Level::WARN && e.text.contains("line 7")));
}

#[test]
fn test_undecodable_line_does_not_end_the_loop() {
    // Arrange
    let opener = SimulatedPortOpener::new();
    let device = SimulatedDevice::peripheral();
    opener.attach("/dev/sim0", device.clone());
    let board = StatusBoard::new(10);
    let session = board_session(&opener, &board);
    let mut use_case = ForwardInputUseCase::new(session, X11KeyMapper::default());
    let input = b"key 0x61 press\n\xff\xfe garbage\nkey 0x61 release\n".to_vec();
    let mut source = TextEventSource::new(Cursor::new(input));

    // Act
    let result = use_case.run(&mut source, || {});

    // Assert
    assert!(result.is_ok());
    assert_eq!(
        sent(&device),
        vec![Command::KeyPress(b'a'), Command::KeyRelease(b'a')]
    );
}

#[test]
fn test_large_motion_is_split_into_byte_sized_moves() {
    // Arrange
    let opener = SimulatedPortOpener::new();
    let device = SimulatedDevice::peripheral();
    opener.attach("/dev/sim0", device.clone());
    let board = StatusBoard::new(10);
    let session = board_session(&opener, &board);
    let mut use_case = ForwardInputUseCase::new(session, X11KeyMapper::default());
    let mut source = MockInputSource::new([
        InputEvent::Enter { x: 0, y: 0 },
        InputEvent::Motion { x: 300, y: -10 },
    ]);

    // Act
    use_case
        .run(&mut source, || {})
        .expect("scripted source never fails");

    // Assert
    let moves = sent(&device);
    assert_eq!(
        moves,
        vec![
            Command::Move { dx: 127, dy: -10 },
            Command::Move { dx: 127, dy: 0 },
            Command::Move { dx: 46, dy: 0 },
        ]
    );
}

#[test]
fn test_events_without_a_board_are_dropped_and_loop_continues() {
    // Arrange
    let opener = SimulatedPortOpener::new();
    let board = StatusBoard::new(10);
    let session = board_session(&opener, &board);
    let mut use_case = ForwardInputUseCase::new(session, X11KeyMapper::default());
    let mut source = MockInputSource::new([
        InputEvent::Key {
            sym: 0x61,
            pressed: true,
        },
        InputEvent::Button {
            code: 1,
            pressed: true,
        },
        InputEvent::Hide,
    ]);

    // Act
    let result = use_case.run(&mut source, || {});

    // Assert
    assert!(result.is_ok());
    assert_eq!(source.consumed, 3);
    assert!(!board.snapshot().connected);
    assert_eq!(board.snapshot().device_index, None);
}

#[test]
fn test_german_layout_can_be_disabled() {
    // Arrange
    let opener = SimulatedPortOpener::new();
    let device = SimulatedDevice::peripheral();
    opener.attach("/dev/sim0", device.clone());
    let board = StatusBoard::new(10);
    let session = board_session(&opener, &board);
    let mapper = X11KeyMapper::new(X11LayoutOptions {
        german_layout: false,
        reverse_xkb_navigation: false,
    });
    let mut use_case = ForwardInputUseCase::new(session, mapper);

    // Act
    use_case
        .handle(InputEvent::Key {
            sym: 0x79,
            pressed: true,
        })
        .expect("key must be forwarded");

    // Assert
    assert_eq!(sent(&device), vec![Command::KeyPress(b'y')]);
}
