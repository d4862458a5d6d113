//! Binary codec for mouseboard command frames and response bytes.
//!
//! Wire format:
//! ```text
//! [header:1][payload:N]      N = Header::payload_len(), 0..=2
//! ```
//! Signed payload bytes (scroll and motion deltas) are two's complement.

use crate::protocol::messages::{Command, Header, Response, MAX_FRAME_LEN};
use thiserror::Error;

/// Errors that can occur while decoding bytes from the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the frame announced by its header.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The header byte is not a recognized command.
    #[error("unknown command header: 0x{0:02X}")]
    UnknownHeader(u8),

    /// The response byte is not a recognized reply.
    #[error("unknown response byte: 0x{0:02X}")]
    UnknownResponse(u8),
}

/// One encoded command, held on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_LEN],
    len: usize,
}

impl Frame {
    /// The full frame: header followed by payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// The single header byte.
    pub fn header(&self) -> &[u8] {
        &self.bytes[..1]
    }

    /// The payload bytes, empty for `Ping` and `Close`.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..self.len]
    }

    /// Total frame length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; every frame carries at least a header byte.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`Command`] into its wire frame.
///
/// # Examples
///
/// ```rust
/// use mouseboard_core::protocol::{encode_command, Command};
///
/// let frame = encode_command(&Command::Move { dx: -1, dy: 5 });
/// assert_eq!(frame.as_bytes(), &[9, 0xFF, 5]);
/// ```
pub fn encode_command(command: &Command) -> Frame {
    let mut bytes = [0u8; MAX_FRAME_LEN];
    bytes[0] = command.header() as u8;

    match *command {
        Command::Ping | Command::Close => {}
        Command::KeyPress(code)
        | Command::KeyRelease(code)
        | Command::ButtonPress(code)
        | Command::ButtonRelease(code) => bytes[1] = code,
        Command::VScroll(delta) | Command::HScroll(delta) => bytes[1] = delta as u8,
        Command::Move { dx, dy } => {
            bytes[1] = dx as u8;
            bytes[2] = dy as u8;
        }
    }

    Frame {
        bytes,
        len: 1 + command.payload_len(),
    }
}

/// Decodes one [`Command`] from the beginning of `bytes`.
///
/// Returns the command and the number of bytes consumed. This is the
/// peripheral's side of the link; the controller uses it to drive simulated
/// devices.
///
/// # Errors
///
/// Returns [`ProtocolError::UnknownHeader`] for an unrecognized first byte and
/// [`ProtocolError::InsufficientData`] if the payload is truncated.
pub fn decode_command(bytes: &[u8]) -> Result<(Command, usize), ProtocolError> {
    let Some(&first) = bytes.first() else {
        return Err(ProtocolError::InsufficientData {
            needed: 1,
            available: 0,
        });
    };

    let header = Header::try_from(first).map_err(|_| ProtocolError::UnknownHeader(first))?;
    let total = 1 + header.payload_len();
    if bytes.len() < total {
        return Err(ProtocolError::InsufficientData {
            needed: total,
            available: bytes.len(),
        });
    }

    let command = match header {
        Header::Ping => Command::Ping,
        Header::Close => Command::Close,
        Header::KeyPress => Command::KeyPress(bytes[1]),
        Header::KeyRelease => Command::KeyRelease(bytes[1]),
        Header::ButtonPress => Command::ButtonPress(bytes[1]),
        Header::ButtonRelease => Command::ButtonRelease(bytes[1]),
        Header::VScroll => Command::VScroll(bytes[1] as i8),
        Header::HScroll => Command::HScroll(bytes[1] as i8),
        Header::Move => Command::Move {
            dx: bytes[1] as i8,
            dy: bytes[2] as i8,
        },
    };

    Ok((command, total))
}

/// Decodes a response byte.
///
/// # Errors
///
/// Returns [`ProtocolError::UnknownResponse`] for bytes outside the response table.
pub fn decode_response(byte: u8) -> Result<Response, ProtocolError> {
    Response::try_from(byte).map_err(|_| ProtocolError::UnknownResponse(byte))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn all_commands() -> Vec<Command> {
        vec![
            Command::Ping,
            Command::Close,
            Command::KeyPress(b'q'),
            Command::KeyRelease(127 + 14),
            Command::ButtonPress(1),
            Command::ButtonRelease(3),
            Command::VScroll(-4),
            Command::HScroll(4),
            Command::Move { dx: -128, dy: 127 },
        ]
    }

    #[test]
    fn test_every_frame_is_one_header_plus_payload() {
        for command in all_commands() {
            let frame = encode_command(&command);
            assert_eq!(
                frame.len(),
                1 + command.payload_len(),
                "wrong frame length for {command:?}"
            );
            assert_eq!(frame.header(), &[command.header() as u8]);
            assert_eq!(frame.payload().len(), command.payload_len());
        }
    }

    #[test]
    fn test_ping_frame_is_single_byte() {
        let frame = encode_command(&Command::Ping);
        assert_eq!(frame.as_bytes(), &[1]);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_close_frame_is_single_byte() {
        assert_eq!(encode_command(&Command::Close).as_bytes(), &[2]);
    }

    #[test]
    fn test_key_press_carries_code() {
        assert_eq!(encode_command(&Command::KeyPress(b'a')).as_bytes(), &[3, b'a']);
        assert_eq!(encode_command(&Command::KeyRelease(b'a')).as_bytes(), &[4, b'a']);
    }

    #[test]
    fn test_scroll_delta_is_twos_complement() {
        // Arrange
        let up = Command::VScroll(3);
        let down = Command::VScroll(-3);

        // Act / Assert
        assert_eq!(encode_command(&up).as_bytes(), &[7, 0x03]);
        assert_eq!(encode_command(&down).as_bytes(), &[7, 0xFD]);
        assert_eq!(encode_command(&Command::HScroll(-1)).as_bytes(), &[8, 0xFF]);
    }

    #[test]
    fn test_move_payload_order_is_dx_then_dy() {
        let frame = encode_command(&Command::Move { dx: 10, dy: -20 });
        assert_eq!(frame.as_bytes(), &[9, 10, (-20i8) as u8]);
    }

    #[test]
    fn test_decode_command_recovers_every_encoded_command() {
        for command in all_commands() {
            let frame = encode_command(&command);
            let (decoded, consumed) = decode_command(frame.as_bytes()).unwrap();
            assert_eq!(decoded, command);
            assert_eq!(consumed, frame.len());
        }
    }

    #[test]
    fn test_decode_command_consumes_only_one_frame() {
        // Two frames back to back: key press then ping.
        let bytes = [3, b'x', 1];
        let (first, consumed) = decode_command(&bytes).unwrap();
        assert_eq!(first, Command::KeyPress(b'x'));
        assert_eq!(consumed, 2);
    }

    #[test]
    fn test_decode_command_empty_input_is_insufficient() {
        assert_eq!(
            decode_command(&[]),
            Err(ProtocolError::InsufficientData {
                needed: 1,
                available: 0
            })
        );
    }

    #[test]
    fn test_decode_command_truncated_move_is_insufficient() {
        assert_eq!(
            decode_command(&[9, 1]),
            Err(ProtocolError::InsufficientData {
                needed: 3,
                available: 2
            })
        );
    }

    #[test]
    fn test_decode_command_unknown_header() {
        assert_eq!(decode_command(&[0x00]), Err(ProtocolError::UnknownHeader(0x00)));
        assert_eq!(decode_command(&[10]), Err(ProtocolError::UnknownHeader(10)));
    }

    #[test]
    fn test_decode_response_known_values() {
        assert_eq!(decode_response(0x00), Ok(Response::Ok));
        assert_eq!(decode_response(0xFF), Ok(Response::NotConnected));
        assert_eq!(decode_response(0xFE), Ok(Response::InvalidCommand));
        assert_eq!(decode_response(0xFD), Ok(Response::InvalidKey));
        assert_eq!(decode_response(0x42), Ok(Response::Magic));
    }

    #[test]
    fn test_decode_response_unknown_value() {
        assert_eq!(decode_response(0x07), Err(ProtocolError::UnknownResponse(0x07)));
    }
}
