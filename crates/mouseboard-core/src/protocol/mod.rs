//! Protocol module containing the command/response types and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_command, decode_response, encode_command, Frame, ProtocolError};
pub use messages::*;
