//! Key code translation for the mouseboard protocol.
//!
//! The peripheral speaks a compact one-byte key code:
//!
//! - printable ASCII (32..=126) is sent as the character itself, as the
//!   firmware's keyboard library types it on a US layout;
//! - every other key is `NONASCII_BASE + n`, where `n` is the key's position
//!   in [`ProtocolKey`].
//!
//! Platform key identifiers (X11 keysyms and the like) are translated at the
//! input boundary by a [`KeyMapper`]. The mapper is supplied by whoever owns
//! the input source and can be swapped without touching the transport.

pub mod linux_x11;

pub use linux_x11::{X11KeyMapper, X11LayoutOptions};

/// First protocol key code used for non-ASCII keys.
pub const NONASCII_BASE: u8 = 127;

/// Translates a platform key identifier into a protocol key code.
pub trait KeyMapper {
    /// Returns the protocol key code for `sym`, or `None` if the key is not
    /// supported by the peripheral.
    fn protocol_key(&self, sym: u32) -> Option<u8>;
}

impl<M: KeyMapper + ?Sized> KeyMapper for &M {
    fn protocol_key(&self, sym: u32) -> Option<u8> {
        (**self).protocol_key(sym)
    }
}

impl<M: KeyMapper + ?Sized> KeyMapper for Box<M> {
    fn protocol_key(&self, sym: u32) -> Option<u8> {
        (**self).protocol_key(sym)
    }
}

/// Non-ASCII keys understood by the peripheral, in protocol order.
///
/// The discriminant is the offset from [`NONASCII_BASE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProtocolKey {
    ControlLeft = 0,
    ShiftLeft = 1,
    AltLeft = 2,
    SuperLeft = 3,
    ControlRight = 4,
    ShiftRight = 5,
    AltRight = 6,
    SuperRight = 7,
    ArrowUp = 8,
    ArrowDown = 9,
    ArrowLeft = 10,
    ArrowRight = 11,
    Backspace = 12,
    Tab = 13,
    Enter = 14,
    Escape = 15,
    Insert = 16,
    PrintScreen = 17,
    Delete = 18,
    PageUp = 19,
    PageDown = 20,
    Home = 21,
    End = 22,
    CapsLock = 23,
    F1 = 24,
    F2 = 25,
    F3 = 26,
    F4 = 27,
    F5 = 28,
    F6 = 29,
    F7 = 30,
    F8 = 31,
    F9 = 32,
    F10 = 33,
    F11 = 34,
    F12 = 35,
    F13 = 36,
    F14 = 37,
    F15 = 38,
    F16 = 39,
    F17 = 40,
    F18 = 41,
    F19 = 42,
    F20 = 43,
    F21 = 44,
    F22 = 45,
    F23 = 46,
    F24 = 47,
    Numpad0 = 48,
    Numpad1 = 49,
    Numpad2 = 50,
    Numpad3 = 51,
    Numpad4 = 52,
    Numpad5 = 53,
    Numpad6 = 54,
    Numpad7 = 55,
    Numpad8 = 56,
    Numpad9 = 57,
    NumpadDivide = 58,
    NumpadMultiply = 59,
    NumpadSubtract = 60,
    NumpadAdd = 61,
    NumpadEnter = 62,
    NumpadDecimal = 63,
    NumLock = 64,
}

impl ProtocolKey {
    /// The key code sent on the wire.
    pub fn code(self) -> u8 {
        NONASCII_BASE + self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_key_codes_start_at_nonascii_base() {
        assert_eq!(ProtocolKey::ControlLeft.code(), 127);
        assert_eq!(ProtocolKey::Enter.code(), 141);
        assert_eq!(ProtocolKey::NumLock.code(), 191);
    }

    #[test]
    fn test_function_keys_are_contiguous() {
        assert_eq!(ProtocolKey::F12.code() - ProtocolKey::F1.code(), 11);
        assert_eq!(ProtocolKey::F24.code() - ProtocolKey::F1.code(), 23);
    }

    #[test]
    fn test_boxed_mapper_delegates() {
        struct Fixed;
        impl KeyMapper for Fixed {
            fn protocol_key(&self, _sym: u32) -> Option<u8> {
                Some(7)
            }
        }

        let mapper: Box<dyn KeyMapper> = Box::new(Fixed);
        assert_eq!(mapper.protocol_key(0), Some(7));
    }
}
