//! X11 KeySym to protocol key code translation.
//!
//! X11 KeySym values are defined in X11/keysymdef.h.
//! Reference: https://gitlab.freedesktop.org/xorg/proto/xorgproto/-/blob/master/include/X11/keysymdef.h
//!
//! Latin-1 keysyms in 0x20..0x7F equal their ASCII character, so printable
//! keys pass straight through. The firmware always types on a US layout, so
//! a German keyboard needs a handful of symbols remapped to the US key in the
//! same physical position ([`X11LayoutOptions::german_layout`]).

use serde::{Deserialize, Serialize};

use super::{KeyMapper, ProtocolKey};

/// Layout adjustments applied before the generic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct X11LayoutOptions {
    /// Remap German-layout symbols to the US keys at the same position.
    pub german_layout: bool,
    /// Undo a custom xkb map that turns modifier+arrow combinations into
    /// navigation keys (e.g. Alt+Left into Home) on the X server, so the
    /// target sees the arrow key that was physically pressed.
    pub reverse_xkb_navigation: bool,
}

impl Default for X11LayoutOptions {
    fn default() -> Self {
        Self {
            german_layout: true,
            reverse_xkb_navigation: false,
        }
    }
}

/// [`KeyMapper`] for X11 keysyms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct X11KeyMapper {
    options: X11LayoutOptions,
}

impl X11KeyMapper {
    pub fn new(options: X11LayoutOptions) -> Self {
        Self { options }
    }
}

impl KeyMapper for X11KeyMapper {
    fn protocol_key(&self, sym: u32) -> Option<u8> {
        if self.options.german_layout {
            if let Some(code) = german_to_us(sym) {
                return Some(code);
            }
        }

        if (0x20..0x7F).contains(&sym) {
            return u8::try_from(sym).ok();
        }

        if self.options.reverse_xkb_navigation {
            if let Some(key) = reversed_navigation(sym) {
                return Some(key.code());
            }
        }

        keysym_to_protocol(sym).map(ProtocolKey::code)
    }
}

/// Symbols of a German keyboard, mapped to the US character at the same key.
fn german_to_us(sym: u32) -> Option<u8> {
    match sym {
        0x0079 => Some(b'z'),  // XK_y
        0x007A => Some(b'y'),  // XK_z
        0x005E => Some(b'`'),  // XK_asciicircum
        0x00DF => Some(b'-'),  // XK_ssharp
        0x00B4 => Some(b'='),  // XK_acute
        0x002B => Some(b']'),  // XK_plus
        0x002D => Some(b'/'),  // XK_minus
        0x0023 => Some(b'\\'), // XK_numbersign
        0x003D => Some(b'\''), // XK_equal
        0x00F6 => Some(b';'),  // XK_odiaeresis
        0x00E4 => Some(b'\''), // XK_adiaeresis
        0x00FC => Some(b'['),  // XK_udiaeresis
        _ => None,
    }
}

/// Navigation keys produced by the custom xkb map, mapped back to the keys
/// that were physically pressed.
fn reversed_navigation(sym: u32) -> Option<ProtocolKey> {
    match sym {
        0xFF63 => Some(ProtocolKey::Enter),      // XK_Insert
        0xFFFF => Some(ProtocolKey::Backspace),  // XK_Delete
        0xFF55 => Some(ProtocolKey::ArrowUp),    // XK_Page_Up
        0xFF56 => Some(ProtocolKey::ArrowDown),  // XK_Page_Down
        0xFF50 => Some(ProtocolKey::ArrowLeft),  // XK_Home
        0xFF57 => Some(ProtocolKey::ArrowRight), // XK_End
        _ => None,
    }
}

/// Translates a non-printable X11 keysym into a [`ProtocolKey`].
pub fn keysym_to_protocol(sym: u32) -> Option<ProtocolKey> {
    use ProtocolKey as K;

    let key = match sym {
        // Modifiers
        0xFFE3 => K::ControlLeft,  // XK_Control_L
        0xFFE1 => K::ShiftLeft,    // XK_Shift_L
        0xFFE9 => K::AltLeft,      // XK_Alt_L
        0xFFEB => K::SuperLeft,    // XK_Super_L
        0xFFE4 => K::ControlRight, // XK_Control_R
        0xFFE2 => K::ShiftRight,   // XK_Shift_R
        0xFFEA => K::AltRight,     // XK_Alt_R
        0xFE03 => K::AltRight,     // XK_ISO_Level3_Shift (AltGr)
        0xFFEC => K::SuperRight,   // XK_Super_R

        // Arrows
        0xFF52 => K::ArrowUp,    // XK_Up
        0xFF54 => K::ArrowDown,  // XK_Down
        0xFF51 => K::ArrowLeft,  // XK_Left
        0xFF53 => K::ArrowRight, // XK_Right

        // Editing and control
        0xFF08 => K::Backspace,   // XK_BackSpace
        0xFF09 => K::Tab,         // XK_Tab
        0xFF0D => K::Enter,       // XK_Return
        0xFF1B => K::Escape,      // XK_Escape
        0xFF61 => K::PrintScreen, // XK_Print
        0xFFE5 => K::CapsLock,    // XK_Caps_Lock
        0xFF63 => K::Insert,      // XK_Insert
        0xFFFF => K::Delete,      // XK_Delete
        0xFF55 => K::PageUp,      // XK_Page_Up
        0xFF56 => K::PageDown,    // XK_Page_Down
        0xFF50 => K::Home,        // XK_Home
        0xFF57 => K::End,         // XK_End

        // Function keys XK_F1..XK_F24 are contiguous
        0xFFBE..=0xFFD5 => return function_key(sym - 0xFFBE),

        // Keypad, with and without NumLock
        0xFFB0 | 0xFF9E => K::Numpad0,         // XK_KP_0, XK_KP_Insert
        0xFFB1 | 0xFF9C => K::Numpad1,         // XK_KP_1, XK_KP_End
        0xFFB2 | 0xFF99 => K::Numpad2,         // XK_KP_2, XK_KP_Down
        0xFFB3 | 0xFF9B => K::Numpad3,         // XK_KP_3, XK_KP_Page_Down
        0xFFB4 | 0xFF96 => K::Numpad4,         // XK_KP_4, XK_KP_Left
        0xFFB5 | 0xFF9D => K::Numpad5,         // XK_KP_5, XK_KP_Begin
        0xFFB6 | 0xFF98 => K::Numpad6,         // XK_KP_6, XK_KP_Right
        0xFFB7 | 0xFF95 => K::Numpad7,         // XK_KP_7, XK_KP_Home
        0xFFB8 | 0xFF97 => K::Numpad8,         // XK_KP_8, XK_KP_Up
        0xFFB9 | 0xFF9A => K::Numpad9,         // XK_KP_9, XK_KP_Page_Up
        0xFFAF => K::NumpadDivide,             // XK_KP_Divide
        0xFFAA => K::NumpadMultiply,           // XK_KP_Multiply
        0xFFAD => K::NumpadSubtract,           // XK_KP_Subtract
        0xFFAB => K::NumpadAdd,                // XK_KP_Add
        0xFF8D => K::NumpadEnter,              // XK_KP_Enter
        0xFF9F | 0xFFAC => K::NumpadDecimal,   // XK_KP_Delete, XK_KP_Separator
        0xFF7F => K::NumLock,                  // XK_Num_Lock

        _ => return None,
    };
    Some(key)
}

fn function_key(index: u32) -> Option<ProtocolKey> {
    use ProtocolKey as K;

    const KEYS: [ProtocolKey; 24] = [
        K::F1, K::F2, K::F3, K::F4, K::F5, K::F6, K::F7, K::F8, K::F9, K::F10, K::F11, K::F12,
        K::F13, K::F14, K::F15, K::F16, K::F17, K::F18, K::F19, K::F20, K::F21, K::F22, K::F23,
        K::F24,
    ];
    KEYS.get(usize::try_from(index).ok()?).copied()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
