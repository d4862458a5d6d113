//! Mapping of key and pointer-button events onto protocol commands.
//!
//! Pointer buttons arrive as X11-style button numbers. Numbers 4–7 are not
//! real buttons but the two axes of the scroll wheel, one number per
//! direction. The peripheral has dedicated scroll commands for those, so they
//! are substituted before any button framing happens:
//!
//! | Button | Meaning      | Command           |
//! |--------|--------------|-------------------|
//! | 4      | wheel up     | `VScroll(+K)`     |
//! | 5      | wheel down   | `VScroll(-K)`     |
//! | 6      | wheel left   | `HScroll(-K)`     |
//! | 7      | wheel right  | `HScroll(+K)`     |
//! | other  | button       | `ButtonPress/Release(code)` |
//!
//! `K` is the configured [`ScrollDistance`]. Wheel numbers are reported on
//! both press and release, and each produces a scroll command.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::messages::Command;

/// Button number reported for one notch of the wheel away from the user.
pub const BUTTON_SCROLL_UP: u8 = 4;
/// Button number reported for one notch of the wheel towards the user.
pub const BUTTON_SCROLL_DOWN: u8 = 5;
/// Button number reported for a left tilt of the wheel.
pub const BUTTON_SCROLL_LEFT: u8 = 6;
/// Button number reported for a right tilt of the wheel.
pub const BUTTON_SCROLL_RIGHT: u8 = 7;

/// Magnitude applied to every scroll command; the sign encodes direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ScrollDistance(i8);

/// Returned when a configured scroll distance does not fit a positive `i8`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("scroll distance must be between 1 and 127, got {0}")]
pub struct InvalidScrollDistance(pub u8);

impl ScrollDistance {
    /// Builds a distance from an unsigned magnitude in `1..=127`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidScrollDistance`] for 0 or values above 127.
    pub fn new(magnitude: u8) -> Result<Self, InvalidScrollDistance> {
        match i8::try_from(magnitude) {
            Ok(k) if k > 0 => Ok(Self(k)),
            _ => Err(InvalidScrollDistance(magnitude)),
        }
    }

    /// The positive magnitude `K`.
    pub fn get(self) -> i8 {
        self.0
    }
}

impl Default for ScrollDistance {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for ScrollDistance {
    type Error = InvalidScrollDistance;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScrollDistance> for u8 {
    fn from(value: ScrollDistance) -> Self {
        value.0 as u8
    }
}

/// Classification of a raw pointer button number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// One of the vertical wheel directions; `true` means up.
    VerticalScroll { up: bool },
    /// One of the horizontal wheel directions; `true` means right.
    HorizontalScroll { right: bool },
    /// A real button, forwarded by number.
    Button(u8),
}

impl ButtonKind {
    /// Classifies a raw button number.
    pub fn classify(code: u8) -> Self {
        match code {
            BUTTON_SCROLL_UP => ButtonKind::VerticalScroll { up: true },
            BUTTON_SCROLL_DOWN => ButtonKind::VerticalScroll { up: false },
            BUTTON_SCROLL_LEFT => ButtonKind::HorizontalScroll { right: false },
            BUTTON_SCROLL_RIGHT => ButtonKind::HorizontalScroll { right: true },
            other => ButtonKind::Button(other),
        }
    }
}

/// Builds the command for a key event carrying a protocol key code.
pub fn key_command(code: u8, pressed: bool) -> Command {
    if pressed {
        Command::KeyPress(code)
    } else {
        Command::KeyRelease(code)
    }
}

/// Builds the command for a pointer button event, substituting scroll commands
/// for wheel button numbers.
pub fn button_command(code: u8, pressed: bool, distance: ScrollDistance) -> Command {
    let k = distance.get();
    match ButtonKind::classify(code) {
        ButtonKind::VerticalScroll { up } => Command::VScroll(if up { k } else { -k }),
        ButtonKind::HorizontalScroll { right } => Command::HScroll(if right { k } else { -k }),
        ButtonKind::Button(code) if pressed => Command::ButtonPress(code),
        ButtonKind::Button(code) => Command::ButtonRelease(code),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
