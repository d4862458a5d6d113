//! Line-oriented text event source.
//!
//! # Format
//!
//! One event per line, fields separated by whitespace:
//!
//! ```text
//! key <keysym> press|release      # X11 keysym, e.g. 0xff0d for Return
//! button <n> press|release        # 1 left, 2 middle, 3 right, 4..7 wheel
//! motion <x> <y>                  # absolute pointer position
//! enter <x> <y>                   # pointer entered the capture area
//! hide                            # capture area hidden, release everything
//! quit
//! ```
//!
//! Numbers are decimal or `0x`-prefixed hexadecimal. Blank lines and anything
//! after `#` are ignored.

use std::io::BufRead;

use thiserror::Error;

use crate::application::forward_input::{InputEvent, InputSource, SourceError};

/// Error type for a single malformed line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEventError {
    #[error("unknown event {0:?}")]
    UnknownEvent(String),

    #[error("{event}: missing {argument}")]
    MissingArgument {
        event: &'static str,
        argument: &'static str,
    },

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("number {0:?} out of range")]
    OutOfRange(String),

    #[error("expected `press` or `release`, got {0:?}")]
    InvalidAction(String),

    #[error("unexpected trailing input {0:?}")]
    TrailingInput(String),

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// Reads [`InputEvent`]s line by line from a reader.
pub struct TextEventSource<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> TextEventSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Number of lines read so far.
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> InputSource for TextEventSource<R> {
    fn next_event(&mut self) -> Result<Option<InputEvent>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let parsed = std::str::from_utf8(&self.buf)
                .map_err(|_| ParseEventError::InvalidUtf8)
                .and_then(parse_event);
            match parsed {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => continue,
                Err(err) => {
                    return Err(SourceError::Parse {
                        line: self.line,
                        reason: err.to_string(),
                    })
                }
            }
        }
    }
}

/// Parses one line. Returns `Ok(None)` for blank and comment-only lines.
///
/// # Errors
///
/// Returns [`ParseEventError`] describing the first problem in the line.
pub fn parse_event(line: &str) -> Result<Option<InputEvent>, ParseEventError> {
    let content = line.split('#').next().unwrap_or_default();
    let mut tokens = content.split_whitespace();

    let Some(name) = tokens.next() else {
        return Ok(None);
    };

    let event = match name {
        "key" => InputEvent::Key {
            sym: number(arg(&mut tokens, "key", "keysym")?)?,
            pressed: action(arg(&mut tokens, "key", "action")?)?,
        },
        "button" => InputEvent::Button {
            code: number(arg(&mut tokens, "button", "button number")?)?,
            pressed: action(arg(&mut tokens, "button", "action")?)?,
        },
        "motion" => InputEvent::Motion {
            x: number(arg(&mut tokens, "motion", "x")?)?,
            y: number(arg(&mut tokens, "motion", "y")?)?,
        },
        "enter" => InputEvent::Enter {
            x: number(arg(&mut tokens, "enter", "x")?)?,
            y: number(arg(&mut tokens, "enter", "y")?)?,
        },
        "hide" => InputEvent::Hide,
        "quit" => InputEvent::Quit,
        other => return Err(ParseEventError::UnknownEvent(other.to_string())),
    };

    if let Some(extra) = tokens.next() {
        return Err(ParseEventError::TrailingInput(extra.to_string()));
    }
    Ok(Some(event))
}

fn arg<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    event: &'static str,
    argument: &'static str,
) -> Result<&'a str, ParseEventError> {
    tokens
        .next()
        .ok_or(ParseEventError::MissingArgument { event, argument })
}

fn action(token: &str) -> Result<bool, ParseEventError> {
    match token {
        "press" => Ok(true),
        "release" => Ok(false),
        other => Err(ParseEventError::InvalidAction(other.to_string())),
    }
}

fn number<T: TryFrom<i64>>(token: &str) -> Result<T, ParseEventError> {
    let invalid = || ParseEventError::InvalidNumber(token.to_string());

    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if digits.starts_with(['+', '-']) {
        return Err(invalid());
    }

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| invalid())?;

    let value = if negative { -magnitude } else { magnitude };
    T::try_from(value).map_err(|_| ParseEventError::OutOfRange(token.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
