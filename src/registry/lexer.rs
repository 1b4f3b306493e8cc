//! # Registry Lexer
//!
//! Byte-at-a-time tokenizer for the input-device registry text.
//!
//! The lexer holds exactly one byte of lookahead. Tokens are separated by the
//! fixed delimiter set `{' ', ':', '=', '"', '\n'}`:
//!
//! - A quoted token runs from the opening quote to the closing quote.
//! - An unquoted token runs until the next delimiter, which is left unread.
//! - Newline is never part of a token. It is only consumed by
//!   [`Lexer::skip_line`], which is how higher-level rules end a line.
//!
//! All token buffers are [`BoundedString`]s, so a malformed registry can never
//! make the lexer allocate more than [`MAX_TOKEN_LEN`] bytes per token.

use std::borrow::Cow;
use std::fmt;
use std::io::{self, Bytes, Read};

/// Maximum number of bytes kept for a single token.
pub const MAX_TOKEN_LEN: usize = 63;

/// Quote byte opening and closing a quoted token.
pub const QUOTE: u8 = b'"';

/// End-of-line byte.
pub const EOL: u8 = b'\n';

/// Bytes that separate tokens.
const DELIMITERS: [u8; 5] = [b' ', b':', b'=', QUOTE, EOL];

/// Returns `true` if `byte` is one of the token delimiters.
#[must_use]
pub fn is_delimiter(byte: u8) -> bool {
    DELIMITERS.contains(&byte)
}

/// Maps a lowercase hexadecimal digit to its value.
fn hex_digit(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some(u32::from(byte - b'0')),
        b'a'..=b'f' => Some(u32::from(byte - b'a') + 10),
        _ => None,
    }
}

/// Owned byte string holding at most [`MAX_TOKEN_LEN`] bytes.
///
/// Bytes pushed past the limit are dropped and the buffer is flagged as
/// truncated; what was already stored is never touched.
///
/// # Examples
///
/// ```
/// use gamepad_pilot::registry::BoundedString;
///
/// let name = BoundedString::from("js0");
/// assert_eq!(name, "js0");
/// assert!(!name.is_truncated());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundedString {
    bytes: Vec<u8>,
    truncated: bool,
}

impl BoundedString {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a byte. Returns `false` if the byte was dropped.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.bytes.len() >= MAX_TOKEN_LEN {
            self.truncated = true;
            return false;
        }
        self.bytes.push(byte);
        true
    }

    /// Raw stored bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Stored bytes as text, replacing invalid UTF-8.
    #[must_use]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Number of stored bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns `true` if input was dropped because the buffer was full.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl From<&str> for BoundedString {
    fn from(text: &str) -> Self {
        let mut bounded = Self::new();
        for &byte in text.as_bytes() {
            bounded.push(byte);
        }
        bounded
    }
}

impl PartialEq<&str> for BoundedString {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl fmt::Display for BoundedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Result of reading a hexadecimal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexField {
    /// Every byte up to the delimiter was a valid digit.
    Value(u32),
    /// A non-digit (or overflow) was hit. Carries the digits accumulated
    /// before the failure.
    Malformed(u32),
}

impl HexField {
    /// The accumulated value, reliable or not.
    #[must_use]
    pub fn value(self) -> u32 {
        match self {
            HexField::Value(value) | HexField::Malformed(value) => value,
        }
    }
}

/// One-byte-lookahead lexer over a registry stream.
pub struct Lexer<R> {
    bytes: Bytes<R>,
    next: Option<u8>,
    line: usize,
}

impl<R: Read> Lexer<R> {
    /// Creates a lexer and primes the lookahead with the first byte.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading the first byte.
    pub fn new(reader: R) -> io::Result<Self> {
        let mut bytes = reader.bytes();
        let next = bytes.next().transpose()?;
        Ok(Self {
            bytes,
            next,
            line: 1,
        })
    }

    /// The lookahead byte, `None` at end of stream.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.next
    }

    /// Current line number (1-based), for diagnostics.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns `true` if the lookahead is a newline or the stream is exhausted.
    #[must_use]
    pub fn at_line_end(&self) -> bool {
        matches!(self.next, None | Some(EOL))
    }

    /// Consumes the lookahead byte and refills it from the stream.
    ///
    /// Never reads past end of stream: once the lookahead is `None` this is a
    /// no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the underlying reader.
    pub fn bump(&mut self) -> io::Result<Option<u8>> {
        let current = self.next;
        if current.is_some() {
            self.next = self.bytes.next().transpose()?;
        }
        if current == Some(EOL) {
            self.line += 1;
        }
        Ok(current)
    }

    /// Skips delimiters in front of the next token on this line.
    ///
    /// Stops at a quote (the start of a quoted token) and at end of line.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the underlying reader.
    pub fn skip_separators(&mut self) -> io::Result<()> {
        while let Some(byte) = self.next {
            if byte == EOL || byte == QUOTE || !is_delimiter(byte) {
                break;
            }
            self.bump()?;
        }
        Ok(())
    }

    /// Reads one quoted or unquoted token.
    ///
    /// A quoted token consumes both quotes. An unterminated quote ends at the
    /// newline, which is left unread.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the underlying reader.
    pub fn read_token(&mut self) -> io::Result<BoundedString> {
        let mut token = BoundedString::new();

        if self.next == Some(QUOTE) {
            self.bump()?;
            while let Some(byte) = self.next {
                if byte == EOL {
                    break;
                }
                self.bump()?;
                if byte == QUOTE {
                    break;
                }
                token.push(byte);
            }
        } else {
            while let Some(byte) = self.next {
                if is_delimiter(byte) {
                    break;
                }
                self.bump()?;
                token.push(byte);
            }
        }

        Ok(token)
    }

    /// Reads a lowercase hexadecimal integer up to the next delimiter.
    ///
    /// The whole token is always consumed. Accumulation stops at the first
    /// byte outside `0-9a-f` (or on overflow), and the result is reported as
    /// [`HexField::Malformed`] carrying the partial value. An empty token is
    /// malformed as well.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the underlying reader.
    pub fn read_hex(&mut self) -> io::Result<HexField> {
        let mut value: u32 = 0;
        let mut valid = true;
        let mut digits = 0usize;

        while let Some(byte) = self.next {
            if is_delimiter(byte) {
                break;
            }
            self.bump()?;

            if !valid {
                continue;
            }

            match hex_digit(byte).and_then(|digit| {
                value.checked_mul(16).and_then(|shifted| shifted.checked_add(digit))
            }) {
                Some(accumulated) => {
                    value = accumulated;
                    digits += 1;
                }
                None => valid = false,
            }
        }

        if valid && digits > 0 {
            Ok(HexField::Value(value))
        } else {
            Ok(HexField::Malformed(value))
        }
    }

    /// Consumes the rest of the current line, including its newline.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised by the underlying reader.
    pub fn skip_line(&mut self) -> io::Result<()> {
        while let Some(byte) = self.bump()? {
            if byte == EOL {
                break;
            }
        }
        Ok(())
    }
}
