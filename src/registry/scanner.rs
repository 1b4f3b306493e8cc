//! # Registry Scanner
//!
//! Line grammar for the input-device registry. The first byte of each line
//! selects the rule:
//!
//! | Tag | Rule |
//! |-----|------|
//! | `I` | `keyword=hex` pairs (Bus, Vendor, Product, Version); starts a new block |
//! | `N` | `Name="quoted string"` |
//! | `H` | `Handlers=token token ...`; completes the block |
//! | other | skipped without tokenizing |

use std::io::{self, Read};
use tracing::{debug, info, warn};

use super::lexer::{HexField, Lexer};
use super::{BoundedString, DeviceRecord, TargetIdentity};

/// Handler names accepted as a joystick handle.
pub const JOYSTICK_HANDLERS: [&str; 4] = ["js0", "js1", "js2", "js3"];

/// Upper bound on handler tokens kept per record.
pub const MAX_HANDLER_CANDIDATES: usize = 16;

/// Record field a keyword writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Bus,
    Vendor,
    Product,
    Version,
    Name,
    Handlers,
}

/// How a keyword's value is lexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Hex,
    Text,
}

/// Keyword table. Adding a keyword is one entry here plus its arm in
/// [`Field::kind`] and the record setters.
const KEYWORDS: [(&str, Field); 6] = [
    ("Bus", Field::Bus),
    ("Vendor", Field::Vendor),
    ("Product", Field::Product),
    ("Version", Field::Version),
    ("Name", Field::Name),
    ("Handlers", Field::Handlers),
];

impl Field {
    fn lookup(keyword: &BoundedString) -> Option<Self> {
        KEYWORDS
            .iter()
            .find(|(name, _)| name.as_bytes() == keyword.as_bytes())
            .map(|&(_, field)| field)
    }

    fn kind(self) -> ValueKind {
        match self {
            Field::Bus | Field::Vendor | Field::Product | Field::Version => ValueKind::Hex,
            Field::Name | Field::Handlers => ValueKind::Text,
        }
    }
}

impl DeviceRecord {
    fn set_hex(&mut self, field: Field, value: u32) {
        match field {
            Field::Bus => self.bus = value,
            Field::Vendor => self.vendor = value,
            Field::Product => self.product = value,
            Field::Version => self.version = value,
            Field::Name | Field::Handlers => {}
        }
    }

    fn set_text(&mut self, field: Field, value: BoundedString) {
        match field {
            Field::Name => self.name = value,
            Field::Handlers => self.add_handler_candidate(value),
            Field::Bus | Field::Vendor | Field::Product | Field::Version => {}
        }
    }
}

/// Incremental scanner yielding one [`DeviceRecord`] per completed block.
///
/// # Examples
///
/// ```
/// use gamepad_pilot::registry::RegistryScanner;
///
/// let registry = "I: Bus=0011 Vendor=0001 Product=0001\nN: Name=\"Keyboard\"\nH: Handlers=kbd event0\n";
/// let mut scanner = RegistryScanner::new(registry.as_bytes())?;
///
/// let record = scanner.next_record()?.unwrap();
/// assert_eq!(record.name, "Keyboard");
/// assert!(record.handler.is_none());
/// assert!(scanner.next_record()?.is_none());
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct RegistryScanner<R> {
    lexer: Lexer<R>,
    record: DeviceRecord,
}

impl<R: Read> RegistryScanner<R> {
    /// Creates a scanner over a registry stream.
    ///
    /// The reader is consumed one byte at a time, so pass a buffered reader
    /// for files.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while priming the lexer.
    pub fn new(reader: R) -> io::Result<Self> {
        Ok(Self {
            lexer: Lexer::new(reader)?,
            record: DeviceRecord::default(),
        })
    }

    /// Reads up to and including the next `H` line and returns that block.
    ///
    /// Returns `Ok(None)` at end of stream. A block cut off before its `H`
    /// line is dropped.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading the stream.
    pub fn next_record(&mut self) -> io::Result<Option<DeviceRecord>> {
        loop {
            match self.lexer.peek() {
                None => {
                    if self.record != DeviceRecord::default() {
                        debug!("Registry ended inside a device block, discarding it");
                    }
                    return Ok(None);
                }
                Some(b'I') => {
                    self.record = DeviceRecord::default();
                    self.parse_pairs()?;
                }
                Some(b'N') => self.parse_pairs()?,
                Some(b'H') => {
                    self.parse_handlers()?;
                    self.lexer.skip_line()?;
                    return Ok(Some(std::mem::take(&mut self.record)));
                }
                Some(_) => {}
            }
            self.lexer.skip_line()?;
        }
    }

    /// Returns the first block whose identity equals `target` and which
    /// exposes a joystick handler.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading the stream.
    pub fn find(&mut self, target: TargetIdentity) -> io::Result<Option<DeviceRecord>> {
        while let Some(record) = self.next_record()? {
            if !record.matches(target) {
                continue;
            }

            match &record.handler {
                Some(handler) => {
                    info!("Input device {} found ({}, handler {})", target, record.name, handler);
                    return Ok(Some(record));
                }
                None => {
                    warn!(
                        "Device {} ({}) has no joystick handler, continuing scan",
                        target, record.name
                    );
                }
            }
        }

        debug!("No registry block matched {}", target);
        Ok(None)
    }

    /// `I` and `N` lines: a run of `keyword=value` pairs.
    fn parse_pairs(&mut self) -> io::Result<()> {
        let tag = self.lexer.bump()?;

        loop {
            self.lexer.skip_separators()?;
            if self.lexer.at_line_end() {
                break;
            }

            let keyword = self.lexer.read_token()?;
            self.lexer.skip_separators()?;

            let Some(field) = Field::lookup(&keyword) else {
                // Unknown keyword: its value is tokenized and dropped
                if !self.lexer.at_line_end() {
                    self.lexer.read_token()?;
                }
                debug!("Skipping unknown registry keyword {:?}", keyword.to_string());
                continue;
            };

            match field.kind() {
                ValueKind::Hex => match self.lexer.read_hex()? {
                    HexField::Value(value) => self.record.set_hex(field, value),
                    HexField::Malformed(partial) => {
                        warn!(
                            "Malformed hex value for {:?} on registry line {}",
                            field,
                            self.lexer.line()
                        );
                        self.record.set_hex(field, partial);
                        self.record.malformed_fields += 1;
                    }
                },
                ValueKind::Text => {
                    let value = self.lexer.read_token()?;
                    self.record.set_text(field, value);
                }
            }
        }

        debug!(
            "Parsed {} line (bus={:04x} vendor={:04x} product={:04x} version={:04x})",
            tag.map(char::from).unwrap_or('?'),
            self.record.bus,
            self.record.vendor,
            self.record.product,
            self.record.version
        );
        Ok(())
    }

    /// `H` line: `Handlers=` followed by whitespace-separated tokens.
    fn parse_handlers(&mut self) -> io::Result<()> {
        self.lexer.bump()?;
        self.lexer.skip_separators()?;

        let keyword = self.lexer.read_token()?;
        if Field::lookup(&keyword) != Some(Field::Handlers) {
            debug!("H line without Handlers keyword on line {}", self.lexer.line());
            return Ok(());
        }

        loop {
            self.lexer.skip_separators()?;
            if self.lexer.at_line_end() {
                break;
            }
            let token = self.lexer.read_token()?;
            self.record.set_text(Field::Handlers, token);
        }

        Ok(())
    }
}
