//! Line-oriented transaction script parser.
//!
//! One transaction per line; `#` starts a comment. Addresses, counts and
//! command bytes accept `0x`-prefixed hex or decimal. Data bytes in `write`
//! and `expect` lines are hex, with or without the prefix.
//!
//! ```text
//! write  0x70 05 aa bb cc
//! read   0x70 3
//! expect aa bb cc
//! ```

use smbus_core::{AddressError, BusAddress};
use thiserror::Error;

/// One parsed script operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Quick command with a direction bit.
    Quick {
        /// Target address.
        address: BusAddress,
        /// `true` for a read-direction quick command.
        read: bool,
    },
    /// Raw write transaction; the first byte is the command byte.
    Write {
        /// Target address.
        address: BusAddress,
        /// Full transaction payload.
        bytes: Vec<u8>,
    },
    /// Raw sequential read.
    Read {
        /// Target address.
        address: BusAddress,
        /// Number of bytes to receive.
        count: usize,
    },
    /// SMBus read byte data.
    ReadByte {
        /// Target address.
        address: BusAddress,
        /// Register index.
        command: u8,
    },
    /// SMBus write byte data.
    WriteByte {
        /// Target address.
        address: BusAddress,
        /// Register index.
        command: u8,
        /// Byte to store.
        value: u8,
    },
    /// SMBus read word data.
    ReadWord {
        /// Target address.
        address: BusAddress,
        /// Register index of the low byte.
        command: u8,
    },
    /// SMBus write word data.
    WriteWord {
        /// Target address.
        address: BusAddress,
        /// Register index of the low byte.
        command: u8,
        /// Word to store, low byte first.
        value: u16,
    },
    /// Reset every attached device.
    Reset,
    /// Assert the bytes produced by the most recent read.
    Expect(Vec<u8>),
    /// Print the device's register file.
    Dump {
        /// Target address.
        address: BusAddress,
    },
}

/// A command tagged with its 1-indexed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-indexed line number.
    pub line: usize,
    /// Parsed operation.
    pub command: Command,
}

/// Reasons a script line fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptErrorKind {
    /// First token is not a known operation.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    /// A required operand is absent.
    #[error("missing {0}")]
    MissingOperand(&'static str),
    /// Operand is not a number in range.
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    /// Quick direction is neither `read` nor `write`.
    #[error("invalid direction: {0} (expected read or write)")]
    InvalidDirection(String),
    /// Extra tokens after a complete operation.
    #[error("unexpected operand: {0}")]
    TrailingOperand(String),
    /// Address operand is not 7-bit.
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Parse failure with source location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ScriptError {
    /// 1-indexed line number.
    pub line: usize,
    /// Failure reason.
    pub kind: ScriptErrorKind,
}

/// Parses a full script, skipping blank and comment lines.
///
/// # Errors
///
/// Returns the first [`ScriptError`] encountered.
pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let command = parse_line(text).map_err(|kind| ScriptError { line, kind })?;
        lines.push(ScriptLine { line, command });
    }
    Ok(lines)
}

fn parse_line(text: &str) -> Result<Command, ScriptErrorKind> {
    let mut tokens = text.split_whitespace();
    let op = tokens
        .next()
        .ok_or(ScriptErrorKind::MissingOperand("command"))?;

    let command = match op.to_ascii_lowercase().as_str() {
        "quick" => {
            let address = take_address(&mut tokens)?;
            let direction = tokens
                .next()
                .ok_or(ScriptErrorKind::MissingOperand("direction"))?;
            let read = match direction {
                "read" | "r" => true,
                "write" | "w" => false,
                other => return Err(ScriptErrorKind::InvalidDirection(other.to_string())),
            };
            Command::Quick { address, read }
        }
        "write" => {
            let address = take_address(&mut tokens)?;
            let bytes = take_hex_bytes(&mut tokens)?;
            if bytes.is_empty() {
                return Err(ScriptErrorKind::MissingOperand("command byte"));
            }
            Command::Write { address, bytes }
        }
        "read" => Command::Read {
            address: take_address(&mut tokens)?,
            count: take_count(&mut tokens)?,
        },
        "readb" => Command::ReadByte {
            address: take_address(&mut tokens)?,
            command: take_byte(&mut tokens, "register")?,
        },
        "writeb" => Command::WriteByte {
            address: take_address(&mut tokens)?,
            command: take_byte(&mut tokens, "register")?,
            value: take_byte(&mut tokens, "value")?,
        },
        "readw" => Command::ReadWord {
            address: take_address(&mut tokens)?,
            command: take_byte(&mut tokens, "register")?,
        },
        "writew" => Command::WriteWord {
            address: take_address(&mut tokens)?,
            command: take_byte(&mut tokens, "register")?,
            value: take_word(&mut tokens)?,
        },
        "reset" => Command::Reset,
        "expect" => {
            let bytes = take_hex_bytes(&mut tokens)?;
            if bytes.is_empty() {
                return Err(ScriptErrorKind::MissingOperand("expected bytes"));
            }
            Command::Expect(bytes)
        }
        "dump" => Command::Dump {
            address: take_address(&mut tokens)?,
        },
        other => return Err(ScriptErrorKind::UnknownCommand(other.to_string())),
    };

    match tokens.next() {
        Some(extra) => Err(ScriptErrorKind::TrailingOperand(extra.to_string())),
        None => Ok(command),
    }
}

/// Parses `0x`-prefixed hex or decimal.
#[must_use]
pub fn parse_number(token: &str) -> Option<u64> {
    token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .map_or_else(|| token.parse().ok(), |hex| u64::from_str_radix(hex, 16).ok())
}

fn take_number<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
    max: u64,
) -> Result<u64, ScriptErrorKind> {
    let token = tokens.next().ok_or(ScriptErrorKind::MissingOperand(what))?;
    parse_number(token)
        .filter(|value| *value <= max)
        .ok_or_else(|| ScriptErrorKind::InvalidNumber(token.to_string()))
}

fn take_address<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<BusAddress, ScriptErrorKind> {
    let raw = take_number(tokens, "address", u64::from(u16::MAX))?;
    let raw = u16::try_from(raw).map_err(|_| ScriptErrorKind::InvalidNumber(raw.to_string()))?;
    Ok(BusAddress::new(raw)?)
}

fn take_count<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<usize, ScriptErrorKind> {
    let value = take_number(tokens, "count", u64::from(u16::MAX))?;
    usize::try_from(value).map_err(|_| ScriptErrorKind::InvalidNumber(value.to_string()))
}

fn take_byte<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    what: &'static str,
) -> Result<u8, ScriptErrorKind> {
    let value = take_number(tokens, what, u64::from(u8::MAX))?;
    u8::try_from(value).map_err(|_| ScriptErrorKind::InvalidNumber(value.to_string()))
}

fn take_word<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<u16, ScriptErrorKind> {
    let value = take_number(tokens, "value", u64::from(u16::MAX))?;
    u16::try_from(value).map_err(|_| ScriptErrorKind::InvalidNumber(value.to_string()))
}

fn take_hex_bytes<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<Vec<u8>, ScriptErrorKind> {
    tokens
        .map(|token| {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            u8::from_str_radix(digits, 16)
                .map_err(|_| ScriptErrorKind::InvalidNumber(token.to_string()))
        })
        .collect()
}
