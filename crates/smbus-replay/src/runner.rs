//! Executes parsed scripts against an SMBus bus.

use std::fmt;

use smbus_core::{RegisterFileDevice, SmbusBus, TraceSink, TransactionError};
use thiserror::Error;

use crate::script::{Command, ScriptLine};

/// Runtime failure that aborts a script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {source}")]
pub struct RunError {
    /// 1-indexed line of the failing transaction.
    pub line: usize,
    /// Bus-level failure.
    #[source]
    pub source: TransactionError,
}

/// Outcome of one `expect` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectationResult {
    /// 1-indexed line of the expectation.
    pub line: usize,
    /// Bytes the script asserted.
    pub expected: Vec<u8>,
    /// Bytes of the most recent read, if any read happened.
    pub actual: Option<Vec<u8>>,
}

impl ExpectationResult {
    /// Returns true when the last read matched exactly.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.actual.as_deref() == Some(self.expected.as_slice())
    }
}

impl fmt::Display for ExpectationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: expect {}: ", self.line, hex(&self.expected))?;
        match &self.actual {
            _ if self.passed() => write!(f, "ok"),
            Some(actual) => write!(f, "FAILED (got {})", hex(actual)),
            None => write!(f, "FAILED (no read performed)"),
        }
    }
}

/// Collected output of a completed script run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Human-readable lines produced by reads and dumps.
    pub output: Vec<String>,
    /// Expectation outcomes in script order.
    pub expectations: Vec<ExpectationResult>,
}

impl RunReport {
    /// Returns true when every expectation passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.expectations.iter().all(ExpectationResult::passed)
    }

    /// Returns the number of failed expectations.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.expectations.iter().filter(|e| !e.passed()).count()
    }
}

/// Runs `lines` in order against `bus`.
///
/// Failed expectations are recorded and do not stop the run.
///
/// # Errors
///
/// Returns [`RunError`] on the first transaction the bus rejects.
pub fn run_script<T: TraceSink>(
    bus: &mut SmbusBus<RegisterFileDevice, T>,
    lines: &[ScriptLine],
) -> Result<RunReport, RunError> {
    let mut report = RunReport::default();
    let mut last_read: Option<Vec<u8>> = None;

    for script_line in lines {
        let line = script_line.line;
        let at_line = |source| RunError { line, source };

        match &script_line.command {
            Command::Quick { address, read } => {
                bus.quick_command(*address, *read).map_err(at_line)?;
            }
            Command::Write { address, bytes } => {
                bus.write(*address, bytes).map_err(at_line)?;
            }
            Command::Read { address, count } => {
                let bytes = bus.read(*address, *count).map_err(at_line)?;
                report.output.push(format!("read {address}: {}", hex(&bytes)));
                last_read = Some(bytes);
            }
            Command::ReadByte { address, command } => {
                let value = bus.read_byte_data(*address, *command).map_err(at_line)?;
                report
                    .output
                    .push(format!("readb {address}[{command:#04x}] = {value:#04x}"));
                last_read = Some(vec![value]);
            }
            Command::WriteByte {
                address,
                command,
                value,
            } => {
                bus.write_byte_data(*address, *command, *value)
                    .map_err(at_line)?;
            }
            Command::ReadWord { address, command } => {
                let value = bus.read_word_data(*address, *command).map_err(at_line)?;
                report
                    .output
                    .push(format!("readw {address}[{command:#04x}] = {value:#06x}"));
                last_read = Some(value.to_le_bytes().to_vec());
            }
            Command::WriteWord {
                address,
                command,
                value,
            } => {
                bus.write_word_data(*address, *command, *value)
                    .map_err(at_line)?;
            }
            Command::Reset => bus.reset_all(),
            Command::Expect(expected) => report.expectations.push(ExpectationResult {
                line,
                expected: expected.clone(),
                actual: last_read.clone(),
            }),
            Command::Dump { address } => {
                let device = bus
                    .device(*address)
                    .ok_or_else(|| at_line(TransactionError::NoDevice(*address)))?;
                report.output.push(format!(
                    "dump {address} (cursor {:#04x})",
                    device.command()
                ));
                report.output.extend(dump_rows(device));
            }
        }
    }

    Ok(report)
}

fn dump_rows(device: &RegisterFileDevice) -> impl Iterator<Item = String> + '_ {
    device
        .registers()
        .chunks(16)
        .enumerate()
        .map(|(row, chunk)| format!("{:02x}: {}", row * 16, hex(chunk)))
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
