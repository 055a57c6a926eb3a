//! Transaction script replay for the SMBus register-file encoder.

#[cfg(test)]
use tempfile as _;

/// Script execution against a bus with expectation tracking.
pub mod runner;
/// Line-oriented transaction script parser.
pub mod script;
