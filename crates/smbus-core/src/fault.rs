use thiserror::Error;

use crate::BusAddress;

/// Rejected bus address configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AddressError {
    /// Raw value does not fit the 7-bit SMBus address space.
    #[error("bus address {0:#04x} exceeds the 7-bit range")]
    OutOfRange(u16),
}

/// Failures surfaced while delivering a bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TransactionError {
    /// Write transaction arrived without a command byte.
    #[error("write transaction carried no command byte")]
    EmptyWrite,
    /// No device acknowledged the addressed slot.
    #[error("no device acknowledged address {0}")]
    NoDevice(BusAddress),
    /// A device is already attached at the requested slot.
    #[error("bus address {0} is already occupied")]
    AddressInUse(BusAddress),
    /// Block write payload exceeds the SMBus block limit.
    #[error("block payload of {0} bytes exceeds the 32-byte limit")]
    BlockTooLong(usize),
}

impl TransactionError {
    /// Returns `true` for the bus-level "nobody answered" condition.
    #[must_use]
    pub const fn is_nack(self) -> bool {
        matches!(self, Self::NoDevice(_))
    }
}

/// Snapshot import failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum SnapshotLayoutError {
    /// Snapshot carries a wire version this build cannot read.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u16),
    /// Register image is not exactly 256 bytes.
    #[error("snapshot holds {0} registers, expected 256")]
    RegisterCount(usize),
    /// Stored bus address is invalid.
    #[error(transparent)]
    Address(#[from] AddressError),
}
