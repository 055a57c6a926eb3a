//! Core emulation crate for the register-file SMBus video encoder.

/// Validated 7-bit bus addresses.
pub mod address;
pub use address::{BusAddress, MAX_BUS_ADDRESS, XCALIBUR_ADDRESS};

/// Error taxonomy for configuration, transactions and snapshots.
pub mod fault;
pub use fault::{AddressError, SnapshotLayoutError, TransactionError};

/// Public host-facing device contract, configuration and trace hooks.
pub mod api;
pub use api::{
    DeviceConfig, NullTrace, SmbusDevice, TraceEvent, TraceLog, TraceSink, REGISTER_FILE_SIZE,
};

/// Peripheral device models.
pub mod peripherals;
pub use peripherals::RegisterFileDevice;

/// Host-side transaction dispatcher and SMBus protocol helpers.
pub mod bus;
pub use bus::{SmbusBus, SMBUS_BLOCK_MAX};

/// Versioned device state import/export.
pub mod snapshot;
pub use snapshot::{DeviceSnapshot, SnapshotVersion};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
