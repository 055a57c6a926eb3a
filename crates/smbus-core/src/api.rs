//! Public host-facing contracts for embedding SMBus devices.
//!
//! A bus dispatcher drives devices through [`SmbusDevice`] and reports each
//! delivered transaction to a [`TraceSink`].

use core::fmt;

use crate::{AddressError, BusAddress, TransactionError, XCALIBUR_ADDRESS};

/// Number of addressable registers in a register-file device.
pub const REGISTER_FILE_SIZE: usize = 256;

/// Construction-time device configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DeviceConfig {
    /// Raw bus address the device answers to, validated at construction.
    pub address: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: XCALIBUR_ADDRESS,
        }
    }
}

impl DeviceConfig {
    /// Validates the configured address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::OutOfRange`] when `address` is not 7-bit.
    pub fn bus_address(self) -> Result<BusAddress, AddressError> {
        BusAddress::try_from(self.address)
    }
}

/// Transaction-level callbacks a bus dispatcher invokes on a slave device.
///
/// The dispatcher delivers at most one call at a time; implementations need
/// no internal synchronization.
pub trait SmbusDevice {
    /// Returns the bus address this device answers to.
    fn address(&self) -> BusAddress;

    /// Restores power-on state.
    fn reset(&mut self);

    /// Handles a zero-payload transaction carrying only a direction bit.
    fn quick_command(&mut self, read: bool);

    /// Handles the full payload of one write transaction.
    ///
    /// The first byte is the command byte.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::EmptyWrite`] when `bytes` is empty.
    fn write_data(&mut self, bytes: &[u8]) -> Result<(), TransactionError>;

    /// Supplies the next byte of a read transaction.
    fn receive_byte(&mut self) -> u8;
}

/// Transaction trace events emitted by the dispatcher in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// Quick command delivered.
    QuickCommand {
        /// Target device address.
        address: BusAddress,
        /// Direction bit; `true` for read.
        read: bool,
    },
    /// Write transaction delivered.
    WriteData {
        /// Target device address.
        address: BusAddress,
        /// Leading command byte.
        command: u8,
        /// Number of data bytes following the command byte.
        len: usize,
    },
    /// One byte supplied by a device during a read.
    ReceiveByte {
        /// Source device address.
        address: BusAddress,
        /// Byte returned to the host.
        value: u8,
    },
    /// Device was reset by the host.
    Reset {
        /// Reset device address.
        address: BusAddress,
    },
    /// Transaction addressed an empty slot.
    Nack {
        /// Unanswered address.
        address: BusAddress,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::QuickCommand { address, read } => {
                write!(f, "quick addr={address} read={}", u8::from(read))
            }
            Self::WriteData {
                address,
                command,
                len,
            } => write!(f, "write addr={address} cmd={command:#04x} len={len}"),
            Self::ReceiveByte { address, value } => {
                write!(f, "recv addr={address} val={value:#04x}")
            }
            Self::Reset { address } => write!(f, "reset addr={address}"),
            Self::Nack { address } => write!(f, "nack addr={address}"),
        }
    }
}

/// Sink trait for transaction trace hooks.
pub trait TraceSink {
    /// Records an event in delivery order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// In-memory sink retaining every event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceLog {
    events: Vec<TraceEvent>,
}

impl TraceLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Returns recorded events in delivery order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Removes and returns every recorded event.
    pub fn take(&mut self) -> Vec<TraceEvent> {
        std::mem::take(&mut self.events)
    }
}

impl TraceSink for TraceLog {
    fn on_event(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceConfig, TraceEvent, TraceLog, TraceSink};
    use crate::{AddressError, BusAddress, XCALIBUR_ADDRESS};

    #[test]
    fn default_config_targets_xcalibur_slot() {
        let config = DeviceConfig::default();
        assert_eq!(config.address, XCALIBUR_ADDRESS);
        assert_eq!(config.bus_address(), Ok(BusAddress::XCALIBUR));
    }

    #[test]
    fn config_rejects_eight_bit_address() {
        let config = DeviceConfig { address: 0xE0 };
        assert_eq!(config.bus_address(), Err(AddressError::OutOfRange(0xE0)));
    }

    #[test]
    fn trace_event_display_matches_log_format() {
        let address = BusAddress::XCALIBUR;
        assert_eq!(
            TraceEvent::QuickCommand {
                address,
                read: true
            }
            .to_string(),
            "quick addr=0x70 read=1"
        );
        assert_eq!(
            TraceEvent::WriteData {
                address,
                command: 0x05,
                len: 3
            }
            .to_string(),
            "write addr=0x70 cmd=0x05 len=3"
        );
        assert_eq!(
            TraceEvent::ReceiveByte {
                address,
                value: 0xAA
            }
            .to_string(),
            "recv addr=0x70 val=0xaa"
        );
        assert_eq!(TraceEvent::Reset { address }.to_string(), "reset addr=0x70");
        assert_eq!(TraceEvent::Nack { address }.to_string(), "nack addr=0x70");
    }

    #[test]
    fn trace_log_records_and_drains_in_order() {
        let address = BusAddress::XCALIBUR;
        let mut log = TraceLog::new();
        log.on_event(TraceEvent::Reset { address });
        log.on_event(TraceEvent::Nack { address });

        assert_eq!(log.events().len(), 2);
        let drained = log.take();
        assert_eq!(
            drained,
            vec![TraceEvent::Reset { address }, TraceEvent::Nack { address }]
        );
        assert!(log.events().is_empty());
    }
}
