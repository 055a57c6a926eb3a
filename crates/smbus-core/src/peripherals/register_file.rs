//! Xcalibur-class register-file video encoder.
//!
//! The device is transparent storage: a 256-byte register file addressed by
//! the command byte of each write, with a read cursor that post-increments
//! and wraps at 8 bits.

use crate::api::{DeviceConfig, SmbusDevice, REGISTER_FILE_SIZE};
use crate::{AddressError, BusAddress, TransactionError};

/// Register-file SMBus slave.
///
/// Writes set the cursor to the command byte and copy the remaining payload
/// from that index, truncating at the end of the file. The cursor is left at
/// the command byte, so a following read starts at the first written
/// register. Reads return the register under the cursor and advance it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFileDevice {
    address: BusAddress,
    registers: [u8; REGISTER_FILE_SIZE],
    cmd: u8,
}

impl Default for RegisterFileDevice {
    fn default() -> Self {
        Self::at(BusAddress::XCALIBUR)
    }
}

impl RegisterFileDevice {
    /// Creates a zeroed device from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::OutOfRange`] when the configured address is
    /// not 7-bit.
    pub fn new(config: DeviceConfig) -> Result<Self, AddressError> {
        config.bus_address().map(Self::at)
    }

    /// Creates a zeroed device at an already validated address.
    #[must_use]
    pub const fn at(address: BusAddress) -> Self {
        Self {
            address,
            registers: [0; REGISTER_FILE_SIZE],
            cmd: 0,
        }
    }

    pub(crate) const fn from_parts(
        address: BusAddress,
        cmd: u8,
        registers: [u8; REGISTER_FILE_SIZE],
    ) -> Self {
        Self {
            address,
            registers,
            cmd,
        }
    }

    /// Returns the current command/cursor register.
    #[must_use]
    pub const fn command(&self) -> u8 {
        self.cmd
    }

    /// Returns the full register file without moving the cursor.
    #[must_use]
    pub const fn registers(&self) -> &[u8; REGISTER_FILE_SIZE] {
        &self.registers
    }

    /// Returns one register without moving the cursor.
    #[must_use]
    pub fn register(&self, index: u8) -> u8 {
        self.registers[usize::from(index)]
    }
}

impl SmbusDevice for RegisterFileDevice {
    fn address(&self) -> BusAddress {
        self.address
    }

    fn reset(&mut self) {
        self.registers = [0; REGISTER_FILE_SIZE];
        self.cmd = 0;
    }

    fn quick_command(&mut self, _read: bool) {}

    fn write_data(&mut self, bytes: &[u8]) -> Result<(), TransactionError> {
        let (&command, payload) = bytes.split_first().ok_or(TransactionError::EmptyWrite)?;
        self.cmd = command;

        let start = usize::from(command);
        let copy_len = payload.len().min(REGISTER_FILE_SIZE - start);
        self.registers[start..start + copy_len].copy_from_slice(&payload[..copy_len]);
        Ok(())
    }

    fn receive_byte(&mut self) -> u8 {
        let value = self.registers[usize::from(self.cmd)];
        self.cmd = self.cmd.wrapping_add(1);
        value
    }
}
