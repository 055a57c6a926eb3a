//! Host-side SMBus transaction dispatcher.
//!
//! Routes raw transactions to attached devices by address and layers the
//! standard SMBus protocol commands (send/receive byte, byte/word data,
//! block write) on top of them.

use std::collections::BTreeMap;

use crate::api::{NullTrace, SmbusDevice, TraceEvent, TraceSink};
use crate::{BusAddress, RegisterFileDevice, TransactionError};

/// Maximum payload of an SMBus block write.
pub const SMBUS_BLOCK_MAX: usize = 32;

/// Single-master bus holding devices keyed by address.
#[derive(Debug, Clone)]
pub struct SmbusBus<D = RegisterFileDevice, T = NullTrace> {
    devices: BTreeMap<BusAddress, D>,
    trace: T,
}

impl SmbusBus {
    /// Creates an empty, untraced bus of register-file devices.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            devices: BTreeMap::new(),
            trace: NullTrace,
        }
    }
}

impl Default for SmbusBus {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: SmbusDevice, T: TraceSink> SmbusBus<D, T> {
    /// Creates an empty bus reporting transactions to `trace`.
    #[must_use]
    pub const fn with_trace(trace: T) -> Self {
        Self {
            devices: BTreeMap::new(),
            trace,
        }
    }

    /// Attaches a device, builder style.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::AddressInUse`] when the slot is occupied.
    pub fn with_device(mut self, device: D) -> Result<Self, TransactionError> {
        self.attach(device)?;
        Ok(self)
    }

    /// Attaches a device at its configured address.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::AddressInUse`] when the slot is occupied.
    pub fn attach(&mut self, device: D) -> Result<(), TransactionError> {
        let address = device.address();
        if self.devices.contains_key(&address) {
            return Err(TransactionError::AddressInUse(address));
        }
        self.devices.insert(address, device);
        Ok(())
    }

    /// Removes and returns the device at `address`.
    pub fn detach(&mut self, address: BusAddress) -> Option<D> {
        self.devices.remove(&address)
    }

    /// Returns the device at `address`, if attached.
    #[must_use]
    pub fn device(&self, address: BusAddress) -> Option<&D> {
        self.devices.get(&address)
    }

    /// Returns the device at `address` mutably, if attached.
    pub fn device_mut(&mut self, address: BusAddress) -> Option<&mut D> {
        self.devices.get_mut(&address)
    }

    /// Iterates occupied addresses in ascending order.
    pub fn addresses(&self) -> impl Iterator<Item = BusAddress> + '_ {
        self.devices.keys().copied()
    }

    /// Returns the trace sink.
    #[must_use]
    pub const fn trace(&self) -> &T {
        &self.trace
    }

    /// Returns the trace sink mutably.
    #[allow(clippy::missing_const_for_fn)]
    pub fn trace_mut(&mut self) -> &mut T {
        &mut self.trace
    }

    /// Resets every attached device.
    pub fn reset_all(&mut self) {
        for (&address, device) in &mut self.devices {
            device.reset();
            self.trace.on_event(TraceEvent::Reset { address });
        }
    }

    /// Delivers a quick command.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`.
    pub fn quick_command(
        &mut self,
        address: BusAddress,
        read: bool,
    ) -> Result<(), TransactionError> {
        let device = lookup(&mut self.devices, &mut self.trace, address)?;
        device.quick_command(read);
        self.trace.on_event(TraceEvent::QuickCommand { address, read });
        Ok(())
    }

    /// Delivers one write transaction; `bytes[0]` is the command byte.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`
    /// and [`TransactionError::EmptyWrite`] when `bytes` is empty.
    pub fn write(&mut self, address: BusAddress, bytes: &[u8]) -> Result<(), TransactionError> {
        let device = lookup(&mut self.devices, &mut self.trace, address)?;
        device.write_data(bytes)?;
        if let Some((&command, payload)) = bytes.split_first() {
            self.trace.on_event(TraceEvent::WriteData {
                address,
                command,
                len: payload.len(),
            });
        }
        Ok(())
    }

    /// Delivers one read transaction of `count` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`.
    pub fn read(
        &mut self,
        address: BusAddress,
        count: usize,
    ) -> Result<Vec<u8>, TransactionError> {
        let device = lookup(&mut self.devices, &mut self.trace, address)?;
        let trace = &mut self.trace;
        Ok((0..count)
            .map(|_| {
                let value = device.receive_byte();
                trace.on_event(TraceEvent::ReceiveByte { address, value });
                value
            })
            .collect())
    }

    /// SMBus send byte: a write carrying only the command byte.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`.
    pub fn send_byte(&mut self, address: BusAddress, value: u8) -> Result<(), TransactionError> {
        self.write(address, &[value])
    }

    /// SMBus receive byte: a single-byte read at the current cursor.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`.
    pub fn receive_byte(&mut self, address: BusAddress) -> Result<u8, TransactionError> {
        let bytes = self.read(address, 1)?;
        Ok(bytes[0])
    }

    /// SMBus write byte data.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`.
    pub fn write_byte_data(
        &mut self,
        address: BusAddress,
        command: u8,
        value: u8,
    ) -> Result<(), TransactionError> {
        self.write(address, &[command, value])
    }

    /// SMBus read byte data: command write followed by a one-byte read.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`.
    pub fn read_byte_data(
        &mut self,
        address: BusAddress,
        command: u8,
    ) -> Result<u8, TransactionError> {
        self.send_byte(address, command)?;
        self.receive_byte(address)
    }

    /// SMBus write word data, low byte first.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`.
    pub fn write_word_data(
        &mut self,
        address: BusAddress,
        command: u8,
        value: u16,
    ) -> Result<(), TransactionError> {
        let [lo, hi] = value.to_le_bytes();
        self.write(address, &[command, lo, hi])
    }

    /// SMBus read word data: command write followed by a two-byte read,
    /// low byte first.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::NoDevice`] when nothing answers `address`.
    pub fn read_word_data(
        &mut self,
        address: BusAddress,
        command: u8,
    ) -> Result<u16, TransactionError> {
        self.send_byte(address, command)?;
        let bytes = self.read(address, 2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// SMBus block write: command, byte count, then the data bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionError::BlockTooLong`] when `data` exceeds
    /// [`SMBUS_BLOCK_MAX`] and [`TransactionError::NoDevice`] when nothing
    /// answers `address`.
    pub fn write_block_data(
        &mut self,
        address: BusAddress,
        command: u8,
        data: &[u8],
    ) -> Result<(), TransactionError> {
        let count = u8::try_from(data.len())
            .ok()
            .filter(|count| usize::from(*count) <= SMBUS_BLOCK_MAX)
            .ok_or(TransactionError::BlockTooLong(data.len()))?;

        let mut frame = Vec::with_capacity(data.len() + 2);
        frame.push(command);
        frame.push(count);
        frame.extend_from_slice(data);
        self.write(address, &frame)
    }
}

fn lookup<'a, D, T: TraceSink>(
    devices: &'a mut BTreeMap<BusAddress, D>,
    trace: &mut T,
    address: BusAddress,
) -> Result<&'a mut D, TransactionError> {
    match devices.get_mut(&address) {
        Some(device) => Ok(device),
        None => {
            trace.on_event(TraceEvent::Nack { address });
            Err(TransactionError::NoDevice(address))
        }
    }
}
