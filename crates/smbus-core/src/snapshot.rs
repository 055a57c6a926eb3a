//! Versioned import/export of register-file device state.

use crate::api::{SmbusDevice, REGISTER_FILE_SIZE};
use crate::{BusAddress, RegisterFileDevice, SnapshotLayoutError};

/// Stable snapshot wire-version identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u16)]
pub enum SnapshotVersion {
    /// Initial schema revision.
    V1 = 1,
}

impl SnapshotVersion {
    /// Converts wire value to known snapshot version.
    #[must_use]
    pub const fn from_u16(version: u16) -> Option<Self> {
        match version {
            1 => Some(Self::V1),
            _ => None,
        }
    }

    /// Returns the wire value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Serializable device state used for save/restore and test fixtures.
///
/// Fields hold raw wire values; [`DeviceSnapshot::into_device`] validates
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DeviceSnapshot {
    /// Snapshot schema version.
    pub version: u16,
    /// Bus address of the captured device.
    pub address: u8,
    /// Command/cursor register at capture time.
    pub command: u8,
    /// Full register image, expected to be 256 bytes.
    pub registers: Vec<u8>,
}

impl DeviceSnapshot {
    /// Captures the current device state.
    #[must_use]
    pub fn from_device(device: &RegisterFileDevice) -> Self {
        Self {
            version: SnapshotVersion::V1.as_u16(),
            address: device.address().get(),
            command: device.command(),
            registers: device.registers().to_vec(),
        }
    }

    /// Rebuilds a device from this snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotLayoutError`] when the version is unknown, the
    /// address is not 7-bit, or the register image is not 256 bytes.
    pub fn into_device(self) -> Result<RegisterFileDevice, SnapshotLayoutError> {
        if SnapshotVersion::from_u16(self.version).is_none() {
            return Err(SnapshotLayoutError::UnsupportedVersion(self.version));
        }
        let address = BusAddress::try_from(self.address)?;
        let registers: [u8; REGISTER_FILE_SIZE] = self
            .registers
            .try_into()
            .map_err(|rejected: Vec<u8>| SnapshotLayoutError::RegisterCount(rejected.len()))?;

        Ok(RegisterFileDevice::from_parts(
            address,
            self.command,
            registers,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceSnapshot, SnapshotVersion};
    use crate::{
        AddressError, RegisterFileDevice, SmbusDevice, SnapshotLayoutError, REGISTER_FILE_SIZE,
    };

    #[test]
    fn snapshot_version_roundtrip_is_stable() {
        assert_eq!(SnapshotVersion::from_u16(1), Some(SnapshotVersion::V1));
        assert_eq!(SnapshotVersion::V1.as_u16(), 1);
        assert_eq!(SnapshotVersion::from_u16(2), None);
    }

    #[test]
    fn capture_records_cursor_and_registers() {
        let mut device = RegisterFileDevice::default();
        device.write_data(&[0x30, 0x01, 0x02]).unwrap();
        device.receive_byte();

        let snapshot = DeviceSnapshot::from_device(&device);

        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.address, 0x70);
        assert_eq!(snapshot.command, 0x31);
        assert_eq!(snapshot.registers.len(), REGISTER_FILE_SIZE);
        assert_eq!(&snapshot.registers[0x30..0x32], &[0x01, 0x02]);
    }

    #[test]
    fn restore_rejects_unknown_version() {
        let snapshot = DeviceSnapshot {
            version: 9,
            ..DeviceSnapshot::from_device(&RegisterFileDevice::default())
        };
        assert_eq!(
            snapshot.into_device(),
            Err(SnapshotLayoutError::UnsupportedVersion(9))
        );
    }

    #[test]
    fn restore_rejects_short_register_image() {
        let snapshot = DeviceSnapshot {
            registers: vec![0; 128],
            ..DeviceSnapshot::from_device(&RegisterFileDevice::default())
        };
        assert_eq!(
            snapshot.into_device(),
            Err(SnapshotLayoutError::RegisterCount(128))
        );
    }

    #[test]
    fn restore_rejects_eight_bit_address() {
        let snapshot = DeviceSnapshot {
            address: 0xE0,
            ..DeviceSnapshot::from_device(&RegisterFileDevice::default())
        };
        assert_eq!(
            snapshot.into_device(),
            Err(SnapshotLayoutError::Address(AddressError::OutOfRange(0xE0)))
        );
    }
}
