//! Validated 7-bit SMBus device addresses.

use core::fmt;

use crate::AddressError;

/// Highest address representable in the 7-bit SMBus address space.
pub const MAX_BUS_ADDRESS: u8 = 0x7F;

/// Conventional bus address of the Xcalibur video encoder.
pub const XCALIBUR_ADDRESS: u8 = 0x70;

/// A 7-bit bus address a device answers to.
///
/// Construction is fallible so that every `BusAddress` in circulation is
/// known to fit the SMBus address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusAddress(u8);

impl BusAddress {
    /// The Xcalibur encoder's default slot (`0x70`).
    pub const XCALIBUR: Self = Self(XCALIBUR_ADDRESS);

    /// Validates a raw address value.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::OutOfRange`] when `raw` exceeds
    /// [`MAX_BUS_ADDRESS`].
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(raw: u16) -> Result<Self, AddressError> {
        if raw > MAX_BUS_ADDRESS as u16 {
            Err(AddressError::OutOfRange(raw))
        } else {
            Ok(Self(raw as u8))
        }
    }

    /// Returns the raw 7-bit address value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for BusAddress {
    type Error = AddressError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::new(u16::from(raw))
    }
}

impl From<BusAddress> for u8 {
    fn from(address: BusAddress) -> Self {
        address.0
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
