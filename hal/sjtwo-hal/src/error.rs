//! HAL error types

use core::fmt;

/// Errors raised while validating hardware identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Pin index outside 0..32
    InvalidPinIndex(u8),
    /// GPIO port number that does not exist on the chip
    InvalidPort(u8),
    /// Pin already claimed for another role
    PinInUse {
        /// Port number
        port: u8,
        /// Pin index within the port
        pin: u8,
    },
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HalError::InvalidPinIndex(pin) => write!(f, "pin index {} out of range", pin),
            HalError::InvalidPort(port) => write!(f, "GPIO port {} does not exist", port),
            HalError::PinInUse { port, pin } => write!(f, "P{}.{} is already in use", port, pin),
        }
    }
}
