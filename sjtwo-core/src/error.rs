//! Core error types
//!
//! Configuration and index errors are returned synchronously from the call
//! that caused them. Timeouts are returned to the task that attempted the
//! blocking operation; the core never retries on its own.

use core::fmt;

use sjtwo_hal::HalError;

/// Reasons a configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A clock frequency of zero was given
    ZeroClock,
    /// Requested bus clock needs a prescaler below the minimum of 2
    ClockTooFast,
    /// Requested bus clock needs a prescaler above the register maximum
    ClockTooSlow,
    /// Bus used before `init`
    NotInitialized,
    /// Lock or bus poll timeout of zero
    ZeroTimeout,
    /// GPIO port number that does not exist
    InvalidPort(u8),
    /// Configured pin index outside the port
    InvalidPin(u8),
    /// Same physical pin assigned to two roles
    PinConflict {
        /// Port number
        port: u8,
        /// Pin index within the port
        pin: u8,
    },
    /// Interrupt requested on a port without edge interrupt support
    NotInterruptCapable(u8),
}

/// Errors from core operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Pin index outside the valid range
    InvalidPinIndex(u8),
    /// Configuration cannot be applied
    InvalidConfiguration(ConfigError),
    /// Bus lock not obtained within the timeout
    LockTimeout,
    /// Peripheral stayed busy past the poll timeout
    BusTimeout,
}

impl From<HalError> for Error {
    fn from(err: HalError) -> Self {
        match err {
            HalError::InvalidPinIndex(pin) => Error::InvalidPinIndex(pin),
            HalError::InvalidPort(port) => Error::InvalidConfiguration(ConfigError::InvalidPort(port)),
            HalError::PinInUse { port, pin } => {
                Error::InvalidConfiguration(ConfigError::PinConflict { port, pin })
            }
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::InvalidConfiguration(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroClock => f.write_str("clock frequency is zero"),
            ConfigError::ClockTooFast => f.write_str("bus clock needs a prescaler below 2"),
            ConfigError::ClockTooSlow => f.write_str("bus clock needs a prescaler above 254"),
            ConfigError::NotInitialized => f.write_str("bus not initialized"),
            ConfigError::ZeroTimeout => f.write_str("timeout is zero"),
            ConfigError::InvalidPort(port) => write!(f, "GPIO port {} does not exist", port),
            ConfigError::InvalidPin(pin) => write!(f, "pin index {} out of range", pin),
            ConfigError::PinConflict { port, pin } => {
                write!(f, "P{}.{} assigned to more than one role", port, pin)
            }
            ConfigError::NotInterruptCapable(port) => {
                write!(f, "GPIO port {} has no edge interrupts", port)
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidPinIndex(pin) => write!(f, "pin index {} out of range", pin),
            Error::InvalidConfiguration(err) => write!(f, "invalid configuration: {}", err),
            Error::LockTimeout => f.write_str("timed out waiting for bus lock"),
            Error::BusTimeout => f.write_str("timed out waiting for bus peripheral"),
        }
    }
}

impl embedded_hal::spi::Error for Error {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hal_error() {
        assert_eq!(Error::from(HalError::InvalidPinIndex(40)), Error::InvalidPinIndex(40));
        assert_eq!(
            Error::from(HalError::PinInUse { port: 1, pin: 10 }),
            Error::InvalidConfiguration(ConfigError::PinConflict { port: 1, pin: 10 })
        );
    }
}
