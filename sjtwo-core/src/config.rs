//! Board configuration
//!
//! Pin assignments and bus timing for one SJ-Two board. Validated once at
//! startup, before any register is touched.

use embassy_time::Duration;
use heapless::Vec;
use sjtwo_hal::{Edge, PIN_COUNT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bus::{compute_prescaler, BusConfig};
use crate::error::ConfigError;

/// GPIO ports on the LPC40xx
pub const PORT_COUNT: u8 = 6;

/// Ports with edge interrupt support
pub const INTERRUPT_PORTS: [u8; 2] = [0, 2];

/// Number of LED pins on the board
pub const LED_COUNT: usize = 2;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO port number (0-5)
    pub port: u8,
    /// Pin index within the port (0-31)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(port: u8, pin: u8) -> Self {
        Self {
            port,
            pin,
            inverted: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(port: u8, pin: u8) -> Self {
        Self {
            port,
            pin,
            inverted: true,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port >= PORT_COUNT {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.pin as usize >= PIN_COUNT {
            return Err(ConfigError::InvalidPin(self.pin));
        }
        Ok(())
    }

    fn same_pin(&self, other: &PinConfig) -> bool {
        self.port == other.port && self.pin == other.pin
    }
}

/// Push button with the edge that triggers it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ButtonConfig {
    /// Button pin; must be on an interrupt-capable port
    pub pin: PinConfig,
    /// Edge that counts as a press
    pub edge: Edge,
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Peripheral clock feeding the SSP prescaler (Hz)
    pub source_clock_hz: u32,
    /// Highest SPI clock the flash accepts (Hz)
    pub spi_max_clock_hz: u32,
    /// Bound on waiting for the bus lock
    pub lock_timeout_ms: u32,
    /// Bound on each busy-poll of the SSP status register
    pub bus_timeout_ms: u32,
    /// Flash chip select
    pub flash_cs: PinConfig,
    /// Blinking LEDs
    pub leds: [PinConfig; LED_COUNT],
    /// Interrupt-driven push button
    pub button: ButtonConfig,
}

impl Default for BoardConfig {
    /// SJ-Two defaults: 48 MHz peripheral clock, flash on SSP2 with CS on
    /// P1.10, LED0/LED1 and SW3
    fn default() -> Self {
        Self {
            source_clock_hz: 48_000_000,
            spi_max_clock_hz: 24_000_000,
            lock_timeout_ms: 1000,
            bus_timeout_ms: 10,
            flash_cs: PinConfig::inverted(1, 10),
            leds: [PinConfig::inverted(2, 3), PinConfig::inverted(1, 26)],
            button: ButtonConfig {
                pin: PinConfig::new(0, 29),
                edge: Edge::Rising,
            },
        }
    }
}

impl BoardConfig {
    /// Check pin ranges, pin aliasing, timeouts and the SPI clock
    pub fn validate(&self) -> Result<(), ConfigError> {
        compute_prescaler(self.source_clock_hz, self.spi_max_clock_hz)?;
        // A zero poll bound fails any exchange that sees BSY even once
        if self.bus_timeout_ms == 0 || self.lock_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let mut pins: Vec<PinConfig, { LED_COUNT + 2 }> = Vec::new();
        let _ = pins.push(self.flash_cs);
        let _ = pins.push(self.button.pin);
        for led in &self.leds {
            let _ = pins.push(*led);
        }

        for (i, pin) in pins.iter().enumerate() {
            pin.validate()?;
            if pins[..i].iter().any(|earlier| earlier.same_pin(pin)) {
                return Err(ConfigError::PinConflict {
                    port: pin.port,
                    pin: pin.pin,
                });
            }
        }

        if !INTERRUPT_PORTS.contains(&self.button.pin.port) {
            return Err(ConfigError::NotInterruptCapable(self.button.pin.port));
        }
        Ok(())
    }

    /// Bus engine configuration
    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            source_clock_hz: self.source_clock_hz,
            max_clock_hz: self.spi_max_clock_hz,
            poll_timeout: Duration::from_millis(self.bus_timeout_ms as u64),
        }
    }

    /// Bound on waiting for the bus lock
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms as u64)
    }
}
