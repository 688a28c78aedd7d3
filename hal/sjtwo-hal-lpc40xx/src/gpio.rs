//! GPIO register blocks for LPC40xx
//!
//! Port registers live on the AHB at `0x2009_8000 + 0x20 * port`. The edge
//! interrupt registers for ports 0 and 2 live in the GPIOINT block on APB0.

use sjtwo_hal::{Edge, GpioInterruptRegisters, GpioRegisters, HalError};

use crate::reg::Reg;

/// Base address of GPIO port 0
const GPIO_BASE: usize = 0x2009_8000;
/// Address stride between GPIO ports
const GPIO_STRIDE: usize = 0x20;

/// Register offsets within a GPIO port
const DIR: usize = 0x00;
const PIN: usize = 0x14;

/// GPIOINT register addresses per interrupt-capable port
const GPIOINT_PORT0: usize = 0x4002_8084;
const GPIOINT_PORT2: usize = 0x4002_80A4;

/// Register offsets within a GPIOINT port group
const INT_STAT_R: usize = 0x00;
const INT_STAT_F: usize = 0x04;
const INT_CLR: usize = 0x08;
const INT_EN_R: usize = 0x0C;
const INT_EN_F: usize = 0x10;

/// Number of GPIO ports on the LPC4078
pub const PORT_COUNT: usize = 6;

/// GPIO port selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Port {
    /// Port 0, edge interrupt capable
    P0 = 0,
    /// Port 1
    P1 = 1,
    /// Port 2, edge interrupt capable
    P2 = 2,
    /// Port 3
    P3 = 3,
    /// Port 4
    P4 = 4,
    /// Port 5
    P5 = 5,
}

impl Port {
    /// Port number
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Convert a port number
    pub const fn from_number(n: u8) -> Result<Self, HalError> {
        match n {
            0 => Ok(Port::P0),
            1 => Ok(Port::P1),
            2 => Ok(Port::P2),
            3 => Ok(Port::P3),
            4 => Ok(Port::P4),
            5 => Ok(Port::P5),
            _ => Err(HalError::InvalidPort(n)),
        }
    }

    /// Whether the port has edge interrupt support
    pub const fn has_interrupts(self) -> bool {
        matches!(self, Port::P0 | Port::P2)
    }

    const fn base(self) -> usize {
        GPIO_BASE + GPIO_STRIDE * self as usize
    }
}

/// Direction and level registers of one GPIO port
#[derive(Debug, Clone, Copy)]
pub struct GpioPort {
    port: Port,
}

impl GpioPort {
    /// Take a handle to `port`
    ///
    /// # Safety
    ///
    /// Only one handle per port may perform read-modify-write at a time.
    pub const unsafe fn steal(port: Port) -> Self {
        Self { port }
    }

    /// Port this handle addresses
    pub const fn port(&self) -> Port {
        self.port
    }

    fn reg(&self, offset: usize) -> Reg {
        Reg::at(self.port.base(), offset)
    }
}

impl GpioRegisters for GpioPort {
    fn direction(&self) -> u32 {
        self.reg(DIR).read()
    }

    fn write_direction(&self, value: u32) {
        self.reg(DIR).write(value)
    }

    fn level(&self) -> u32 {
        self.reg(PIN).read()
    }

    fn write_level(&self, value: u32) {
        self.reg(PIN).write(value)
    }
}

/// Edge interrupt registers for one interrupt-capable port
#[derive(Debug, Clone, Copy)]
pub struct GpioInterrupts {
    base: usize,
}

impl GpioInterrupts {
    /// Take the interrupt block of port 0
    ///
    /// # Safety
    ///
    /// Only one handle may exist; it is normally owned by the dispatcher.
    pub const unsafe fn port0() -> Self {
        Self { base: GPIOINT_PORT0 }
    }

    /// Take the interrupt block of port 2
    ///
    /// # Safety
    ///
    /// As for [`GpioInterrupts::port0`].
    pub const unsafe fn port2() -> Self {
        Self { base: GPIOINT_PORT2 }
    }

    fn reg(&self, offset: usize) -> Reg {
        Reg::at(self.base, offset)
    }
}

impl GpioInterruptRegisters for GpioInterrupts {
    fn enable(&self, edge: Edge) -> u32 {
        match edge {
            Edge::Rising => self.reg(INT_EN_R).read(),
            Edge::Falling => self.reg(INT_EN_F).read(),
        }
    }

    fn write_enable(&self, edge: Edge, value: u32) {
        match edge {
            Edge::Rising => self.reg(INT_EN_R).write(value),
            Edge::Falling => self.reg(INT_EN_F).write(value),
        }
    }

    fn status(&self, edge: Edge) -> u32 {
        match edge {
            Edge::Rising => self.reg(INT_STAT_R).read(),
            Edge::Falling => self.reg(INT_STAT_F).read(),
        }
    }

    fn clear(&self, mask: u32) {
        // Write-only register; zeros are ignored by hardware
        self.reg(INT_CLR).write(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_addresses() {
        assert_eq!(Port::P0.base(), 0x2009_8000);
        assert_eq!(Port::P1.base(), 0x2009_8020);
        assert_eq!(Port::P5.base(), 0x2009_80A0);
    }

    #[test]
    fn test_port_from_number() {
        assert_eq!(Port::from_number(2), Ok(Port::P2));
        assert_eq!(Port::from_number(6), Err(HalError::InvalidPort(6)));
    }

    #[test]
    fn test_interrupt_capable_ports() {
        assert!(Port::P0.has_interrupts());
        assert!(Port::P2.has_interrupts());
        assert!(!Port::P1.has_interrupts());
    }
}
