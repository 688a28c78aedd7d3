//! System control: peripheral power and pin function selection

use crate::gpio::Port;
use crate::reg::Reg;

/// Peripheral power control register
const PCONP: Reg = Reg::at(0x400F_C000, 0x0C4);

/// IOCON block base; each pin has one 32-bit register
const IOCON_BASE: usize = 0x4002_C000;
/// IOCON stride between ports
const IOCON_PORT_STRIDE: usize = 0x80;
/// FUNC field of an IOCON register
const IOCON_FUNC_MASK: u32 = 0x7;

/// Peripherals gated by PCONP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerDomain {
    /// PCSSP0
    Ssp0,
    /// PCSSP1
    Ssp1,
    /// PCSSP2
    Ssp2,
    /// PCGPIO, which also clocks the GPIO interrupt block
    Gpio,
}

impl PowerDomain {
    /// PCONP bit for this peripheral
    pub const fn bit(self) -> u32 {
        match self {
            PowerDomain::Ssp1 => 10,
            PowerDomain::Gpio => 15,
            PowerDomain::Ssp2 => 20,
            PowerDomain::Ssp0 => 21,
        }
    }
}

/// Power a peripheral on
pub fn power_on(domain: PowerDomain) {
    PCONP.modify(|v| v | (1 << domain.bit()));
}

/// Select the alternate function of a pin (IOCON FUNC field)
pub fn set_pin_function(port: Port, pin: u8, function: u8) {
    iocon(port, pin).modify(|v| (v & !IOCON_FUNC_MASK) | (function as u32 & IOCON_FUNC_MASK));
}

fn iocon(port: Port, pin: u8) -> Reg {
    Reg::at(
        IOCON_BASE,
        port.number() as usize * IOCON_PORT_STRIDE + (pin as usize & 0x1F) * 4,
    )
}

/// SSP2 pin functions on the SJ-Two board
pub mod ssp2_pins {
    use super::*;

    /// IOCON function number for SSP2 on port 1
    pub const SSP2_FUNCTION: u8 = 0x4;

    /// P1.0 = SCK2, P1.1 = MOSI2, P1.4 = MISO2
    pub const PINS: [(Port, u8); 3] = [(Port::P1, 0), (Port::P1, 1), (Port::P1, 4)];

    /// Route SCK2/MOSI2/MISO2 to their port 1 pins
    pub fn configure() {
        for (port, pin) in PINS {
            set_pin_function(port, pin, SSP2_FUNCTION);
        }
    }
}
