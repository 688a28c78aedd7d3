//! SSP (synchronous serial port) register blocks for LPC40xx

use sjtwo_hal::SspRegisters;

use crate::reg::Reg;
use crate::syscon::{self, PowerDomain};

/// Register offsets within an SSP block
const CR0: usize = 0x00;
const CR1: usize = 0x04;
const DR: usize = 0x08;
const SR: usize = 0x0C;
const CPSR: usize = 0x10;

/// SSP peripheral instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SspInstance {
    /// SSP0 at 0x4008_8000
    Ssp0,
    /// SSP1 at 0x4003_0000
    Ssp1,
    /// SSP2 at 0x400A_C000, wired to the on-board flash
    Ssp2,
}

impl SspInstance {
    const fn base(self) -> usize {
        match self {
            SspInstance::Ssp0 => 0x4008_8000,
            SspInstance::Ssp1 => 0x4003_0000,
            SspInstance::Ssp2 => 0x400A_C000,
        }
    }

    const fn power_domain(self) -> PowerDomain {
        match self {
            SspInstance::Ssp0 => PowerDomain::Ssp0,
            SspInstance::Ssp1 => PowerDomain::Ssp1,
            SspInstance::Ssp2 => PowerDomain::Ssp2,
        }
    }
}

/// Registers of one SSP peripheral
#[derive(Debug, Clone, Copy)]
pub struct Ssp {
    instance: SspInstance,
}

impl Ssp {
    /// Take a handle to `instance`
    ///
    /// # Safety
    ///
    /// Only one handle per instance may exist; it is normally owned by a
    /// bus engine behind the arbitration lock.
    pub const unsafe fn steal(instance: SspInstance) -> Self {
        Self { instance }
    }

    /// Power the peripheral on through PCONP
    pub fn power_on(&self) {
        syscon::power_on(self.instance.power_domain());
    }

    /// Instance this handle addresses
    pub const fn instance(&self) -> SspInstance {
        self.instance
    }

    fn reg(&self, offset: usize) -> Reg {
        Reg::at(self.instance.base(), offset)
    }
}

impl SspRegisters for Ssp {
    fn write_control0(&self, value: u32) {
        self.reg(CR0).write(value)
    }

    fn write_control1(&self, value: u32) {
        self.reg(CR1).write(value)
    }

    fn status(&self) -> u32 {
        self.reg(SR).read()
    }

    fn write_data(&self, value: u32) {
        self.reg(DR).write(value)
    }

    fn read_data(&self) -> u32 {
        self.reg(DR).read()
    }

    fn write_prescaler(&self, value: u32) {
        self.reg(CPSR).write(value)
    }
}
