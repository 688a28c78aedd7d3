//! NVIC interrupt numbers used by the SJ-Two firmware

use cortex_m::interrupt::InterruptNumber;

/// Number of device interrupt vectors on the LPC40xx
pub const VECTOR_COUNT: usize = 41;

/// Device interrupts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Interrupt {
    /// SSP0
    Ssp0 = 14,
    /// SSP1
    Ssp1 = 15,
    /// SSP2
    Ssp2 = 36,
    /// GPIO ports 0 and 2 edge interrupts
    Gpio = 38,
}

// SAFETY: every discriminant is a valid LPC40xx IRQ number below VECTOR_COUNT.
unsafe impl InterruptNumber for Interrupt {
    #[inline(always)]
    fn number(self) -> u16 {
        self as u16
    }
}
