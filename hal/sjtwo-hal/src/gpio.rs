//! GPIO register contracts
//!
//! A GPIO port exposes one bit per pin in each register. The traits here take
//! `&self` because the registers behind them are shared hardware: the
//! interrupt block is read from interrupt context while tasks program it.

use crate::error::HalError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of pins addressable within one port
pub const PIN_COUNT: usize = 32;

/// Validated pin index within one GPIO port (0-31)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(u8);

impl PinId {
    /// Validate a raw pin index
    pub const fn new(index: u8) -> Result<Self, HalError> {
        if (index as usize) < PIN_COUNT {
            Ok(Self(index))
        } else {
            Err(HalError::InvalidPinIndex(index))
        }
    }

    /// Raw pin index
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Single-bit register mask for this pin
    pub const fn mask(self) -> u32 {
        1 << self.0
    }

    /// Iterate the pins set in `mask`, lowest index first
    pub fn iter_mask(mask: u32) -> MaskIter {
        MaskIter { remaining: mask }
    }
}

impl TryFrom<u8> for PinId {
    type Error = HalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Iterator over the set bits of a pin mask, in ascending order
#[derive(Debug, Clone)]
pub struct MaskIter {
    remaining: u32,
}

impl Iterator for MaskIter {
    type Item = PinId;

    fn next(&mut self) -> Option<PinId> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.remaining.trailing_zeros() as u8;
        // Clear lowest set bit
        self.remaining &= self.remaining - 1;
        Some(PinId(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.count_ones() as usize;
        (n, Some(n))
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Pin reads the external signal
    Input,
    /// Pin drives its level register value
    Output,
}

/// Signal transition that raises an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
}

impl Edge {
    /// The opposite edge
    pub const fn other(self) -> Self {
        match self {
            Edge::Rising => Edge::Falling,
            Edge::Falling => Edge::Rising,
        }
    }
}

/// Direction and level registers of one GPIO port
///
/// Bit `n` of each register corresponds to pin `n`.
pub trait GpioRegisters {
    /// Read the direction register (1 = output)
    fn direction(&self) -> u32;

    /// Write the direction register
    fn write_direction(&self, value: u32);

    /// Read the level register
    fn level(&self) -> u32;

    /// Write the level register
    fn write_level(&self, value: u32);
}

/// Edge interrupt registers of one GPIO port
pub trait GpioInterruptRegisters {
    /// Read the interrupt enable register for `edge`
    fn enable(&self, edge: Edge) -> u32;

    /// Write the interrupt enable register for `edge`
    fn write_enable(&self, edge: Edge, value: u32);

    /// Read the (read-only) interrupt status register for `edge`
    fn status(&self, edge: Edge) -> u32;

    /// Write-1-to-clear the pending flags in `mask` (both edges)
    fn clear(&self, mask: u32);
}

impl<T: GpioRegisters + ?Sized> GpioRegisters for &T {
    fn direction(&self) -> u32 {
        (**self).direction()
    }

    fn write_direction(&self, value: u32) {
        (**self).write_direction(value)
    }

    fn level(&self) -> u32 {
        (**self).level()
    }

    fn write_level(&self, value: u32) {
        (**self).write_level(value)
    }
}

impl<T: GpioInterruptRegisters + ?Sized> GpioInterruptRegisters for &T {
    fn enable(&self, edge: Edge) -> u32 {
        (**self).enable(edge)
    }

    fn write_enable(&self, edge: Edge, value: u32) {
        (**self).write_enable(edge, value)
    }

    fn status(&self, edge: Edge) -> u32 {
        (**self).status(edge)
    }

    fn clear(&self, mask: u32) {
        (**self).clear(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_id_range() {
        assert_eq!(PinId::new(0).map(PinId::index), Ok(0));
        assert_eq!(PinId::new(31).map(PinId::mask), Ok(0x8000_0000));
        assert_eq!(PinId::new(32), Err(HalError::InvalidPinIndex(32)));
        assert_eq!(PinId::try_from(255), Err(HalError::InvalidPinIndex(255)));
    }

    #[test]
    fn test_mask_iter_ascending() {
        let mut iter = PinId::iter_mask((1 << 7) | (1 << 3) | (1 << 31));
        assert_eq!(iter.size_hint(), (3, Some(3)));
        assert_eq!(iter.next().map(PinId::index), Some(3));
        assert_eq!(iter.next().map(PinId::index), Some(7));
        assert_eq!(iter.next().map(PinId::index), Some(31));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_mask_iter_empty() {
        assert_eq!(PinId::iter_mask(0).next(), None);
    }

    #[test]
    fn test_edge_other() {
        assert_eq!(Edge::Rising.other(), Edge::Falling);
        assert_eq!(Edge::Falling.other(), Edge::Rising);
    }
}
