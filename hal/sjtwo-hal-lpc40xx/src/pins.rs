//! GPIO allocation
//!
//! Tracks which pins are claimed so a physical pin never ends up in two roles
//! (for example chip select and an LED) at the same time.

use sjtwo_hal::{HalError, PinId};

use crate::gpio::{Port, PORT_COUNT};

/// GPIO allocator to track pin usage across all ports
#[derive(Debug, Clone)]
pub struct PinAllocator {
    /// Bitmask of allocated pins, one word per port
    allocated: [u32; PORT_COUNT],
}

impl Default for PinAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PinAllocator {
    /// Create a new allocator with every pin free
    pub const fn new() -> Self {
        Self {
            allocated: [0; PORT_COUNT],
        }
    }

    /// Claim a pin
    ///
    /// Fails if the port or pin index is invalid, or if the pin is already
    /// claimed.
    pub fn allocate(&mut self, port: u8, pin: u8) -> Result<(Port, PinId), HalError> {
        let port_id = Port::from_number(port)?;
        let pin_id = PinId::new(pin)?;
        let word = &mut self.allocated[port as usize];
        if *word & pin_id.mask() != 0 {
            return Err(HalError::PinInUse { port, pin });
        }
        *word |= pin_id.mask();
        Ok((port_id, pin_id))
    }

    /// Get the number of allocated pins
    pub fn allocated_count(&self) -> usize {
        self.allocated.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator() {
        let mut alloc = PinAllocator::new();

        assert!(alloc.allocate(1, 10).is_ok());

        // Can't allocate same pin twice
        assert_eq!(
            alloc.allocate(1, 10),
            Err(HalError::PinInUse { port: 1, pin: 10 })
        );

        // Same index on another port is a different pin
        assert!(alloc.allocate(0, 10).is_ok());
        assert_eq!(alloc.allocated_count(), 2);
    }

    #[test]
    fn test_allocator_rejects_invalid() {
        let mut alloc = PinAllocator::new();
        assert_eq!(alloc.allocate(6, 0), Err(HalError::InvalidPort(6)));
        assert_eq!(alloc.allocate(0, 32), Err(HalError::InvalidPinIndex(32)));
        assert_eq!(alloc.allocated_count(), 0);
    }
}
