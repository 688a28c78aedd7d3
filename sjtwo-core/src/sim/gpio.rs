//! Simulated GPIO port with edge interrupt registers

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;
use sjtwo_hal::{Edge, GpioInterruptRegisters, GpioRegisters, PinId};

/// Number of clear operations remembered
const CLEAR_LOG_LEN: usize = 64;

/// Simulated GPIO port
///
/// Output pins read back the level register; input pins read the externally
/// driven signal set with [`SimGpio::drive`].
pub struct SimGpio {
    direction: AtomicU32,
    output: AtomicU32,
    external: AtomicU32,
    enable_rising: AtomicU32,
    enable_falling: AtomicU32,
    status_rising: AtomicU32,
    status_falling: AtomicU32,
    clears: Mutex<CriticalSectionRawMutex, RefCell<Vec<u32, CLEAR_LOG_LEN>>>,
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimGpio {
    /// Create a port with every pin an input, all signals low
    pub const fn new() -> Self {
        Self {
            direction: AtomicU32::new(0),
            output: AtomicU32::new(0),
            external: AtomicU32::new(0),
            enable_rising: AtomicU32::new(0),
            enable_falling: AtomicU32::new(0),
            status_rising: AtomicU32::new(0),
            status_falling: AtomicU32::new(0),
            clears: Mutex::new(RefCell::new(Vec::new())),
        }
    }

    /// Drive the external signal on `pin`
    ///
    /// If the pin is an input and the level changes, the matching status bit
    /// is latched when that edge is enabled.
    pub fn drive(&self, pin: PinId, high: bool) {
        let mask = pin.mask();
        let was_high = self.external.load(Ordering::SeqCst) & mask != 0;
        if high {
            self.external.fetch_or(mask, Ordering::SeqCst);
        } else {
            self.external.fetch_and(!mask, Ordering::SeqCst);
        }

        let is_input = self.direction.load(Ordering::SeqCst) & mask == 0;
        if !is_input || was_high == high {
            return;
        }

        let edge = if high { Edge::Rising } else { Edge::Falling };
        if self.enable(edge) & mask != 0 {
            self.latch(edge, mask);
        }
    }

    /// Force status bits for `edge`, regardless of enables
    pub fn latch(&self, edge: Edge, mask: u32) {
        match edge {
            Edge::Rising => self.status_rising.fetch_or(mask, Ordering::SeqCst),
            Edge::Falling => self.status_falling.fetch_or(mask, Ordering::SeqCst),
        };
    }

    /// Union of both status registers
    pub fn pending(&self) -> u32 {
        self.status(Edge::Rising) | self.status(Edge::Falling)
    }

    /// Masks written to the clear register, oldest first
    pub fn clear_history(&self) -> Vec<u32, CLEAR_LOG_LEN> {
        self.clears.lock(|log| log.borrow().clone())
    }
}

impl GpioRegisters for SimGpio {
    fn direction(&self) -> u32 {
        self.direction.load(Ordering::SeqCst)
    }

    fn write_direction(&self, value: u32) {
        self.direction.store(value, Ordering::SeqCst)
    }

    fn level(&self) -> u32 {
        let dir = self.direction.load(Ordering::SeqCst);
        (self.output.load(Ordering::SeqCst) & dir) | (self.external.load(Ordering::SeqCst) & !dir)
    }

    fn write_level(&self, value: u32) {
        self.output.store(value, Ordering::SeqCst)
    }
}

impl GpioInterruptRegisters for SimGpio {
    fn enable(&self, edge: Edge) -> u32 {
        match edge {
            Edge::Rising => self.enable_rising.load(Ordering::SeqCst),
            Edge::Falling => self.enable_falling.load(Ordering::SeqCst),
        }
    }

    fn write_enable(&self, edge: Edge, value: u32) {
        match edge {
            Edge::Rising => self.enable_rising.store(value, Ordering::SeqCst),
            Edge::Falling => self.enable_falling.store(value, Ordering::SeqCst),
        }
    }

    fn status(&self, edge: Edge) -> u32 {
        match edge {
            Edge::Rising => self.status_rising.load(Ordering::SeqCst),
            Edge::Falling => self.status_falling.load(Ordering::SeqCst),
        }
    }

    fn clear(&self, mask: u32) {
        self.status_rising.fetch_and(!mask, Ordering::SeqCst);
        self.status_falling.fetch_and(!mask, Ordering::SeqCst);
        self.clears.lock(|log| {
            // Oldest entries are kept once the log is full
            let _ = log.borrow_mut().push(mask);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(n: u8) -> PinId {
        PinId::new(n).unwrap()
    }

    #[test]
    fn test_drive_latches_enabled_edge_only() {
        let gpio = SimGpio::new();
        gpio.write_enable(Edge::Rising, pin(4).mask());

        gpio.drive(pin(4), true);
        assert_eq!(gpio.status(Edge::Rising), pin(4).mask());

        // Falling edge not enabled
        gpio.drive(pin(4), false);
        assert_eq!(gpio.status(Edge::Falling), 0);
    }

    #[test]
    fn test_output_pin_ignores_external_signal() {
        let gpio = SimGpio::new();
        gpio.write_direction(pin(2).mask());
        gpio.write_enable(Edge::Rising, pin(2).mask());

        gpio.drive(pin(2), true);
        assert_eq!(gpio.level() & pin(2).mask(), 0);
        assert_eq!(gpio.pending(), 0);
    }

    #[test]
    fn test_clear_is_recorded() {
        let gpio = SimGpio::new();
        gpio.latch(Edge::Rising, 0b1010);
        gpio.latch(Edge::Falling, 0b0010);
        gpio.clear(0b0010);
        assert_eq!(gpio.pending(), 0b1000);
        assert_eq!(gpio.clear_history().as_slice(), &[0b0010]);
    }
}
