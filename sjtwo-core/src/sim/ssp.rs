//! Simulated SSP peripheral with an attached flash device

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::{Deque, Vec};
use sjtwo_hal::ssp::{sr, RX_FIFO_DEPTH};
use sjtwo_hal::SspRegisters;

use super::flash::SimFlash;
use crate::bus::ChipSelect;

/// Number of transmitted bytes remembered
pub const WIRE_LOG_LEN: usize = 256;

struct Wire {
    device: SimFlash,
    selected: bool,
    mosi: Vec<u8, WIRE_LOG_LEN>,
    rx: Deque<u8, RX_FIFO_DEPTH>,
}

/// Simulated SSP peripheral
///
/// Every byte written to the data register is shifted through the attached
/// [`SimFlash`] and logged. The byte shifted back is queued in a receive FIFO
/// until read. After each write the status register reports busy for a
/// configurable number of polls.
pub struct SimSsp {
    control0: AtomicU32,
    control1: AtomicU32,
    prescaler: AtomicU32,
    busy_cycles: AtomicU32,
    busy_remaining: AtomicU32,
    stuck: AtomicBool,
    wire: Mutex<CriticalSectionRawMutex, RefCell<Wire>>,
}

impl Default for SimSsp {
    fn default() -> Self {
        Self::new(SimFlash::adesto())
    }
}

impl SimSsp {
    /// Create a peripheral wired to `device`
    pub const fn new(device: SimFlash) -> Self {
        Self {
            control0: AtomicU32::new(0),
            control1: AtomicU32::new(0),
            prescaler: AtomicU32::new(0),
            busy_cycles: AtomicU32::new(2),
            busy_remaining: AtomicU32::new(0),
            stuck: AtomicBool::new(false),
            wire: Mutex::new(RefCell::new(Wire {
                device,
                selected: false,
                mosi: Vec::new(),
                rx: Deque::new(),
            })),
        }
    }

    /// Number of status polls that report busy after each data write
    pub fn set_busy_cycles(&self, cycles: u32) {
        self.busy_cycles.store(cycles, Ordering::SeqCst);
    }

    /// Keep the busy flag set forever (a wedged peripheral)
    pub fn set_stuck(&self, stuck: bool) {
        self.stuck.store(stuck, Ordering::SeqCst);
    }

    /// Finish the frame in flight
    pub fn settle(&self) {
        self.busy_remaining.store(0, Ordering::SeqCst);
    }

    /// Last value written to control register 0
    pub fn control0(&self) -> u32 {
        self.control0.load(Ordering::SeqCst)
    }

    /// Last value written to control register 1
    pub fn control1(&self) -> u32 {
        self.control1.load(Ordering::SeqCst)
    }

    /// Last value written to the prescaler register
    pub fn prescaler(&self) -> u32 {
        self.prescaler.load(Ordering::SeqCst)
    }

    /// Bytes transmitted so far, oldest first
    pub fn wire_log(&self) -> Vec<u8, WIRE_LOG_LEN> {
        self.wire.lock(|wire| wire.borrow().mosi.clone())
    }

    /// Whether the device's chip select is asserted
    pub fn is_selected(&self) -> bool {
        self.wire.lock(|wire| wire.borrow().selected)
    }

    /// Chip select handle for the attached device
    pub fn chip_select(&self) -> SimChipSelect<'_> {
        SimChipSelect { ssp: self }
    }

    fn rx_flags(&self) -> u32 {
        self.wire.lock(|wire| {
            let wire = wire.borrow();
            let mut flags = 0;
            if !wire.rx.is_empty() {
                flags |= sr::RNE;
            }
            if wire.rx.is_full() {
                flags |= sr::RFF;
            }
            flags
        })
    }

    fn set_selected(&self, selected: bool) {
        self.wire.lock(|wire| {
            let mut wire = wire.borrow_mut();
            if wire.selected && !selected {
                wire.device.deselect();
            }
            wire.selected = selected;
        });
    }
}

impl SspRegisters for SimSsp {
    fn write_control0(&self, value: u32) {
        self.control0.store(value, Ordering::SeqCst)
    }

    fn write_control1(&self, value: u32) {
        self.control1.store(value, Ordering::SeqCst)
    }

    fn status(&self) -> u32 {
        let rx = self.rx_flags();
        if self.stuck.load(Ordering::SeqCst) {
            return sr::BSY | rx;
        }
        let remaining = self.busy_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.busy_remaining.store(remaining - 1, Ordering::SeqCst);
            return sr::BSY | rx;
        }
        sr::TFE | sr::TNF | rx
    }

    fn write_data(&self, value: u32) {
        let mosi = value as u8;
        self.wire.lock(|wire| {
            let mut wire = wire.borrow_mut();
            // Oldest bytes are kept once the log is full
            let _ = wire.mosi.push(mosi);
            let miso = wire.device.exchange(mosi);
            // A full FIFO overruns and the new frame is lost
            let _ = wire.rx.push_back(miso);
        });
        self.busy_remaining
            .store(self.busy_cycles.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    fn read_data(&self) -> u32 {
        self.wire
            .lock(|wire| wire.borrow_mut().rx.pop_front())
            .map_or(0, u32::from)
    }

    fn write_prescaler(&self, value: u32) {
        self.prescaler.store(value, Ordering::SeqCst)
    }
}

/// Active-low chip select of the simulated flash
pub struct SimChipSelect<'a> {
    ssp: &'a SimSsp,
}

impl ChipSelect for SimChipSelect<'_> {
    fn select(&mut self) {
        self.ssp.set_selected(true);
    }

    fn deselect(&mut self) {
        self.ssp.set_selected(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_after_write() {
        let ssp = SimSsp::default();
        ssp.set_busy_cycles(2);
        assert!(!ssp.is_busy());

        ssp.write_data(0x9F);
        assert!(ssp.is_busy());
        assert!(ssp.is_busy());
        assert!(!ssp.is_busy());
        assert_eq!(ssp.wire_log().as_slice(), &[0x9F]);
    }

    #[test]
    fn test_deselect_resets_device() {
        let ssp = SimSsp::default();
        let mut cs = ssp.chip_select();

        cs.select();
        ssp.write_data(0x9F);
        ssp.write_data(0xFF);
        assert_eq!(ssp.read_data(), 0xFF);
        assert_eq!(ssp.read_data(), 0x1F);
        cs.deselect();
        assert!(!ssp.is_selected());

        cs.select();
        ssp.write_data(0x9F);
        assert_eq!(ssp.read_data(), 0xFF);
        ssp.write_data(0xFF);
        assert_eq!(ssp.read_data(), 0x1F);
    }

    #[test]
    fn test_rx_fifo_flags() {
        let ssp = SimSsp::default();
        ssp.set_busy_cycles(0);
        assert_eq!(ssp.status() & (sr::RNE | sr::RFF), 0);

        ssp.write_data(0x9F);
        assert_eq!(ssp.status() & (sr::RNE | sr::RFF), sr::RNE);

        for _ in 0..RX_FIFO_DEPTH {
            ssp.write_data(0xFF);
        }
        assert_eq!(ssp.status() & (sr::RNE | sr::RFF), sr::RNE | sr::RFF);
        // The overrun frame was dropped
        for _ in 0..RX_FIFO_DEPTH {
            ssp.read_data();
        }
        assert_eq!(ssp.status() & sr::RNE, 0);
        assert_eq!(ssp.wire_log().len(), RX_FIFO_DEPTH + 1);
    }
}
