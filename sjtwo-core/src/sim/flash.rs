//! Simulated SPI NOR flash answering JEDEC Read-ID

use crate::devices::adesto::{ADESTO_MANUFACTURER_ID, DUMMY_BYTE, READ_ID_COMMAND};

/// Command decoding state since chip select was asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Waiting for a command byte
    Idle,
    /// Shifting out identification byte `n`
    ReadId(usize),
    /// Unknown command; clock out 0xFF until deselected
    Ignore,
}

/// Simulated flash device on the SPI bus
#[derive(Debug, Clone)]
pub struct SimFlash {
    id: [u8; 4],
    phase: Phase,
}

impl Default for SimFlash {
    fn default() -> Self {
        Self::adesto()
    }
}

impl SimFlash {
    /// Device answering Read-ID with the given identification bytes
    pub const fn new(manufacturer_id: u8, device_id_1: u8, device_id_2: u8, extended_id: u8) -> Self {
        Self {
            id: [manufacturer_id, device_id_1, device_id_2, extended_id],
            phase: Phase::Idle,
        }
    }

    /// Adesto AT25SF041 as fitted to the SJ-Two board
    pub const fn adesto() -> Self {
        Self::new(ADESTO_MANUFACTURER_ID, 0x26, 0x00, 0x00)
    }

    /// Shift one byte in and return the byte shifted out during the same frame
    pub fn exchange(&mut self, mosi: u8) -> u8 {
        match self.phase {
            Phase::Idle => {
                self.phase = if mosi == READ_ID_COMMAND {
                    Phase::ReadId(0)
                } else {
                    Phase::Ignore
                };
                DUMMY_BYTE
            }
            Phase::ReadId(n) => {
                self.phase = Phase::ReadId(n + 1);
                self.id.get(n).copied().unwrap_or(DUMMY_BYTE)
            }
            Phase::Ignore => DUMMY_BYTE,
        }
    }

    /// Chip select released; the next byte is a command again
    pub fn deselect(&mut self) {
        self.phase = Phase::Idle;
    }
}
