//! Synchronous serial port register contract
//!
//! Covers the SPI-class peripheral used for byte exchanges: two control
//! registers, a status register, the data register and the clock prescaler.

/// Control register 0 fields
pub mod cr0 {
    /// Data size select for 8-bit frames (DSS = frame bits - 1)
    pub const DSS_8BIT: u32 = 0x7;
}

/// Control register 1 fields
pub mod cr1 {
    /// Synchronous serial port enable
    pub const SSE: u32 = 1 << 1;
}

/// Status register fields
pub mod sr {
    /// Transmit FIFO empty
    pub const TFE: u32 = 1 << 0;
    /// Transmit FIFO not full
    pub const TNF: u32 = 1 << 1;
    /// Receive FIFO not empty
    pub const RNE: u32 = 1 << 2;
    /// Receive FIFO full
    pub const RFF: u32 = 1 << 3;
    /// Busy shifting a frame
    pub const BSY: u32 = 1 << 4;
}

/// Depth of the receive FIFO in frames
pub const RX_FIFO_DEPTH: usize = 8;

/// Smallest clock prescaler the peripheral accepts
pub const MIN_PRESCALER: u32 = 2;

/// Largest clock prescaler the peripheral accepts (8-bit, even)
pub const MAX_PRESCALER: u32 = 254;

/// SSP peripheral registers
pub trait SspRegisters {
    /// Write control register 0 (frame format, word size)
    fn write_control0(&self, value: u32);

    /// Write control register 1 (enable, master/slave)
    fn write_control1(&self, value: u32);

    /// Read the status register
    fn status(&self) -> u32;

    /// Write the data register, starting a transfer
    fn write_data(&self, value: u32);

    /// Pop the oldest received frame from the data register
    fn read_data(&self) -> u32;

    /// Write the clock prescaler register
    fn write_prescaler(&self, value: u32);

    /// Check whether a frame is currently being shifted
    fn is_busy(&self) -> bool {
        self.status() & sr::BSY != 0
    }
}

impl<T: SspRegisters + ?Sized> SspRegisters for &T {
    fn write_control0(&self, value: u32) {
        (**self).write_control0(value)
    }

    fn write_control1(&self, value: u32) {
        (**self).write_control1(value)
    }

    fn status(&self) -> u32 {
        (**self).status()
    }

    fn write_data(&self, value: u32) {
        (**self).write_data(value)
    }

    fn read_data(&self) -> u32 {
        (**self).read_data()
    }

    fn write_prescaler(&self, value: u32) {
        (**self).write_prescaler(value)
    }
}
