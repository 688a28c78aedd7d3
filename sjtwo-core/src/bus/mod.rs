//! Shared SPI-class bus
//!
//! [`BusEngine`] is the blocking single-byte exchange primitive over the SSP
//! registers. It is only reachable through a [`BusTransaction`], handed out
//! by [`BusArbiter`], so multi-byte sequences from different tasks never
//! interleave on the wire.

mod arbiter;
mod chip_select;
mod engine;

pub use arbiter::{BusArbiter, BusTransaction, DEFAULT_LOCK_TIMEOUT};
pub use chip_select::{ChipSelect, GpioChipSelect};
pub use engine::{compute_prescaler, BusConfig, BusEngine, DEFAULT_POLL_TIMEOUT};
