//! In-memory register blocks
//!
//! These implement the `sjtwo-hal` register contracts with atomics so the
//! dispatcher, accessor and bus engine can run unchanged on the host. Each
//! simulated block also exposes the hardware side of the register (injecting
//! edges, attaching an SPI device) and records what the core wrote.
//!
//! A `critical-section` implementation must be linked (on the host, enable
//! `critical-section/std`).

mod flash;
mod gpio;
mod ssp;

pub use flash::SimFlash;
pub use gpio::SimGpio;
pub use ssp::{SimChipSelect, SimSsp, WIRE_LOG_LEN};
