//! LPC40xx-specific HAL for the SJ-Two firmware
//!
//! This crate provides memory-mapped implementations of the `sjtwo-hal`
//! register contracts for the LPC4078 on the SJ-Two board:
//!
//! - GPIO ports 0-5 (direction and level registers)
//! - GPIO interrupt blocks for ports 0 and 2
//! - SSP0/SSP1/SSP2 synchronous serial ports
//! - Peripheral power control and IOCON pin function selection
//! - Pin allocation to keep one physical pin in one role
//! - NVIC interrupt numbers
//!
//! Every register block is a plain base address. Constructing one is `unsafe`
//! because two handles to the same block would race on read-modify-write.

#![no_std]

mod reg;

pub mod gpio;
pub mod interrupt;
pub mod pins;
pub mod ssp;
pub mod syscon;

pub use gpio::{GpioInterrupts, GpioPort, Port};
pub use interrupt::Interrupt;
pub use pins::PinAllocator;
pub use ssp::{Ssp, SspInstance};
