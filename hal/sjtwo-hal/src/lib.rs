//! SJ-Two Hardware Abstraction Layer
//!
//! This crate defines the register contracts that the core logic is written
//! against. A chip crate (LPC40xx today) implements them on top of real
//! memory-mapped registers; `sjtwo-core` implements them again in memory so
//! the dispatcher and bus engine can be tested on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (sjtwo-firmware)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sjtwo-core (dispatcher, bus, drivers)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sjtwo-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ sjtwo-hal-    │       │ sjtwo-core    │
//! │   lpc40xx     │       │   ::sim       │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioRegisters`] - Direction and level registers of one port
//! - [`gpio::GpioInterruptRegisters`] - Per-edge enable/status and clear registers
//! - [`ssp::SspRegisters`] - Synchronous serial port (SPI-class) registers

#![no_std]
#![deny(unsafe_code)]

pub mod error;
pub mod gpio;
pub mod ssp;

// Re-export key types at crate root for convenience
pub use error::HalError;
pub use gpio::{Direction, Edge, GpioInterruptRegisters, GpioRegisters, PinId, PIN_COUNT};
pub use ssp::SspRegisters;
