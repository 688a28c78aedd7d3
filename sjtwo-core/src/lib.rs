//! Board-agnostic core logic for the SJ-Two firmware
//!
//! This crate contains the parts of the firmware where ordering and
//! concurrency actually matter, written against the `sjtwo-hal` register
//! contracts:
//!
//! - Pin state accessor (direction/level read-modify-write)
//! - Interrupt callback registry and dispatcher
//! - Bus exchange engine (blocking full-duplex byte exchange)
//! - Bus arbitration lock (one task's transaction at a time)
//! - Adesto SPI flash signature reader
//! - Board configuration types
//!
//! # Contexts
//!
//! Code here runs in two contexts. Interrupt handlers registered with the
//! [`interrupt::Dispatcher`] are synchronous [`interrupt::InterruptHandler`]
//! objects and run at interrupt priority. The bus is only reachable through
//! [`bus::BusArbiter::acquire`], which is `async`, so a handler has no way to
//! wait on the bus lock or run the engine's busy-poll loops.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod bus;
pub mod config;
pub mod devices;
pub mod error;
pub mod interrupt;
pub mod pin;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use error::{ConfigError, Error};
pub use sjtwo_hal::{Direction, Edge, PinId};
