//! Devices on the shared bus

pub mod adesto;

pub use adesto::{AdestoFlash, FlashSignature};
