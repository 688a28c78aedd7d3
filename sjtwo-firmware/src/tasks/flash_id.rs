//! Flash signature reader task
//!
//! Two instances run at once and contend for the SSP2 bus; the arbiter keeps
//! their Read-ID sequences from interleaving on the wire.

use defmt::*;
use embassy_time::{Duration, Ticker};

use sjtwo_core::devices::AdestoFlash;

use crate::board::{FlashBus, FlashChipSelect};

/// Read period
pub const READ_PERIOD_MS: u64 = 500;

/// Flash ID task - reads and logs the flash signature periodically
#[embassy_executor::task(pool_size = 2)]
pub async fn flash_id_task(name: &'static str, bus: &'static FlashBus, cs: &'static FlashChipSelect) {
    info!("{} flash task started", name);

    let mut flash = AdestoFlash::new(cs);
    let mut ticker = Ticker::every(Duration::from_millis(READ_PERIOD_MS));
    loop {
        match flash.read_signature_locked(bus).await {
            Ok(signature) if signature.is_adesto() => info!(
                "{}: Adesto flash {:#04x} {:#04x} {:#04x}",
                name, signature.device_id_1, signature.device_id_2, signature.extended_device_id
            ),
            Ok(signature) => warn!(
                "{}: unexpected manufacturer {:#04x}",
                name, signature.manufacturer_id
            ),
            // Try again next period
            Err(e) => warn!("{}: signature read failed: {}", name, e),
        }
        ticker.next().await;
    }
}
