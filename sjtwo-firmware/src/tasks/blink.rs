//! LED blink task

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::board::Led;

/// Toggle period
pub const BLINK_PERIOD_MS: u64 = 500;

/// Blink task - toggles one LED forever
#[embassy_executor::task(pool_size = 2)]
pub async fn blink_task(name: &'static str, mut led: Led) {
    info!("{} blink task started", name);

    let mut ticker = Ticker::every(Duration::from_millis(BLINK_PERIOD_MS));
    loop {
        led.toggle();
        ticker.next().await;
    }
}
