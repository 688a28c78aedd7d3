//! Button interrupt task
//!
//! The interrupt handler only signals; logging and pin reads happen here in
//! task context.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use sjtwo_core::interrupt::InterruptHandler;
use sjtwo_core::PinId;

use crate::board::Button;

/// Signal raised from the GPIO interrupt with the pin that fired
pub static BUTTON_PRESSED: Signal<CriticalSectionRawMutex, PinId> = Signal::new();

/// Interrupt handler registered for the button pin
pub struct ButtonHandler;

impl InterruptHandler for ButtonHandler {
    fn on_interrupt(&self, pin: PinId) {
        BUTTON_PRESSED.signal(pin);
    }
}

pub static BUTTON_HANDLER: ButtonHandler = ButtonHandler;

/// Button task - reports each edge seen by the interrupt handler
#[embassy_executor::task]
pub async fn button_task(button: Button) {
    info!("Button task started");

    let mut presses: u32 = 0;
    loop {
        let pin = BUTTON_PRESSED.wait().await;
        presses = presses.wrapping_add(1);
        info!(
            "button on pin {} ({} presses), level now {}",
            pin.index(),
            presses,
            button.is_high()
        );
    }
}
