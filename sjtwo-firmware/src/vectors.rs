//! Device interrupt vector table
//!
//! Without a peripheral access crate the LPC40xx vectors are laid out here.
//! Only the GPIO vector is bound; the rest go to `DefaultHandler`.

use sjtwo_hal_lpc40xx::interrupt::VECTOR_COUNT;
use sjtwo_hal_lpc40xx::Interrupt;

/// One entry of the device vector table
pub type Vector = unsafe extern "C" fn();

extern "C" {
    fn DefaultHandler();
}

const fn table() -> [Vector; VECTOR_COUNT] {
    let mut table = [DefaultHandler as Vector; VECTOR_COUNT];
    table[Interrupt::Gpio as usize] = gpio_irq;
    table
}

#[link_section = ".vector_table.interrupts"]
#[no_mangle]
pub static __INTERRUPTS: [Vector; VECTOR_COUNT] = table();

/// GPIO port 0 and 2 edge interrupt entry point
unsafe extern "C" fn gpio_irq() {
    crate::board::on_gpio_interrupt();
}
