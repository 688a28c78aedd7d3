//! Device chip select

use sjtwo_hal::GpioRegisters;

use crate::pin::OutputPin;

/// Selects one device on the shared bus
pub trait ChipSelect {
    /// Assert chip select
    fn select(&mut self);

    /// Release chip select
    fn deselect(&mut self);
}

/// Chip select driven by a GPIO output
pub struct GpioChipSelect<'a, R> {
    pin: OutputPin<'a, R>,
    active_low: bool,
}

impl<'a, R: GpioRegisters> GpioChipSelect<'a, R> {
    /// Wrap `pin`, leaving the device deselected
    pub fn new(pin: OutputPin<'a, R>, active_low: bool) -> Self {
        let mut cs = Self { pin, active_low };
        cs.deselect();
        cs
    }

    /// Active-low chip select (the common case)
    pub fn active_low(pin: OutputPin<'a, R>) -> Self {
        Self::new(pin, true)
    }

    /// Whether the device is currently selected
    pub fn is_selected(&self) -> bool {
        self.pin.is_set_high() != self.active_low
    }
}

impl<R: GpioRegisters> ChipSelect for GpioChipSelect<'_, R> {
    fn select(&mut self) {
        self.pin.drive(!self.active_low);
    }

    fn deselect(&mut self) {
        self.pin.drive(self.active_low);
    }
}

/// Shared chip select
///
/// Several drivers of the same device may hold the one pin by reference.
/// Only the holder of the bus lock drives it.
impl<R: GpioRegisters> ChipSelect for &GpioChipSelect<'_, R> {
    fn select(&mut self) {
        self.pin.drive(!self.active_low);
    }

    fn deselect(&mut self) {
        self.pin.drive(self.active_low);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::PinAccessor;
    use crate::sim::SimGpio;

    #[test]
    fn test_active_low_select() {
        let port = PinAccessor::new(SimGpio::new());
        let mut cs = GpioChipSelect::active_low(port.output(10, false).unwrap());

        // Constructed deselected
        assert!(!cs.is_selected());
        assert_eq!(port.get_level(10), Ok(true));

        cs.select();
        assert!(cs.is_selected());
        assert_eq!(port.get_level(10), Ok(false));

        cs.deselect();
        assert_eq!(port.get_level(10), Ok(true));
    }

    #[test]
    fn test_shared_by_reference() {
        let port = PinAccessor::new(SimGpio::new());
        let cs = GpioChipSelect::active_low(port.output(10, true).unwrap());
        let mut first = &cs;
        let mut second = &cs;

        first.select();
        assert!(cs.is_selected());
        second.deselect();
        assert!(!cs.is_selected());
    }
}
