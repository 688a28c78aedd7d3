//! Pin state accessor
//!
//! Direction and level control for the pins of one GPIO port. Every entry
//! point validates the pin index; each operation is a read-modify-write of a
//! single bit, done inside a critical section so that two tasks sharing a
//! port cannot lose each other's updates.

use core::convert::Infallible;

use sjtwo_hal::{Direction, GpioRegisters, PinId};

use crate::error::Error;

/// Raw direction/level control over one GPIO port
pub struct PinAccessor<R> {
    regs: R,
}

impl<R: GpioRegisters> PinAccessor<R> {
    /// Create an accessor over the registers of one port
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Underlying register block
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Set the direction of `pin`
    pub fn set_direction(&self, pin: u8, direction: Direction) -> Result<(), Error> {
        let pin = PinId::new(pin)?;
        self.write_direction(pin, direction);
        Ok(())
    }

    /// Drive `pin` high or low
    ///
    /// Has no visible effect on the pin until it is configured as an output.
    pub fn set_level(&self, pin: u8, high: bool) -> Result<(), Error> {
        let pin = PinId::new(pin)?;
        self.write_level(pin, high);
        Ok(())
    }

    /// Read the current level of `pin`
    pub fn get_level(&self, pin: u8) -> Result<bool, Error> {
        let pin = PinId::new(pin)?;
        Ok(self.read_level(pin))
    }

    /// Drive `pin` high
    pub fn set_high(&self, pin: u8) -> Result<(), Error> {
        self.set_level(pin, true)
    }

    /// Drive `pin` low
    pub fn set_low(&self, pin: u8) -> Result<(), Error> {
        self.set_level(pin, false)
    }

    /// Invert the driven level of `pin`
    pub fn toggle(&self, pin: u8) -> Result<(), Error> {
        let pin = PinId::new(pin)?;
        self.toggle_level(pin);
        Ok(())
    }

    /// Configure `pin` as an output driven to `initial` and return a handle to it
    pub fn output(&self, pin: u8, initial: bool) -> Result<OutputPin<'_, R>, Error> {
        let pin = PinId::new(pin)?;
        // Latch the level first so the pin never glitches to the old value
        self.write_level(pin, initial);
        self.write_direction(pin, Direction::Output);
        Ok(OutputPin { port: self, pin })
    }

    /// Configure `pin` as an input and return a handle to it
    pub fn input(&self, pin: u8) -> Result<InputPin<'_, R>, Error> {
        let pin = PinId::new(pin)?;
        self.write_direction(pin, Direction::Input);
        Ok(InputPin { port: self, pin })
    }

    fn write_direction(&self, pin: PinId, direction: Direction) {
        critical_section::with(|_| {
            let dir = self.regs.direction();
            let dir = match direction {
                Direction::Output => dir | pin.mask(),
                Direction::Input => dir & !pin.mask(),
            };
            self.regs.write_direction(dir);
        });
    }

    fn write_level(&self, pin: PinId, high: bool) {
        critical_section::with(|_| {
            let level = self.regs.level();
            let level = if high {
                level | pin.mask()
            } else {
                level & !pin.mask()
            };
            self.regs.write_level(level);
        });
    }

    fn toggle_level(&self, pin: PinId) {
        critical_section::with(|_| {
            self.regs.write_level(self.regs.level() ^ pin.mask());
        });
    }

    fn read_level(&self, pin: PinId) -> bool {
        self.regs.level() & pin.mask() != 0
    }
}

/// A pin configured as an output
pub struct OutputPin<'a, R> {
    port: &'a PinAccessor<R>,
    pin: PinId,
}

impl<R: GpioRegisters> OutputPin<'_, R> {
    /// Pin this handle drives
    pub fn id(&self) -> PinId {
        self.pin
    }

    /// Drive the pin to `high`
    pub fn set_state(&mut self, high: bool) {
        self.drive(high);
    }

    pub(crate) fn drive(&self, high: bool) {
        self.port.write_level(self.pin, high);
    }

    /// Invert the driven level
    pub fn toggle(&mut self) {
        self.port.toggle_level(self.pin);
    }

    /// Check if the pin is currently driven high
    pub fn is_set_high(&self) -> bool {
        self.port.read_level(self.pin)
    }
}

/// A pin configured as an input
pub struct InputPin<'a, R> {
    port: &'a PinAccessor<R>,
    pin: PinId,
}

impl<R: GpioRegisters> InputPin<'_, R> {
    /// Pin this handle reads
    pub fn id(&self) -> PinId {
        self.pin
    }

    /// Check if the pin reads high
    pub fn is_high(&self) -> bool {
        self.port.read_level(self.pin)
    }
}

impl<R> embedded_hal::digital::ErrorType for OutputPin<'_, R> {
    type Error = Infallible;
}

impl<R: GpioRegisters> embedded_hal::digital::OutputPin for OutputPin<'_, R> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_state(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_state(true);
        Ok(())
    }
}

impl<R: GpioRegisters> embedded_hal::digital::StatefulOutputPin for OutputPin<'_, R> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(OutputPin::is_set_high(self))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!OutputPin::is_set_high(self))
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        OutputPin::toggle(self);
        Ok(())
    }
}

impl<R> embedded_hal::digital::ErrorType for InputPin<'_, R> {
    type Error = Infallible;
}

impl<R: GpioRegisters> embedded_hal::digital::InputPin for InputPin<'_, R> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(InputPin::is_high(self))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!InputPin::is_high(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimGpio;
    use embedded_hal::digital::OutputPin as _;
    use proptest::prelude::*;

    #[test]
    fn test_invalid_pin_index() {
        let port = PinAccessor::new(SimGpio::new());
        assert_eq!(port.set_direction(32, Direction::Output), Err(Error::InvalidPinIndex(32)));
        assert_eq!(port.set_level(200, true), Err(Error::InvalidPinIndex(200)));
        assert_eq!(port.get_level(32), Err(Error::InvalidPinIndex(32)));
        assert!(port.output(40, false).is_err());
    }

    #[test]
    fn test_only_target_bit_changes() {
        let port = PinAccessor::new(SimGpio::new());
        port.set_direction(3, Direction::Output).unwrap();
        port.set_direction(9, Direction::Output).unwrap();
        port.set_direction(3, Direction::Input).unwrap();
        assert_eq!(port.registers().direction(), 1 << 9);
    }

    #[test]
    fn test_input_reads_external_signal() {
        let gpio = SimGpio::new();
        let port = PinAccessor::new(&gpio);
        let input = port.input(5).unwrap();
        assert!(!input.is_high());

        gpio.drive(input.id(), true);
        assert!(input.is_high());
        assert_eq!(port.get_level(5), Ok(true));
    }

    #[test]
    fn test_output_handle_toggle() {
        let port = PinAccessor::new(SimGpio::new());
        let mut led = port.output(18, true).unwrap();
        assert!(led.is_set_high());

        led.toggle();
        assert_eq!(port.get_level(18), Ok(false));

        led.set_high().unwrap();
        assert_eq!(port.get_level(18), Ok(true));
    }

    proptest! {
        #[test]
        fn prop_output_level_reads_back(pin in 0u8..32, high in any::<bool>()) {
            let port = PinAccessor::new(SimGpio::new());
            port.set_direction(pin, Direction::Output).unwrap();
            port.set_level(pin, high).unwrap();
            prop_assert_eq!(port.get_level(pin), Ok(high));
            port.set_level(pin, !high).unwrap();
            prop_assert_eq!(port.get_level(pin), Ok(!high));
        }

        #[test]
        fn prop_out_of_range_rejected(pin in 32u8..=255) {
            let port = PinAccessor::new(SimGpio::new());
            prop_assert_eq!(port.get_level(pin), Err(Error::InvalidPinIndex(pin)));
        }
    }
}
