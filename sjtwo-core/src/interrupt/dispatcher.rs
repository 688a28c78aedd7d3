//! Interrupt dispatcher
//!
//! Runs once per GPIO interrupt. The pending set is read once into a
//! snapshot; every pin in it is serviced in ascending index order and its
//! flag cleared before moving to the next pin. Edges that arrive while a pass
//! is running stay latched in hardware and are picked up by the next pass.

use embassy_sync::blocking_mutex::raw::RawMutex;
use sjtwo_hal::{Edge, GpioInterruptRegisters, PinId};

use super::registry::{CallbackRegistry, InterruptHandler, Registration};
use crate::error::Error;

/// Outcome of one dispatch pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchReport {
    /// Status snapshot taken at the start of the pass
    pub pending: u32,
    /// Pins whose handler ran
    pub handled: u32,
    /// Pins with no registration; flag cleared, nothing invoked
    pub unhandled: u32,
}

impl DispatchReport {
    /// Number of pins serviced in this pass
    pub fn serviced(&self) -> u32 {
        self.pending.count_ones()
    }
}

/// Edge interrupt dispatcher for one GPIO port
///
/// Owns the port's interrupt registers and the callback table. Construct it
/// once (typically as a `static`) and share it by reference between the
/// tasks that register handlers and the interrupt entry point.
pub struct Dispatcher<M: RawMutex, R> {
    regs: R,
    registry: CallbackRegistry<M>,
}

impl<M: RawMutex, R: GpioInterruptRegisters> Dispatcher<M, R> {
    /// Create a dispatcher with no registrations
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            registry: CallbackRegistry::new(),
        }
    }

    /// Register `handler` for `edge` on `pin`
    ///
    /// Replaces any earlier registration for the pin and leaves only `edge`
    /// enabled for it. Registrations should be made before the interrupt is
    /// unmasked in the NVIC.
    pub fn register_interrupt(
        &self,
        pin: u8,
        edge: Edge,
        handler: &'static dyn InterruptHandler,
    ) -> Result<(), Error> {
        let pin = PinId::new(pin)?;
        if let Some(previous) = self.registry.register(&self.regs, pin, edge, handler) {
            debug!(
                "pin {} interrupt replaced ({} -> {})",
                pin.index(),
                previous.edge(),
                edge
            );
        }
        Ok(())
    }

    /// Current registration for `pin`
    pub fn registration(&self, pin: u8) -> Result<Option<Registration>, Error> {
        let pin = PinId::new(pin)?;
        Ok(self.registry.get(pin))
    }

    /// Service all pending pin interrupts
    ///
    /// Called from the interrupt entry point. Never fails: a pending pin with
    /// no registration only has its flag cleared.
    pub fn dispatch(&self) -> DispatchReport {
        let pending = self.regs.status(Edge::Rising) | self.regs.status(Edge::Falling);
        let mut report = DispatchReport {
            pending,
            ..DispatchReport::default()
        };

        for pin in PinId::iter_mask(pending) {
            match self.registry.get(pin) {
                Some(registration) => {
                    registration.invoke(pin);
                    report.handled |= pin.mask();
                }
                None => {
                    trace!("unhandled interrupt on pin {}", pin.index());
                    report.unhandled |= pin.mask();
                }
            }
            self.regs.clear(pin.mask());
        }

        report
    }
}
