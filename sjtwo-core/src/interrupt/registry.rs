//! Interrupt callback registry
//!
//! Fixed table mapping each pin to at most one (edge, handler) registration.
//! A second registration for the same pin replaces the first; there is no
//! unregister operation.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use sjtwo_hal::{Edge, GpioInterruptRegisters, PinId, PIN_COUNT};

/// Callback invoked from interrupt context
///
/// Implementations must not block. Closures `Fn(PinId) + Sync` implement
/// this trait, so a `static` closure or function item can be registered
/// directly.
pub trait InterruptHandler: Sync {
    /// Called once per dispatch pass in which `pin`'s flag was pending
    fn on_interrupt(&self, pin: PinId);
}

impl<F> InterruptHandler for F
where
    F: Fn(PinId) + Sync,
{
    fn on_interrupt(&self, pin: PinId) {
        self(pin)
    }
}

/// One live registration
#[derive(Clone, Copy)]
pub struct Registration {
    edge: Edge,
    handler: &'static dyn InterruptHandler,
}

impl Registration {
    /// Edge this registration is armed for
    pub fn edge(&self) -> Edge {
        self.edge
    }

    pub(crate) fn invoke(&self, pin: PinId) {
        self.handler.on_interrupt(pin);
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("edge", &self.edge)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY: Cell<Option<Registration>> = Cell::new(None);

/// Pin-indexed callback table
///
/// Written from task context, read from interrupt context. Both sides go
/// through the raw mutex `M`; with `CriticalSectionRawMutex` a registration
/// is atomic with respect to the dispatcher.
pub struct CallbackRegistry<M: RawMutex> {
    slots: Mutex<M, [Cell<Option<Registration>>; PIN_COUNT]>,
}

impl<M: RawMutex> Default for CallbackRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> CallbackRegistry<M> {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new([EMPTY; PIN_COUNT]),
        }
    }

    /// Store a registration and arm the hardware for it
    ///
    /// Enables `edge` for `pin` in `regs` and disables the other edge, so at
    /// most one edge is active per pin. Returns the registration it replaced.
    pub fn register<R: GpioInterruptRegisters>(
        &self,
        regs: &R,
        pin: PinId,
        edge: Edge,
        handler: &'static dyn InterruptHandler,
    ) -> Option<Registration> {
        self.slots.lock(|slots| {
            let previous = slots[pin.index() as usize].replace(Some(Registration { edge, handler }));

            regs.write_enable(edge, regs.enable(edge) | pin.mask());
            regs.write_enable(edge.other(), regs.enable(edge.other()) & !pin.mask());
            previous
        })
    }

    /// Registration for `pin`, if any
    pub fn get(&self, pin: PinId) -> Option<Registration> {
        self.slots.lock(|slots| slots[pin.index() as usize].get())
    }
}
