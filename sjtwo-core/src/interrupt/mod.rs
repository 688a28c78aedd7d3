//! GPIO edge interrupt handling
//!
//! A task registers an [`InterruptHandler`] for a pin and edge with the
//! [`Dispatcher`]; the interrupt entry point calls [`Dispatcher::dispatch`],
//! which services every pending pin in ascending order and clears its flag.
//!
//! # Handler contract
//!
//! Handlers run in interrupt context. They are synchronous, so they cannot
//! await the bus lock, and they must return quickly: hand work to a task
//! through a non-blocking primitive such as an `embassy_sync` `Signal` rather
//! than doing it inline.

mod dispatcher;
mod registry;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use registry::{CallbackRegistry, InterruptHandler, Registration};
