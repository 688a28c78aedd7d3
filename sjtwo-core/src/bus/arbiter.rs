//! Bus arbitration lock
//!
//! Wraps the exchange engine in an async mutex. A task obtains a
//! [`BusTransaction`] from [`BusArbiter::acquire`], runs its byte sequence and
//! drops (or [`release`](BusTransaction::release)s) the transaction. The
//! lock is released by `Drop`, so every exit path, including `?` on an
//! exchange error, gives the bus back.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_time::{with_deadline, Duration, Instant};
use sjtwo_hal::SspRegisters;

use super::chip_select::ChipSelect;
use super::engine::BusEngine;
use crate::error::Error;

/// Byte clocked out when only the received byte matters
const FILL_BYTE: u8 = 0xFF;

/// Default bound on waiting for the bus lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(1000);

/// Mutual exclusion over one physical bus
///
/// Task context only: acquisition is `async` and cannot be awaited from an
/// interrupt handler.
pub struct BusArbiter<M: RawMutex, R> {
    bus: Mutex<M, BusEngine<R>>,
    lock_timeout: Duration,
}

impl<M: RawMutex, R: SspRegisters> BusArbiter<M, R> {
    /// Guard an initialized engine
    pub const fn new(engine: BusEngine<R>, lock_timeout: Duration) -> Self {
        Self {
            bus: Mutex::new(engine),
            lock_timeout,
        }
    }

    /// Wait for the bus using the default lock timeout
    pub async fn acquire(&self) -> Result<BusTransaction<'_, M, R>, Error> {
        self.acquire_timeout(self.lock_timeout).await
    }

    /// Wait up to `timeout` for the bus
    ///
    /// `Duration::MAX` waits without a bound.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<BusTransaction<'_, M, R>, Error> {
        let deadline = Instant::now().saturating_add(timeout);
        match with_deadline(deadline, self.bus.lock()).await {
            Ok(guard) => Ok(BusTransaction { guard }),
            Err(_) => {
                warn!("bus lock not obtained within {} ms", timeout.as_millis());
                Err(Error::LockTimeout)
            }
        }
    }

    /// Take the bus only if it is free right now
    ///
    /// Returns [`Error::LockTimeout`] when another task holds it.
    pub fn try_acquire(&self) -> Result<BusTransaction<'_, M, R>, Error> {
        self.bus
            .try_lock()
            .map(|guard| BusTransaction { guard })
            .map_err(|_| Error::LockTimeout)
    }

    /// Acquire the bus, run `f` with `cs` asserted, then release both
    pub async fn transaction<C, T>(
        &self,
        cs: &mut C,
        f: impl FnOnce(&mut BusTransaction<'_, M, R>) -> Result<T, Error>,
    ) -> Result<T, Error>
    where
        C: ChipSelect,
    {
        let mut bus = self.acquire().await?;
        bus.with_device(cs, f)
    }
}

/// Exclusive ownership of the bus
///
/// Held by exactly one task at a time; the bus is released when this is
/// dropped.
pub struct BusTransaction<'a, M: RawMutex, R> {
    guard: MutexGuard<'a, M, BusEngine<R>>,
}

impl<M: RawMutex, R: SspRegisters> BusTransaction<'_, M, R> {
    /// Exchange one byte
    pub fn exchange_byte(&mut self, out: u8) -> Result<u8, Error> {
        self.guard.exchange_byte(out)
    }

    /// Exchange one byte with an explicit busy-poll bound
    pub fn exchange_byte_timeout(&mut self, out: u8, timeout: Duration) -> Result<u8, Error> {
        self.guard.exchange_byte_timeout(out, timeout)
    }

    /// Run `f` with `cs` asserted
    ///
    /// Chip select is released whether `f` succeeds or fails.
    pub fn with_device<C, T>(
        &mut self,
        cs: &mut C,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error>
    where
        C: ChipSelect,
    {
        cs.select();
        let result = f(self);
        cs.deselect();
        result
    }

    /// Give the bus back to other tasks
    pub fn release(self) {}
}

impl<M: RawMutex, R: SspRegisters> embedded_hal::spi::ErrorType for BusTransaction<'_, M, R> {
    type Error = Error;
}

impl<M: RawMutex, R: SspRegisters> embedded_hal::spi::SpiBus<u8> for BusTransaction<'_, M, R> {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words {
            *word = self.exchange_byte(FILL_BYTE)?;
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.exchange_byte(word)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for i in 0..read.len().max(write.len()) {
            let received = self.exchange_byte(write.get(i).copied().unwrap_or(FILL_BYTE))?;
            if let Some(slot) = read.get_mut(i) {
                *slot = received;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words {
            *word = self.exchange_byte(*word)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Every exchange already waits for its frame to complete
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::BusConfig;
    use crate::sim::SimSsp;
    use core::cell::RefCell;
    use embassy_futures::join::join;
    use embassy_futures::{block_on, yield_now};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embedded_hal::spi::SpiBus;
    use heapless::Vec;

    type SimArbiter<'a> = BusArbiter<CriticalSectionRawMutex, &'a SimSsp>;

    fn arbiter(ssp: &SimSsp) -> SimArbiter<'_> {
        let mut engine = BusEngine::new(ssp);
        engine.init(&BusConfig::new(48_000_000, 24_000_000)).unwrap();
        BusArbiter::new(engine, Duration::from_millis(500))
    }

    async fn send_slowly(
        arbiter: &SimArbiter<'_>,
        bytes: [u8; 4],
        events: &RefCell<Vec<&'static str, 8>>,
        name: [&'static str; 2],
    ) {
        let mut bus = arbiter.acquire().await.unwrap();
        events.borrow_mut().push(name[0]).unwrap();
        for byte in bytes {
            bus.exchange_byte(byte).unwrap();
            // Give the other task every chance to cut in
            yield_now().await;
        }
        events.borrow_mut().push(name[1]).unwrap();
        bus.release();
    }

    #[test]
    fn test_contending_tasks_do_not_interleave() {
        let ssp = SimSsp::default();
        let arbiter = arbiter(&ssp);
        let events = RefCell::new(Vec::new());

        let task_a = send_slowly(&arbiter, [0xA1, 0xA2, 0xA3, 0xA4], &events, ["a acquired", "a released"]);
        let task_b = async {
            // Let task A take the lock first
            yield_now().await;
            send_slowly(&arbiter, [0xB1, 0xB2, 0xB3, 0xB4], &events, ["b acquired", "b released"]).await;
        };
        block_on(join(task_a, task_b));

        assert_eq!(
            events.borrow().as_slice(),
            &["a acquired", "a released", "b acquired", "b released"]
        );
        assert_eq!(
            ssp.wire_log().as_slice(),
            &[0xA1, 0xA2, 0xA3, 0xA4, 0xB1, 0xB2, 0xB3, 0xB4]
        );
    }

    #[test]
    fn test_acquire_times_out_while_held() {
        let ssp = SimSsp::default();
        let arbiter = arbiter(&ssp);

        let held = arbiter.try_acquire().unwrap();
        assert!(matches!(arbiter.try_acquire(), Err(Error::LockTimeout)));
        let result = block_on(arbiter.acquire_timeout(Duration::from_millis(20)));
        assert!(matches!(result, Err(Error::LockTimeout)));

        drop(held);
        assert!(block_on(arbiter.acquire_timeout(Duration::from_millis(20))).is_ok());
    }

    #[test]
    fn test_unbounded_acquire_on_free_lock() {
        let ssp = SimSsp::default();
        let arbiter = arbiter(&ssp);

        let mut bus = block_on(arbiter.acquire_timeout(Duration::MAX)).unwrap();
        assert_eq!(bus.exchange_byte_timeout(0x9F, Duration::MAX), Ok(0xFF));
        bus.release();
        assert!(arbiter.try_acquire().is_ok());
    }

    #[test]
    fn test_error_path_releases_lock_and_chip_select() {
        let ssp = SimSsp::default();
        let arbiter = arbiter(&ssp);
        let mut cs = ssp.chip_select();
        ssp.set_stuck(true);

        let result = block_on(arbiter.transaction(&mut cs, |bus| {
            bus.exchange_byte_timeout(0x9F, Duration::from_millis(2))
        }));

        assert_eq!(result, Err(Error::BusTimeout));
        assert!(!ssp.is_selected());
        assert!(arbiter.try_acquire().is_ok());
    }

    #[test]
    fn test_spi_bus_transfer() {
        let ssp = SimSsp::default();
        let arbiter = arbiter(&ssp);
        let mut cs = ssp.chip_select();

        let id = block_on(arbiter.transaction(&mut cs, |bus| {
            let mut id = [0u8; 3];
            bus.transfer(&mut id, &[0x9F])?;
            Ok(id)
        }))
        .unwrap();

        // First byte is the response to the command itself
        assert_eq!(id, [0xFF, 0x1F, 0x26]);
        assert_eq!(ssp.wire_log().as_slice(), &[0x9F, 0xFF, 0xFF]);
    }
}
