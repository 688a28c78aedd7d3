//! Bus exchange engine
//!
//! Drives the SSP peripheral as an 8-bit master. Each exchange is full
//! duplex: one byte out, one byte in. Protocol state (commands, dummy bytes)
//! lives entirely in the callers.

use embassy_time::{Duration, Instant};
use sjtwo_hal::ssp::{cr0, cr1, sr, MAX_PRESCALER, MIN_PRESCALER, RX_FIFO_DEPTH};
use sjtwo_hal::SspRegisters;

use crate::error::{ConfigError, Error};

/// Default bound on each busy-poll wait
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Bus clock and timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Peripheral clock feeding the prescaler (Hz)
    pub source_clock_hz: u32,
    /// Highest SCK frequency the device accepts (Hz)
    pub max_clock_hz: u32,
    /// Bound on each wait for the peripheral to go idle
    pub poll_timeout: Duration,
}

impl BusConfig {
    /// Configuration with the default poll timeout
    pub const fn new(source_clock_hz: u32, max_clock_hz: u32) -> Self {
        Self {
            source_clock_hz,
            max_clock_hz,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Compute the SSP clock prescaler
///
/// Returns the largest even integer not exceeding
/// `source_clock_hz / max_clock_hz`. The result must be at least 2 and fit
/// the 8-bit prescaler register.
pub fn compute_prescaler(source_clock_hz: u32, max_clock_hz: u32) -> Result<u32, ConfigError> {
    if source_clock_hz == 0 || max_clock_hz == 0 {
        return Err(ConfigError::ZeroClock);
    }
    let prescaler = (source_clock_hz / max_clock_hz) & !1;
    if prescaler < MIN_PRESCALER {
        return Err(ConfigError::ClockTooFast);
    }
    if prescaler > MAX_PRESCALER {
        return Err(ConfigError::ClockTooSlow);
    }
    Ok(prescaler)
}

/// Blocking byte-exchange engine over one SSP peripheral
pub struct BusEngine<R> {
    regs: R,
    prescaler: Option<u32>,
    poll_timeout: Duration,
}

impl<R: SspRegisters> BusEngine<R> {
    /// Wrap an SSP register block; call [`BusEngine::init`] before exchanging
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            prescaler: None,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    /// Configure 8-bit master mode and the clock prescaler
    ///
    /// Returns the prescaler written. On error the peripheral is left
    /// untouched.
    pub fn init(&mut self, config: &BusConfig) -> Result<u32, Error> {
        let prescaler = compute_prescaler(config.source_clock_hz, config.max_clock_hz)?;

        self.regs.write_control0(cr0::DSS_8BIT);
        // SSE set, MS clear: enabled as master, no loopback
        self.regs.write_control1(cr1::SSE);
        self.regs.write_prescaler(prescaler);

        self.prescaler = Some(prescaler);
        self.poll_timeout = config.poll_timeout;
        info!(
            "bus ready: prescaler {}, sck {} Hz",
            prescaler,
            config.source_clock_hz / prescaler
        );
        Ok(prescaler)
    }

    /// Prescaler in effect, if initialized
    pub fn prescaler(&self) -> Option<u32> {
        self.prescaler
    }

    /// Exchange one byte using the configured poll timeout
    pub fn exchange_byte(&mut self, out: u8) -> Result<u8, Error> {
        self.exchange_byte_timeout(out, self.poll_timeout)
    }

    /// Exchange one byte, bounding each busy-wait by `timeout`
    ///
    /// Waits for the peripheral to go idle, writes `out`, waits for the frame
    /// to complete and returns the byte received during it. `Duration::MAX`
    /// waits without a bound.
    pub fn exchange_byte_timeout(&mut self, out: u8, timeout: Duration) -> Result<u8, Error> {
        if self.prescaler.is_none() {
            return Err(ConfigError::NotInitialized.into());
        }

        self.wait_idle(timeout)?;
        // A frame that finished after an earlier timeout left its byte behind
        self.drain_rx();
        self.regs.write_data(out as u32);
        self.wait_idle(timeout)?;

        Ok(self.regs.read_data() as u8)
    }

    fn drain_rx(&self) {
        for _ in 0..RX_FIFO_DEPTH {
            if self.regs.status() & sr::RNE == 0 {
                return;
            }
            let stale = self.regs.read_data();
            debug!("dropped stale rx byte {:#x}", stale);
        }
    }

    fn wait_idle(&self, timeout: Duration) -> Result<(), Error> {
        let deadline = Instant::now().saturating_add(timeout);
        while self.regs.is_busy() {
            if Instant::now() >= deadline {
                warn!("bus busy for more than {} us", timeout.as_micros());
                return Err(Error::BusTimeout);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ChipSelect;
    use crate::sim::SimSsp;
    use proptest::prelude::*;

    const SOURCE_HZ: u32 = 48_000_000;

    fn engine(ssp: &SimSsp) -> BusEngine<&SimSsp> {
        let mut engine = BusEngine::new(ssp);
        engine.init(&BusConfig::new(SOURCE_HZ, 24_000_000)).unwrap();
        engine
    }

    #[test]
    fn test_prescaler_for_24mhz_from_48mhz() {
        assert_eq!(compute_prescaler(SOURCE_HZ, 24_000_000), Ok(2));
    }

    #[test]
    fn test_prescaler_rounds_down_to_even() {
        // 48 / 10 = 4.8 -> 4
        assert_eq!(compute_prescaler(SOURCE_HZ, 10_000_000), Ok(4));
        // 48 / 7 = 6.86 -> 6
        assert_eq!(compute_prescaler(SOURCE_HZ, 7_000_000), Ok(6));
        // 48 / 16 = 3 -> 2
        assert_eq!(compute_prescaler(SOURCE_HZ, 16_000_000), Ok(2));
    }

    #[test]
    fn test_prescaler_rejects_unreachable_clocks() {
        assert_eq!(compute_prescaler(SOURCE_HZ, 48_000_000), Err(ConfigError::ClockTooFast));
        assert_eq!(compute_prescaler(SOURCE_HZ, 30_000_000), Err(ConfigError::ClockTooFast));
        assert_eq!(compute_prescaler(SOURCE_HZ, 100_000), Err(ConfigError::ClockTooSlow));
        assert_eq!(compute_prescaler(SOURCE_HZ, 0), Err(ConfigError::ZeroClock));
    }

    #[test]
    fn test_init_programs_registers() {
        let ssp = SimSsp::default();
        let engine = engine(&ssp);

        assert_eq!(engine.prescaler(), Some(2));
        assert_eq!(ssp.control0(), 0x7);
        assert_eq!(ssp.control1(), 1 << 1);
        assert_eq!(ssp.prescaler(), 2);
    }

    #[test]
    fn test_init_failure_leaves_peripheral_untouched() {
        let ssp = SimSsp::default();
        let mut engine = BusEngine::new(&ssp);

        assert_eq!(
            engine.init(&BusConfig::new(SOURCE_HZ, 48_000_000)),
            Err(Error::InvalidConfiguration(ConfigError::ClockTooFast))
        );
        assert_eq!(ssp.control1(), 0);
        assert_eq!(engine.exchange_byte(0x9F), Err(Error::InvalidConfiguration(ConfigError::NotInitialized)));
    }

    #[test]
    fn test_read_id_sequence() {
        let ssp = SimSsp::default();
        ssp.set_busy_cycles(3);
        let mut engine = engine(&ssp);

        let mut rx = [0u8; 5];
        for (slot, out) in rx.iter_mut().zip([0x9F, 0xFF, 0xFF, 0xFF, 0xFF]) {
            *slot = engine.exchange_byte(out).unwrap();
        }

        assert_eq!(&rx[1..], &[0x1F, 0x26, 0x00, 0x00]);
        assert_eq!(ssp.wire_log().as_slice(), &[0x9F, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_stuck_peripheral_times_out() {
        let ssp = SimSsp::default();
        let mut engine = engine(&ssp);
        ssp.set_stuck(true);

        let result = engine.exchange_byte_timeout(0x9F, Duration::from_millis(5));
        assert_eq!(result, Err(Error::BusTimeout));
        // Nothing was written while busy
        assert!(ssp.wire_log().is_empty());
    }

    #[test]
    fn test_exchange_after_timeout_reads_current_frame() {
        let ssp = SimSsp::default();
        let mut engine = engine(&ssp);
        let mut cs = ssp.chip_select();
        cs.select();

        // The command frame outlives the wait and completes afterwards
        ssp.set_busy_cycles(u32::MAX);
        assert_eq!(
            engine.exchange_byte_timeout(0x9F, Duration::from_millis(2)),
            Err(Error::BusTimeout)
        );
        ssp.settle();
        ssp.set_busy_cycles(2);

        // Its response is still queued; the next exchange must not return it
        assert_eq!(engine.exchange_byte(0xFF), Ok(0x1F));
        assert_eq!(engine.exchange_byte(0xFF), Ok(0x26));
        assert_eq!(ssp.wire_log().as_slice(), &[0x9F, 0xFF, 0xFF]);
    }

    #[test]
    fn test_unbounded_poll_timeout() {
        let ssp = SimSsp::default();
        let mut engine = engine(&ssp);
        ssp.set_busy_cycles(5);

        assert_eq!(engine.exchange_byte_timeout(0x9F, Duration::MAX), Ok(0xFF));
    }

    proptest! {
        #[test]
        fn prop_prescaler_even_and_bounded(source in 1u32..=120_000_000, max in 1u32..=120_000_000) {
            match compute_prescaler(source, max) {
                Ok(p) => {
                    prop_assert_eq!(p % 2, 0);
                    prop_assert!((MIN_PRESCALER..=MAX_PRESCALER).contains(&p));
                    prop_assert!(p <= source / max);
                    prop_assert!(p + 2 > source / max);
                }
                Err(ConfigError::ClockTooFast) => prop_assert!(source / max < 2),
                Err(ConfigError::ClockTooSlow) => prop_assert!(source / max > MAX_PRESCALER + 1),
                Err(other) => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }
}
