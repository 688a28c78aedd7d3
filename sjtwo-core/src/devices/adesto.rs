//! Adesto SPI flash
//!
//! Only the JEDEC Read-ID sequence is implemented: command `0x9F` followed by
//! four dummy bytes, each of which clocks one identification byte back.

use embassy_sync::blocking_mutex::raw::RawMutex;
use sjtwo_hal::SspRegisters;

use crate::bus::{BusArbiter, BusTransaction, ChipSelect};
use crate::error::Error;

/// JEDEC Read Manufacturer and Device ID
pub const READ_ID_COMMAND: u8 = 0x9F;

/// Byte clocked out while reading
pub const DUMMY_BYTE: u8 = 0xFF;

/// JEDEC manufacturer code assigned to Adesto
pub const ADESTO_MANUFACTURER_ID: u8 = 0x1F;

/// Identification bytes returned by Read-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlashSignature {
    /// JEDEC manufacturer code
    pub manufacturer_id: u8,
    /// Family code and density
    pub device_id_1: u8,
    /// Sub-code and product variant
    pub device_id_2: u8,
    /// Extended device information
    pub extended_device_id: u8,
}

impl FlashSignature {
    /// Whether the manufacturer byte is Adesto's
    pub fn is_adesto(&self) -> bool {
        self.manufacturer_id == ADESTO_MANUFACTURER_ID
    }
}

/// Adesto flash behind a chip select
pub struct AdestoFlash<C> {
    cs: C,
}

impl<C: ChipSelect> AdestoFlash<C> {
    /// Driver for the flash selected by `cs`
    pub fn new(mut cs: C) -> Self {
        cs.deselect();
        Self { cs }
    }

    /// Read the signature on a bus the caller already holds
    ///
    /// Chip select is asserted for exactly the five-byte sequence.
    pub fn read_signature<M, R>(&mut self, bus: &mut BusTransaction<'_, M, R>) -> Result<FlashSignature, Error>
    where
        M: RawMutex,
        R: SspRegisters,
    {
        bus.with_device(&mut self.cs, |bus| {
            // Response to the command byte itself carries no data
            bus.exchange_byte(READ_ID_COMMAND)?;
            Ok(FlashSignature {
                manufacturer_id: bus.exchange_byte(DUMMY_BYTE)?,
                device_id_1: bus.exchange_byte(DUMMY_BYTE)?,
                device_id_2: bus.exchange_byte(DUMMY_BYTE)?,
                extended_device_id: bus.exchange_byte(DUMMY_BYTE)?,
            })
        })
    }

    /// Acquire the bus, read the signature, release the bus
    pub async fn read_signature_locked<M, R>(&mut self, arbiter: &BusArbiter<M, R>) -> Result<FlashSignature, Error>
    where
        M: RawMutex,
        R: SspRegisters,
    {
        let mut bus = arbiter.acquire().await?;
        let signature = self.read_signature(&mut bus);
        bus.release();

        match &signature {
            Ok(sig) => debug!(
                "flash signature {:x} {:x} {:x} {:x}",
                sig.manufacturer_id,
                sig.device_id_1,
                sig.device_id_2,
                sig.extended_device_id
            ),
            Err(_) => warn!("flash signature read failed"),
        }
        signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusConfig, BusEngine};
    use crate::sim::{SimFlash, SimSsp};
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_time::Duration;

    fn arbiter(ssp: &SimSsp) -> BusArbiter<CriticalSectionRawMutex, &SimSsp> {
        let mut engine = BusEngine::new(ssp);
        engine.init(&BusConfig::new(48_000_000, 24_000_000)).unwrap();
        BusArbiter::new(engine, Duration::from_millis(500))
    }

    #[test]
    fn test_read_adesto_signature() {
        let ssp = SimSsp::default();
        let arbiter = arbiter(&ssp);
        let mut flash = AdestoFlash::new(ssp.chip_select());

        let signature = block_on(flash.read_signature_locked(&arbiter)).unwrap();

        assert_eq!(
            signature,
            FlashSignature {
                manufacturer_id: 0x1F,
                device_id_1: 0x26,
                device_id_2: 0x00,
                extended_device_id: 0x00,
            }
        );
        assert!(signature.is_adesto());
        assert_eq!(ssp.wire_log().as_slice(), &[0x9F, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(!ssp.is_selected());
    }

    #[test]
    fn test_other_manufacturer() {
        let ssp = SimSsp::new(SimFlash::new(0xEF, 0x40, 0x18, 0x00));
        let arbiter = arbiter(&ssp);
        let mut flash = AdestoFlash::new(ssp.chip_select());

        let signature = block_on(flash.read_signature_locked(&arbiter)).unwrap();
        assert_eq!(signature.manufacturer_id, 0xEF);
        assert!(!signature.is_adesto());
    }

    #[test]
    fn test_back_to_back_reads_from_two_tasks() {
        let ssp = SimSsp::default();
        let arbiter = arbiter(&ssp);
        let mut first = AdestoFlash::new(ssp.chip_select());
        let mut second = AdestoFlash::new(ssp.chip_select());

        let (a, b) = block_on(join(
            first.read_signature_locked(&arbiter),
            second.read_signature_locked(&arbiter),
        ));

        assert_eq!(a, b);
        assert!(a.unwrap().is_adesto());
        assert_eq!(
            ssp.wire_log().as_slice(),
            &[0x9F, 0xFF, 0xFF, 0xFF, 0xFF, 0x9F, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_stuck_bus_deselects_and_unlocks() {
        let ssp = SimSsp::default();
        let arbiter = arbiter(&ssp);
        let mut flash = AdestoFlash::new(ssp.chip_select());
        ssp.set_stuck(true);

        let result = block_on(flash.read_signature_locked(&arbiter));

        assert_eq!(result, Err(Error::BusTimeout));
        assert!(!ssp.is_selected());
        assert!(arbiter.try_acquire().is_ok());
    }
}
