//! SJ-Two board bring-up
//!
//! Owns the static register blocks: the GPIO port accessors, the edge
//! interrupt dispatchers for ports 0 and 2 and the SSP2 bus arbiter shared by
//! every flash reader.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use static_cell::StaticCell;

use sjtwo_core::bus::{BusArbiter, BusEngine, GpioChipSelect};
use sjtwo_core::config::{BoardConfig, PinConfig, LED_COUNT};
use sjtwo_core::interrupt::{Dispatcher, InterruptHandler};
use sjtwo_core::pin::{InputPin, OutputPin, PinAccessor};
use sjtwo_core::{ConfigError, Error};
use sjtwo_hal_lpc40xx::gpio::PORT_COUNT;
use sjtwo_hal_lpc40xx::syscon::{self, ssp2_pins, PowerDomain};
use sjtwo_hal_lpc40xx::{GpioInterrupts, GpioPort, PinAllocator, Port, Ssp, SspInstance};

/// Core clock as left by the clock setup that runs before `main`
pub const CORE_CLOCK_HZ: u32 = 96_000_000;

/// Pin accessor for one GPIO port
pub type Gpio = PinAccessor<GpioPort>;
/// Edge interrupt dispatcher for port 0 or 2
pub type GpioDispatcher = Dispatcher<CriticalSectionRawMutex, GpioInterrupts>;
/// SSP2 bus shared by the flash readers
pub type FlashBus = BusArbiter<CriticalSectionRawMutex, Ssp>;
/// Flash chip select on a GPIO pin
pub type FlashChipSelect = GpioChipSelect<'static, GpioPort>;
/// LED output
pub type Led = OutputPin<'static, GpioPort>;
/// Push button input
pub type Button = InputPin<'static, GpioPort>;

// SAFETY: each port gets exactly one accessor, and every accessor does its
// read-modify-write inside a critical section.
static PORTS: [Gpio; PORT_COUNT] = unsafe {
    [
        PinAccessor::new(GpioPort::steal(Port::P0)),
        PinAccessor::new(GpioPort::steal(Port::P1)),
        PinAccessor::new(GpioPort::steal(Port::P2)),
        PinAccessor::new(GpioPort::steal(Port::P3)),
        PinAccessor::new(GpioPort::steal(Port::P4)),
        PinAccessor::new(GpioPort::steal(Port::P5)),
    ]
};

// SAFETY: the dispatchers are the only owners of the interrupt blocks.
static GPIO0_INTERRUPTS: GpioDispatcher = Dispatcher::new(unsafe { GpioInterrupts::port0() });
static GPIO2_INTERRUPTS: GpioDispatcher = Dispatcher::new(unsafe { GpioInterrupts::port2() });

static FLASH_BUS: StaticCell<FlashBus> = StaticCell::new();
static FLASH_CS: StaticCell<FlashChipSelect> = StaticCell::new();

/// Handles to everything the tasks use
pub struct Board {
    /// LED0 and LED1, both off
    pub leds: [Led; LED_COUNT],
    /// Initialized SSP2 bus
    pub flash_bus: &'static FlashBus,
    /// Chip select shared by every flash reader
    pub flash_cs: &'static FlashChipSelect,
    /// Button whose edge interrupt is registered separately
    pub button: Button,
}

impl Board {
    /// Validate `config`, power the peripherals and claim every pin
    ///
    /// Must be called once, before the GPIO interrupt is unmasked.
    pub fn init(config: &BoardConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut pins = PinAllocator::new();
        // The SSP2 pins are claimed too so no GPIO role can alias them
        for (port, pin) in ssp2_pins::PINS {
            pins.allocate(port.number(), pin)?;
        }

        syscon::power_on(PowerDomain::Gpio);
        ssp2_pins::configure();

        // SAFETY: SSP2 is only ever reached through the arbiter below
        let ssp = unsafe { Ssp::steal(SspInstance::Ssp2) };
        ssp.power_on();
        let mut engine = BusEngine::new(ssp);
        engine.init(&config.bus_config())?;
        let flash_bus = FLASH_BUS.init(BusArbiter::new(engine, config.lock_timeout()));

        let (port, pin) = claim(&mut pins, config.flash_cs)?;
        let cs = GpioChipSelect::new(port.output(pin, config.flash_cs.inverted)?, config.flash_cs.inverted);
        let flash_cs: &'static FlashChipSelect = FLASH_CS.init(cs);

        let leds = [led(&mut pins, config.leds[0])?, led(&mut pins, config.leds[1])?];

        let (port, pin) = claim(&mut pins, config.button.pin)?;
        let button = port.input(pin)?;

        info!("board ready: {} pins claimed", pins.allocated_count());
        Ok(Self {
            leds,
            flash_bus,
            flash_cs,
            button,
        })
    }
}

/// Register `handler` for an edge on a pin of port 0 or 2
pub fn register_interrupt(
    pin: PinConfig,
    edge: sjtwo_core::Edge,
    handler: &'static dyn InterruptHandler,
) -> Result<(), Error> {
    dispatcher(pin.port)?.register_interrupt(pin.pin, edge, handler)
}

/// Shared GPIO interrupt entry point for ports 0 and 2
pub fn on_gpio_interrupt() {
    let port0 = GPIO0_INTERRUPTS.dispatch();
    let port2 = GPIO2_INTERRUPTS.dispatch();
    trace!(
        "gpio irq: port0 {:#x} port2 {:#x}",
        port0.pending,
        port2.pending
    );
}

fn dispatcher(port: u8) -> Result<&'static GpioDispatcher, Error> {
    match port {
        0 => Ok(&GPIO0_INTERRUPTS),
        2 => Ok(&GPIO2_INTERRUPTS),
        other => Err(ConfigError::NotInterruptCapable(other).into()),
    }
}

fn led(pins: &mut PinAllocator, config: PinConfig) -> Result<Led, Error> {
    let (port, pin) = claim(pins, config)?;
    // Start with the LED off
    port.output(pin, config.inverted)
}

fn claim(pins: &mut PinAllocator, pin: PinConfig) -> Result<(&'static Gpio, u8), Error> {
    let (port, id) = pins.allocate(pin.port, pin.pin)?;
    Ok((&PORTS[port.number() as usize], id.index()))
}
