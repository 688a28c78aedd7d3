//! SJ-Two firmware
//!
//! Demo firmware for the SJ-Two (LPC4078) board:
//! - two tasks blinking LED0 and LED1
//! - two tasks reading the Adesto flash signature over the shared SSP2 bus
//! - a button on a port 0/2 pin whose edge interrupt wakes a task

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use sjtwo_core::config::BoardConfig;
use sjtwo_core::Error;
use sjtwo_hal_lpc40xx::Interrupt;

mod board;
mod tasks;
mod time_driver;
mod vectors;

use board::Board;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SJ-Two firmware starting...");

    let Some(core) = cortex_m::Peripherals::take() else {
        error!("core peripherals already taken");
        return;
    };
    time_driver::init(core.SYST, board::CORE_CLOCK_HZ);

    let config = BoardConfig::default();
    let board = match setup(&config) {
        Ok(board) => board,
        Err(e) => {
            error!("board setup failed: {}", e);
            return;
        }
    };

    let [led0, led1] = board.leds;
    unwrap!(spawner.spawn(tasks::blink_task("led0", led0)));
    unwrap!(spawner.spawn(tasks::blink_task("led1", led1)));
    unwrap!(spawner.spawn(tasks::flash_id_task("spi1", board.flash_bus, board.flash_cs)));
    unwrap!(spawner.spawn(tasks::flash_id_task("spi2", board.flash_bus, board.flash_cs)));
    unwrap!(spawner.spawn(tasks::button_task(board.button)));

    // Handlers are in place; let edges through
    // SAFETY: the dispatchers are fully constructed statics
    unsafe { cortex_m::peripheral::NVIC::unmask(Interrupt::Gpio) };

    info!("All tasks spawned, firmware running");
}

/// Bring up the board and register the button interrupt
fn setup(config: &BoardConfig) -> Result<Board, Error> {
    let board = Board::init(config)?;
    board::register_interrupt(config.button.pin, config.button.edge, &tasks::BUTTON_HANDLER)?;
    info!(
        "button on P{}.{} ({})",
        config.button.pin.port,
        config.button.pin.pin,
        config.button.edge
    );
    Ok(board)
}
