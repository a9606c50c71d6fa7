#![no_std]

use core::sync::atomic::{AtomicUsize, Ordering};

use panic_probe as _;         // panic handler
use defmt_rtt as _;           // global logger

use openh743::hal::prelude::*;
use openh743::{pac, Board, Clocks};
use openh743::mco::Mco;


// - panic handler ------------------------------------------------------------

#[defmt::panic_handler]
fn panic() -> ! {
    cortex_m::asm::udf()
}


static COUNT: AtomicUsize = AtomicUsize::new(0);
defmt::timestamp!("{=usize}", {
    // NOTE(no-CAS) `timestamps` runs with interrupts disabled
    let n = COUNT.load(Ordering::Relaxed);
    COUNT.store(n + 1, Ordering::Relaxed);
    n
});


// - board initialization -----------------------------------------------------

/// Peripherals the tests inspect after bring-up
pub struct Booted {
    pub clocks: Clocks,
    pub mco: Mco,
    pub pwr: pac::PWR,
    pub rcc: pac::RCC,
    pub syscfg: pac::SYSCFG,
    pub flash: pac::FLASH,
}

/// Runs the same boot sequence as the `bringup` binary, minus the blink
/// loop.
pub fn init() -> Booted {
    defmt::debug!("initializing board");

    let board = defmt::unwrap!(Board::take());
    let dp = defmt::unwrap!(pac::Peripherals::take());

    let ccdr = defmt::unwrap!(board.freeze_clocks(&dp.PWR, &dp.RCC, &dp.SYSCFG, &dp.FLASH));
    let mut clocks = ccdr.clocks;

    let pins = board.split_gpios(
        dp.GPIOA.split(ccdr.peripheral.GPIOA),
        dp.GPIOB.split(ccdr.peripheral.GPIOB),
        dp.GPIOC.split(ccdr.peripheral.GPIOC),
        dp.GPIOH.split(ccdr.peripheral.GPIOH),
        dp.GPIOI.split(ccdr.peripheral.GPIOI),
    );
    let mco = defmt::unwrap!(board.enable_mco(&dp.RCC, &dp.SYSCFG, pins.mco, &mut clocks));

    Booted {
        clocks,
        mco,
        pwr: dp.PWR,
        rcc: dp.RCC,
        syscfg: dp.SYSCFG,
        flash: dp.FLASH,
    }
}
