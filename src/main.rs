#![no_main]
#![no_std]

use cortex_m_rt::entry;
use defmt_rtt as _; // global logger
use panic_probe as _; // panic handler

use openh743::blink::Blinker;
use openh743::hal::prelude::*;
use openh743::pac;


#[entry]
fn main() -> ! {
    // - board setup ----------------------------------------------------------

    let board = defmt::unwrap!(openh743::Board::take());
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

    // - clock outputs --------------------------------------------------------

    let _mco = defmt::unwrap!(board.enable_mco(&dp.RCC, &dp.SYSCFG, pins.mco, &mut clocks));

    let live = openh743::Clocks::read_back(&dp.RCC);
    if live != clocks {
        defmt::warn!("RCC reads back sys_ck {=u32} Hz, hclk {=u32} Hz",
                     live.sys_ck().raw(), live.hclk().raw());
    }

    // - main loop ------------------------------------------------------------

    let mut user_leds = board.split_led_user(pins.user_leds);

    Blinker::new(&clocks).run(&mut user_leds)
}
