use crate::hal;
use crate::hal::pac;
use crate::hal::rcc::PeripheralREC;
use crate::hal::rcc::RccExt;

use crate::clocks::{self, Clocks};
use crate::error::Error;
use crate::led;
use crate::mco;
use crate::pins;


// - global static state ------------------------------------------------------

// `no_mangle` is used here to prevent linking different minor
// versions of this crate as that would let you `take` the board
// more than once (one per minor version)
#[no_mangle]
static OPENH743_BOARD: () = ();

/// Set to `true` when `take` was called to make `Board` a singleton.
static mut TAKEN: bool = false;


// - Ccdr ---------------------------------------------------------------------

/// Core clock distribution after bring-up
pub struct Ccdr {
    pub clocks: Clocks,
    /// Enable / reset control for the peripherals, the GPIO ports in
    /// particular
    pub peripheral: PeripheralREC,
}


// - Board --------------------------------------------------------------------

pub struct Board;

impl Board {
    #[inline]
    pub fn take() -> Option<Self> {
        cortex_m::interrupt::free(|_| {
            if unsafe { TAKEN } {
                None
            } else {
                unsafe { TAKEN = true };
                Some(unsafe { Board::steal() })
            }
        })
    }

    /// # Safety
    ///
    /// Bypasses the singleton check, the caller must not run the
    /// bring-up twice.
    #[inline]
    pub unsafe fn steal() -> Self {
        Board
    }

    /// Runs the boot sequence up to a 480 MHz `sys_ck`, see
    /// [`clocks::configure`].
    pub fn freeze_clocks(&self,
                         pwr: &pac::PWR,
                         rcc: &pac::RCC,
                         syscfg: &pac::SYSCFG,
                         flash: &pac::FLASH) -> Result<Ccdr, Error> {
        let clocks = clocks::configure(pwr, rcc, syscfg, flash)?;

        // unsafe: the RCC is programmed directly above, the HAL only
        // gets to gate and reset peripherals. `Board` is a singleton so
        // this runs once.
        let peripheral = unsafe {
            pac::Peripherals::steal().RCC.constrain().steal_peripheral_rec()
        };

        Ok(Ccdr { clocks, peripheral })
    }

    /// Takes the board's GPIO peripherals and split them into ZST's
    /// representing the individual GPIO pins used by the board.
    pub fn split_gpios(&self,
                       gpioa: hal::gpio::gpioa::Parts,
                       gpiob: hal::gpio::gpiob::Parts,
                       gpioc: hal::gpio::gpioc::Parts,
                       gpioh: hal::gpio::gpioh::Parts,
                       gpioi: hal::gpio::gpioi::Parts) -> pins::Pins {
        pins::Pins::new(gpioa, gpiob, gpioc, gpioh, gpioi)
    }

    pub fn split_led_user(&self, pins: pins::user_leds::Pins) -> pins::user_leds::Type {
        led::new(pins)
    }

    /// Routes the MCO1 and MCO2 clocks out to PA8 and PC9.
    pub fn enable_mco(&self,
                      rcc: &pac::RCC,
                      syscfg: &pac::SYSCFG,
                      pins: pins::mco::Pins,
                      clocks: &mut Clocks) -> Result<mco::Mco, Error> {
        mco::configure(rcc, syscfg, pins, clocks)
    }
}
