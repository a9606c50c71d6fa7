//! Board support crate for the Waveshare OpenH743-C (STM32H743IIT6)
//!
//! Brings the part up from reset to a 480 MHz system clock fed by the
//! 25 MHz HSE crystal, exposes internal clocks on the MCO pins and
//! drives the four user LEDs.
//!
//! # Usage - see src/main.rs
//!
//! ```ignore
//! let board = openh743::Board::take().unwrap();
//! let dp = openh743::pac::Peripherals::take().unwrap();
//!
//! let ccdr = board.freeze_clocks(&dp.PWR, &dp.RCC, &dp.SYSCFG, &dp.FLASH)?;
//! let gpioa = dp.GPIOA.split(ccdr.peripheral.GPIOA);
//! ```

#![no_std]

pub use stm32h7xx_hal as hal;
pub use hal::hal as embedded_hal;
pub use hal::pac;


// - modules ------------------------------------------------------------------

#[macro_use]
mod log;

pub mod blink;
pub mod board;
pub mod clocks;
pub mod error;
pub mod flash;
pub mod led;
pub mod mco;
pub mod pins;
pub mod pll;
pub mod poll;
pub mod power;
pub mod snapshot;

pub use board::Board;
pub use clocks::configure as configure_clocks;
pub use clocks::Clocks;
pub use error::Error;
