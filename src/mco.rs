//! Microcontroller clock outputs
//!
//!   MCO1  --------------> PA8     HSI        /1  =  64 MHz
//!   MCO2  --------------> PC9     pll1_p_ck  /5  =  96 MHz
//!
//! Both pins run in alternate function 0, push-pull, very high speed.
//! The clock on either pin must stay below the 100 MHz the I/O can
//! drive. See RM0433 8.5.4 "Clock output generation (MCO1/MCO2)".

use crate::clocks::{Clocks, CSI};
use crate::error::Error;
use crate::hal::gpio::{self, Speed};
use crate::hal::pac;
use crate::hal::time::Hertz;
use crate::pins;
use crate::poll::wait_until;


// - constants ----------------------------------------------------------------

/// Highest frequency the MCO pins can drive
pub const MCO_PIN_MAX: u32 = 100_000_000;

pub const MCO1: Route<Mco1Source> = Route {
    source: Mco1Source::Hsi,
    prescaler: McoPrescaler::new_or_bypass(1),
};

pub const MCO2: Route<Mco2Source> = Route {
    source: Mco2Source::Pll1P,
    prescaler: McoPrescaler::new_or_bypass(5),
};


// - types --------------------------------------------------------------------

/// RCC_CFGR.MCO1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mco1Source {
    Hsi = 0b000,
    Lse = 0b001,
    Hse = 0b010,
    Pll1Q = 0b011,
    Hsi48 = 0b100,
}

/// RCC_CFGR.MCO2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mco2Source {
    SysCk = 0b000,
    Pll2P = 0b001,
    Hse = 0b010,
    Pll1P = 0b011,
    Csi = 0b100,
    Lsi = 0b101,
}

impl Mco1Source {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(Mco1Source::Hsi),
            0b001 => Some(Mco1Source::Lse),
            0b010 => Some(Mco1Source::Hse),
            0b011 => Some(Mco1Source::Pll1Q),
            0b100 => Some(Mco1Source::Hsi48),
            _ => None,
        }
    }

    /// Frequency of the source, `None` if it is off or not tracked (LSE).
    pub fn frequency(self, clocks: &Clocks) -> Option<Hertz> {
        match self {
            Mco1Source::Hsi => clocks.hsi_ck(),
            Mco1Source::Lse => None,
            Mco1Source::Hse => clocks.hse_ck(),
            Mco1Source::Pll1Q => clocks.pll1_q_ck(),
            Mco1Source::Hsi48 => clocks.hsi48_ck(),
        }
    }
}

impl Mco2Source {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(Mco2Source::SysCk),
            0b001 => Some(Mco2Source::Pll2P),
            0b010 => Some(Mco2Source::Hse),
            0b011 => Some(Mco2Source::Pll1P),
            0b100 => Some(Mco2Source::Csi),
            0b101 => Some(Mco2Source::Lsi),
            _ => None,
        }
    }

    /// Frequency of the source, `None` if it is off or not tracked
    /// (PLL2, LSI).
    pub fn frequency(self, clocks: &Clocks) -> Option<Hertz> {
        match self {
            Mco2Source::SysCk => Some(clocks.sys_ck()),
            Mco2Source::Pll2P => None,
            Mco2Source::Hse => clocks.hse_ck(),
            Mco2Source::Pll1P => clocks.pll1_p_ck(),
            Mco2Source::Csi => clocks.csi_ck(),
            Mco2Source::Lsi => None,
        }
    }
}

/// MCOxPRE divider, 1 - 15.
///
/// The hardware also accepts 0 ("prescaler disabled", the reset value)
/// which is never written here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct McoPrescaler(u8);

impl McoPrescaler {
    pub const fn new(div: u8) -> Option<Self> {
        match div {
            1..=15 => Some(McoPrescaler(div)),
            _ => None,
        }
    }

    /// For constants: out of range dividers fall back to 1.
    const fn new_or_bypass(div: u8) -> Self {
        match Self::new(div) {
            Some(pre) => pre,
            None => McoPrescaler(1),
        }
    }

    pub const fn div(self) -> u8 {
        self.0
    }

    /// The register encoding is the divider itself.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route<S> {
    pub source: S,
    pub prescaler: McoPrescaler,
}

/// Frequency on the pin for a source running at `source`.
pub fn output_frequency(source: Option<Hertz>, prescaler: McoPrescaler) -> Result<Hertz, Error> {
    let source = source.ok_or(Error::McoSourceOff)?;
    let output = source.raw() / prescaler.div() as u32;
    if output > MCO_PIN_MAX {
        return Err(Error::McoTooFast(output));
    }
    Ok(Hertz::from_raw(output))
}


// - Mco ----------------------------------------------------------------------

/// The configured MCO pins. Dropping it leaves the outputs running.
pub struct Mco {
    pub mco1: gpio::gpioa::PA8<gpio::Alternate<0>>,
    pub mco2: gpio::gpioc::PC9<gpio::Alternate<0>>,
}


// - configure ----------------------------------------------------------------

/// Turns on CSI and the I/O compensation cell, recommended for outputs
/// toggling above 50 MHz.
pub fn enable_io_compensation(rcc: &pac::RCC, syscfg: &pac::SYSCFG) -> Result<(), Error> {
    rcc.cr.modify(|_, w| w.csion().on());
    wait_until(Error::CsiNotReady, || rcc.cr.read().csirdy().is_ready())?;

    rcc.apb4enr.modify(|_, w| w.syscfgen().enabled());
    syscfg.cccsr.modify(|_, w| w.en().set_bit().cs().clear_bit().hslv().clear_bit());
    wait_until(Error::CompensationNotReady, || syscfg.cccsr.read().ready().bit_is_set())?;

    Ok(())
}

/// Routes [`MCO1`] and [`MCO2`] to PA8 and PC9 and records the output
/// frequencies in `clocks`.
pub fn configure(rcc: &pac::RCC,
                 syscfg: &pac::SYSCFG,
                 pins: pins::mco::Pins,
                 clocks: &mut Clocks) -> Result<Mco, Error> {
    // check both routes before touching the hardware
    let mco1_ck = output_frequency(MCO1.source.frequency(clocks), MCO1.prescaler)?;
    let mco2_ck = output_frequency(MCO2.source.frequency(clocks), MCO2.prescaler)?;

    enable_io_compensation(rcc, syscfg)?;
    clocks.csi_ck = Some(Hertz::from_raw(CSI));

    // route the clocks while the pins are still analog, they only reach
    // PA8 / PC9 once AF0 is selected
    rcc.cfgr.modify(|_, w| unsafe {
        w.mco1().bits(MCO1.source.bits())
         .mco1pre().bits(MCO1.prescaler.bits())
         .mco2().bits(MCO2.source.bits())
         .mco2pre().bits(MCO2.prescaler.bits())
    });

    let mco1 = pins.mco1.into_alternate::<0>().speed(Speed::VeryHigh);
    let mco2 = pins.mco2.into_alternate::<0>().speed(Speed::VeryHigh);

    clocks.mco1_ck = Some(mco1_ck);
    clocks.mco2_ck = Some(mco2_ck);
    info!("mco: MCO1 (PA8) {=u32} Hz, MCO2 (PC9) {=u32} Hz", mco1_ck.raw(), mco2_ck.raw());

    Ok(Mco { mco1, mco2 })
}


// - tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_routes() {
        let clocks = Clocks::expected();

        let mco1 = output_frequency(MCO1.source.frequency(&clocks), MCO1.prescaler);
        let mco2 = output_frequency(MCO2.source.frequency(&clocks), MCO2.prescaler);
        assert_eq!(mco1.map(|f| f.raw()), Ok(64_000_000));
        assert_eq!(mco2.map(|f| f.raw()), Ok(96_000_000));

        assert_eq!(MCO1.source.bits(), 0b000);
        assert_eq!(MCO1.prescaler.bits(), 1);
        assert_eq!(MCO2.source.bits(), 0b011);
        assert_eq!(MCO2.prescaler.bits(), 0b0101);
    }

    #[test]
    fn undivided_sys_ck_is_too_fast_for_the_pin() {
        let clocks = Clocks::expected();
        let pre = McoPrescaler::new(1).unwrap();
        assert_eq!(
            output_frequency(Mco2Source::SysCk.frequency(&clocks), pre),
            Err(Error::McoTooFast(480_000_000))
        );
    }

    #[test]
    fn pin_limit_is_inclusive() {
        let pre = McoPrescaler::new(1).unwrap();
        let hz = |f| Some(Hertz::from_raw(f));

        assert_eq!(output_frequency(hz(MCO_PIN_MAX), pre).map(|f| f.raw()), Ok(MCO_PIN_MAX));
        assert_eq!(output_frequency(hz(MCO_PIN_MAX + 1), pre),
                   Err(Error::McoTooFast(MCO_PIN_MAX + 1)));
        // dividing brings a fast source back under the limit
        let pre = McoPrescaler::new(5).unwrap();
        assert_eq!(output_frequency(hz(5 * MCO_PIN_MAX), pre).map(|f| f.raw()), Ok(MCO_PIN_MAX));
    }

    #[test]
    fn stopped_source_is_rejected() {
        let clocks = Clocks::expected();
        let pre = McoPrescaler::new(2).unwrap();
        // CSI is only started with the compensation cell
        assert_eq!(output_frequency(Mco2Source::Csi.frequency(&clocks), pre),
                   Err(Error::McoSourceOff));
        assert_eq!(output_frequency(Mco1Source::Lse.frequency(&clocks), pre),
                   Err(Error::McoSourceOff));
        // LSI and LSE are not tracked in `Clocks`
        assert_eq!(output_frequency(Mco2Source::Lsi.frequency(&clocks), pre),
                   Err(Error::McoSourceOff));
    }

    #[test]
    fn prescaler_range() {
        assert_eq!(McoPrescaler::new(0), None);
        assert_eq!(McoPrescaler::new(16), None);
        assert_eq!(McoPrescaler::new(15).map(McoPrescaler::bits), Some(15));
    }

    #[test]
    fn source_encodings_round_trip_through_the_field() {
        assert_eq!(Mco1Source::from_bits(0b100), Some(Mco1Source::Hsi48));
        assert_eq!(Mco1Source::from_bits(0b101), None);
        assert_eq!(Mco2Source::from_bits(0b101), Some(Mco2Source::Lsi));
        assert_eq!(Mco2Source::from_bits(0b110), None);
    }
}
