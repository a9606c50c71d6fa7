use crate::error::Error;
use crate::flash;
use crate::hal::pac;
use crate::hal::time::Hertz;
use crate::pll::{self, InputRange, Pll1Config, VcoRange};
use crate::poll::wait_until;
use crate::power;


// - constants ----------------------------------------------------------------

/// X1, 25 MHz crystal
pub const HSE: u32 = 25_000_000;
pub const HSI: u32 = 64_000_000;
pub const CSI: u32 = 4_000_000;
pub const HSI48: u32 = 48_000_000;

pub const SYS_CK: u32 = 480_000_000;

/// D1CPRE, sys_ck -> c_ck
pub const D1CPRE: u16 = 1;
/// HPRE, c_ck -> hclk / aclk
pub const HPRE: u16 = 2;
/// D1PPRE, hclk -> pclk3
pub const PPRE3: u8 = 2;
/// D2PPRE1, hclk -> pclk1
pub const PPRE1: u8 = 2;
/// D2PPRE2, hclk -> pclk2
pub const PPRE2: u8 = 2;
/// D3PPRE, hclk -> pclk4
pub const PPRE4: u8 = 2;

const _: () = assert!(pll::PLL1.p_ck(HSE) == SYS_CK);


// - types --------------------------------------------------------------------

/// RCC_CFGR.SW / SWS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SysClkSource {
    Hsi = 0b000,
    Csi = 0b001,
    Hse = 0b010,
    Pll1 = 0b011,
}

impl SysClkSource {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b000 => Some(SysClkSource::Hsi),
            0b001 => Some(SysClkSource::Csi),
            0b010 => Some(SysClkSource::Hse),
            0b011 => Some(SysClkSource::Pll1),
            _ => None,
        }
    }
}


// - prescaler encodings ------------------------------------------------------

/// HPRE / D1CPRE encoding of a divider.
pub const fn ahb_bits(div: u16) -> Option<u8> {
    match div {
        1 => Some(0b0000),
        2 => Some(0b1000),
        4 => Some(0b1001),
        8 => Some(0b1010),
        16 => Some(0b1011),
        64 => Some(0b1100),
        128 => Some(0b1101),
        256 => Some(0b1110),
        512 => Some(0b1111),
        _ => None,
    }
}

/// Divider selected by an HPRE / D1CPRE field. Values below 0b1000 do
/// not divide.
pub const fn ahb_div(bits: u8) -> u16 {
    match bits & 0b1111 {
        0b1000 => 2,
        0b1001 => 4,
        0b1010 => 8,
        0b1011 => 16,
        0b1100 => 64,
        0b1101 => 128,
        0b1110 => 256,
        0b1111 => 512,
        _ => 1,
    }
}

/// DxPPRE encoding of a divider.
pub const fn apb_bits(div: u8) -> Option<u8> {
    match div {
        1 => Some(0b000),
        2 => Some(0b100),
        4 => Some(0b101),
        8 => Some(0b110),
        16 => Some(0b111),
        _ => None,
    }
}

/// Divider selected by a DxPPRE field. Values below 0b100 do not divide.
pub const fn apb_div(bits: u8) -> u8 {
    match bits & 0b111 {
        0b100 => 2,
        0b101 => 4,
        0b110 => 8,
        0b111 => 16,
        _ => 1,
    }
}

/// Timer kernel clock of an APB domain (RM0433 Table 55).
///
/// With TIMPRE cleared it is the APB clock, doubled whenever the APB
/// prescaler divides. With TIMPRE set it is `hclk` up to a divider of 4,
/// four times the APB clock beyond that.
pub const fn timer_ker_ck(hclk: u32, ppre: u8, timpre: bool) -> u32 {
    match (timpre, ppre) {
        (false, 1) | (true, 1) | (true, 2) | (true, 4) => hclk,
        (false, _) => (hclk / ppre as u32) * 2,
        (true, _) => (hclk / ppre as u32) * 4,
    }
}

const fn bits_or_zero(bits: Option<u8>) -> u8 {
    match bits {
        Some(bits) => bits,
        None => 0,
    }
}

pub(crate) const D1CPRE_BITS: u8 = bits_or_zero(ahb_bits(D1CPRE));
pub(crate) const HPRE_BITS: u8 = bits_or_zero(ahb_bits(HPRE));
pub(crate) const PPRE1_BITS: u8 = bits_or_zero(apb_bits(PPRE1));
pub(crate) const PPRE2_BITS: u8 = bits_or_zero(apb_bits(PPRE2));
pub(crate) const PPRE3_BITS: u8 = bits_or_zero(apb_bits(PPRE3));
pub(crate) const PPRE4_BITS: u8 = bits_or_zero(apb_bits(PPRE4));

const _: () = assert!(ahb_bits(D1CPRE).is_some() && ahb_bits(HPRE).is_some());
const _: () = assert!(apb_bits(PPRE1).is_some() && apb_bits(PPRE2).is_some());
const _: () = assert!(apb_bits(PPRE3).is_some() && apb_bits(PPRE4).is_some());


// - Clocks -------------------------------------------------------------------

/// Frozen clock frequencies
///
/// Produced by [`configure`], or by decoding the RCC registers with
/// [`Clocks::read_back`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Clocks {
    pub(crate) hse_ck: Option<Hertz>,
    pub(crate) hsi_ck: Option<Hertz>,
    pub(crate) csi_ck: Option<Hertz>,
    pub(crate) hsi48_ck: Option<Hertz>,
    pub(crate) pll1_p_ck: Option<Hertz>,
    pub(crate) pll1_q_ck: Option<Hertz>,
    pub(crate) pll1_r_ck: Option<Hertz>,
    pub(crate) sys_ck: Hertz,
    pub(crate) c_ck: Hertz,
    pub(crate) hclk: Hertz,
    pub(crate) pclk1: Hertz,
    pub(crate) pclk2: Hertz,
    pub(crate) pclk3: Hertz,
    pub(crate) pclk4: Hertz,
    pub(crate) ppre1: u8,
    pub(crate) ppre2: u8,
    pub(crate) ppre3: u8,
    pub(crate) ppre4: u8,
    pub(crate) timx_ker_ck: Hertz,
    pub(crate) timy_ker_ck: Hertz,
    pub(crate) mco1_ck: Option<Hertz>,
    pub(crate) mco2_ck: Option<Hertz>,
}

impl Clocks {
    /// The clock tree [`configure`] sets up, before the MCO outputs are
    /// routed.
    pub const fn expected() -> Self {
        let pll1 = pll::PLL1;
        let sys_ck = pll1.p_ck(HSE);
        let c_ck = sys_ck / D1CPRE as u32;
        let hclk = c_ck / HPRE as u32;

        Self {
            hse_ck: Some(Hertz::from_raw(HSE)),
            hsi_ck: Some(Hertz::from_raw(HSI)),
            csi_ck: None,
            hsi48_ck: None,
            pll1_p_ck: Some(Hertz::from_raw(sys_ck)),
            pll1_q_ck: Some(Hertz::from_raw(pll1.q_ck(HSE))),
            pll1_r_ck: Some(Hertz::from_raw(pll1.r_ck(HSE))),
            sys_ck: Hertz::from_raw(sys_ck),
            c_ck: Hertz::from_raw(c_ck),
            hclk: Hertz::from_raw(hclk),
            pclk1: Hertz::from_raw(hclk / PPRE1 as u32),
            pclk2: Hertz::from_raw(hclk / PPRE2 as u32),
            pclk3: Hertz::from_raw(hclk / PPRE3 as u32),
            pclk4: Hertz::from_raw(hclk / PPRE4 as u32),
            ppre1: PPRE1,
            ppre2: PPRE2,
            ppre3: PPRE3,
            ppre4: PPRE4,
            timx_ker_ck: Hertz::from_raw(timer_ker_ck(hclk, PPRE1, false)),
            timy_ker_ck: Hertz::from_raw(timer_ker_ck(hclk, PPRE2, false)),
            mco1_ck: None,
            mco2_ck: None,
        }
    }

    /// Decodes the live RCC configuration.
    pub fn read_back(rcc: &pac::RCC) -> Self {
        crate::snapshot::RccSnapshot::read(rcc).decode(HSE)
    }

    pub fn hse_ck(&self) -> Option<Hertz> { self.hse_ck }
    pub fn hsi_ck(&self) -> Option<Hertz> { self.hsi_ck }
    pub fn csi_ck(&self) -> Option<Hertz> { self.csi_ck }
    pub fn hsi48_ck(&self) -> Option<Hertz> { self.hsi48_ck }
    pub fn pll1_p_ck(&self) -> Option<Hertz> { self.pll1_p_ck }
    pub fn pll1_q_ck(&self) -> Option<Hertz> { self.pll1_q_ck }
    pub fn pll1_r_ck(&self) -> Option<Hertz> { self.pll1_r_ck }

    /// System clock, the input to D1CPRE
    pub fn sys_ck(&self) -> Hertz { self.sys_ck }
    /// Cortex-M7 core clock
    pub fn c_ck(&self) -> Hertz { self.c_ck }
    /// AHB1,2,3,4 clock
    pub fn hclk(&self) -> Hertz { self.hclk }
    /// AXI clock, same as `hclk`
    pub fn aclk(&self) -> Hertz { self.hclk }
    /// APB1 clock
    pub fn pclk1(&self) -> Hertz { self.pclk1 }
    /// APB2 clock
    pub fn pclk2(&self) -> Hertz { self.pclk2 }
    /// APB3 clock
    pub fn pclk3(&self) -> Hertz { self.pclk3 }
    /// APB4 clock
    pub fn pclk4(&self) -> Hertz { self.pclk4 }
    pub fn ppre1(&self) -> u8 { self.ppre1 }
    pub fn ppre2(&self) -> u8 { self.ppre2 }
    pub fn ppre3(&self) -> u8 { self.ppre3 }
    pub fn ppre4(&self) -> u8 { self.ppre4 }
    /// Kernel clock of the APB1 timers
    pub fn timx_ker_ck(&self) -> Hertz { self.timx_ker_ck }
    /// Kernel clock of the APB2 timers
    pub fn timy_ker_ck(&self) -> Hertz { self.timy_ker_ck }
    pub fn mco1_ck(&self) -> Option<Hertz> { self.mco1_ck }
    pub fn mco2_ck(&self) -> Option<Hertz> { self.mco2_ck }
}


// - bring-up stages ----------------------------------------------------------

/// Starts the HSE crystal and runs `sys_ck` from it while PLL1 is being
/// reprogrammed.
pub fn enable_hse(rcc: &pac::RCC) -> Result<(), Error> {
    rcc.cr.modify(|_, w| w.hseon().on().hsebyp().not_bypassed());
    wait_until(Error::HseNotReady, || rcc.cr.read().hserdy().is_ready())?;
    info!("clocks: HSE {=u32} Hz ready", HSE);

    switch_sys_ck(rcc, SysClkSource::Hse)
}

/// Programs PLL1 from HSE and waits for lock.
///
/// PLL1 must not be the `sys_ck` source when this is called.
pub fn configure_pll1(rcc: &pac::RCC, pll: &Pll1Config) -> Result<(), Error> {
    pll.validate(HSE)?;
    let range = pll.input_range(HSE).ok_or(pll::PllError::RefOutOfRange(pll.ref_ck(HSE)))?;

    // DIVM1 and the PLL1 configuration are locked while PLL1ON is set
    rcc.cr.modify(|_, w| w.pll1on().off());
    wait_until(Error::Pll1NotStopped, || rcc.cr.read().pll1rdy().is_not_ready())?;

    rcc.pllckselr.modify(|_, w| w.pllsrc().hse().divm1().bits(pll.divm_bits()));

    rcc.pll1divr.write(|w| unsafe {
        w.divn1().bits(pll.divn_bits())
         .divp1().bits(pll.divp_bits())
         .divq1().bits(pll.divq_bits())
         .divr1().bits(pll.divr_bits())
    });

    // integer mode: FRACN1 = 0, latched by the 0 -> 1 edge of PLL1FRACEN below
    rcc.pllcfgr.modify(|_, w| w.pll1fracen().clear_bit());
    rcc.pll1fracr.write(|w| w.fracn1().bits(0));

    rcc.pllcfgr.modify(|_, w| {
        let w = match range {
            InputRange::Range1To2 => w.pll1rge().range1(),
            InputRange::Range2To4 => w.pll1rge().range2(),
            InputRange::Range4To8 => w.pll1rge().range4(),
            InputRange::Range8To16 => w.pll1rge().range8(),
        };
        let w = match pll.vco_range() {
            VcoRange::Wide => w.pll1vcosel().wide_vco(),
            VcoRange::Medium => w.pll1vcosel().medium_vco(),
        };
        w.divp1en().enabled()
         .divq1en().enabled()
         .divr1en().enabled()
    });
    rcc.pllcfgr.modify(|_, w| w.pll1fracen().set_bit());

    rcc.cr.modify(|_, w| w.pll1on().on());
    wait_until(Error::Pll1NotLocked, || rcc.cr.read().pll1rdy().is_ready())?;
    info!("clocks: PLL1 locked, vco1_ck {=u32} Hz", pll.vco_ck(HSE));

    Ok(())
}

/// Sets the fixed D1/D2/D3 domain prescalers.
pub fn configure_prescalers(rcc: &pac::RCC) -> Result<(), Error> {
    rcc.d1cfgr.modify(|_, w| unsafe {
        w.d1cpre().bits(D1CPRE_BITS)
         .d1ppre().bits(PPRE3_BITS) // D1 contains APB3
         .hpre().bits(HPRE_BITS)
    });
    wait_until(Error::PrescalerNotApplied, || rcc.d1cfgr.read().d1cpre().bits() == D1CPRE_BITS)?;

    rcc.d2cfgr.modify(|_, w| unsafe {
        w.d2ppre1().bits(PPRE1_BITS) // D2 contains APB1
         .d2ppre2().bits(PPRE2_BITS) // and APB2
    });

    rcc.d3cfgr.modify(|_, w| unsafe {
        w.d3ppre().bits(PPRE4_BITS) // D3 contains APB4
    });
    debug!("clocks: prescalers d1cpre /{=u16} hpre /{=u16} ppre /{=u8}", D1CPRE, HPRE, PPRE1);

    Ok(())
}

/// Selects the `sys_ck` source and waits for the switch to complete.
pub fn switch_sys_ck(rcc: &pac::RCC, source: SysClkSource) -> Result<(), Error> {
    let bits = source.bits();
    rcc.cfgr.modify(|_, w| unsafe { w.sw().bits(bits) });
    wait_until(Error::ClockSwitch(source), || rcc.cfgr.read().sws().bits() == bits)?;
    debug!("clocks: sys_ck from {}", source);

    Ok(())
}

/// Hands `sys_ck` over to `pll1_p_ck`. Prescalers and flash wait states
/// must already suit the target frequency.
#[inline]
pub fn switch_to_pll1(rcc: &pac::RCC) -> Result<(), Error> {
    switch_sys_ck(rcc, SysClkSource::Pll1)
}


// - configure ----------------------------------------------------------------

/// Configures system clocks:
///
///   VOS0
///   HSE crystal, 25 MHz
///   PLL1 -> 480 MHz sys_ck
///   hclk 240 MHz, pclk1..4 120 MHz
///
/// Usage:
///
/// ```ignore
/// let dp = pac::Peripherals::take().unwrap();
/// let clocks = configure(&dp.PWR, &dp.RCC, &dp.SYSCFG, &dp.FLASH)?;
/// ```
pub fn configure(pwr: &pac::PWR,
                 rcc: &pac::RCC,
                 syscfg: &pac::SYSCFG,
                 flash: &pac::FLASH) -> Result<Clocks, Error> {
    let vos = power::configure(pwr, rcc, syscfg)?;
    debug_assert!(vos.max_sys_ck() >= SYS_CK);

    enable_hse(rcc)?;
    configure_pll1(rcc, &pll::PLL1)?;

    let clocks = Clocks::expected();
    configure_prescalers(rcc)?;
    flash::configure(flash, vos, clocks.aclk().raw())?;
    switch_to_pll1(rcc)?;

    info!("clocks: sys_ck {=u32} Hz, hclk {=u32} Hz",
          clocks.sys_ck().raw(), clocks.hclk().raw());

    Ok(clocks)
}


// - tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_clock_tree() {
        let clocks = Clocks::expected();

        assert_eq!(clocks.sys_ck().raw(),      480_000_000, "SCGU");
        assert_eq!(clocks.c_ck().raw(),        480_000_000, "Core");
        assert_eq!(clocks.hclk().raw(),        240_000_000, "AHB1,2,3,4");
        assert_eq!(clocks.aclk().raw(),        240_000_000, "AXI");
        assert_eq!(clocks.pclk1().raw(),       120_000_000, "APB1");
        assert_eq!(clocks.pclk2().raw(),       120_000_000, "APB2");
        assert_eq!(clocks.pclk3().raw(),       120_000_000, "APB3");
        assert_eq!(clocks.pclk4().raw(),       120_000_000, "APB4");
        assert_eq!(clocks.ppre1(), 2);
        assert_eq!(clocks.ppre4(), 2);
        assert_eq!(clocks.timx_ker_ck().raw(), 240_000_000, "APB1 timers");
        assert_eq!(clocks.timy_ker_ck().raw(), 240_000_000, "APB2 timers");

        assert_eq!(clocks.hse_ck().map(|f| f.raw()), Some(25_000_000));
        assert_eq!(clocks.pll1_p_ck().map(|f| f.raw()), Some(480_000_000));
        assert!(clocks.mco1_ck().is_none());
        assert!(clocks.mco2_ck().is_none());
    }

    #[test]
    fn prescaler_encodings() {
        assert_eq!(D1CPRE_BITS, 0b0000);
        assert_eq!(HPRE_BITS, 0b1000);
        assert_eq!(PPRE1_BITS, 0b100);
        assert_eq!(ahb_bits(3), None);
        assert_eq!(apb_bits(32), None);

        for div in [1, 2, 4, 8, 16, 64, 128, 256, 512] {
            assert_eq!(ahb_div(ahb_bits(div).unwrap()), div);
        }
        for div in [1, 2, 4, 8, 16] {
            assert_eq!(apb_div(apb_bits(div).unwrap()), div);
        }
        // low encodings are "not divided"
        assert_eq!(ahb_div(0b0111), 1);
        assert_eq!(apb_div(0b011), 1);
    }

    #[test]
    fn timer_kernel_clock_doubles_divided_apb() {
        assert_eq!(timer_ker_ck(240_000_000, 1, false), 240_000_000);
        assert_eq!(timer_ker_ck(240_000_000, 2, false), 240_000_000);
        assert_eq!(timer_ker_ck(240_000_000, 4, false), 120_000_000);

        assert_eq!(timer_ker_ck(240_000_000, 4, true), 240_000_000);
        assert_eq!(timer_ker_ck(240_000_000, 8, true), 120_000_000);
    }

    #[test]
    fn sys_ck_source_encoding() {
        assert_eq!(SysClkSource::Hse.bits(), 0b010);
        assert_eq!(SysClkSource::Pll1.bits(), 0b011);
        assert_eq!(SysClkSource::from_bits(0b011), Some(SysClkSource::Pll1));
        assert_eq!(SysClkSource::from_bits(0b111), None);
    }
}
