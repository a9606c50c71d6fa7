//! Raw RCC register image and its decoding into [`Clocks`].
//!
//! Recomputes the clock tree from what the hardware actually holds,
//! independently of the constants used to program it.

use crate::clocks::{self, Clocks, SysClkSource, CSI, HSI, HSI48};
use crate::hal::pac;
use crate::hal::time::Hertz;
use crate::mco::{McoPrescaler, Mco1Source, Mco2Source};


// - bit fields ---------------------------------------------------------------

mod cr {
    pub const HSIRDY: u32 = 2;
    pub const HSIDIV: (u32, u32) = (3, 2);
    pub const CSIRDY: u32 = 8;
    pub const HSI48RDY: u32 = 13;
    pub const HSERDY: u32 = 17;
    pub const PLL1RDY: u32 = 25;
}

mod cfgr {
    pub const SWS: (u32, u32) = (3, 3);
    pub const TIMPRE: u32 = 15;
    pub const MCO1PRE: (u32, u32) = (18, 4);
    pub const MCO1: (u32, u32) = (22, 3);
    pub const MCO2PRE: (u32, u32) = (25, 4);
    pub const MCO2: (u32, u32) = (29, 3);
}

mod pllckselr {
    pub const PLLSRC: (u32, u32) = (0, 2);
    pub const DIVM1: (u32, u32) = (4, 6);
}

mod pllcfgr {
    pub const PLL1FRACEN: u32 = 0;
    pub const DIVP1EN: u32 = 16;
    pub const DIVQ1EN: u32 = 17;
    pub const DIVR1EN: u32 = 18;
}

mod pll1divr {
    pub const DIVN1: (u32, u32) = (0, 9);
    pub const DIVP1: (u32, u32) = (9, 7);
    pub const DIVQ1: (u32, u32) = (16, 7);
    pub const DIVR1: (u32, u32) = (24, 7);
}

mod pll1fracr {
    pub const FRACN1: (u32, u32) = (3, 13);
}

mod dxcfgr {
    pub const HPRE: (u32, u32) = (0, 4);
    pub const D1PPRE: (u32, u32) = (4, 3);
    pub const D1CPRE: (u32, u32) = (8, 4);
    pub const D2PPRE1: (u32, u32) = (4, 3);
    pub const D2PPRE2: (u32, u32) = (8, 3);
    pub const D3PPRE: (u32, u32) = (4, 3);
}

#[inline]
const fn field(reg: u32, (shift, width): (u32, u32)) -> u32 {
    (reg >> shift) & ((1 << width) - 1)
}

#[inline]
const fn bit(reg: u32, n: u32) -> bool {
    reg & (1 << n) != 0
}

/// Fractional part resolution of FRACN1
const FRACN_SCALE: u64 = 8192;


// - RccSnapshot --------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RccSnapshot {
    pub cr: u32,
    pub cfgr: u32,
    pub pllckselr: u32,
    pub pllcfgr: u32,
    pub pll1divr: u32,
    pub pll1fracr: u32,
    pub d1cfgr: u32,
    pub d2cfgr: u32,
    pub d3cfgr: u32,
}

impl RccSnapshot {
    pub fn read(rcc: &pac::RCC) -> Self {
        Self {
            cr: rcc.cr.read().bits(),
            cfgr: rcc.cfgr.read().bits(),
            pllckselr: rcc.pllckselr.read().bits(),
            pllcfgr: rcc.pllcfgr.read().bits(),
            pll1divr: rcc.pll1divr.read().bits(),
            pll1fracr: rcc.pll1fracr.read().bits(),
            d1cfgr: rcc.d1cfgr.read().bits(),
            d2cfgr: rcc.d2cfgr.read().bits(),
            d3cfgr: rcc.d3cfgr.read().bits(),
        }
    }

    pub fn sys_ck_source(&self) -> Option<SysClkSource> {
        SysClkSource::from_bits(field(self.cfgr, cfgr::SWS) as u8)
    }

    /// Computes every clock the registers describe. `hse` is the crystal
    /// frequency, which the RCC cannot report.
    pub fn decode(&self, hse: u32) -> Clocks {
        let hz = Hertz::from_raw;

        let hsi_ck = bit(self.cr, cr::HSIRDY).then(|| hz(HSI >> field(self.cr, cr::HSIDIV)));
        let csi_ck = bit(self.cr, cr::CSIRDY).then(|| hz(CSI));
        let hsi48_ck = bit(self.cr, cr::HSI48RDY).then(|| hz(HSI48));
        let hse_ck = bit(self.cr, cr::HSERDY).then(|| hz(hse));

        // PLL1
        let pll_src = match field(self.pllckselr, pllckselr::PLLSRC) {
            0 => hsi_ck,
            1 => csi_ck,
            2 => hse_ck,
            _ => None,
        };
        let divm = field(self.pllckselr, pllckselr::DIVM1);
        let vco = match pll_src {
            Some(src) if divm != 0 && bit(self.cr, cr::PLL1RDY) => {
                let n = field(self.pll1divr, pll1divr::DIVN1) as u64 + 1;
                let frac = if bit(self.pllcfgr, pllcfgr::PLL1FRACEN) {
                    field(self.pll1fracr, pll1fracr::FRACN1) as u64
                } else {
                    0
                };
                let ref_ck = (src.raw() / divm) as u64;
                Some(ref_ck * (n * FRACN_SCALE + frac) / FRACN_SCALE)
            }
            _ => None,
        };
        let pll_out = |enable: u32, div_field: (u32, u32)| {
            let div = field(self.pll1divr, div_field) as u64 + 1;
            match vco {
                Some(vco) if bit(self.pllcfgr, enable) => Some(hz((vco / div) as u32)),
                _ => None,
            }
        };
        let pll1_p_ck = pll_out(pllcfgr::DIVP1EN, pll1divr::DIVP1);
        let pll1_q_ck = pll_out(pllcfgr::DIVQ1EN, pll1divr::DIVQ1);
        let pll1_r_ck = pll_out(pllcfgr::DIVR1EN, pll1divr::DIVR1);

        let sys_ck = match self.sys_ck_source() {
            Some(SysClkSource::Hsi) => hsi_ck,
            Some(SysClkSource::Csi) => csi_ck,
            Some(SysClkSource::Hse) => hse_ck,
            Some(SysClkSource::Pll1) => pll1_p_ck,
            None => None,
        }
        .unwrap_or(hz(0));

        // bus prescalers
        let d1cpre = clocks::ahb_div(field(self.d1cfgr, dxcfgr::D1CPRE) as u8) as u32;
        let hpre = clocks::ahb_div(field(self.d1cfgr, dxcfgr::HPRE) as u8) as u32;
        let ppre3 = clocks::apb_div(field(self.d1cfgr, dxcfgr::D1PPRE) as u8);
        let ppre1 = clocks::apb_div(field(self.d2cfgr, dxcfgr::D2PPRE1) as u8);
        let ppre2 = clocks::apb_div(field(self.d2cfgr, dxcfgr::D2PPRE2) as u8);
        let ppre4 = clocks::apb_div(field(self.d3cfgr, dxcfgr::D3PPRE) as u8);
        let timpre = bit(self.cfgr, cfgr::TIMPRE);

        let c_ck = sys_ck.raw() / d1cpre;
        let hclk = c_ck / hpre;

        let mut clocks = Clocks {
            hse_ck,
            hsi_ck,
            csi_ck,
            hsi48_ck,
            pll1_p_ck,
            pll1_q_ck,
            pll1_r_ck,
            sys_ck,
            c_ck: hz(c_ck),
            hclk: hz(hclk),
            pclk1: hz(hclk / ppre1 as u32),
            pclk2: hz(hclk / ppre2 as u32),
            pclk3: hz(hclk / ppre3 as u32),
            pclk4: hz(hclk / ppre4 as u32),
            ppre1,
            ppre2,
            ppre3,
            ppre4,
            timx_ker_ck: hz(clocks::timer_ker_ck(hclk, ppre1, timpre)),
            timy_ker_ck: hz(clocks::timer_ker_ck(hclk, ppre2, timpre)),
            mco1_ck: None,
            mco2_ck: None,
        };

        // a zero prescaler keeps the output disabled
        let mco = |source: Option<Hertz>, pre: u32| {
            McoPrescaler::new(pre as u8).and_then(|pre| source.map(|f| hz(f.raw() / pre.div() as u32)))
        };
        clocks.mco1_ck = mco(
            Mco1Source::from_bits(field(self.cfgr, cfgr::MCO1) as u8).and_then(|s| s.frequency(&clocks)),
            field(self.cfgr, cfgr::MCO1PRE),
        );
        clocks.mco2_ck = mco(
            Mco2Source::from_bits(field(self.cfgr, cfgr::MCO2) as u8).and_then(|s| s.frequency(&clocks)),
            field(self.cfgr, cfgr::MCO2PRE),
        );

        clocks
    }
}


// - tests --------------------------------------------------------------------
