//! PLL1 parameters
//!
//! ```text
//!   HSE 25 MHz -> DIVM1 /5 -> ref1_ck 5 MHz -> DIVN1 x192 -> vco1_ck 960 MHz
//!                                                          -> DIVP1 /2 -> pll1_p_ck 480 MHz (sys_ck)
//!                                                          -> DIVQ1 /2 -> pll1_q_ck 480 MHz
//!                                                          -> DIVR1 /2 -> pll1_r_ck 480 MHz
//! ```
//!
//! See RM0433 8.7.12 - 8.7.15 for the limits checked here.

use crate::clocks::HSE;


// - constants ----------------------------------------------------------------

/// PLL1 settings for a 480 MHz `sys_ck` from the 25 MHz crystal.
pub const PLL1: Pll1Config = match Pll1Config::new(5, 192, 2, 2, 2) {
    Ok(pll) => pll,
    Err(_) => panic!("PLL1 dividers out of range"),
};

const REF_MIN: u32 = 1_000_000;
const REF_MAX: u32 = 16_000_000;

// The board settings must be usable, checked at compile time.
const _: () = assert!(PLL1.validate(HSE).is_ok());


// - types --------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllError {
    DivM(u8),
    DivN(u16),
    DivP(u8),
    DivQ(u8),
    DivR(u8),
    /// ref1_ck outside 1 - 16 MHz
    RefOutOfRange(u32),
    /// ref1_ck too slow for the selected VCO range
    RefTooSlowForVco(u32),
    /// ref1_ck too fast for the selected VCO range
    RefTooFastForVco(u32),
    /// vco1_ck outside the selected VCO range
    VcoOutOfRange(u32),
}

/// PLL1RGE: frequency range of ref1_ck
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputRange {
    Range1To2 = 0b00,
    Range2To4 = 0b01,
    Range4To8 = 0b10,
    Range8To16 = 0b11,
}

impl InputRange {
    pub const fn for_ref_ck(hz: u32) -> Option<Self> {
        match hz {
            1_000_000..=1_999_999 => Some(InputRange::Range1To2),
            2_000_000..=3_999_999 => Some(InputRange::Range2To4),
            4_000_000..=7_999_999 => Some(InputRange::Range4To8),
            8_000_000..=16_000_000 => Some(InputRange::Range8To16),
            _ => None,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// PLL1VCOSEL
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VcoRange {
    /// 192 - 960 MHz, needs ref1_ck >= 2 MHz
    Wide = 0,
    /// 150 - 420 MHz, needs ref1_ck in 1 - 2 MHz
    Medium = 1,
}

impl VcoRange {
    pub const fn limits(self) -> (u32, u32) {
        match self {
            VcoRange::Wide => (192_000_000, 960_000_000),
            VcoRange::Medium => (150_000_000, 420_000_000),
        }
    }
}


// - Pll1Config ---------------------------------------------------------------

/// PLL1 dividers. Only constructed through [`Pll1Config::new`], so every
/// divider is within its register range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pll1Config {
    m: u8,
    n: u16,
    p: u8,
    q: u8,
    r: u8,
    vco_range: VcoRange,
}

impl Pll1Config {
    /// Checks the dividers against their register ranges. The resulting
    /// frequencies depend on the source and are checked by [`validate`].
    ///
    /// [`validate`]: Pll1Config::validate
    pub const fn new(m: u8, n: u16, p: u8, q: u8, r: u8) -> Result<Self, PllError> {
        if m < 1 || m > 63 {
            return Err(PllError::DivM(m));
        }
        if n < 4 || n > 512 {
            return Err(PllError::DivN(n));
        }
        // DIVP1 only accepts 1 or an even divider
        if p < 1 || p > 128 || (p > 1 && p % 2 != 0) {
            return Err(PllError::DivP(p));
        }
        if q < 1 || q > 128 {
            return Err(PllError::DivQ(q));
        }
        if r < 1 || r > 128 {
            return Err(PllError::DivR(r));
        }
        Ok(Self { m, n, p, q, r, vco_range: VcoRange::Wide })
    }

    pub const fn with_vco_range(self, vco_range: VcoRange) -> Self {
        Self { vco_range, ..self }
    }

    pub const fn m(&self) -> u8 { self.m }
    pub const fn n(&self) -> u16 { self.n }
    pub const fn p(&self) -> u8 { self.p }
    pub const fn q(&self) -> u8 { self.q }
    pub const fn r(&self) -> u8 { self.r }
    pub const fn vco_range(&self) -> VcoRange { self.vco_range }

    pub const fn ref_ck(&self, src_hz: u32) -> u32 {
        src_hz / self.m as u32
    }

    /// Saturates at `u32::MAX`, [`validate`](Pll1Config::validate) rejects
    /// anything that large.
    pub const fn vco_ck(&self, src_hz: u32) -> u32 {
        self.ref_ck(src_hz).saturating_mul(self.n as u32)
    }

    pub const fn p_ck(&self, src_hz: u32) -> u32 {
        self.vco_ck(src_hz) / self.p as u32
    }

    pub const fn q_ck(&self, src_hz: u32) -> u32 {
        self.vco_ck(src_hz) / self.q as u32
    }

    pub const fn r_ck(&self, src_hz: u32) -> u32 {
        self.vco_ck(src_hz) / self.r as u32
    }

    pub const fn input_range(&self, src_hz: u32) -> Option<InputRange> {
        InputRange::for_ref_ck(self.ref_ck(src_hz))
    }

    /// Checks the ref1_ck and vco1_ck windows for a source of `src_hz`.
    pub const fn validate(&self, src_hz: u32) -> Result<(), PllError> {
        let ref_ck = self.ref_ck(src_hz);
        if ref_ck < REF_MIN || ref_ck > REF_MAX {
            return Err(PllError::RefOutOfRange(ref_ck));
        }
        match self.vco_range {
            VcoRange::Wide if ref_ck < 2_000_000 => {
                return Err(PllError::RefTooSlowForVco(ref_ck));
            }
            VcoRange::Medium if ref_ck > 2_000_000 => {
                return Err(PllError::RefTooFastForVco(ref_ck));
            }
            _ => (),
        }

        let vco = ref_ck as u64 * self.n as u64;
        let (min, max) = self.vco_range.limits();
        if vco < min as u64 || vco > max as u64 {
            return Err(PllError::VcoOutOfRange(self.vco_ck(src_hz)));
        }

        Ok(())
    }

    // register encodings, RM0433 8.7.12 / 8.7.13

    pub const fn divm_bits(&self) -> u8 {
        self.m
    }

    pub const fn divn_bits(&self) -> u16 {
        self.n - 1
    }

    pub const fn divp_bits(&self) -> u8 {
        self.p - 1
    }

    pub const fn divq_bits(&self) -> u8 {
        self.q - 1
    }

    pub const fn divr_bits(&self) -> u8 {
        self.r - 1
    }
}


// - tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_pll_reaches_480_mhz() {
        assert_eq!(PLL1.ref_ck(HSE), 5_000_000);
        assert_eq!(PLL1.vco_ck(HSE), 960_000_000);
        assert_eq!(PLL1.p_ck(HSE), 480_000_000);
        assert_eq!(PLL1.q_ck(HSE), 480_000_000);
        assert_eq!(PLL1.r_ck(HSE), 480_000_000);
        assert_eq!(PLL1.validate(HSE), Ok(()));
    }

    #[test]
    fn board_pll_register_encoding() {
        assert_eq!(PLL1.divm_bits(), 0b000101);
        assert_eq!(PLL1.divn_bits(), 0xbf);
        assert_eq!(PLL1.divp_bits(), 1);
        assert_eq!(PLL1.divq_bits(), 1);
        assert_eq!(PLL1.divr_bits(), 1);
    }

    #[test]
    fn input_range_follows_reference_clock() {
        assert_eq!(PLL1.input_range(HSE), Some(InputRange::Range4To8));
        assert_eq!(InputRange::for_ref_ck(1_000_000), Some(InputRange::Range1To2));
        assert_eq!(InputRange::for_ref_ck(2_000_000), Some(InputRange::Range2To4));
        assert_eq!(InputRange::for_ref_ck(16_000_000), Some(InputRange::Range8To16));
        assert_eq!(InputRange::for_ref_ck(999_999), None);
        assert_eq!(InputRange::for_ref_ck(16_000_001), None);
        assert_eq!(InputRange::Range4To8.bits(), 0b10);
    }

    #[test]
    fn odd_p_divider_is_rejected() {
        assert_eq!(Pll1Config::new(5, 192, 3, 2, 2), Err(PllError::DivP(3)));

        let bypass = Pll1Config::new(5, 96, 1, 2, 2).unwrap();
        assert_eq!(bypass.validate(HSE), Ok(()));
    }

    #[test]
    fn divider_limits() {
        assert_eq!(Pll1Config::new(0, 192, 2, 2, 2), Err(PllError::DivM(0)));
        assert_eq!(Pll1Config::new(64, 192, 2, 2, 2), Err(PllError::DivM(64)));
        assert_eq!(Pll1Config::new(5, 3, 2, 2, 2), Err(PllError::DivN(3)));
        assert_eq!(Pll1Config::new(5, 192, 0, 2, 2), Err(PllError::DivP(0)));
        assert_eq!(Pll1Config::new(5, 192, 2, 0, 2), Err(PllError::DivQ(0)));
        assert_eq!(Pll1Config::new(5, 192, 2, 2, 129), Err(PllError::DivR(129)));
    }

    #[test]
    fn extreme_dividers_stay_encodable() {
        let pll = Pll1Config::new(63, 512, 1, 1, 1).unwrap();
        assert_eq!(pll.divn_bits(), 511);
        assert_eq!(pll.divp_bits(), 0);
        // 25 MHz / 63 * 512 fits, no overflow in the helpers
        assert_eq!(pll.vco_ck(HSE), (HSE / 63) * 512);
        assert_eq!(pll.vco_ck(u32::MAX), u32::MAX);
    }

    #[test]
    fn reference_and_vco_windows() {
        let pll = |m, n| Pll1Config::new(m, n, 2, 2, 2).unwrap();

        // 25 MHz / 1 is above the 16 MHz ref1_ck limit
        assert_eq!(pll(1, 30).validate(HSE), Err(PllError::RefOutOfRange(25_000_000)));
        // 5 MHz x 200 = 1 GHz overshoots the wide VCO range
        assert_eq!(pll(5, 200).validate(HSE), Err(PllError::VcoOutOfRange(1_000_000_000)));
        // 1.25 MHz is fine for the PLL but too slow for the wide VCO
        assert_eq!(pll(20, 192).validate(HSE), Err(PllError::RefTooSlowForVco(1_250_000)));
    }

    #[test]
    fn medium_vco_needs_a_slow_reference() {
        let pll = |m, n| Pll1Config::new(m, n, 2, 2, 2).unwrap().with_vco_range(VcoRange::Medium);

        // 5 MHz x 80 = 400 MHz is inside the medium window, ref1_ck is not
        assert_eq!(pll(5, 80).validate(HSE), Err(PllError::RefTooFastForVco(5_000_000)));
        // 1 MHz x 300 = 300 MHz
        assert_eq!(pll(25, 300).validate(HSE), Ok(()));
        assert_eq!(pll(25, 300).vco_range(), VcoRange::Medium);
        // 1 MHz x 500 = 500 MHz overshoots it
        assert_eq!(pll(25, 500).validate(HSE), Err(PllError::VcoOutOfRange(500_000_000)));
    }
}
