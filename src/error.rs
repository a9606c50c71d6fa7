use crate::clocks::SysClkSource;
use crate::pll::PllError;


// - Error --------------------------------------------------------------------

/// Bring-up failures.
///
/// Each hardware wait in the boot sequence has its own variant so a
/// board that stalls can be diagnosed from the log alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// PWR_CSR1.ACTVOSRDY never set after selecting the LDO supply
    SupplyNotReady,
    /// PWR_D3CR.VOSRDY never set after programming VOS1
    VoltageScaleNotReady,
    /// PWR_D3CR.VOSRDY never set after enabling overdrive
    OverdriveNotReady,
    /// RCC_CR.HSERDY never set, check the crystal
    HseNotReady,
    /// RCC_CR.CSIRDY never set
    CsiNotReady,
    /// RCC_CFGR.SWS did not follow RCC_CFGR.SW
    ClockSwitch(SysClkSource),
    /// RCC_CR.PLL1RDY stayed set after clearing PLL1ON
    Pll1NotStopped,
    /// RCC_CR.PLL1RDY never set
    Pll1NotLocked,
    /// RCC_D1CFGR.D1CPRE did not read back
    PrescalerNotApplied,
    /// FLASH_ACR.LATENCY did not read back
    FlashLatencyNotApplied,
    /// SYSCFG_CCCSR.READY never set
    CompensationNotReady,
    /// PLL1 parameters out of range
    InvalidPll(PllError),
    /// The clock routed to an MCO pin is not running
    McoSourceOff,
    /// The clock routed to an MCO pin exceeds the pin limit (Hz)
    McoTooFast(u32),
}

impl From<PllError> for Error {
    fn from(error: PllError) -> Self {
        Error::InvalidPll(error)
    }
}
