//! Core voltage scaling
//!
//! `sys_ck` above 400 MHz needs VOS0, which is only reachable from VOS1
//! by enabling the LDO overdrive (RM0433 6.6.2 "VOS0 activation/deactivation
//! sequence").

use crate::error::Error;
use crate::hal::pac;
use crate::poll::wait_until;


// - VoltageScale -------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageScale {
    /// VOS1 + overdrive
    Scale0,
    Scale1,
    Scale2,
    Scale3,
}

impl VoltageScale {
    /// PWR_D3CR.VOS encoding. Scale0 is VOS1 with SYSCFG_PWRCR.ODEN set.
    pub const fn vos_bits(self) -> u8 {
        match self {
            VoltageScale::Scale0 | VoltageScale::Scale1 => 0b11,
            VoltageScale::Scale2 => 0b10,
            VoltageScale::Scale3 => 0b01,
        }
    }

    /// Highest `sys_ck` the scale supports (STM32H743 rev V).
    pub const fn max_sys_ck(self) -> u32 {
        match self {
            VoltageScale::Scale0 => 480_000_000,
            VoltageScale::Scale1 => 400_000_000,
            VoltageScale::Scale2 => 300_000_000,
            VoltageScale::Scale3 => 200_000_000,
        }
    }
}


// - configure ----------------------------------------------------------------

/// Raises the core voltage to VOS0.
///
///   1. LDO supply, supply configuration locked
///   2. VOS1
///   3. SYSCFG clock on, overdrive on
pub fn configure(pwr: &pac::PWR,
                 rcc: &pac::RCC,
                 syscfg: &pac::SYSCFG) -> Result<VoltageScale, Error> {
    // SCUEN is write-once, the supply stays on the LDO until the next reset
    pwr.cr3.modify(|_, w| w.scuen().set_bit().ldoen().set_bit().bypass().clear_bit());
    wait_until(Error::SupplyNotReady, || pwr.csr1.read().actvosrdy().bit_is_set())?;

    pwr.d3cr.write(|w| unsafe { w.vos().bits(VoltageScale::Scale1.vos_bits()) });
    wait_until(Error::VoltageScaleNotReady, || pwr.d3cr.read().vosrdy().bit_is_set())?;
    debug!("power: VOS1 ready");

    rcc.apb4enr.modify(|_, w| w.syscfgen().enabled());
    syscfg.pwrcr.modify(|_, w| w.oden().set_bit());
    wait_until(Error::OverdriveNotReady, || pwr.d3cr.read().vosrdy().bit_is_set())?;
    info!("power: VOS0 (overdrive) ready");

    Ok(VoltageScale::Scale0)
}


// - tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdrive_shares_the_vos1_encoding() {
        assert_eq!(VoltageScale::Scale0.vos_bits(), VoltageScale::Scale1.vos_bits());
        assert_eq!(VoltageScale::Scale1.vos_bits(), 0b11);
        assert_eq!(VoltageScale::Scale3.vos_bits(), 0b01);
    }

    #[test]
    fn only_vos0_reaches_480_mhz() {
        assert!(VoltageScale::Scale0.max_sys_ck() >= crate::clocks::SYS_CK);
        assert!(VoltageScale::Scale1.max_sys_ck() < crate::clocks::SYS_CK);
    }
}
