//! Flash wait states
//!
//! The AXI clock can only be raised once FLASH_ACR carries enough wait
//! states for it. See RM0433 Table 17 "FLASH recommended number of wait
//! states and programming delay".

use crate::error::Error;
use crate::hal::pac;
use crate::poll::wait_until;
use crate::power::VoltageScale;


// - wait states --------------------------------------------------------------

/// Returns `(LATENCY, WRHIGHFREQ)` for an AXI clock of `aclk` Hz.
pub const fn wait_states(vos: VoltageScale, aclk: u32) -> (u8, u8) {
    let aclk_mhz = aclk / 1_000_000;
    match vos {
        VoltageScale::Scale0 => match aclk_mhz {
            0..=70 => (0, 0),
            71..=140 => (1, 1),
            141..=210 => (2, 2),
            211..=225 => (3, 2),
            _ => (4, 2),
        },
        VoltageScale::Scale1 => match aclk_mhz {
            0..=70 => (0, 0),
            71..=140 => (1, 1),
            141..=185 => (2, 1),
            186..=210 => (2, 2),
            211..=225 => (3, 2),
            _ => (4, 2),
        },
        VoltageScale::Scale2 => match aclk_mhz {
            0..=55 => (0, 0),
            56..=110 => (1, 1),
            111..=165 => (2, 1),
            166..=225 => (3, 2),
            _ => (4, 2),
        },
        VoltageScale::Scale3 => match aclk_mhz {
            0..=45 => (0, 0),
            46..=90 => (1, 1),
            91..=135 => (2, 1),
            136..=180 => (3, 2),
            _ => (4, 2),
        },
    }
}


// - configure ----------------------------------------------------------------

/// Programs wait states for `aclk`. Call before raising `sys_ck`.
pub fn configure(flash: &pac::FLASH, vos: VoltageScale, aclk: u32) -> Result<(), Error> {
    let (latency, wrhighfreq) = wait_states(vos, aclk);

    flash.acr.write(|w| unsafe { w.wrhighfreq().bits(wrhighfreq).latency().bits(latency) });
    wait_until(Error::FlashLatencyNotApplied, || flash.acr.read().latency().bits() == latency)?;
    debug!("flash: {=u8} wait states, WRHIGHFREQ {=u8}", latency, wrhighfreq);

    Ok(())
}


// - tests --------------------------------------------------------------------
