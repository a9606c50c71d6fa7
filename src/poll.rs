//! Bounded polling of hardware status flags.
//!
//! Every ready flag in the boot sequence is polled through here. A flag
//! that never rises turns into an [`Error`] naming the stage instead of
//! an endless spin.

use crate::error::Error;


// - constants ----------------------------------------------------------------

/// Number of polls before giving up.
///
/// At the 64 MHz HSI reset clock this is well above the HSE start-up
/// time (~2 ms) and the PLL lock time.
pub const BUDGET: u32 = 2_000_000;


// - polling ------------------------------------------------------------------

/// Converts a status flag into a non-blocking result.
#[inline(always)]
pub fn ready(flag: bool) -> nb::Result<(), Error> {
    if flag {
        Ok(())
    } else {
        Err(nb::Error::WouldBlock)
    }
}

/// Calls `f` until it stops returning `WouldBlock`, at most `budget` times.
///
/// Returns `timeout` when the budget runs out.
pub fn block_within<T, F>(budget: u32, timeout: Error, mut f: F) -> Result<T, Error>
where
    F: FnMut() -> nb::Result<T, Error>,
{
    for _ in 0..budget {
        match f() {
            Ok(value) => return Ok(value),
            Err(nb::Error::WouldBlock) => continue,
            Err(nb::Error::Other(e)) => return Err(e),
        }
    }
    error!("timed out: {}", timeout);
    Err(timeout)
}

/// Waits for `condition` to hold, failing with `timeout`.
#[inline]
pub fn wait_until<F>(timeout: Error, mut condition: F) -> Result<(), Error>
where
    F: FnMut() -> bool,
{
    block_within(BUDGET, timeout, || ready(condition()))
}


// - tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_once_condition_holds() {
        let mut polls = 0;
        let result = block_within(10, Error::HseNotReady, || {
            polls += 1;
            ready(polls == 3)
        });
        assert_eq!(result, Ok(()));
        assert_eq!(polls, 3);
    }

    #[test]
    fn times_out_with_the_stage_error() {
        let mut polls = 0;
        let result = block_within(5, Error::Pll1NotLocked, || {
            polls += 1;
            ready(false)
        });
        assert_eq!(result, Err(Error::Pll1NotLocked));
        assert_eq!(polls, 5);
    }

    #[test]
    fn other_errors_stop_polling() {
        let mut polls = 0;
        let result: Result<(), Error> = block_within(5, Error::Pll1NotLocked, || {
            polls += 1;
            Err(nb::Error::Other(Error::McoSourceOff))
        });
        assert_eq!(result, Err(Error::McoSourceOff));
        assert_eq!(polls, 1);
    }

    #[test]
    fn wait_until_passes_through_ready_flags() {
        assert_eq!(wait_until(Error::CsiNotReady, || true), Ok(()));
    }
}
