//! Busy-wait LED pattern
//!
//! `cortex_m::asm::delay` spins for at least the requested number of core
//! cycles, so frame timing follows `c_ck` and stretches under interrupts.

use crate::clocks::Clocks;
use crate::embedded_hal::digital::v2::OutputPin;
use crate::led::UserLeds;


// - Frame --------------------------------------------------------------------

/// One step of the pattern: LDn is lit when bit n-1 of `leds` is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub leds: u8,
    pub hold_ms: u32,
}

impl Frame {
    const fn new(leds: u8, hold_ms: u32) -> Self {
        Self { leds, hold_ms }
    }
}

/// Chase LD1 -> LD4, then all on, then all off.
pub const PATTERN: [Frame; 6] = [
    Frame::new(0b0001, 250),
    Frame::new(0b0010, 250),
    Frame::new(0b0100, 250),
    Frame::new(0b1000, 250),
    Frame::new(0b1111, 500),
    Frame::new(0b0000, 500),
];

/// Core cycles in `ms` milliseconds at `clock` Hz, saturating at `u32::MAX`.
pub const fn ms_to_cycles(ms: u32, clock: u32) -> u32 {
    let cycles = ms as u64 * clock as u64 / 1_000;
    if cycles > u32::MAX as u64 {
        u32::MAX
    } else {
        cycles as u32
    }
}


// - Blinker ------------------------------------------------------------------

pub struct Blinker {
    c_ck: u32,
}

impl Blinker {
    pub fn new(clocks: &Clocks) -> Self {
        Self { c_ck: clocks.c_ck().raw() }
    }

    /// The pattern as `(led mask, delay cycles)` pairs.
    pub fn steps(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        PATTERN.iter().map(move |frame| (frame.leds, ms_to_cycles(frame.hold_ms, self.c_ck)))
    }

    /// Plays [`PATTERN`] forever.
    pub fn run<LD1, LD2, LD3, LD4>(&self, leds: &mut UserLeds<LD1, LD2, LD3, LD4>) -> !
    where
        LD1: OutputPin,
        LD2: OutputPin,
        LD3: OutputPin,
        LD4: OutputPin,
    {
        info!("blink: {=usize} frames at c_ck {=u32} Hz", PATTERN.len(), self.c_ck);
        loop {
            for (mask, cycles) in self.steps() {
                trace!("blink: {=u8:b}", mask);
                leds.show(mask);
                cortex_m::asm::delay(cycles);
            }
        }
    }
}


// - tests --------------------------------------------------------------------
