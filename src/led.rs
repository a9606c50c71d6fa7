use crate::embedded_hal::digital::v2::OutputPin;

use crate::pins::user_leds;

/// Number of user LEDs on the board
pub const COUNT: usize = 4;

// - traits -------------------------------------------------------------------

/// Generic LED
pub trait Led {
    /// Turns the LED off
    fn off(&mut self);

    /// Turns the LED on
    fn on(&mut self);

    fn set(&mut self, on: bool) {
        if on {
            self.on();
        } else {
            self.off();
        }
    }
}

// - UserLed ------------------------------------------------------------------

/// An active high LED on a push-pull output
pub struct UserLed<PIN>(PIN);

impl<PIN> UserLed<PIN> {
    pub fn new(pin: PIN) -> Self {
        UserLed(pin)
    }

    pub fn free(self) -> PIN {
        self.0
    }
}

impl<PIN> Led for UserLed<PIN>
where
    PIN: OutputPin,
{
    fn on(&mut self) {
        if let Ok(()) = self.0.set_high() {}
    }

    fn off(&mut self) {
        if let Ok(()) = self.0.set_low() {}
    }
}

// - UserLeds -----------------------------------------------------------------

pub struct UserLeds<LD1, LD2, LD3, LD4> {
    pub ld1: UserLed<LD1>,
    pub ld2: UserLed<LD2>,
    pub ld3: UserLed<LD3>,
    pub ld4: UserLed<LD4>,
}

impl<LD1, LD2, LD3, LD4> UserLeds<LD1, LD2, LD3, LD4>
where
    LD1: OutputPin,
    LD2: OutputPin,
    LD3: OutputPin,
    LD4: OutputPin,
{
    pub fn new(pin1: LD1, pin2: LD2, pin3: LD3, pin4: LD4) -> Self {
        Self {
            ld1: UserLed(pin1),
            ld2: UserLed(pin2),
            ld3: UserLed(pin3),
            ld4: UserLed(pin4),
        }
    }

    /// Lights LDn when bit n-1 of `mask` is set, turns it off otherwise.
    pub fn show(&mut self, mask: u8) {
        self.ld1.set(mask & 0b0001 != 0);
        self.ld2.set(mask & 0b0010 != 0);
        self.ld3.set(mask & 0b0100 != 0);
        self.ld4.set(mask & 0b1000 != 0);
    }

    pub fn all_off(&mut self) {
        self.show(0);
    }
}

/// Configures the LED pins as push-pull outputs, all LEDs off.
pub fn new(pins: user_leds::Pins) -> user_leds::Type {
    let mut leds = UserLeds::new(
        pins.ld1.into_push_pull_output(),
        pins.ld2.into_push_pull_output(),
        pins.ld3.into_push_pull_output(),
        pins.ld4.into_push_pull_output(),
    );
    leds.all_off();
    leds
}

// - tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;

    struct MockPin<'a>(&'a Cell<bool>);

    impl OutputPin for MockPin<'_> {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.set(true);
            Ok(())
        }
    }

    fn levels(cells: &[Cell<bool>; COUNT]) -> [bool; COUNT] {
        [cells[0].get(), cells[1].get(), cells[2].get(), cells[3].get()]
    }

    #[test]
    fn show_maps_mask_bits_to_leds() {
        let cells = [Cell::new(false), Cell::new(false), Cell::new(false), Cell::new(false)];
        let mut leds = UserLeds::new(MockPin(&cells[0]),
                                     MockPin(&cells[1]),
                                     MockPin(&cells[2]),
                                     MockPin(&cells[3]));

        leds.show(0b0101);
        assert_eq!(levels(&cells), [true, false, true, false]);

        leds.show(0b1010);
        assert_eq!(levels(&cells), [false, true, false, true]);

        // bits above LD4 are ignored
        leds.show(0xf0);
        assert_eq!(levels(&cells), [false; COUNT]);

        leds.show(0b1111);
        leds.all_off();
        assert_eq!(levels(&cells), [false; COUNT]);
    }

    #[test]
    fn set_drives_the_pin() {
        let level = Cell::new(false);
        let mut led = UserLed::new(MockPin(&level));

        led.set(true);
        assert!(level.get());
        led.off();
        assert!(!level.get());
        led.on();
        assert!(level.get());
    }
}
