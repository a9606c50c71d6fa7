use crate::hal;

// Waveshare OpenH743-C pin map, only the pins this crate drives.

pub mod mco {
    use crate::hal;

    pub type Mco1 = hal::gpio::gpioa::PA8<hal::gpio::Analog>;
    pub type Mco2 = hal::gpio::gpioc::PC9<hal::gpio::Analog>;

    pub struct Pins {
        pub mco1: Mco1,
        pub mco2: Mco2,
    }
}

pub mod user_leds {
    use crate::hal;
    use hal::gpio::{Output, PushPull};

    pub type Pin1 = hal::gpio::gpiob::PB6<hal::gpio::Analog>;
    pub type Pin2 = hal::gpio::gpiob::PB7<hal::gpio::Analog>;
    pub type Pin3 = hal::gpio::gpioh::PH4<hal::gpio::Analog>;
    pub type Pin4 = hal::gpio::gpioi::PI8<hal::gpio::Analog>;

    pub type Ld1 = hal::gpio::gpiob::PB6<Output<PushPull>>;
    pub type Ld2 = hal::gpio::gpiob::PB7<Output<PushPull>>;
    pub type Ld3 = hal::gpio::gpioh::PH4<Output<PushPull>>;
    pub type Ld4 = hal::gpio::gpioi::PI8<Output<PushPull>>;

    pub type Type = crate::led::UserLeds<Ld1, Ld2, Ld3, Ld4>;

    pub struct Pins {
        pub ld1: Pin1,
        pub ld2: Pin2,
        pub ld3: Pin3,
        pub ld4: Pin4,
    }
}

// - Pins ---------------------------------------------------------------------

pub struct Pins {
    pub mco: mco::Pins,
    pub user_leds: user_leds::Pins,
}

// - construction -------------------------------------------------------------

impl Pins {
    pub fn new(
        gpioa: hal::gpio::gpioa::Parts,
        gpiob: hal::gpio::gpiob::Parts,
        gpioc: hal::gpio::gpioc::Parts,
        gpioh: hal::gpio::gpioh::Parts,
        gpioi: hal::gpio::gpioi::Parts,
    ) -> Self {
        Self {
            mco: mco::Pins {
                mco1: gpioa.pa8,
                mco2: gpioc.pc9,
            },
            user_leds: user_leds::Pins {
                ld1: gpiob.pb6,
                ld2: gpiob.pb7,
                ld3: gpioh.ph4,
                ld4: gpioi.pi8,
            },
        }
    }
}
