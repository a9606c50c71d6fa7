//! Logging macros used inside the crate.
//!
//! They forward to `defmt` when the `defmt` feature is enabled and
//! compile to nothing otherwise, which keeps the library buildable for
//! host tests where no global logger is linked.

#![allow(unused_macros)]

macro_rules! log_impl {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        defmt::$level!($fmt $(, $arg)*);
        #[cfg(not(feature = "defmt"))]
        {
            $( let _ = &$arg; )*
        }
    }};
}

macro_rules! trace {
    ($($arg:tt)*) => { log_impl!(trace, $($arg)*) };
}

macro_rules! debug {
    ($($arg:tt)*) => { log_impl!(debug, $($arg)*) };
}

macro_rules! info {
    ($($arg:tt)*) => { log_impl!(info, $($arg)*) };
}

macro_rules! error {
    ($($arg:tt)*) => { log_impl!(error, $($arg)*) };
}
