//! Logging shims.
//!
//! Routes to `defmt` or `log` depending on which feature is enabled. With
//! neither feature the macros only borrow their arguments so call sites stay
//! warning free.
#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! trace {
            ($($arg:tt)*) => { ::defmt::trace!($($arg)*) };
        }
        macro_rules! debug {
            ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
        }
        macro_rules! info {
            ($($arg:tt)*) => { ::defmt::info!($($arg)*) };
        }
        macro_rules! warn {
            ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! trace {
            ($($arg:tt)*) => { ::log::trace!($($arg)*) };
        }
        macro_rules! debug {
            ($($arg:tt)*) => { ::log::debug!($($arg)*) };
        }
        macro_rules! info {
            ($($arg:tt)*) => { ::log::info!($($arg)*) };
        }
        macro_rules! warn {
            ($($arg:tt)*) => { ::log::warn!($($arg)*) };
        }
    } else {
        macro_rules! trace {
            ($($arg:expr),* $(,)?) => {{ $( let _ = &$arg; )* }};
        }
        macro_rules! debug {
            ($($arg:expr),* $(,)?) => {{ $( let _ = &$arg; )* }};
        }
        macro_rules! info {
            ($($arg:expr),* $(,)?) => {{ $( let _ = &$arg; )* }};
        }
        macro_rules! warn {
            ($($arg:expr),* $(,)?) => {{ $( let _ = &$arg; )* }};
        }
    }
}

