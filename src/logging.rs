//! # Logging
//! Log macros shared by the library and the firmware.
//!
//! - feature `defmt`: forwards to the `defmt` macros (RTT transport in the firmware)
//! - host unit tests: prints to stdout/stderr
//! - anything else: compiles to nothing, the arguments are still type checked
//!
//! Format strings must stay within what both `core::fmt` and `defmt` accept, so only
//! `{}`, `{:?}` and `{:02}` are used.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(all(not(test), feature = "defmt"))]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(test), not(feature = "defmt")))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(all(not(test), feature = "defmt"))]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(test), not(feature = "defmt")))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        eprintln!("[ERROR] {}", format!($($arg)*));

        #[cfg(all(not(test), feature = "defmt"))]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(test), not(feature = "defmt")))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(test)]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(all(not(test), feature = "defmt"))]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(test), not(feature = "defmt")))]
        {
            let _ = format_args!($($arg)*);
        }
    }};
}
