//! # Drivers
//! Hardware drivers that only depend on `embedded-hal`, so they run against mock pins on the host.
pub mod hbridge;
