//! Hardware driver for the Grove RGB LCD
//!
//! The module is two I2C chips behind one logical device:
//!
//! - A character/command controller at 0x3E (instructions and
//!   character data)
//! - An RGB backlight controller at 0x62 (PWM color channels)
//!
//! The driver serializes every register transaction on the shared bus,
//! brings the backlight up once at attach, and hands the device to at
//! most one client session at a time.

#![no_std]
#![deny(unsafe_code)]

// Host tests lock CriticalSectionRawMutex; the std critical-section
// implementation must be linked for that to resolve.
#[cfg(test)]
use critical_section as _;

pub mod display;
