//! HD44780 LCD module.
//!
//! [command] holds the instruction set, [driver] the controller interface and its I2C backpack
//! implementation.

pub mod command;
pub mod driver;
