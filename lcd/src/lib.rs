//! Driver for HD44780-compatible 16x2 character LCDs behind a PCF8574/PCF8574A I2C backpack.
//!
//! The bus and the delay source are injected through the `embedded-hal` traits, so the driver
//! runs on anything that implements them. With the `linux` feature, [linux] opens `/dev/i2c-N` through
//! `linux-embedded-hal`.

pub mod address;
pub mod display;
pub mod hd44780;
#[cfg(feature = "linux")]
pub mod linux;

pub use address::DeviceAddress;
pub use display::DisplayExt;
pub use hd44780::command::Command;
pub use hd44780::driver::{HD44780Driver, I2cHD44780Driver};

use embedded_hal::i2c::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq, Clone)]
pub enum LcdError {
    #[error("no LCD backpack answered in 0x20-0x27 or 0x38-0x3F")]
    AddressNotFound,
    #[error("driver used before initialization")]
    NotInitialized,
    #[error("invalid argument")]
    InvalidArgument,
    #[error("I2C bus error: {0:?}")]
    Bus(ErrorKind),
    #[error("error: {0}")]
    Other(String),
}

impl LcdError {
    /// Wraps the error of any `embedded-hal` I2C implementation, keeping its kind.
    pub fn from_bus<E: embedded_hal::i2c::Error>(err: E) -> Self {
        LcdError::Bus(err.kind())
    }
}

pub type LcdResult<T> = Result<T, LcdError>;
