//! Linux `i2c-dev` backend, provided by `linux-embedded-hal`.
//!
//! [I2cdev] sets the slave address per transfer, so auto-detection can walk the candidates on one
//! bus handle. Its error kind maps `ENXIO`/`EREMOTEIO` to `NoAcknowledge`.

use crate::{LcdError, LcdResult};
use log::debug;
use std::path::Path;

pub use linux_embedded_hal::{Delay, I2cdev};

/// Opens the bus device, e.g. `/dev/i2c-1` on a Raspberry Pi.
pub fn open_bus(path: impl AsRef<Path>) -> LcdResult<I2cdev> {
    let path = path.as_ref();
    let bus = I2cdev::new(path)
        .map_err(|err| LcdError::Other(format!("{}: {}", path.display(), err)))?;
    debug!("Opened I2C bus {}", path.display());
    Ok(bus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_bus_device() {
        let result = open_bus("/dev/i2c-does-not-exist");
        assert!(matches!(result, Err(LcdError::Other(msg)) if msg.starts_with("/dev/i2c-does-not-exist")));
    }
}
