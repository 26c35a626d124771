use dotenv::var;
use eyre::WrapErr;
use lcd1602_i2c::DeviceAddress;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    /// I2C bus device, `LCD_I2C_BUS`.
    pub bus: PathBuf,
    /// Backpack address, `LCD_I2C_ADDRESS`.
    pub address: DeviceAddress,
    /// Pause between steps, `LCD_STEP_PAUSE_MS`.
    pub step_pause: Duration,
}

impl Config {
    /// Reads the config from the environment (and `.env`), falling back to defaults.
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let mut config = Config::default();

        if let Some(bus) = lookup("LCD_I2C_BUS") {
            config.bus = PathBuf::from(bus);
        }
        if let Some(address) = lookup("LCD_I2C_ADDRESS") {
            config.address = address
                .parse::<DeviceAddress>()
                .wrap_err_with(|| format!("invalid LCD_I2C_ADDRESS: {:?}", address))?;
        }
        if let Some(pause) = lookup("LCD_STEP_PAUSE_MS") {
            let ms: u64 = pause
                .trim()
                .parse::<u64>()
                .wrap_err_with(|| format!("invalid LCD_STEP_PAUSE_MS: {:?}", pause))?;
            config.step_pause = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bus: PathBuf::from("/dev/i2c-1"),
            address: DeviceAddress::AutoDetect,
            step_pause: Duration::from_millis(1000),
        }
    }
}
