use crate::{LcdError, LcdResult};
use embedded_hal::i2c::I2c;
use log::{info, trace};
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Address ranges a PCF8574 (`0x20..=0x27`) and a PCF8574A (`0x38..=0x3F`) can be strapped to,
/// in probing order.
pub const CANDIDATE_RANGES: [RangeInclusive<u8>; 2] = [0x20..=0x27, 0x38..=0x3F];

/// I2C address of the backpack.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DeviceAddress {
    /// Scan [CANDIDATE_RANGES] during initialization.
    #[default]
    AutoDetect,
    /// PCF8574 with all address pins high, `0x27`.
    Pcf8574,
    /// PCF8574A with all address pins high, `0x3F`.
    Pcf8574A,
    /// Any other 7-bit address. Values above `0x7F` are rejected by [DeviceAddress::resolve].
    Custom(u8),
}

impl DeviceAddress {
    /// Gets the address, unless it has to be detected.
    pub fn fixed(self) -> Option<u8> {
        match self {
            DeviceAddress::AutoDetect => None,
            DeviceAddress::Pcf8574 => Some(0x27),
            DeviceAddress::Pcf8574A => Some(0x3F),
            DeviceAddress::Custom(address) => Some(address),
        }
    }

    /// Resolves the address, probing the bus for [DeviceAddress::AutoDetect].
    ///
    /// # Errors
    /// - [LcdError::InvalidArgument] if the address doesn't fit in 7 bits.
    /// - [LcdError::AddressNotFound] if auto-detection found nothing.
    pub fn resolve<I: I2c>(self, i2c: &mut I) -> LcdResult<u8> {
        match self.fixed() {
            Some(address) if address > 0x7F => Err(LcdError::InvalidArgument),
            Some(address) => Ok(address),
            None => detect_address(i2c),
        }
    }
}

impl From<u8> for DeviceAddress {
    /// `0` means auto-detection.
    fn from(value: u8) -> Self {
        match value {
            0 => DeviceAddress::AutoDetect,
            0x27 => DeviceAddress::Pcf8574,
            0x3F => DeviceAddress::Pcf8574A,
            other => DeviceAddress::Custom(other),
        }
    }
}

impl FromStr for DeviceAddress {
    type Err = LcdError;

    /// Accepts `auto`, `pcf8574`, `pcf8574a`, or a number in decimal or `0x` hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "auto" | "autodetect" => return Ok(DeviceAddress::AutoDetect),
            "pcf8574" => return Ok(DeviceAddress::Pcf8574),
            "pcf8574a" => return Ok(DeviceAddress::Pcf8574A),
            _ => {}
        }

        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u8::from_str_radix(hex, 16),
            None => s.parse(),
        }
        .map_err(|_| LcdError::InvalidArgument)?;

        if value > 0x7F {
            return Err(LcdError::InvalidArgument);
        }
        Ok(value.into())
    }
}

impl Display for DeviceAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.fixed() {
            Some(address) => write!(f, "{:#04x}", address),
            None => write!(f, "auto"),
        }
    }
}

/// Looks for a backpack in [CANDIDATE_RANGES] and returns the first address that answers with
/// the expected signature.
///
/// Each candidate gets all outputs driven high (`FF FF FF FF`), which must read back with the low
/// nibble `0111`, then all outputs driven low (`00 00`), which must read back as `00`. A bus error
/// on a candidate just rules it out.
///
/// # Errors
/// - [LcdError::AddressNotFound] if no candidate matches.
pub fn detect_address<I: I2c>(i2c: &mut I) -> LcdResult<u8> {
    for range in CANDIDATE_RANGES {
        for address in range {
            match check_candidate(i2c, address) {
                Ok(true) => {
                    info!("Backpack found at {:#04x}", address);
                    return Ok(address);
                }
                Ok(false) => trace!("{:#04x}: signature mismatch", address),
                Err(err) => trace!("{:#04x}: {}", address, err),
            }
        }
    }
    Err(LcdError::AddressNotFound)
}

fn check_candidate<I: I2c>(i2c: &mut I, address: u8) -> LcdResult<bool> {
    let mut buf = [0u8; 1];

    i2c.write(address, &[0xFF; 4]).map_err(LcdError::from_bus)?;
    i2c.read(address, &mut buf).map_err(LcdError::from_bus)?;
    let high = buf[0] & 0x0F;

    i2c.write(address, &[0x00; 2]).map_err(LcdError::from_bus)?;
    i2c.read(address, &mut buf).map_err(LcdError::from_bus)?;
    let low = buf[0];

    trace!("{:#04x}: read {:04b} / {:08b}", address, high, low);
    Ok(high == 0b0111 && low == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    use log::{Level, LevelFilter, Log, Metadata, Record};
    use std::sync::Mutex;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    fn nack(address: u8) -> I2cTransaction {
        I2cTransaction::write(address, vec![0xFF; 4])
            .with_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
    }

    fn candidate_reads(address: u8, high: u8, low: u8) -> Vec<I2cTransaction> {
        vec![
            I2cTransaction::write(address, vec![0xFF; 4]),
            I2cTransaction::read(address, vec![high]),
            I2cTransaction::write(address, vec![0x00; 2]),
            I2cTransaction::read(address, vec![low]),
        ]
    }

    #[test]
    fn detects_pcf8574_without_probing_further() {
        let mut expected: Vec<_> = (0x20..0x27).map(nack).collect();
        expected.extend(candidate_reads(0x27, 0xF7, 0x00));

        let mut i2c = I2cMock::new(&expected);
        assert_eq!(detect_address(&mut i2c), Ok(0x27));
        i2c.done();
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut expected: Vec<_> = (0x20..=0x27).flat_map(|a| candidate_reads(a, 0xFF, 0xFF)).collect();
        expected.extend((0x38..0x3F).map(nack));
        expected.extend(candidate_reads(0x3F, 0x07, 0x00));

        let mut i2c = I2cMock::new(&expected);
        assert_eq!(detect_address(&mut i2c), Ok(0x3F));
        i2c.done();
    }

    #[test]
    fn low_nibble_only_matters_on_first_read() {
        let mut expected = candidate_reads(0x20, 0x07, 0x01);
        expected.extend(candidate_reads(0x21, 0xA7, 0x00));

        let mut i2c = I2cMock::new(&expected);
        assert_eq!(detect_address(&mut i2c), Ok(0x21));
        i2c.done();
    }

    #[test]
    fn fails_when_nothing_answers() {
        let expected: Vec<_> = (0x20..=0x27).chain(0x38..=0x3F).map(nack).collect();

        let mut i2c = I2cMock::new(&expected);
        assert_eq!(detect_address(&mut i2c), Err(LcdError::AddressNotFound));
        i2c.done();
    }

    #[test]
    fn fixed_addresses_skip_the_bus() {
        let mut i2c = I2cMock::new(&[]);
        assert_eq!(DeviceAddress::Pcf8574.resolve(&mut i2c), Ok(0x27));
        assert_eq!(DeviceAddress::Pcf8574A.resolve(&mut i2c), Ok(0x3F));
        assert_eq!(DeviceAddress::Custom(0x3E).resolve(&mut i2c), Ok(0x3E));
        i2c.done();
    }

    #[test]
    fn custom_address_must_fit_seven_bits() {
        let mut i2c = I2cMock::new(&[]);
        assert_eq!(DeviceAddress::Custom(0x7F).resolve(&mut i2c), Ok(0x7F));
        assert_eq!(DeviceAddress::Custom(0x80).resolve(&mut i2c), Err(LcdError::InvalidArgument));
        assert_eq!(DeviceAddress::from(0xFF).resolve(&mut i2c), Err(LcdError::InvalidArgument));
        i2c.done();
    }

    struct CapturingLogger {
        records: Mutex<Vec<(Level, String)>>,
    }

    impl Log for CapturingLogger {
        fn enabled(&self, _metadata: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.records
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    static LOGGER: CapturingLogger = CapturingLogger {
        records: Mutex::new(Vec::new()),
    };

    #[test]
    fn detected_address_is_logged_at_info() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);

        let mut expected: Vec<_> = (0x20..=0x27).chain(0x38..0x3E).map(nack).collect();
        expected.extend(candidate_reads(0x3E, 0x17, 0x00));
        let mut i2c = I2cMock::new(&expected);
        assert_eq!(detect_address(&mut i2c), Ok(0x3E));
        i2c.done();

        let records = LOGGER.records.lock().unwrap();
        assert!(records
            .iter()
            .any(|(level, msg)| *level == Level::Info && msg == "Backpack found at 0x3e"));
    }

    #[test]
    fn parse() {
        assert_eq!("auto".parse::<DeviceAddress>(), Ok(DeviceAddress::AutoDetect));
        assert_eq!("PCF8574A".parse::<DeviceAddress>(), Ok(DeviceAddress::Pcf8574A));
        assert_eq!("0x27".parse::<DeviceAddress>(), Ok(DeviceAddress::Pcf8574));
        assert_eq!("63".parse::<DeviceAddress>(), Ok(DeviceAddress::Pcf8574A));
        assert_eq!("0".parse::<DeviceAddress>(), Ok(DeviceAddress::AutoDetect));
        assert_eq!(" 0x3e ".parse::<DeviceAddress>(), Ok(DeviceAddress::Custom(0x3E)));
        assert_eq!("0x80".parse::<DeviceAddress>(), Err(LcdError::InvalidArgument));
        assert_eq!("lcd".parse::<DeviceAddress>(), Err(LcdError::InvalidArgument));
    }

    #[test]
    fn display() {
        assert_eq!(DeviceAddress::Pcf8574.to_string(), "0x27");
        assert_eq!(DeviceAddress::AutoDetect.to_string(), "auto");
    }
}
