use crate::hd44780::driver::{HD44780Driver, LINE_1_OFFSET};
use crate::LcdResult;
use log::{debug, warn};

/// Visible columns on a 1602 display.
pub const COLUMNS: u8 = 16;
/// Visible lines on a 1602 display.
pub const ROWS: u8 = 2;

/// Gets the DDRAM address of `(column, row)`. Any `row` above `0` means the second line.
///
/// Nothing is clamped: columns past the visible 16 still address DDRAM (off-screen until the
/// display is shifted), and columns past the end of a line give whatever the controller makes of
/// them.
pub fn ddram_address(column: u8, row: u8) -> u8 {
    if row > 0 {
        LINE_1_OFFSET.wrapping_add(column)
    } else {
        column
    }
}

/// Whether `(column, row)` is on the visible 16x2 area of an unshifted display.
pub fn is_visible(column: u8, row: u8) -> bool {
    column < COLUMNS && row < ROWS
}

/// Text output on top of the raw [HD44780Driver] instructions.
pub trait DisplayExt {
    /// Moves the cursor to `(column, row)`.
    fn set_cursor(&mut self, column: u8, row: u8) -> LcdResult<()>;
    /// Prints at the current cursor position. Non-ASCII characters are replaced with `?`.
    fn print(&mut self, s: &str) -> LcdResult<()>;
    /// Writes raw character codes at `(column, row)`, e.g. CGRAM slots `0..=7`.
    fn write_bytes(&mut self, bytes: &[u8], column: u8, row: u8) -> LcdResult<()>;
    /// Writes `s` starting at `(column, row)`.
    fn write_string(&mut self, s: &str, column: u8, row: u8) -> LcdResult<()>;
    /// Writes `n` in decimal starting at `(column, row)`.
    fn write_number(&mut self, n: i64, column: u8, row: u8) -> LcdResult<()>;
}

impl<T: ?Sized + HD44780Driver> DisplayExt for T {
    fn set_cursor(&mut self, column: u8, row: u8) -> LcdResult<()> {
        if !is_visible(column, row) {
            debug!("Cursor at ({}, {}) is off the {}x{} screen", column, row, COLUMNS, ROWS);
        }
        self.set_ddram_address(ddram_address(column, row))
    }

    fn print(&mut self, s: &str) -> LcdResult<()> {
        for c in s.chars() {
            if c.is_ascii() {
                self.send_data(c as u8)?;
            } else {
                warn!("Non-ASCII character: {}", c);
                self.send_data(b'?')?
            }
        }
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8], column: u8, row: u8) -> LcdResult<()> {
        self.set_cursor(column, row)?;
        for &byte in bytes {
            self.send_data(byte)?;
        }
        Ok(())
    }

    fn write_string(&mut self, s: &str, column: u8, row: u8) -> LcdResult<()> {
        self.set_cursor(column, row)?;
        self.print(s)
    }

    fn write_number(&mut self, n: i64, column: u8, row: u8) -> LcdResult<()> {
        self.write_string(&n.to_string(), column, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hd44780::driver::test_support::{command, data, finish, initialized};
    use embedded_hal_mock::eh1::i2c::Transaction as I2cTransaction;

    fn text(address: u8, position: u8, s: &[u8]) -> Vec<I2cTransaction> {
        let mut expected = command(address, position);
        for &c in s {
            expected.extend(data(address, c));
        }
        expected
    }

    #[test]
    fn positioning_command_for_every_cell() {
        let address = 0x27;
        for row in 0..ROWS {
            for column in 0..COLUMNS {
                let base = if row == 0 { 0x80 } else { 0xC0 };
                let mut driver = initialized(address, text(address, base + column, b"*"));
                assert!(driver.write_string("*", column, row).is_ok());
                finish(driver);
            }
        }
    }

    #[test]
    fn hello_world() {
        let address = 0x27;
        let mut expected = text(address, 0x80, b"Hello");
        expected.extend(text(address, 0xC0, b"World!"));
        // 2 positioning commands and 11 characters, 6 writes each
        assert_eq!(expected.len(), 13 * 6);

        let mut driver = initialized(address, expected);
        assert!(driver.write_string("Hello", 0, 0).is_ok());
        assert!(driver.write_string("World!", 0, 1).is_ok());
        finish(driver);
    }

    #[test]
    fn numbers_match_their_text() {
        let address = 0x27;
        for (n, s) in [(1234i64, "1234"), (0, "0"), (-42, "-42"), (i64::MIN, "-9223372036854775808")] {
            let mut expected = text(address, 0x84, s.as_bytes());
            expected.extend(text(address, 0x84, s.as_bytes()));

            let mut driver = initialized(address, expected);
            assert!(driver.write_number(n, 4, 0).is_ok());
            assert!(driver.write_string(s, 4, 0).is_ok());
            finish(driver);
        }
    }

    #[test]
    fn minus_sign_is_its_own_byte() {
        let address = 0x27;
        let mut driver = initialized(address, text(address, 0xC0, b"-7"));
        assert!(driver.write_number(-7, 0, 1).is_ok());
        finish(driver);
    }

    #[test]
    fn non_ascii_is_replaced() {
        let address = 0x27;
        let mut driver = initialized(address, text(address, 0x80, b"a?b"));
        assert!(driver.write_string("aéb", 0, 0).is_ok());
        finish(driver);
    }

    #[test]
    fn raw_bytes_and_out_of_range_columns() {
        let address = 0x27;
        let mut expected = text(address, 0x80 + 20, &[0x00, 0xFF]);
        expected.extend(text(address, 0xC0 + 39, b"z"));

        let mut driver = initialized(address, expected);
        assert!(driver.write_bytes(&[0x00, 0xFF], 20, 0).is_ok());
        assert!(driver.write_string("z", 39, 5).is_ok());
        finish(driver);
    }

    #[test]
    fn visible_area() {
        assert!(is_visible(0, 0));
        assert!(is_visible(15, 1));
        assert!(!is_visible(16, 0));
        assert!(!is_visible(0, 2));
    }

    #[test]
    fn address_math() {
        assert_eq!(ddram_address(0, 0), 0x00);
        assert_eq!(ddram_address(15, 0), 0x0F);
        assert_eq!(ddram_address(0, 1), 0x40);
        assert_eq!(ddram_address(15, 1), 0x4F);
        assert_eq!(ddram_address(3, 7), 0x43);
    }
}
