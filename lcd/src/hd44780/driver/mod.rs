mod i2c;

use crate::hd44780::command::Command;
use crate::{LcdError, LcdResult};
pub use i2c::*;
#[cfg(test)]
pub(crate) use i2c::tests as test_support;

/// DDRAM address of the first column of the second line.
pub const LINE_1_OFFSET: u8 = 0x40;

/// Instruction-level interface of an HD44780 controller.
///
/// Implementors only provide the bring-up and the raw [send_command](Self::send_command) and
/// [send_data](Self::send_data); everything else is expressed through them.
pub trait HD44780Driver {
    /// Brings the controller into 4-bit, two-line, 5x8 mode with the display on and blank.
    fn init(&mut self) -> LcdResult<()>;

    /// Clears the display and sets the cursor to the home position.
    fn clear_display(&mut self) -> LcdResult<()> {
        self.send_command(Command::ClearDisplay)
    }

    /// Sets the cursor to the home position and undoes display shifts.
    fn return_home(&mut self) -> LcdResult<()> {
        self.send_command(Command::ReturnHome)
    }

    /// Turns the display on. Doesn't touch DDRAM or the backlight.
    fn display_on(&mut self) -> LcdResult<()> {
        self.send_command(Command::DisplayOn)
    }

    /// Turns the display off. DDRAM is retained.
    fn display_off(&mut self) -> LcdResult<()> {
        self.send_command(Command::DisplayOff)
    }

    /// Shifts the whole display left. Both lines move together.
    fn shift_left(&mut self) -> LcdResult<()> {
        self.send_command(Command::ShiftDisplayLeft)
    }

    /// Shifts the whole display right. Both lines move together.
    fn shift_right(&mut self) -> LcdResult<()> {
        self.send_command(Command::ShiftDisplayRight)
    }

    /// Sets the CGRAM address.
    fn set_cgram_address(&mut self, address: u8) -> LcdResult<()> {
        if address > 0b00111111 {
            return Err(LcdError::InvalidArgument);
        }
        self.send_command(Command::SetCgramAddress(address))
    }

    /// Sets the DDRAM address. Not range-checked.
    fn set_ddram_address(&mut self, address: u8) -> LcdResult<()> {
        self.send_command(Command::SetDdramAddress(address))
    }

    /// Stores a 5x8 glyph in one of the 8 CGRAM slots. The glyph is then printed with the
    /// character code equal to `slot`.
    ///
    /// Leaves the controller addressing CGRAM, so position the cursor before writing text again.
    fn create_char(&mut self, slot: u8, rows: [u8; 8]) -> LcdResult<()> {
        if slot > 7 {
            return Err(LcdError::InvalidArgument);
        }
        self.set_cgram_address(slot << 3)?;
        for row in rows {
            self.send_data(row & 0b00011111)?;
        }
        Ok(())
    }

    // Low-level commands

    /// Sends a command to the HD44780 controller.
    /// Sets RS to 0 (command).
    fn send_command(&mut self, command: Command) -> LcdResult<()>;

    /// Sends data to the HD44780 controller.
    /// Sets RS to 1 (data).
    fn send_data(&mut self, data: u8) -> LcdResult<()>;
}
