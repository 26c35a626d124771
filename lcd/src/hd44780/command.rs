/// Instructions understood by the HD44780 controller, as used by this driver.
///
/// Fixed instructions carry their opcode directly. The two address instructions carry the address
/// that gets OR-ed (or added, for DDRAM) into their base opcode.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Does nothing on the controller. Used to relatch the backpack outputs, e.g. the backlight.
    Nop,
    /// Clears DDRAM and moves the cursor to (0, 0). Needs a long settle time.
    ClearDisplay,
    /// Moves the cursor to (0, 0) and undoes any display shift. Needs a long settle time.
    ReturnHome,
    /// Cursor moves right after each character, display doesn't shift.
    EntryModeSet,
    /// Display off. DDRAM contents are retained.
    DisplayOff,
    /// Display on, cursor hidden, no blinking.
    DisplayOn,
    /// Shifts the whole display (both lines) one position to the left.
    ShiftDisplayLeft,
    /// Shifts the whole display (both lines) one position to the right.
    ShiftDisplayRight,
    /// 4-bit interface, two lines, 5x8 dot font.
    Set4BitMode,
    /// First byte of the 4-bit bring-up sequence.
    Set4BitModeInit,
    /// Sets the CGRAM address (`0..=0x3F`).
    SetCgramAddress(u8),
    /// Sets the DDRAM address. Line 0 starts at `0x00`, line 1 at `0x40`.
    ///
    /// Not range-checked: the opcode is `0x80 + address`, wrapping inside the byte.
    SetDdramAddress(u8),
}

impl Command {
    /// Moves the cursor to the first position of the first line.
    pub const ADDR_TO_0: Command = Command::SetDdramAddress(0);

    /// Gets the raw instruction byte.
    pub fn opcode(self) -> u8 {
        match self {
            Command::Nop => 0x00,
            Command::ClearDisplay => 0x01,
            Command::ReturnHome => 0x02,
            Command::EntryModeSet => 0x06,
            Command::DisplayOff => 0x08,
            Command::DisplayOn => 0x0C,
            Command::ShiftDisplayLeft => 0x18,
            Command::ShiftDisplayRight => 0x1C,
            Command::Set4BitMode => 0x28,
            Command::Set4BitModeInit => 0x33,
            Command::SetCgramAddress(address) => 0x40 | (address & 0x3F),
            Command::SetDdramAddress(address) => 0x80u8.wrapping_add(address),
        }
    }

    /// Whether the controller needs more than the usual settle time (1.52 ms per the datasheet)
    /// after this instruction.
    pub fn needs_long_settle(self) -> bool {
        matches!(self, Command::ClearDisplay | Command::ReturnHome)
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.opcode()
    }
}
