use crate::address::DeviceAddress;
use crate::hd44780::command::Command;
use crate::hd44780::driver::HD44780Driver;
use crate::{LcdError, LcdResult};
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, trace};
use std::fmt::{Debug, Formatter};

/// Backpack output bit driving RS.
const BIT_RS: u8 = 0b0000_0001;
/// Backpack output bit driving E.
const BIT_E: u8 = 0b0000_0100;
/// Backpack output bit switching the backlight transistor.
const BIT_BACKLIGHT: u8 = 0b0000_1000;

/// Settle time after every byte written to the backpack.
const WRITE_SETTLE_MS: u32 = 1;
/// Settle time between the steps of the 4-bit bring-up sequence.
const INIT_STEP_MS: u32 = 5;
/// Settle time after clear-display and return-home (datasheet says 1.52 ms).
const LONG_SETTLE_MS: u32 = 2;

/// HD44780 driven in 4-bit mode through a PCF8574/PCF8574A I2C expander.
///
/// Backpack wiring: P0 = RS, P1 = RW (always low), P2 = E, P3 = backlight, P4..P7 = D4..D7.
///
/// Every nibble is latched with three writes (E low, E high, E low), so each command or data byte
/// costs six bus writes. The bus has no busy flag here, so timing is fixed delays only.
pub struct I2cHD44780Driver<I, D> {
    i2c: I,
    delay: D,
    address: Option<u8>,
    backlight: bool,
    register_select: bool,
}

impl<I: I2c, D: DelayNs> I2cHD44780Driver<I, D> {
    /// Creates an uninitialized driver. Nothing is sent until [Self::initialize].
    pub fn new(i2c: I, delay: D) -> Self {
        I2cHD44780Driver {
            i2c,
            delay,
            address: None,
            backlight: true,
            register_select: false,
        }
    }

    /// Resolves the backpack address (probing the bus for [DeviceAddress::AutoDetect]) and resets
    /// the display: blank, cursor home, display on, backlight on.
    ///
    /// # Errors
    /// - [LcdError::AddressNotFound] if auto-detection found nothing.
    /// - [LcdError::InvalidArgument] if a custom address is not a 7-bit address.
    /// - [LcdError::Bus] if the bring-up sequence failed on the bus. The driver is then back to
    ///   uninitialized.
    pub fn initialize(&mut self, address: DeviceAddress) -> LcdResult<()> {
        let resolved = address.resolve(&mut self.i2c)?;
        debug!("Using LCD backpack at {:#04x} ({})", resolved, address);
        self.address = Some(resolved);
        if let Err(err) = self.init() {
            // A half-done bring-up leaves the controller in an unknown mode.
            self.address = None;
            return Err(err);
        }
        Ok(())
    }

    /// Gets the backpack address, once initialized.
    pub fn address(&self) -> Option<u8> {
        self.address
    }

    /// Gets the latched backlight state.
    pub fn backlight(&self) -> bool {
        self.backlight
    }

    /// Switches the backlight. The new state is pushed out right away with a no-op command, and
    /// is carried by every following write.
    pub fn set_backlight(&mut self, on: bool) -> LcdResult<()> {
        self.backlight = on;
        self.send_command(Command::Nop)
    }

    pub fn backlight_on(&mut self) -> LcdResult<()> {
        self.set_backlight(true)
    }

    pub fn backlight_off(&mut self) -> LcdResult<()> {
        self.set_backlight(false)
    }

    /// Shuts the driver down and hands back the bus and the delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    fn write_raw(&mut self, byte: u8) -> LcdResult<()> {
        let address = self.address.ok_or(LcdError::NotInitialized)?;
        self.i2c
            .write(address, &[byte])
            .map_err(LcdError::from_bus)?;
        self.delay.delay_ms(WRITE_SETTLE_MS);
        Ok(())
    }

    /// Latches the high nibble of `value` with a full E pulse.
    fn strobe(&mut self, value: u8) -> LcdResult<()> {
        let mut byte = value & 0xF0;
        if self.backlight {
            byte |= BIT_BACKLIGHT;
        }
        if self.register_select {
            byte |= BIT_RS;
        }
        trace!("Writing nibble: {:04b}, out: {:08b}", value >> 4, byte);

        self.write_raw(byte)?;
        self.write_raw(byte | BIT_E)?;
        self.write_raw(byte)
    }

    fn send(&mut self, data: u8, rs: bool) -> LcdResult<()> {
        trace!("Sending data: {:08b}, RS: {}", data, rs);
        self.register_select = rs;
        self.strobe(data)?;
        self.strobe(data << 4)
    }
}

impl<I: I2c, D: DelayNs> HD44780Driver for I2cHD44780Driver<I, D> {
    fn init(&mut self) -> LcdResult<()> {
        self.backlight = true;
        self.register_select = false;

        // Synchronize, then drop to 4-bit
        self.send_command(Command::Set4BitModeInit)?;
        self.delay.delay_ms(INIT_STEP_MS);
        self.strobe(0x30)?;
        self.delay.delay_ms(INIT_STEP_MS);
        self.strobe(0x20)?;
        self.delay.delay_ms(INIT_STEP_MS);

        self.send_command(Command::Set4BitMode)?;
        self.display_on()?;
        self.send_command(Command::EntryModeSet)?;
        self.clear_display()?;
        Ok(())
    }

    fn send_command(&mut self, command: Command) -> LcdResult<()> {
        self.send(command.opcode(), false)?;
        if command.needs_long_settle() {
            self.delay.delay_ms(LONG_SETTLE_MS);
        }
        Ok(())
    }

    fn send_data(&mut self, data: u8) -> LcdResult<()> {
        self.send(data, true)
    }
}

impl<I, D> Debug for I2cHD44780Driver<I, D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I2cHD44780Driver")
            .field("address", &self.address)
            .field("backlight", &self.backlight)
            .field("register_select", &self.register_select)
            .finish_non_exhaustive()
    }
}
