mod gpio;

use crate::GpioResult;
pub use gpio::*;
use log::warn;
use std::fmt::Debug;

/// Instructions understood by the HD44780 controller, as used by this driver.
///
/// Some instructions share a code: [Command::DisplayOn] and [Command::DisplayBlinkOff] both
/// turn the display on with the cursor and blinking disabled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Function set: 4-bit interface, 2 lines, 5x8 font.
    FunctionSet,
    /// Clears the display and returns the cursor home.
    Clear,
    /// Returns the cursor to the home position.
    Home,
    /// Entry mode set: increment address, no display shift.
    EntryIncrement,
    /// Entry mode set: decrement address, no display shift.
    EntryDecrement,
    /// Cursor shift right.
    CursorRight,
    /// Cursor shift left.
    CursorLeft,
    /// Display on, cursor on, blinking on.
    DisplayBlinkOn,
    /// Display on, cursor off, blinking off.
    DisplayBlinkOff,
    /// Shifts the whole display content right.
    ShiftTextRight,
    /// Shifts the whole display content left.
    ShiftTextLeft,
    /// Display off. DDRAM content is kept.
    DisplayOff,
    /// Display on, cursor off, blinking off.
    DisplayOn,
}

impl Command {
    /// Time the controller needs after [Command::Clear] and [Command::Home].
    pub const EXECUTION_DELAY_MS: u32 = 2;

    /// The instruction byte sent with RS low.
    pub fn code(self) -> u8 {
        match self {
            Command::FunctionSet => 0b00101000,
            Command::Clear => 0b00000001,
            Command::Home => 0b00000010,
            Command::EntryIncrement => 0b00000110,
            Command::EntryDecrement => 0b00000100,
            Command::CursorRight => 0b00010100,
            Command::CursorLeft => 0b00010000,
            Command::DisplayBlinkOn => 0b00001111,
            Command::DisplayBlinkOff => 0b00001100,
            Command::ShiftTextRight => 0b00011100,
            Command::ShiftTextLeft => 0b00011000,
            Command::DisplayOff => 0b00001000,
            Command::DisplayOn => 0b00001100,
        }
    }

    /// How long to wait after sending the command, in milliseconds. `None` for commands that
    /// finish within the enable pulse timing.
    pub fn execution_delay_ms(self) -> Option<u32> {
        match self {
            Command::Clear | Command::Home => Some(Self::EXECUTION_DELAY_MS),
            _ => None,
        }
    }
}

/// DDRAM offset of the first column of the given line.
///
/// Uses the layout of 20x4 displays, where line 2 continues line 0 and line 3 continues line 1
/// inside the two 40 character halves of the address space. Lines outside `0..4` map to `0`.
pub fn row_offset(line: usize) -> usize {
    match line {
        0 => 0,
        1 => 40,
        2 => 20,
        3 => 60,
        _ => {
            warn!("Line {} out of range, using line 0", line);
            0
        }
    }
}

/// The `LiquidCrystal` trait is the interface of a write-only HD44780 driver.
///
/// Implementations provide [LiquidCrystal::init] and the two raw transmissions; every high-level
/// operation is built on [LiquidCrystal::send_command] and [LiquidCrystal::send_data]. The controller
/// state (cursor position, display mode) is not tracked: nothing can be read back from the display.
pub trait LiquidCrystal: Debug {
    /// Runs the 4-bit initialization sequence. Leaves the display on and cleared, with the cursor
    /// hidden and data mode selected.
    fn init(&mut self) -> GpioResult<()>;

    /// Clears the display and sets the cursor to the home position.
    fn clear(&mut self) -> GpioResult<()> {
        self.send_command(Command::Clear)
    }

    /// Sets the cursor to the home position.
    fn cursor_home(&mut self) -> GpioResult<()> {
        self.send_command(Command::Home)
    }

    /// Makes the cursor advance to the right after each character.
    fn cursor_move_forward(&mut self) -> GpioResult<()> {
        self.send_command(Command::EntryIncrement)
    }

    /// Makes the cursor advance to the left after each character.
    fn cursor_move_back(&mut self) -> GpioResult<()> {
        self.send_command(Command::EntryDecrement)
    }

    fn move_cursor_right(&mut self) -> GpioResult<()> {
        self.send_command(Command::CursorRight)
    }

    fn move_cursor_left(&mut self) -> GpioResult<()> {
        self.send_command(Command::CursorLeft)
    }

    /// Shows a blinking cursor.
    fn display_blink_on(&mut self) -> GpioResult<()> {
        self.send_command(Command::DisplayBlinkOn)
    }

    /// Hides the cursor and stops blinking.
    fn display_blink_off(&mut self) -> GpioResult<()> {
        self.send_command(Command::DisplayBlinkOff)
    }

    fn display_shift_text_right(&mut self) -> GpioResult<()> {
        self.send_command(Command::ShiftTextRight)
    }

    fn display_shift_text_left(&mut self) -> GpioResult<()> {
        self.send_command(Command::ShiftTextLeft)
    }

    fn display_off(&mut self) -> GpioResult<()> {
        self.send_command(Command::DisplayOff)
    }

    fn display_on(&mut self) -> GpioResult<()> {
        self.send_command(Command::DisplayOn)
    }

    /// Moves the cursor to the given line and column.
    ///
    /// Returns home, then steps right [row_offset] + `column` times, so the cost grows with the
    /// distance from the home position. Positions past the end of the DDRAM are not checked.
    fn move_to(&mut self, line: usize, column: usize) -> GpioResult<()> {
        let shift = row_offset(line).saturating_add(column);
        self.cursor_home()?;
        for _ in 0..shift {
            self.move_cursor_right()?;
        }
        Ok(())
    }

    /// Writes text at the cursor position.
    ///
    /// Every character is sent as its code point, so `U+0080..=U+00FF` reach the upper half of the
    /// character ROM (e.g. `'\u{DF}'` is the degree sign on the common A00 ROM). Characters above
    /// `U+00FF` are replaced with `?`.
    ///
    /// There is no wrapping: text past the visible area follows the controller's address counter.
    fn write(&mut self, message: &str) -> GpioResult<()> {
        for c in message.chars() {
            match u8::try_from(c) {
                Ok(code) => self.send_data(code)?,
                Err(_) => {
                    warn!("Character out of ROM range: {}", c);
                    self.send_data(b'?')?;
                }
            }
        }
        Ok(())
    }

    // Low-level commands
    // These are not meant to be used directly, but implemented by the driver implementation.

    /// Sends an instruction with RS low, then selects data mode again.
    fn send_command(&mut self, command: Command) -> GpioResult<()>;

    /// Sends a character code with RS left in data mode.
    fn send_data(&mut self, data: u8) -> GpioResult<()>;
}
