// HD44780 display state
// The HD44780 struct owns everything the controller cannot report back: cursor position,
// display control flags and entry mode flags. Every operation mutates that state first and
// then pushes the matching instruction through a DeviceHardwareTrait object. Bus failures
// are logged and dropped by the device; none of these operations can fail.
//

use core::iter;

use crate::{
    bit_configurations::{
        LCD_CMD_CLEARDISPLAY, LCD_CMD_CURSORSHIFT, LCD_CMD_DISPLAYCONTROL, LCD_CMD_ENTRYMODESET,
        LCD_CMD_FUNCTIONSET, LCD_CMD_NOOP, LCD_CMD_RETURNHOME, LCD_CMD_SETDDRAMADDR,
        LCD_FLAG_2LINE, LCD_FLAG_4BITMODE, LCD_FLAG_5x8_DOTS, LCD_FLAG_BLINKOFF, LCD_FLAG_BLINKON,
        LCD_FLAG_CURSOROFF, LCD_FLAG_CURSORON, LCD_FLAG_DISPLAYMOVE, LCD_FLAG_DISPLAYON,
        LCD_FLAG_ENTRYLEFT, LCD_FLAG_ENTRYSHIFTDECREMENT, LCD_FLAG_ENTRYSHIFTINCREMENT,
        LCD_FLAG_MOVELEFT, LCD_FLAG_MOVERIGHT, LCD_INIT_4BIT, LCD_INIT_8BIT, PIN_BACKLIGHT,
        ROW_OFFSETS,
    },
    config::LcdConfig,
    driver::{transport::best_effort, DeviceHardwareTrait},
    LcdError,
};

/// Gap between the steps of the initialization sequence.
pub const INIT_STEP_MS: u32 = 5;
/// Settle time after clear, home and display control changes.
pub const COMMAND_SETTLE_MS: u32 = 2;

/// Sent in place of characters the display ROM cannot show.
const REPLACEMENT_CHAR: u8 = b'?';

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ControllerState {
    /// Constructed, initialization sequence not yet sent
    Uninitialized,
    /// Initialization sequence sent, accepting operations
    Ready,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControllerState {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ControllerState::Uninitialized => defmt::write!(fmt, "Uninitialized"),
            ControllerState::Ready => defmt::write!(fmt, "Ready"),
        }
    }
}

/// Mutable display state. Flags are only changed through the named set/clear methods.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct DisplayState {
    cursor: (u8, u8),
    display_control: u8,
    entry_mode: u8,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            cursor: (0, 0),
            display_control: LCD_FLAG_DISPLAYON | LCD_FLAG_CURSOROFF | LCD_FLAG_BLINKOFF,
            entry_mode: LCD_FLAG_ENTRYLEFT | LCD_FLAG_ENTRYSHIFTDECREMENT,
        }
    }
}

impl DisplayState {
    fn set_control_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.display_control |= flag;
        } else {
            self.display_control &= !flag;
        }
    }

    fn set_entry_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.entry_mode |= flag;
        } else {
            self.entry_mode &= !flag;
        }
    }

    fn display_control_command(&self) -> u8 {
        LCD_CMD_DISPLAYCONTROL | self.display_control
    }

    fn entry_mode_command(&self) -> u8 {
        LCD_CMD_ENTRYMODESET | self.entry_mode
    }
}

pub struct HD44780 {
    state: ControllerState,
    display: DisplayState,
    width: u8,
    cols: u8,
    rows: u8,
}

impl HD44780 {
    pub fn new(config: &LcdConfig) -> Self {
        Self {
            state: ControllerState::Uninitialized,
            display: DisplayState::default(),
            width: config.width(),
            cols: config.cols(),
            rows: config.rows(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn cursor_position(&self) -> (u8, u8) {
        self.display.cursor
    }

    /// The flags sent with every display control instruction.
    pub fn display_control(&self) -> u8 {
        self.display.display_control
    }

    pub fn entry_mode(&self) -> u8 {
        self.display.entry_mode
    }

    /// Runs the initialization sequence and moves to `Ready`. A failing step aborts the rest of
    /// the sequence, but the backlight byte and a clear instruction are always sent afterwards.
    pub fn init<DEVICE>(&mut self, device: &mut DEVICE)
    where
        DEVICE: DeviceHardwareTrait,
    {
        if let Err(err) = self.run_init_sequence(device) {
            log::warn!("Init LCD at {:#04x} failed: {:?}", device.address(), err);
        }

        let backlight = if device.backlight() {
            PIN_BACKLIGHT
        } else {
            0
        };
        best_effort("init backlight", || device.write_raw(backlight));
        device.send_command(LCD_CMD_CLEARDISPLAY);
        device.delay_ms(COMMAND_SETTLE_MS);

        self.display.cursor = (0, 0);
        self.state = ControllerState::Ready;
        log::debug!("Init LCD at {:#04x} done.", device.address());
    }

    fn run_init_sequence<DEVICE>(
        &mut self,
        device: &mut DEVICE,
    ) -> Result<(), LcdError<DEVICE::Error>>
    where
        DEVICE: DeviceHardwareTrait,
    {
        let steps = [
            LCD_INIT_8BIT,
            LCD_INIT_4BIT,
            self.display.entry_mode_command(),
            self.display.display_control_command(),
            LCD_CMD_FUNCTIONSET | LCD_FLAG_4BITMODE | LCD_FLAG_2LINE | LCD_FLAG_5x8_DOTS,
            LCD_CMD_CLEARDISPLAY,
        ];
        for step in steps {
            device.try_send_command(step)?;
            device.delay_ms(INIT_STEP_MS);
        }
        Ok(())
    }

    /// Moves the cursor. Out of range coordinates are clamped to the last row and column.
    pub fn set_cursor<DEVICE>(&mut self, device: &mut DEVICE, col: u8, row: u8)
    where
        DEVICE: DeviceHardwareTrait,
    {
        let row = row.min(self.rows.saturating_sub(1));
        let col = col.min(self.cols.saturating_sub(1));
        self.display.cursor = (col, row);
        device.send_command(LCD_CMD_SETDDRAMADDR | (ROW_OFFSETS[row as usize] + col));
        log::debug!("Cursor move ({}, {})", col, row);
    }

    pub fn clear<DEVICE>(&mut self, device: &mut DEVICE)
    where
        DEVICE: DeviceHardwareTrait,
    {
        device.send_command(LCD_CMD_CLEARDISPLAY);
        device.delay_ms(COMMAND_SETTLE_MS);
        self.display.cursor = (0, 0);
    }

    pub fn home<DEVICE>(&mut self, device: &mut DEVICE)
    where
        DEVICE: DeviceHardwareTrait,
    {
        device.send_command(LCD_CMD_RETURNHOME);
        device.delay_ms(COMMAND_SETTLE_MS);
        self.display.cursor = (0, 0);
    }

    /// The backlight bit only reaches the pins with a transfer, so a no-op instruction carries it.
    pub fn backlight<DEVICE>(&mut self, device: &mut DEVICE, on: bool)
    where
        DEVICE: DeviceHardwareTrait,
    {
        device.set_backlight(on);
        device.send_command(LCD_CMD_NOOP);
        device.delay_ms(COMMAND_SETTLE_MS);
    }

    pub fn show_cursor<DEVICE>(&mut self, device: &mut DEVICE, show_cursor: bool)
    where
        DEVICE: DeviceHardwareTrait,
    {
        self.display.set_control_flag(LCD_FLAG_CURSORON, show_cursor);
        self.send_display_control(device);
    }

    pub fn blink_cursor<DEVICE>(&mut self, device: &mut DEVICE, blink_cursor: bool)
    where
        DEVICE: DeviceHardwareTrait,
    {
        self.display.set_control_flag(LCD_FLAG_BLINKON, blink_cursor);
        self.send_display_control(device);
    }

    pub fn show_display<DEVICE>(&mut self, device: &mut DEVICE, show_display: bool)
    where
        DEVICE: DeviceHardwareTrait,
    {
        self.display.set_control_flag(LCD_FLAG_DISPLAYON, show_display);
        self.send_display_control(device);
    }

    fn send_display_control<DEVICE>(&mut self, device: &mut DEVICE)
    where
        DEVICE: DeviceHardwareTrait,
    {
        device.send_command(self.display.display_control_command());
        log::debug!("DISPLAYFUNC:\t{:#010b}", self.display.display_control);
        device.delay_ms(COMMAND_SETTLE_MS);
    }

    pub fn scroll_left<DEVICE>(&mut self, device: &mut DEVICE)
    where
        DEVICE: DeviceHardwareTrait,
    {
        device.send_command(LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVELEFT);
    }

    pub fn scroll_right<DEVICE>(&mut self, device: &mut DEVICE)
    where
        DEVICE: DeviceHardwareTrait,
    {
        device.send_command(LCD_CMD_CURSORSHIFT | LCD_FLAG_DISPLAYMOVE | LCD_FLAG_MOVERIGHT);
    }

    /// Text flow direction. `true` is left to right.
    pub fn set_left_to_right<DEVICE>(&mut self, device: &mut DEVICE, left_to_right: bool)
    where
        DEVICE: DeviceHardwareTrait,
    {
        self.display.set_entry_flag(LCD_FLAG_ENTRYLEFT, left_to_right);
        device.send_command(self.display.entry_mode_command());
    }

    pub fn autoscroll<DEVICE>(&mut self, device: &mut DEVICE, autoscroll: bool)
    where
        DEVICE: DeviceHardwareTrait,
    {
        self.display.set_entry_flag(LCD_FLAG_ENTRYSHIFTINCREMENT, autoscroll);
        device.send_command(self.display.entry_mode_command());
    }

    /// Writes `text` from the stored cursor column and stops at the display width. The stored
    /// cursor is left where it was.
    pub fn print<DEVICE>(&mut self, device: &mut DEVICE, text: &str)
    where
        DEVICE: DeviceHardwareTrait,
    {
        self.write_from_column(device, self.display.cursor.0, text.chars());
    }

    /// Moves the cursor, then writes `text` left justified in a line of exactly `width`
    /// characters. Output stops at the display width, measured from the requested column, so a
    /// column past the width only moves the cursor.
    pub fn write_at<DEVICE>(&mut self, device: &mut DEVICE, col: u8, row: u8, text: &str)
    where
        DEVICE: DeviceHardwareTrait,
    {
        self.set_cursor(device, col, row);
        self.write_from_column(device, col, layout_line(text, self.width as usize));
    }

    fn write_from_column<DEVICE, I>(&mut self, device: &mut DEVICE, col: u8, chars: I)
    where
        DEVICE: DeviceHardwareTrait,
        I: Iterator<Item = char>,
    {
        for (i, c) in chars.enumerate() {
            if i + col as usize >= self.width as usize {
                break;
            }
            device.send_data(char_code(c));
        }
    }
}

/// Pads `text` with spaces or truncates it to exactly `width` characters.
pub fn layout_line(text: &str, width: usize) -> impl Iterator<Item = char> + '_ {
    text.chars().chain(iter::repeat(' ')).take(width)
}

fn char_code(c: char) -> u8 {
    u8::try_from(c).unwrap_or(REPLACEMENT_CHAR)
}
