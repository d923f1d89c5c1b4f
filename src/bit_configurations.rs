use bitfield::bitfield;

// commands
pub const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
pub const LCD_CMD_RETURNHOME: u8 = 0x02; //  Set cursor position to zero
pub const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
pub const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Display on/off, cursor on/off, blink on/off
pub const LCD_CMD_CURSORSHIFT: u8 = 0x10; //  Moves the cursor or shifts the display
pub const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Bus width, line count and font
pub const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Sets the DDRAM (Display Data RAM) address
pub const LCD_CMD_NOOP: u8 = 0x00; //  No effect on the controller, only clocks the expander pins

// 8-bit then 4-bit wake up, sent as full bytes per the 4-bit init procedure
pub const LCD_INIT_8BIT: u8 = 0x33;
pub const LCD_INIT_4BIT: u8 = 0x32;

// flags for display entry mode
pub const LCD_FLAG_ENTRYRIGHT: u8 = 0x00; //  Text flows from right to left
pub const LCD_FLAG_ENTRYLEFT: u8 = 0x02; //  Text flows from left to right
pub const LCD_FLAG_ENTRYSHIFTINCREMENT: u8 = 0x01; //  Shift the display on each write
pub const LCD_FLAG_ENTRYSHIFTDECREMENT: u8 = 0x00; //  Keep the display still on each write

// flags for display on/off control
pub const LCD_FLAG_DISPLAYON: u8 = 0x04; //  Turns the display on
pub const LCD_FLAG_DISPLAYOFF: u8 = 0x00; //  Turns the display off
pub const LCD_FLAG_CURSORON: u8 = 0x02; //  Turns the cursor on
pub const LCD_FLAG_CURSOROFF: u8 = 0x00; //  Turns the cursor off
pub const LCD_FLAG_BLINKON: u8 = 0x01; //  Turns on the blinking cursor
pub const LCD_FLAG_BLINKOFF: u8 = 0x00; //  Turns off the blinking cursor

// flags for display/cursor shift
pub const LCD_FLAG_DISPLAYMOVE: u8 = 0x08; //  Flag for moving the display
pub const LCD_FLAG_CURSORMOVE: u8 = 0x00; //  Flag for moving the cursor
pub const LCD_FLAG_MOVERIGHT: u8 = 0x04; //  Flag for moving right
pub const LCD_FLAG_MOVELEFT: u8 = 0x00; //  Flag for moving left

// flags for function set
pub const LCD_FLAG_8BITMODE: u8 = 0x10; //  LCD 8 bit mode
pub const LCD_FLAG_4BITMODE: u8 = 0x00; //  LCD 4 bit mode
pub const LCD_FLAG_2LINE: u8 = 0x08; //  LCD 2 line mode
pub const LCD_FLAG_1LINE: u8 = 0x00; //  LCD 1 line mode
pub const LCD_FLAG_5x10_DOTS: u8 = 0x04; //  10 pixel high font mode
pub const LCD_FLAG_5x8_DOTS: u8 = 0x00; //  8 pixel high font mode

// PCF8574 pins P0..P3 as single-bit masks
pub const PIN_RS: u8 = 0b0000_0001; //  Register select
pub const PIN_RW: u8 = 0b0000_0010; //  Read/write, always low for this driver
pub const PIN_ENABLE: u8 = 0b0000_0100; //  Enable strobe
pub const PIN_BACKLIGHT: u8 = 0b0000_1000; //  Backlight transistor

/// DDRAM base address of each row. Rows 2 and 3 continue rows 0 and 1 on the
/// controller, which is why the table stops at four entries.
pub const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

// Wiring of the common PCF8574 backpack: P0=RS, P1=RW, P2=E, P3=backlight, P4-P7=DB4-DB7
bitfield! {
    pub struct Pcf8574Bits(u8);
    impl Debug;
    impl BitAnd;
    pub rs, set_rs: 0, 0;
    pub rw, set_rw: 1, 1;
    pub enable, set_enable: 2, 2;
    pub backlight, set_backlight: 3, 3;
    pub data, set_data: 7, 4;
}

impl Clone for Pcf8574Bits {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl Copy for Pcf8574Bits {}

impl Pcf8574Bits {
    /// Frame one nibble transfer. `enable` is left low; the encoder raises and
    /// lowers it around the framed value.
    pub fn frame(nibble: u8, rs: bool, backlight: bool) -> Self {
        let mut bits = Pcf8574Bits(0);
        bits.set_data(nibble & 0x0F);
        bits.set_rs(rs as u8);
        bits.set_rw(0);
        bits.set_backlight(backlight as u8);
        bits
    }

    pub fn with_enable(mut self, enable: bool) -> Self {
        self.set_enable(enable as u8);
        self
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}
