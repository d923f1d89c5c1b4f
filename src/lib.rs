//! This Rust `embedded-hal`-based library drives a [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller)
//! compatible character display, 16x2 class, through a PCF8574 I2C GPIO expander in 4-bit mode. The expander is wired
//! the way the common "I2C backpack" boards do it: P0 is register select, P1 read/write, P2 enable, P3 the backlight
//! and P4-P7 the upper four data lines of the display.
//!
//! The driver is write-only. It never reads the busy flag and relies on fixed delays instead, so there is nothing
//! the display can report back. Every operation is therefore best effort: a failed bus write is logged through the
//! [`log`](https://docs.rs/log) facade and otherwise ignored, and no display operation returns an error.
//!
//! Key features include:
//! - High-level API for positioning, printing and toggling display, cursor, blink and backlight
//! - Cursor coordinates are clamped to the display, never rejected
//! - `write_at` lays a line out to exactly the display width
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Compatible with the `embedded-hal` traits v1.0 and later
//! - Optional support for the `defmt` and `ufmt` logging frameworks
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! pcf8574-lcd = { version = "0.1", features = ["defmt"] }
//! ```
//! Create the display. Construction sends the initialization sequence, so the display is ready afterwards:
//! ```rust
//! use pcf8574_lcd::{CharacterDisplay, LcdConfig};
//!
//! let i2c = ...; // I2C peripheral
//! let delay = ...; // DelayNs implementation
//!
//! // defaults: address 0x27, 16x2, backlight on, log level Info
//! let mut lcd = CharacterDisplay::new(i2c, delay);
//! // or with a specific configuration
//! let config = LcdConfig::default().with_address(0x3F).with_verbosity(log::LevelFilter::Debug);
//! let mut lcd = CharacterDisplay::with_config(i2c, delay, config)?;
//! ```
//! Use the display:
//! ```rust
//! lcd.clear().write_at(0, 0, "--LINE 1 OK").write_at(0, 1, "--LINE 2 OK");
//! lcd.set_cursor(0, 0).print("Blinking").blink();
//!
//! use core::fmt::Write;
//! write!(lcd, "{}", 42)?;
//! ```
//! `print` does not advance the stored cursor column; consecutive prints are each bounded from the column set by the
//! last `set_cursor` or `write_at`.
//!
//! The display must not be shared between threads without external locking. Wrap the whole `CharacterDisplay` in a
//! mutex if several tasks write to it.
//!
#![no_std]
#![allow(dead_code, non_upper_case_globals)]
use core::fmt::{Debug, Display};

use embedded_hal::delay::DelayNs;

mod bit_configurations;
mod config;
mod driver;

pub use config::{ConfigError, LcdConfig};
pub use driver::hd44780::ControllerState;
pub use driver::transport::Transport;

use driver::{encoder::NibbleEncoder, hd44780::HD44780, DeviceHardwareTrait};

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
/// Errors raised on the bus side of the driver. They are logged and never returned from the
/// display operations.
pub enum LcdError<E> {
    /// Error returned from the underlying I2C implementation
    Bus(E),
}

impl<E> From<&LcdError<E>> for &'static str {
    fn from(err: &LcdError<E>) -> Self {
        match err {
            LcdError::Bus(_) => "I2C bus error",
        }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for LcdError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<E> ufmt::uDisplay for LcdError<E> {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<E> Display for LcdError<E>
where
    E: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        match self {
            LcdError::Bus(cause) => write!(f, "{}: {:?}", msg, cause),
        }
    }
}

/// HD44780 character display behind a PCF8574 expander. Owns the bus handle and the delay
/// until [`release`](CharacterDisplay::release) gives them back.
pub struct CharacterDisplay<T, DELAY>
where
    T: Transport,
    DELAY: DelayNs,
{
    config: LcdConfig,
    device: NibbleEncoder<T, DELAY>,
    controller: HD44780,
}

impl<T, DELAY> CharacterDisplay<T, DELAY>
where
    T: Transport,
    DELAY: DelayNs,
{
    /// Create and initialize a display with the default configuration: address 0x27, 16x2,
    /// backlight on.
    pub fn new(transport: T, delay: DELAY) -> Self {
        Self::build(transport, delay, LcdConfig::default())
    }

    /// Create and initialize a display with a specific configuration.
    pub fn with_config(
        transport: T,
        delay: DELAY,
        config: LcdConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(transport, delay, config))
    }

    fn build(transport: T, delay: DELAY, config: LcdConfig) -> Self {
        log::set_max_level(config.verbosity());
        let mut display = Self {
            device: NibbleEncoder::new(transport, delay, config.address(), config.backlight()),
            controller: HD44780::new(&config),
            config,
        };
        display.controller.init(&mut display.device);
        log::info!(
            "LCD {}x{} ready at {:#04x} on bus {}",
            display.config.cols(),
            display.config.rows(),
            display.config.address(),
            display.config.bus()
        );
        display
    }

    /// Gives back the bus handle and the delay. The display keeps showing its last state.
    pub fn release(self) -> (T, DELAY) {
        self.device.release()
    }

    /// returns a reference to the transport. mostly needed for testing
    #[cfg(test)]
    fn transport(&mut self) -> &mut T {
        self.device.transport()
    }

    pub fn config(&self) -> &LcdConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.controller.state()
    }

    /// Cursor position as `(column, row)`, after clamping.
    pub fn cursor_position(&self) -> (u8, u8) {
        self.controller.cursor_position()
    }

    pub fn is_backlight_on(&self) -> bool {
        self.device.backlight()
    }

    /// Display, cursor and blink flags as sent with the display control instruction.
    pub fn display_control(&self) -> u8 {
        self.controller.display_control()
    }

    //--------------------------------------------------------------------------------------------------
    // high level commands, for the user!
    //--------------------------------------------------------------------------------------------------

    /// Set the cursor position at specified column and row. Columns and rows are zero-indexed and
    /// clamped to the last valid column and row.
    pub fn set_cursor(&mut self, col: u8, row: u8) -> &mut Self {
        self.controller.set_cursor(&mut self.device, col, row);
        self
    }

    /// Clear the display
    pub fn clear(&mut self) -> &mut Self {
        self.controller.clear(&mut self.device);
        self
    }

    /// Set the cursor to the home position.
    pub fn home(&mut self) -> &mut Self {
        self.controller.home(&mut self.device);
        self
    }

    /// Turn the backlight on
    pub fn backlight(&mut self) -> &mut Self {
        self.controller.backlight(&mut self.device, true);
        self
    }

    /// Turn the backlight off
    pub fn no_backlight(&mut self) -> &mut Self {
        self.controller.backlight(&mut self.device, false);
        self
    }

    /// Show the cursor
    pub fn cursor(&mut self) -> &mut Self {
        self.controller.show_cursor(&mut self.device, true);
        self
    }

    pub fn no_cursor(&mut self) -> &mut Self {
        self.controller.show_cursor(&mut self.device, false);
        self
    }

    /// Blink the cursor position
    pub fn blink(&mut self) -> &mut Self {
        self.controller.blink_cursor(&mut self.device, true);
        self
    }

    pub fn no_blink(&mut self) -> &mut Self {
        self.controller.blink_cursor(&mut self.device, false);
        self
    }

    /// Turn the display on. DDRAM content survives `no_display`.
    pub fn display(&mut self) -> &mut Self {
        self.controller.show_display(&mut self.device, true);
        self
    }

    pub fn no_display(&mut self) -> &mut Self {
        self.controller.show_display(&mut self.device, false);
        self
    }

    /// Scroll the display to the left.
    pub fn scroll_display_left(&mut self) -> &mut Self {
        self.controller.scroll_left(&mut self.device);
        self
    }

    /// Scroll the display to the right.
    pub fn scroll_display_right(&mut self) -> &mut Self {
        self.controller.scroll_right(&mut self.device);
        self
    }

    /// Set the text flow direction to left to right.
    pub fn left_to_right(&mut self) -> &mut Self {
        self.controller.set_left_to_right(&mut self.device, true);
        self
    }

    /// Set the text flow direction to right to left.
    pub fn right_to_left(&mut self) -> &mut Self {
        self.controller.set_left_to_right(&mut self.device, false);
        self
    }

    /// Set the auto scroll mode.
    pub fn autoscroll(&mut self, autoscroll: bool) -> &mut Self {
        self.controller.autoscroll(&mut self.device, autoscroll);
        self
    }

    /// Prints a string at the current cursor position. Characters past the display width are
    /// dropped, nothing wraps to the next row.
    pub fn print(&mut self, text: &str) -> &mut Self {
        self.controller.print(&mut self.device, text);
        self
    }

    /// Writes a full line starting at `(col, row)`: `text` is padded with spaces or truncated to
    /// the display width.
    pub fn write_at(&mut self, col: u8, row: u8, text: &str) -> &mut Self {
        self.controller.write_at(&mut self.device, col, row, text);
        self
    }
}

/// Implement the `core::fmt::Write` trait for the display, allowing it to be used with the `write!` macro.
/// Each formatted fragment is printed from the stored cursor column.
impl<T, DELAY> core::fmt::Write for CharacterDisplay<T, DELAY>
where
    T: Transport,
    DELAY: DelayNs,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        self.print(s);
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait for the display, allowing it to be used with the `uwriteln!` and `uwrite!` macros.
impl<T, DELAY> ufmt::uWrite for CharacterDisplay<T, DELAY>
where
    T: Transport,
    DELAY: DelayNs,
{
    type Error = core::convert::Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        self.print(s);
        Ok(())
    }
}
