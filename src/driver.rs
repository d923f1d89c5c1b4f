pub mod encoder;
pub mod hd44780;
pub mod transport;

use core::fmt::Debug;

use crate::{driver::transport::best_effort, LcdError};

/// Trait for the hardware side of the display. Embodies how command and data bytes reach the
/// HD44780 controller. `HD44780` drives the display through this trait only, so it never
/// touches the bus or the expander pin layout directly.
///
/// The `try_` methods report bus failures. The provided `send_command` and `send_data`
/// methods are their best-effort counterparts: a failure is logged and dropped.
pub trait DeviceHardwareTrait {
    type Error: Debug;

    /// returns the configured i2c address
    fn address(&self) -> u8;

    /// returns the backlight bit carried on every expander write
    fn backlight(&self) -> bool;

    /// updates the backlight bit. Nothing is written until the next transfer.
    fn set_backlight(&mut self, on: bool);

    /// blocks the calling thread
    fn delay_ms(&mut self, ms: u32);

    /// writes an instruction byte (RS low) as two nibble transfers
    fn try_send_command(&mut self, command: u8) -> Result<(), LcdError<Self::Error>>;

    /// writes a character byte (RS high) as two nibble transfers
    fn try_send_data(&mut self, data: u8) -> Result<(), LcdError<Self::Error>>;

    /// writes `value` to the expander pins as is, without an enable strobe
    fn write_raw(&mut self, value: u8) -> Result<(), LcdError<Self::Error>>;

    fn send_command(&mut self, command: u8) {
        best_effort("send_command", || self.try_send_command(command));
    }

    fn send_data(&mut self, data: u8) {
        best_effort("send_data", || self.try_send_data(data));
    }
}
