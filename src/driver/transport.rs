use core::fmt::Debug;

use embedded_hal::i2c;

/// The one bus capability the driver needs: write a single byte to a 7-bit device address.
/// No register pointer and no burst writes.
pub trait Transport {
    type Error: Debug;

    fn write_byte(&mut self, address: u8, value: u8) -> Result<(), Self::Error>;
}

impl<I2C> Transport for I2C
where
    I2C: i2c::I2c,
{
    type Error = I2C::Error;

    fn write_byte(&mut self, address: u8, value: u8) -> Result<(), Self::Error> {
        self.write(address, &[value])
    }
}

/// Runs a fallible bus operation and drops its error after logging it under `operation`.
///
/// The display offers no status feedback, so every protocol-level call made on behalf of the
/// user goes through here and the caller never sees a bus failure.
pub fn best_effort<E, F>(operation: &'static str, op: F)
where
    E: Debug,
    F: FnOnce() -> Result<(), E>,
{
    if let Err(err) = op() {
        log::error!("{}: {:?}", operation, err);
    }
}
