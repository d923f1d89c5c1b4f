use embedded_hal::delay::DelayNs;

use crate::{
    bit_configurations::Pcf8574Bits,
    driver::{transport::Transport, DeviceHardwareTrait},
    LcdError,
};

/// Minimum time the enable line is held high before the falling edge latches a nibble.
pub const ENABLE_SETTLE_MS: u32 = 2;

/// Clocks bytes into an HD44780 wired to P4-P7 of a PCF8574 in 4-bit mode. Each byte is two
/// nibble transfers, high nibble first, and each transfer is an enable-high write, a settle
/// delay, then an enable-low write. The backlight bit is repeated on every write so that a
/// transfer never switches the backlight by accident.
pub struct NibbleEncoder<T, DELAY>
where
    T: Transport,
    DELAY: DelayNs,
{
    transport: T,
    delay: DELAY,
    address: u8,
    backlight: bool,
}

impl<T, DELAY> NibbleEncoder<T, DELAY>
where
    T: Transport,
    DELAY: DelayNs,
{
    pub fn new(transport: T, delay: DELAY, address: u8, backlight: bool) -> Self {
        Self {
            transport,
            delay,
            address,
            backlight,
        }
    }

    /// Gives back the bus handle and the delay. Nothing is written to the display.
    pub fn release(self) -> (T, DELAY) {
        (self.transport, self.delay)
    }

    /// returns the transport object. mostly used for testing
    #[cfg(test)]
    pub(crate) fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    fn write_byte_to_controller(
        &mut self,
        rs_setting: bool,
        value: u8,
    ) -> Result<(), LcdError<T::Error>> {
        self.write_nibble(rs_setting, value >> 4)?;
        self.write_nibble(rs_setting, value & 0x0F)
    }

    fn write_nibble(&mut self, rs_setting: bool, nibble: u8) -> Result<(), LcdError<T::Error>> {
        let frame = Pcf8574Bits::frame(nibble, rs_setting, self.backlight);
        self.write_raw(frame.with_enable(true).bits())?;
        self.delay.delay_ms(ENABLE_SETTLE_MS);
        // falling edge latches the nibble
        self.write_raw(frame.with_enable(false).bits())
    }
}

impl<T, DELAY> DeviceHardwareTrait for NibbleEncoder<T, DELAY>
where
    T: Transport,
    DELAY: DelayNs,
{
    type Error = T::Error;

    fn address(&self) -> u8 {
        self.address
    }

    fn backlight(&self) -> bool {
        self.backlight
    }

    fn set_backlight(&mut self, on: bool) {
        self.backlight = on;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn try_send_command(&mut self, command: u8) -> Result<(), LcdError<Self::Error>> {
        log::debug!("CMD:\t{:#04x}({:#010b})", command, command);
        self.write_byte_to_controller(false, command)
    }

    fn try_send_data(&mut self, data: u8) -> Result<(), LcdError<Self::Error>> {
        log::debug!("DATA:\t{:#04x}({})", data, data as char);
        self.write_byte_to_controller(true, data)
    }

    fn write_raw(&mut self, value: u8) -> Result<(), LcdError<Self::Error>> {
        self.transport
            .write_byte(self.address, value)
            .map_err(LcdError::Bus)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::bit_configurations::{PIN_BACKLIGHT, PIN_ENABLE, PIN_RS};
    use core::cell::RefCell;
    use embedded_hal::i2c::ErrorKind;
    use std::vec::Vec;
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        i2c::{Mock as I2cMock, Transaction as I2cTransaction},
    };

    #[test]
    fn test_send_command_four_writes_rs_low() {
        let expected_transactions = [
            // command 0xAD, backlight on
            I2cTransaction::write(0x27, std::vec![0b1010_1100]), // high nibble, bl=1, enable=1, rs=0
            I2cTransaction::write(0x27, std::vec![0b1010_1000]), // high nibble, bl=1, enable=0, rs=0
            I2cTransaction::write(0x27, std::vec![0b1101_1100]), // low nibble, bl=1, enable=1, rs=0
            I2cTransaction::write(0x27, std::vec![0b1101_1000]), // low nibble, bl=1, enable=0, rs=0
        ];
        let mut encoder =
            NibbleEncoder::new(I2cMock::new(&expected_transactions), NoopDelay, 0x27, true);
        assert!(encoder.try_send_command(0xAD).is_ok());
        encoder.transport().done();
    }

    #[test]
    fn test_send_data_four_writes_rs_high() {
        let expected_transactions = [
            // data 0xDE, backlight off
            I2cTransaction::write(0x27, std::vec![0b1101_0101]), // high nibble, bl=0, enable=1, rs=1
            I2cTransaction::write(0x27, std::vec![0b1101_0001]), // high nibble, bl=0, enable=0, rs=1
            I2cTransaction::write(0x27, std::vec![0b1110_0101]), // low nibble, bl=0, enable=1, rs=1
            I2cTransaction::write(0x27, std::vec![0b1110_0001]), // low nibble, bl=0, enable=0, rs=1
        ];
        let mut encoder =
            NibbleEncoder::new(I2cMock::new(&expected_transactions), NoopDelay, 0x27, false);
        assert!(encoder.try_send_data(0xDE).is_ok());
        encoder.transport().done();
    }

    #[test]
    fn test_framing_for_every_byte() {
        for value in 0..=u8::MAX {
            for rs in [false, true] {
                let rs_bit = if rs { PIN_RS } else { 0 };
                let high = (value & 0xF0) | PIN_BACKLIGHT | rs_bit;
                let low = ((value & 0x0F) << 4) | PIN_BACKLIGHT | rs_bit;
                let expected_transactions = [
                    I2cTransaction::write(0x3F, std::vec![high | PIN_ENABLE]),
                    I2cTransaction::write(0x3F, std::vec![high]),
                    I2cTransaction::write(0x3F, std::vec![low | PIN_ENABLE]),
                    I2cTransaction::write(0x3F, std::vec![low]),
                ];
                let mut encoder =
                    NibbleEncoder::new(I2cMock::new(&expected_transactions), NoopDelay, 0x3F, true);
                let result = if rs {
                    encoder.try_send_data(value)
                } else {
                    encoder.try_send_command(value)
                };
                assert!(result.is_ok());
                encoder.transport().done();
            }
        }
    }

    #[test]
    fn test_bus_error_aborts_remaining_writes() {
        let expected_transactions = [
            I2cTransaction::write(0x27, std::vec![0b0000_1100]),
            I2cTransaction::write(0x27, std::vec![0b0000_1000]).with_error(ErrorKind::Other),
        ];
        let mut encoder =
            NibbleEncoder::new(I2cMock::new(&expected_transactions), NoopDelay, 0x27, true);
        assert_eq!(
            encoder.try_send_command(0x01),
            Err(LcdError::Bus(ErrorKind::Other))
        );
        encoder.transport().done();
    }

    #[test]
    fn test_best_effort_send_swallows_bus_error() {
        let expected_transactions = [
            I2cTransaction::write(0x27, std::vec![0b0100_1101]).with_error(ErrorKind::NoAcknowledge(
                embedded_hal::i2c::NoAcknowledgeSource::Address,
            )),
            // the next byte is still attempted
            I2cTransaction::write(0x27, std::vec![0b0100_1101]),
            I2cTransaction::write(0x27, std::vec![0b0100_1001]),
            I2cTransaction::write(0x27, std::vec![0b0001_1101]),
            I2cTransaction::write(0x27, std::vec![0b0001_1001]),
        ];
        let mut encoder =
            NibbleEncoder::new(I2cMock::new(&expected_transactions), NoopDelay, 0x27, true);
        encoder.send_data(b'A');
        encoder.send_data(b'A');
        encoder.transport().done();
    }

    #[test]
    fn test_backlight_bit_follows_setting() {
        let expected_transactions = [
            I2cTransaction::write(0x27, std::vec![0b0000_0100]), // bl=0
            I2cTransaction::write(0x27, std::vec![0b0000_0000]),
            I2cTransaction::write(0x27, std::vec![0b0000_0100]),
            I2cTransaction::write(0x27, std::vec![0b0000_0000]),
            I2cTransaction::write(0x27, std::vec![0b0000_1100]), // bl=1
            I2cTransaction::write(0x27, std::vec![0b0000_1000]),
            I2cTransaction::write(0x27, std::vec![0b0000_1100]),
            I2cTransaction::write(0x27, std::vec![0b0000_1000]),
        ];
        let mut encoder =
            NibbleEncoder::new(I2cMock::new(&expected_transactions), NoopDelay, 0x27, false);
        assert!(!encoder.backlight());
        encoder.send_command(0x00);
        encoder.set_backlight(true);
        assert!(encoder.backlight());
        encoder.send_command(0x00);
        encoder.transport().done();
    }

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    enum Event {
        Write(u8),
        DelayMs(u32),
    }

    /// bus and delay sharing one event log, so their interleaving can be checked
    struct EventBus<'a>(&'a RefCell<Vec<Event>>);

    impl Transport for EventBus<'_> {
        type Error = ErrorKind;

        fn write_byte(&mut self, _address: u8, value: u8) -> Result<(), Self::Error> {
            self.0.borrow_mut().push(Event::Write(value));
            Ok(())
        }
    }

    struct EventDelay<'a>(&'a RefCell<Vec<Event>>);

    impl DelayNs for EventDelay<'_> {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.0.borrow_mut().push(Event::DelayMs(ms));
        }
    }

    #[test]
    fn test_settle_delay_between_enable_edges() {
        let events = RefCell::new(Vec::new());
        let mut encoder =
            NibbleEncoder::new(EventBus(&events), EventDelay(&events), 0x27, true);
        assert!(encoder.try_send_command(0xAD).is_ok());
        assert!(encoder.try_send_data(b'A').is_ok());

        let expected = std::vec![
            Event::Write(0b1010_1100),
            Event::DelayMs(ENABLE_SETTLE_MS),
            Event::Write(0b1010_1000),
            Event::Write(0b1101_1100),
            Event::DelayMs(ENABLE_SETTLE_MS),
            Event::Write(0b1101_1000),
            Event::Write(0b0100_1101),
            Event::DelayMs(ENABLE_SETTLE_MS),
            Event::Write(0b0100_1001),
            Event::Write(0b0001_1101),
            Event::DelayMs(ENABLE_SETTLE_MS),
            Event::Write(0b0001_1001),
        ];
        assert_eq!(*events.borrow(), expected);

        // every enable-high write is followed by the settle delay, then the same frame with enable low
        for window in events.borrow().chunks(3) {
            match window {
                [Event::Write(high), Event::DelayMs(ms), Event::Write(low)] => {
                    assert_eq!(high & PIN_ENABLE, PIN_ENABLE);
                    assert_eq!(*ms, ENABLE_SETTLE_MS);
                    assert_eq!(*low, high & !PIN_ENABLE);
                }
                other => panic!("unexpected nibble transfer {:?}", other),
            }
        }
    }

    #[test]
    fn test_write_raw_and_release() {
        let expected_transactions = [I2cTransaction::write(0x20, std::vec![PIN_BACKLIGHT])];
        let mut encoder =
            NibbleEncoder::new(I2cMock::new(&expected_transactions), NoopDelay, 0x20, true);
        assert_eq!(encoder.address(), 0x20);
        assert!(encoder.write_raw(PIN_BACKLIGHT).is_ok());
        let (mut i2c, _delay) = encoder.release();
        i2c.done();
    }
}
