use crate::delay::Delay;
use crate::lcd::hd44780::driver::{Command, LiquidCrystal};
use crate::{GpioOutput, GpioResult, write_bits};
use log::{debug, trace};

const RS_INSTRUCTION: bool = false;
const RS_DATA: bool = true;

/// Time E is held high, and then low, for every latched nibble.
const ENABLE_PULSE_US: u32 = 40;
/// Wait after every character written.
const CHAR_DELAY_MS: u32 = 2;

/// HD44780 driver bit-banging the 4-bit parallel interface over six GPIO outputs.
///
/// The RW line is not driven and has to be tied low, so the busy flag is never read and fixed
/// delays are used instead. A miswired or missing display goes unnoticed.
#[derive(Debug)]
pub struct GpioLiquidCrystal<'a> {
    pin_rs: &'a dyn GpioOutput,
    pin_e: &'a dyn GpioOutput,
    /// D4 D5 D6 D7
    data_bus: [&'a dyn GpioOutput; 4],
    delay: &'a dyn Delay,
}

impl<'a> GpioLiquidCrystal<'a> {
    /// Binds the driver to its lines and initializes the display.
    pub fn new(
        pin_rs: &'a dyn GpioOutput,
        pin_e: &'a dyn GpioOutput,
        data_bus: [&'a dyn GpioOutput; 4],
        delay: &'a dyn Delay,
    ) -> GpioResult<Self> {
        let mut driver = GpioLiquidCrystal {
            pin_rs,
            pin_e,
            data_bus,
            delay,
        };
        driver.init()?;
        Ok(driver)
    }

    fn pulse_e(&self) -> GpioResult<()> {
        self.pin_e.write(true)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        self.pin_e.write(false)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        Ok(())
    }

    fn send_nibble(&self, nibble: u8) -> GpioResult<()> {
        trace!("Writing nibble: {:04b}", nibble);
        write_bits(&self.data_bus, nibble)?;
        self.pulse_e()
    }

    fn send(&self, data: u8) -> GpioResult<()> {
        trace!("Sending byte: {:08b}", data);
        self.send_nibble(data >> 4)?;
        self.send_nibble(data & 0x0F)
    }
}

impl LiquidCrystal for GpioLiquidCrystal<'_> {
    fn init(&mut self) -> GpioResult<()> {
        debug!("Initializing HD44780 in 4-bit mode");
        self.pin_rs.write(RS_INSTRUCTION)?;

        // Synchronize. The controller might be in 8-bit mode or halfway through a 4-bit transfer.
        for _ in 0..3 {
            self.send_nibble(0b0011)?;
        }
        self.send_nibble(0b0010)?;

        self.send(Command::FunctionSet.code())?;
        self.send(Command::DisplayOn.code())?;
        self.send(Command::EntryIncrement.code())?;
        self.clear()?;

        self.pin_rs.write(RS_DATA)?;
        debug!("HD44780 initialized");
        Ok(())
    }

    fn send_command(&mut self, command: Command) -> GpioResult<()> {
        trace!("Sending command: {:?}", command);
        self.pin_rs.write(RS_INSTRUCTION)?;
        self.send(command.code())?;
        self.pin_rs.write(RS_DATA)?;
        if let Some(ms) = command.execution_delay_ms() {
            self.delay.delay_ms(ms);
        }
        Ok(())
    }

    fn send_data(&mut self, data: u8) -> GpioResult<()> {
        self.send(data)?;
        self.delay.delay_ms(CHAR_DELAY_MS);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, LINE_E, Recorder};
    use std::time::Duration;

    #[test]
    fn enable_pulse_holds_both_levels() {
        let recorder = Recorder::new();
        let rs = recorder.output("rs");
        let e = recorder.output(LINE_E);
        let d = [
            recorder.output("d4"),
            recorder.output("d5"),
            recorder.output("d6"),
            recorder.output("d7"),
        ];
        let delay = recorder.delay();
        let lcd = GpioLiquidCrystal {
            pin_rs: &rs,
            pin_e: &e,
            data_bus: [&d[0], &d[1], &d[2], &d[3]],
            delay: &delay,
        };

        lcd.pulse_e().unwrap();

        assert_eq!(
            recorder.events(),
            vec![
                Event::write(LINE_E, true),
                Event::Delay(Duration::from_micros(40)),
                Event::write(LINE_E, false),
                Event::Delay(Duration::from_micros(40)),
            ]
        );
    }

    #[test]
    fn byte_is_sent_high_nibble_first() {
        let recorder = Recorder::new();
        let rs = recorder.output("rs");
        let e = recorder.output(LINE_E);
        let d = [
            recorder.output("d4"),
            recorder.output("d5"),
            recorder.output("d6"),
            recorder.output("d7"),
        ];
        let delay = recorder.delay();
        let lcd = GpioLiquidCrystal {
            pin_rs: &rs,
            pin_e: &e,
            data_bus: [&d[0], &d[1], &d[2], &d[3]],
            delay: &delay,
        };

        lcd.send(0b1100_0101).unwrap();

        assert_eq!(recorder.latches(), vec![(false, 0b1100), (false, 0b0101)]);
        assert!(recorder.writes_while_enabled().is_empty());
    }
}
