mod config;

use crate::config::Config;
use dotenv::dotenv;
use lcdpico_gpio::GpioDriver;
use lcdpico_gpio::GpioResult;
use lcdpico_gpio::delay::{Delay, StdDelay};
use lcdpico_gpio::gpiod::GpiodDriver;
use lcdpico_gpio::lcd::hd44780::driver::{GpioLiquidCrystal, LiquidCrystal};
use log::{debug, info, warn};
use std::env::var;
use sysinfo::System;
use time::OffsetDateTime;
use time::macros::format_description;

/// Lines of the 20x4 display this demo is laid out for.
const DISPLAY_LINES: usize = 4;

fn parse_pin_bus(pin_str: &str) -> eyre::Result<[usize; 4]> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| eyre::eyre!("Invalid number of data pins"))
}

fn show_lines(lcd: &mut dyn LiquidCrystal, lines: &[String]) -> GpioResult<()> {
    lcd.clear()?;
    for (i, line) in lines.iter().take(DISPLAY_LINES).enumerate() {
        lcd.move_to(i, 0)?;
        lcd.write(line)?;
    }
    Ok(())
}

fn show_attributes(lcd: &mut dyn LiquidCrystal, delay: &dyn Delay) -> GpioResult<()> {
    info!("Blinking cursor");
    lcd.display_blink_on()?;
    delay.delay_secs(2.0);
    lcd.display_blink_off()?;

    info!("Shifting text");
    for _ in 0..4 {
        lcd.display_shift_text_right()?;
        delay.delay_secs(0.3);
    }
    for _ in 0..4 {
        lcd.display_shift_text_left()?;
        delay.delay_secs(0.3);
    }

    info!("Writing backwards");
    lcd.move_to(0, 19)?;
    lcd.cursor_move_back()?;
    lcd.write("<<<")?;
    lcd.cursor_move_forward()?;
    lcd.move_cursor_left()?;

    info!("Display off and on");
    lcd.display_off()?;
    delay.delay_secs(1.0);
    lcd.display_on()?;
    Ok(())
}

fn run_clock(lcd: &mut dyn LiquidCrystal, delay: &dyn Delay, line: usize) -> eyre::Result<()> {
    let format = format_description!("[hour]:[minute]:[second]");
    let now = || {
        OffsetDateTime::now_local().unwrap_or_else(|_| {
            warn!("Local offset unavailable, using UTC");
            OffsetDateTime::now_utc()
        })
    };

    info!("Showing clock on line {}", line);
    loop {
        let text = now().format(&format)?;
        lcd.move_to(line, 0)?;
        lcd.write(&text)?;
        delay.delay_secs(0.5);
    }
}

fn main() -> eyre::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!(
        "Hello, {}!",
        System::name().as_deref().unwrap_or(UNKNOWN_STR)
    );
    info!(
        "Hostname {}",
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR)
    );

    let chip = var("LCDPICO_CHIP").unwrap_or_else(|_| "/dev/gpiochip0".to_string());
    let lcd_rs_pin_no: usize = var("LCDPICO_PIN_RS")?.parse()?;
    let lcd_e_pin_no: usize = var("LCDPICO_PIN_E")?.parse()?;
    let lcd_data_pin_nos: [usize; 4] = parse_pin_bus(&var("LCDPICO_PINS_DATA")?)?;

    info!(
        "LCD @ {} RS: {}, E: {}, D4-D7: {:?}",
        chip, lcd_rs_pin_no, lcd_e_pin_no, lcd_data_pin_nos
    );

    let config = Config::try_load().unwrap_or_default();
    debug!("{:?}", config);

    debug!("Initializing GPIO driver...");
    let gpio = GpiodDriver::open(&chip)?;
    debug!("{:?} initialized.", gpio);

    let lcd_rs_out = gpio.get_output(lcd_rs_pin_no)?;
    let lcd_e_out = gpio.get_output(lcd_e_pin_no)?;
    let lcd_data_out = lcd_data_pin_nos
        .iter()
        .map(|&no| gpio.get_output(no))
        .collect::<Result<Vec<_>, _>>()?;

    let delay = StdDelay;

    debug!("Initializing LCD driver...");
    let mut lcd = GpioLiquidCrystal::new(
        &*lcd_rs_out,
        &*lcd_e_out,
        [
            &*lcd_data_out[0],
            &*lcd_data_out[1],
            &*lcd_data_out[2],
            &*lcd_data_out[3],
        ],
        &delay,
    )?;
    info!("LCD ready");

    show_lines(&mut lcd, &config.lines)?;
    show_attributes(&mut lcd, &delay)?;

    if config.clock {
        let line = config.lines.len().min(DISPLAY_LINES - 1);
        run_clock(&mut lcd, &delay, line)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcdpico_gpio::mock::{LINE_E, LINE_RS, LINES_DATA, Recorder};

    #[test]
    fn pin_bus_separators() {
        assert_eq!(parse_pin_bus("26, 16 ;20,21").unwrap(), [26, 16, 20, 21]);
        assert!(parse_pin_bus("1,2,3").is_err());
        assert!(parse_pin_bus("1,2,3,x").is_err());
    }

    #[test]
    fn lines_are_placed_with_move_to() {
        let recorder = Recorder::new();
        let rs = recorder.output(LINE_RS);
        let e = recorder.output(LINE_E);
        let [d4, d5, d6, d7] = LINES_DATA.map(|name| recorder.output(name));
        let delay = recorder.delay();
        let mut lcd = GpioLiquidCrystal::new(&rs, &e, [&d4, &d5, &d6, &d7], &delay).unwrap();
        recorder.clear();

        let lines: Vec<String> = ["a", "b", "c", "d", "e"].map(String::from).to_vec();
        show_lines(&mut lcd, &lines).unwrap();

        // clear, then per line: home, offset steps, one character; the fifth line is dropped
        let bytes = recorder.latches().len() / 2;
        assert_eq!(bytes, 1 + 4 * 2 + (40 + 20 + 60));
    }
}
