mod config;

use crate::config::Config;
use dotenv::dotenv;
use eyre::WrapErr;
use lcd1602_i2c::linux::{open_bus, Delay, I2cdev};
use lcd1602_i2c::{DisplayExt, HD44780Driver, I2cHD44780Driver};
use log::{debug, info, warn};
use std::thread::sleep;
use sysinfo::System;
use time::OffsetDateTime;

type Lcd = I2cHD44780Driver<I2cdev, Delay>;

/// One manual check: what it shows, so the person watching the display can judge it.
struct Step {
    name: &'static str,
    expected: &'static str,
    run: fn(&mut Lcd, &Config) -> eyre::Result<()>,
}

const STEPS: &[Step] = &[
    Step {
        name: "STR",
        expected: "\"Hello\" on row 0 and \"World!\" on row 1",
        run: show_string,
    },
    Step {
        name: "NUM",
        expected: "\"1234\" at (4, 0) and \"-56\" at (0, 1)",
        run: show_number,
    },
    Step {
        name: "CLR",
        expected: "screen cleared",
        run: clear,
    },
    Step {
        name: "ON",
        expected: "display turns off and back on, \"ON Test\" stays",
        run: on_off,
    },
    Step {
        name: "BL",
        expected: "backlight turns off and back on",
        run: backlight,
    },
    Step {
        name: "SFT",
        expected: "\"Shift Test\" shifts left 5 times, then back right",
        run: shift,
    },
    Step {
        name: "CHR",
        expected: "a heart glyph at (0, 0)",
        run: custom_char,
    },
];

fn show_string(lcd: &mut Lcd, config: &Config) -> eyre::Result<()> {
    lcd.write_string("Hello", 0, 0)?;
    lcd.write_string("World!", 0, 1)?;
    sleep(config.step_pause * 2);
    Ok(())
}

fn show_number(lcd: &mut Lcd, config: &Config) -> eyre::Result<()> {
    lcd.write_number(1234, 4, 0)?;
    lcd.write_number(-56, 0, 1)?;
    sleep(config.step_pause * 2);
    Ok(())
}

fn clear(lcd: &mut Lcd, config: &Config) -> eyre::Result<()> {
    lcd.clear_display()?;
    sleep(config.step_pause);
    Ok(())
}

fn on_off(lcd: &mut Lcd, config: &Config) -> eyre::Result<()> {
    lcd.display_on()?;
    lcd.write_string("ON Test", 0, 0)?;
    sleep(config.step_pause);

    lcd.display_off()?;
    sleep(config.step_pause);

    lcd.display_on()?;
    Ok(())
}

fn backlight(lcd: &mut Lcd, config: &Config) -> eyre::Result<()> {
    lcd.backlight_on()?;
    lcd.write_string("BL ON", 0, 0)?;
    sleep(config.step_pause);

    lcd.backlight_off()?;
    lcd.write_string("BL OFF", 0, 1)?;
    sleep(config.step_pause);

    lcd.backlight_on()?;
    Ok(())
}

fn shift(lcd: &mut Lcd, config: &Config) -> eyre::Result<()> {
    lcd.clear_display()?;
    lcd.write_string("Shift Test", 0, 0)?;
    for _ in 0..5 {
        lcd.shift_left()?;
        sleep(config.step_pause / 2);
    }
    for _ in 0..5 {
        lcd.shift_right()?;
        sleep(config.step_pause / 2);
    }
    Ok(())
}

fn custom_char(lcd: &mut Lcd, config: &Config) -> eyre::Result<()> {
    const HEART: [u8; 8] = [
        0b00000, 0b01010, 0b11111, 0b11111, 0b01110, 0b00100, 0b00000, 0b00000,
    ];
    lcd.clear_display()?;
    lcd.create_char(0, HEART)?;
    lcd.write_bytes(&[0], 0, 0)?;
    sleep(config.step_pause);
    Ok(())
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
        "System ver {} kernel ver {}",
        System::long_os_version().as_deref().unwrap_or(UNKNOWN_STR),
        System::kernel_version().as_deref().unwrap_or(UNKNOWN_STR),
    );
    info!("Architecture {}", System::cpu_arch());

    let config = Config::from_env()?;
    info!("LCD @ bus: {}, address: {}", config.bus.display(), config.address);

    debug!("Opening I2C bus...");
    let bus = open_bus(&config.bus)?;

    debug!("Initializing LCD driver...");
    let mut lcd = I2cHD44780Driver::new(bus, Delay);
    lcd.initialize(config.address)
        .wrap_err("LCD initialization failed")?;
    debug!("{:?} initialized.", lcd);
    sleep(config.step_pause / 2);

    let mut failed = Vec::new();
    for step in STEPS {
        info!("[{}] expect: {}", step.name, step.expected);
        if let Err(err) = (step.run)(&mut lcd, &config) {
            warn!("[{}] failed: {:#}", step.name, err);
            failed.push(step.name);
        }
    }

    lcd.clear_display()?;
    if failed.is_empty() {
        info!("All {} steps ran.", STEPS.len());
        lcd.write_string("All passed", 0, 0)?;
    } else {
        warn!("Failed steps: {:?}", failed);
        lcd.write_string("Failed:", 0, 0)?;
        lcd.write_string(&failed.join(","), 0, 1)?;
        sleep(config.step_pause * 2);
        eyre::bail!("{} of {} steps failed", failed.len(), STEPS.len());
    }

    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let clock = format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second());
    lcd.write_string(&clock, 0, 1)?;
    info!("Done at {}.", clock);

    Ok(())
}
