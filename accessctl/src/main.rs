mod app;
mod config;

use std::env::var;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use dotenv::dotenv;
use log::{debug, info, warn};
use sysinfo::System;
use accessctl_input::GpioActiveLevel::Low;
use accessctl_input::GpioBias;
use accessctl_input::gpiod::GpiodDriver;
use accessctl_input::keypad::{AccessCtlKeypad, MatrixKeyScanner};
use accessctl_input::timing::{self, ThreadTickSource, TIMEBASE};
use crate::app::{queue_event, App, KeyEvent};
use crate::config::Config;

fn parse_pin_bus(pin_str: &str) -> eyre::Result<[usize; 4]> {
    pin_str
        .split([',', ' ', ';'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse())
        .collect::<Result<Vec<_>, _>>()?
        .try_into()
        .map_err(|_| eyre::eyre!("Invalid number of keypad pins"))
}

fn load_config() -> eyre::Result<Config> {
    let path = Config::path();
    debug!("Trying to load config from {}...", path.display());
    match Config::load_from(&path) {
        Ok(Some(config)) => {
            info!("Config loaded.");
            Ok(config)
        }
        Ok(None) => {
            info!("Config not found. Using default");
            let config = Config::default();
            config.save_to(&path)?;
            info!("Default config saved.");
            Ok(config)
        }
        Err(err) => {
            warn!("Failed to load config ({}). Using default", err);
            Ok(Config::default())
        }
    }
}

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    const UNKNOWN_STR: &str = "???";

    info!(
        "AccessCtl keypad v.{} starting on {}...",
        env!("CARGO_PKG_VERSION"),
        System::host_name().as_deref().unwrap_or(UNKNOWN_STR),
    );

    // Get pin numbers from env
    let chip_path = var("ACCESSCTL_GPIO_CHIP").unwrap_or_else(|_| "/dev/gpiochip0".to_string());
    let keypad_pin_col_nos: [usize; 4] = parse_pin_bus(&var("ACCESSCTL_KEYPAD_PINS_COLS")?)?;
    let keypad_pin_row_nos: [usize; 4] = parse_pin_bus(&var("ACCESSCTL_KEYPAD_PINS_ROWS")?)?;

    info!("Keypad @ {} Cols: {:?}, Rows: {:?}", chip_path, keypad_pin_col_nos, keypad_pin_row_nos);

    let config = load_config()?;
    debug!("{:?}", config);

    debug!("Arming timebase...");
    let mut tick_source = ThreadTickSource::new();
    timing::init(&mut tick_source)?;
    debug!("{:?} armed.", TIMEBASE);

    debug!("Initializing keypad driver...");
    let gpio = GpiodDriver::open(&chip_path)?;
    let keypad_col_out = gpio.output_bus(keypad_pin_col_nos, Low, GpioBias::None)?;
    let keypad_row_in = gpio.input_bus(keypad_pin_row_nos, Low, GpioBias::PullUp)?;
    let scanner = MatrixKeyScanner::new(&keypad_col_out, &keypad_row_in, &TIMEBASE)
        .with_debounce_ms(config.debounce_ms);
    let mut keypad = AccessCtlKeypad::new(scanner)?;
    debug!("{:?} initialized.", keypad);

    let (events_tx, events_rx) = mpsc::channel();
    keypad.attach_annotated_callback(move |state, key, edge| {
        queue_event(&events_tx, KeyEvent { state, key, edge, at: timing::millis() });
    });

    info!("Starting main loop...");

    let mut app = App::new();
    let scan_interval = Duration::from_millis(config.scan_interval_ms);
    loop {
        keypad.poll()?;

        for event in events_rx.try_iter() {
            if let Some(next) = app.handle(event) {
                keypad.change_state_to(next);
                info!("Keypad is now in {} mode.", keypad.current_state());
            }
        }

        thread::sleep(scan_interval);
    }
}
