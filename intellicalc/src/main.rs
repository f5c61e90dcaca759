mod app;
mod config;
mod evaluator;

use std::env::var;
use std::thread;
use dotenv::dotenv;
use log::{debug, info};
use intellicalc_gpio::battery::BatteryMonitor;
use intellicalc_gpio::keypad::KeypadScanner;
use intellicalc_gpio::raw::{RawRegisterPort, DISPLAY_BASE, DISPLAY_BLOCK_LEN, GPIO0_BASE, GPIO_BLOCK_LEN};
use intellicalc_gpio::segment::DisplayDriver;
use crate::app::App;
use crate::config::Config;
use crate::evaluator::LiteralEvaluator;

fn main() -> eyre::Result<()> {
    // Initialize environment and logger
    dotenv().ok();
    pretty_env_logger::init();

    info!("IntelliCalc v{} starting...", env!("CARGO_PKG_VERSION"));

    let (gpio0, display_registers) = match var("INTELLICALC_MEM_DEVICE") {
        Ok(mem_device) => {
            debug!("Mapping registers from {}...", mem_device);
            (
                RawRegisterPort::with_device(&mem_device, GPIO0_BASE, GPIO_BLOCK_LEN)?,
                RawRegisterPort::with_device(&mem_device, DISPLAY_BASE, DISPLAY_BLOCK_LEN)?,
            )
        }
        Err(_) => {
            debug!("Mapping registers from /dev/mem...");
            (
                RawRegisterPort::new_mem(GPIO0_BASE, GPIO_BLOCK_LEN)?,
                RawRegisterPort::new_mem(DISPLAY_BASE, DISPLAY_BLOCK_LEN)?,
            )
        }
    };
    debug!("GPIO0 at {:#010x}, displays at {:#010x}.", gpio0.base(), display_registers.base());

    let mut keypad = KeypadScanner::new(&gpio0);
    let mut display = DisplayDriver::new(&display_registers);
    let battery = BatteryMonitor::new(&gpio0);

    debug!("Trying to load config...");
    let config = if let Some(config) = Config::try_load()? {
        info!("Config loaded.");
        config
    } else {
        info!("Config not found. Using default");
        let config = Config::default();
        config.save()?;
        info!("Default config saved.");
        config
    };
    debug!("{:?}", config);

    let scan_period = config.scan_period();
    let evaluator = LiteralEvaluator;

    let mut app = App::new(
        config,
        &mut keypad,
        &mut display,
        &battery,
        &evaluator,
    );
    app.start()?;

    info!("Starting main loop...");
    loop {
        app.update()?;
        thread::sleep(scan_period);
    }
}
