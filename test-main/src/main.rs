use intellicalc_gpio::battery::BatteryMonitor;
use intellicalc_gpio::keypad::{Keypad, KeypadScanner};
use intellicalc_gpio::raw::{RawRegisterPort, DISPLAY_BASE, DISPLAY_BLOCK_LEN, GPIO0_BASE, GPIO_BLOCK_LEN};
use intellicalc_gpio::segment::{DisplayDriver, SegmentDisplay, DISPLAY_COUNT};
use dotenv::dotenv;
use log::{debug, info, warn};
use std::env::var;
use std::thread::sleep;
use std::time::Duration;
use sysinfo::System;

/// Every character with a glyph, in the order they are swept across the displays.
const GLYPH_SWEEP: &str = "0123456789.^sctl+*-/!()";

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

    let (gpio0, display_registers) = match var("INTELLICALC_MEM_DEVICE") {
        Ok(mem_device) => (
            RawRegisterPort::with_device(&mem_device, GPIO0_BASE, GPIO_BLOCK_LEN)?,
            RawRegisterPort::with_device(&mem_device, DISPLAY_BASE, DISPLAY_BLOCK_LEN)?,
        ),
        Err(_) => (
            RawRegisterPort::new_mem(GPIO0_BASE, GPIO_BLOCK_LEN)?,
            RawRegisterPort::new_mem(DISPLAY_BASE, DISPLAY_BLOCK_LEN)?,
        ),
    };
    info!("GPIO0 at {:#010x}, displays at {:#010x}", gpio0.base(), display_registers.base());

    let mut display = DisplayDriver::new(&display_registers);
    let mut keypad = KeypadScanner::new(&gpio0);
    let battery = BatteryMonitor::new(&gpio0);

    // Walk every glyph across every position, so dead segments and swapped banks show up.
    info!("Sweeping {} glyphs across {} displays...", GLYPH_SWEEP.len(), DISPLAY_COUNT);
    for character in GLYPH_SWEEP.chars() {
        debug!("Glyph {:?}", character);
        for position in 0..DISPLAY_COUNT {
            display.clear_all()?;
            display.write_at(character, position)?;
            sleep(Duration::from_millis(60));
        }
    }
    display.render_result("8.8.8.")?;
    sleep(Duration::from_secs(1));
    display.clear_all()?;

    info!("Echoing keys, press Ctrl+C to stop.");

    let mut frame = 0u32;
    let mut last_reading = None;

    loop {
        keypad.scan()?;

        for key in keypad.just_pressed_keys() {
            info!("Pressed ({}, {})", key.row(), key.col());
            display.render_result(&format!("{}-{}", key.row(), key.col()))?;
        }
        for key in keypad.just_released_keys() {
            info!("Released ({}, {})", key.row(), key.col());
        }

        if frame % 100 == 0 {
            let reading = battery.sample()?;
            if last_reading != Some(reading) {
                match reading.percent() {
                    Some(percent) => info!("Battery {:?} ({}%)", reading.flags(), percent),
                    None => warn!("Battery {:?} (not monotonic)", reading.flags()),
                }
                last_reading = Some(reading);
            }
        }

        sleep(Duration::from_millis(10));

        frame = frame.wrapping_add(1);
    }
}
