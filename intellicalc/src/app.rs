//! The module for the main app state and logic.

use log::{debug, info, warn};
use intellicalc_gpio::GpioResult;
use intellicalc_gpio::battery::BatteryMonitor;
use intellicalc_gpio::keypad::Keypad;
use intellicalc_gpio::segment::SegmentDisplay;
use crate::config::Config;
use crate::evaluator::Evaluator;

/// Key that evaluates the current input.
pub const EVALUATE_KEY: char = '=';
/// Key that discards the current input.
pub const CLEAR_KEY: char = 'C';
/// Key that removes the last typed character.
pub const BACKSPACE_KEY: char = 'B';

/// Shown when the input cannot be evaluated.
const ERROR_TEXT: &str = "------";

/// The main app state struct.
pub struct App<'a> {
    /// The configuration for the app.
    config: Config,
    /// The keypad, scanned once per update.
    keypad: &'a mut dyn Keypad,
    /// The six seven-segment displays.
    display: &'a mut dyn SegmentDisplay,
    battery: &'a BatteryMonitor<'a>,
    evaluator: &'a dyn Evaluator,

    /// Characters typed so far, oldest first.
    input: Vec<char>,
    /// Whether the displays show a result (or an error) instead of the input.
    showing_result: bool,
    updates: u32,
    battery_percent: Option<u8>,
}

impl <'a> App<'a> {
    /// Creates a new instance of the App.
    pub fn new(
        config: Config,
        keypad: &'a mut dyn Keypad,
        display: &'a mut dyn SegmentDisplay,
        battery: &'a BatteryMonitor<'a>,
        evaluator: &'a dyn Evaluator,
    ) -> App<'a> {
        App {
            config,
            keypad,
            display,
            battery,
            evaluator,
            input: Vec::new(),
            showing_result: false,
            updates: 0,
            battery_percent: None,
        }
    }

    /// Blanks the displays and takes a first battery reading.
    pub fn start(&mut self) -> GpioResult<()> {
        self.display.clear_all()?;
        self.poll_battery()
    }

    /// Scans the keypad once and reacts to every key that went down since the last scan.
    /// Every `battery_poll_scans` updates, also samples the battery.
    pub fn update(&mut self) -> GpioResult<()> {
        self.keypad.scan()?;

        for key in self.keypad.just_pressed_keys() {
            let character = self.config.key_char(key);
            debug!("Key ({}, {}) pressed: {:?}", key.row(), key.col(), character);
            self.handle_key(character)?;
        }

        self.updates = self.updates.wrapping_add(1);
        let poll_every = self.config.battery_poll_scans;
        if poll_every > 0 && self.updates % poll_every == 0 {
            self.poll_battery()?;
        }

        Ok(())
    }

    fn handle_key(&mut self, character: char) -> GpioResult<()> {
        match character {
            EVALUATE_KEY => self.evaluate(),
            CLEAR_KEY => {
                self.input.clear();
                self.showing_result = false;
                self.display.clear_all()
            }
            BACKSPACE_KEY => {
                self.start_new_input();
                self.input.pop();
                self.display.render_trailing_input(&self.input)
            }
            character => {
                self.start_new_input();
                self.input.push(character);
                self.display.render_trailing_input(&self.input)
            }
        }
    }

    /// Typing after a result starts over.
    fn start_new_input(&mut self) {
        if self.showing_result {
            self.input.clear();
            self.showing_result = false;
        }
    }

    fn evaluate(&mut self) -> GpioResult<()> {
        let expression: String = self.input.iter().collect();
        self.showing_result = true;

        match self.evaluator.evaluate(&expression) {
            Some(value) if value.is_finite() => {
                info!("{} = {}", expression, value);
                self.display.render_number(value)
            }
            _ => {
                warn!("Could not evaluate {:?}", expression);
                self.display.render_result(ERROR_TEXT)
            }
        }
    }

    fn poll_battery(&mut self) -> GpioResult<()> {
        let reading = self.battery.sample()?;
        match reading.percent() {
            Some(percent) if self.battery_percent != Some(percent) => {
                info!("Battery at {}%", percent);
                self.battery_percent = Some(percent);
            }
            Some(_) => {}
            None => warn!("Battery threshold lines out of order: {:?}", reading.flags()),
        }
        Ok(())
    }
}
