use std::env::var_os;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use intellicalc_gpio::keypad::{KeyPosition, KEYPAD_COLS, KEYPAD_ROWS};
use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Delay between keypad scans, in milliseconds.
    pub scan_period_ms: u64,
    /// Sample the battery every this many scans.
    pub battery_poll_scans: u32,
    /// The character each key produces, by row and column.
    pub layout: [[char; KEYPAD_COLS]; KEYPAD_ROWS],
}

impl Config {
    fn path() -> PathBuf {
        var_os("CONFIG_FILE")
            .unwrap_or_else(|| OsString::from("config.json"))
            .into()
    }

    /// Loads the config file. `Ok(None)` if there is none.
    pub fn try_load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::path();
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)?;
        let reader = std::io::BufReader::new(file);
        Ok(Some(serde_json::from_reader(reader)?))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let file = std::fs::File::create(Self::path())?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn scan_period(&self) -> Duration {
        Duration::from_millis(self.scan_period_ms)
    }

    pub fn key_char(&self, key: KeyPosition) -> char {
        self.layout[key.row()][key.col()]
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scan_period_ms: 20,
            battery_poll_scans: 250,
            layout: [
                ['7', '8', '9', '/'],
                ['4', '5', '6', '*'],
                ['1', '2', '3', '-'],
                ['0', '.', '=', '+'],
            ],
        }
    }
}
