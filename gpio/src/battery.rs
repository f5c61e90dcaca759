use std::fmt::{Debug, Formatter};
use bitvec::prelude::*;
use log::{debug, trace};
use crate::{regs, GpioResult, RegisterPort};

/// Number of battery threshold lines, each worth 20% of charge.
pub const BATTERY_THRESHOLDS: usize = 5;

/// Bit of the external port register for each threshold, lowest threshold first.
pub const THRESHOLD_BITS: [usize; BATTERY_THRESHOLDS] = [11, 12, 13, 14, 15];

/// One instantaneous reading of the battery threshold lines.
///
/// Index 0 is the lowest threshold. A healthy sensor asserts thresholds from the
/// bottom up (e.g. `1, 1, 1, 0, 0` means up to 60% left), but the raw lines are kept
/// as read; see [BatteryReading::is_monotonic].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BatteryReading([bool; BATTERY_THRESHOLDS]);

impl BatteryReading {
    pub fn new(flags: [bool; BATTERY_THRESHOLDS]) -> Self {
        BatteryReading(flags)
    }

    pub fn flags(&self) -> [bool; BATTERY_THRESHOLDS] {
        self.0
    }

    /// Whether threshold `index` is asserted. `None` when out of range.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    pub fn asserted_count(&self) -> usize {
        self.0.iter().filter(|&&flag| flag).count()
    }

    /// Whether no threshold is asserted above an unasserted one.
    pub fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0] || !pair[1])
    }

    /// Remaining charge in 20% steps, or `None` if the reading is not monotonic.
    pub fn percent(&self) -> Option<u8> {
        if self.is_monotonic() {
            Some(self.asserted_count() as u8 * 20)
        } else {
            None
        }
    }
}

/// Samples the battery threshold lines on the GPIO0 external port.
///
/// No smoothing or hysteresis: every sample is a single register read.
pub struct BatteryMonitor<'a> {
    port: &'a dyn RegisterPort,
}

impl Debug for BatteryMonitor<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BatteryMonitor({:?})", self.port)
    }
}

impl <'a> BatteryMonitor<'a> {
    pub fn new(port: &'a dyn RegisterPort) -> Self {
        debug!("Battery monitor on {:?}", port);
        BatteryMonitor { port }
    }

    pub fn sample(&self) -> GpioResult<BatteryReading> {
        let mut reading = BatteryReading::default();
        self.sample_into(&mut reading)?;
        Ok(reading)
    }

    /// Like [Self::sample], but fills a reading owned by the caller.
    pub fn sample_into(&self, reading: &mut BatteryReading) -> GpioResult<()> {
        let input = self.port.read_word(regs::EXT_PORTA)?;
        let lines = input.view_bits::<Lsb0>();
        for (flag, &bit) in reading.0.iter_mut().zip(THRESHOLD_BITS.iter()) {
            *flag = lines[bit];
        }
        trace!("Battery lines {:?}", reading.0);
        Ok(())
    }
}
