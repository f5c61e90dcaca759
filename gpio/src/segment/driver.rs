use std::fmt::{Debug, Formatter};
use log::debug;
use crate::segment::{SegmentDisplay, SegmentPattern, DISPLAY_COUNT};
use crate::{GpioError, GpioResult, RegisterPort};

/// Offset of the bank holding displays 0-3, one byte per display.
pub const LOW_BANK: usize = 0x00;
/// Offset of the bank holding displays 4-5, one byte per display.
pub const HIGH_BANK: usize = 0x10;

const LOW_BANK_DISPLAYS: usize = 4;

/// Drives the six displays through their byte-wide pattern registers.
///
/// The displays are split across two banks: positions 0-3 are bytes 0-3 of the low
/// bank, and positions 4-5 are bytes 0-1 of the high bank.
///
/// The pattern registers are write-only, so nothing written can be read back.
pub struct DisplayDriver<'a> {
    port: &'a dyn RegisterPort,
}

impl Debug for DisplayDriver<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DisplayDriver({:?})", self.port)
    }
}

impl <'a> DisplayDriver<'a> {
    /// Creates a driver over the display register block (both banks).
    pub fn new(port: &'a dyn RegisterPort) -> Self {
        debug!("Display driver on {:?}", port);
        DisplayDriver { port }
    }

    /// Byte offset of the pattern register for `position`.
    pub fn register_offset(position: usize) -> GpioResult<usize> {
        match position {
            0..LOW_BANK_DISPLAYS => Ok(LOW_BANK + position),
            LOW_BANK_DISPLAYS..DISPLAY_COUNT => Ok(HIGH_BANK + (position - LOW_BANK_DISPLAYS)),
            _ => Err(GpioError::InvalidArgument),
        }
    }
}

impl SegmentDisplay for DisplayDriver<'_> {
    fn write_pattern(&mut self, position: usize, pattern: SegmentPattern) -> GpioResult<()> {
        let offset = Self::register_offset(position)?;
        self.port.write_byte(offset, pattern.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::encode;
    use crate::sim::{SimRegisterPort, SimWrite};

    fn byte(offset: usize, value: u8) -> SimWrite {
        SimWrite::Byte { offset, value }
    }

    #[test]
    fn positions_map_onto_two_banks() {
        let offsets: Vec<usize> = (0..DISPLAY_COUNT)
            .map(|position| DisplayDriver::register_offset(position).unwrap())
            .collect();
        assert_eq!(offsets, vec![0x00, 0x01, 0x02, 0x03, 0x10, 0x11]);
    }

    #[test]
    fn out_of_range_position_is_rejected_without_writing() {
        let port = SimRegisterPort::new();
        let mut driver = DisplayDriver::new(&port);
        assert_eq!(driver.write_at('1', 6), Err(GpioError::InvalidArgument));
        assert!(port.writes().is_empty());
    }

    #[test]
    fn position_four_is_first_byte_of_high_bank() {
        let port = SimRegisterPort::new();
        let mut driver = DisplayDriver::new(&port);

        driver.write_at('7', 4).unwrap();

        assert_eq!(port.writes(), vec![byte(HIGH_BANK, 0x07)]);
        assert_eq!(port.word(HIGH_BANK), 0x07);
        assert_eq!(port.word(LOW_BANK), 0);
    }

    #[test]
    fn trailing_input_writes() {
        let port = SimRegisterPort::new();
        let mut driver = DisplayDriver::new(&port);

        driver.render_trailing_input(&['1', '2', '+', '3']).unwrap();

        assert_eq!(
            port.writes(),
            vec![
                byte(0x00, encode('3').bits()),
                byte(0x01, encode('+').bits()),
                byte(0x02, encode('2').bits()),
                byte(0x03, encode('1').bits()),
                byte(0x10, 0),
                byte(0x11, 0),
            ]
        );
    }

    #[test]
    fn result_writes() {
        let port = SimRegisterPort::new();
        let mut driver = DisplayDriver::new(&port);

        driver.render_result("3.14159").unwrap();

        assert_eq!(port.byte(0x11), encode('3').bits());
        assert_eq!(port.byte(0x10), encode('.').bits());
        assert_eq!(port.byte(0x03), encode('1').bits());
        assert_eq!(port.byte(0x02), encode('4').bits());
        assert_eq!(port.byte(0x01), encode('1').bits());
        assert_eq!(port.byte(0x00), encode('5').bits());
    }

    #[test]
    fn clear_all_blanks_both_banks() {
        let port = SimRegisterPort::new();
        let mut driver = DisplayDriver::new(&port);
        driver.render_result("888888").unwrap();
        port.take_writes();

        driver.clear_all().unwrap();

        let offsets: Vec<usize> = port
            .writes()
            .into_iter()
            .map(|write| match write {
                SimWrite::Byte { offset, value: 0 } => offset,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(offsets, vec![0x00, 0x01, 0x02, 0x03, 0x10, 0x11]);
        assert_eq!(port.word(LOW_BANK), 0);
        assert_eq!(port.word(HIGH_BANK), 0);
    }
}
