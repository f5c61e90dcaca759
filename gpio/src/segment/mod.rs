//! Seven-segment display module.
//!
//! [encode] turns a character into a [SegmentPattern]; the [SegmentDisplay] trait builds
//! the calculator's rendering operations on top of a single "write pattern at position"
//! primitive, implemented for the board's display banks by [DisplayDriver].

mod driver;

use crate::GpioResult;
pub use driver::*;
use std::fmt::Debug;

/// Number of seven-segment displays. Position 0 is the rightmost, 5 the leftmost.
pub const DISPLAY_COUNT: usize = 6;

/// One light segment of a seven-segment display.
///
/// ```text
///  --A--
/// |     |
/// F     B
/// |     |
///  --G--
/// |     |
/// E     C
/// |     |
///  --D--  .DP
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    DecimalPoint,
}

impl Segment {
    /// The bit of a [SegmentPattern] that lights this segment.
    pub fn mask(self) -> u8 {
        match self {
            Segment::A => 1 << 0,
            Segment::B => 1 << 1,
            Segment::C => 1 << 2,
            Segment::D => 1 << 3,
            Segment::E => 1 << 4,
            Segment::F => 1 << 5,
            Segment::G => 1 << 6,
            Segment::DecimalPoint => 1 << 7,
        }
    }
}

/// Which segments of one display are lit, one bit per [Segment].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct SegmentPattern(u8);

impl SegmentPattern {
    /// All segments off.
    pub const BLANK: SegmentPattern = SegmentPattern(0);

    pub const fn from_bits(bits: u8) -> Self {
        SegmentPattern(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub fn is_lit(self, segment: Segment) -> bool {
        self.0 & segment.mask() != 0
    }

    pub fn is_blank(self) -> bool {
        self.0 == 0
    }
}

/// Glyphs for the calculator's alphabet, indexed by ASCII code.
/// Anything not listed stays blank.
const GLYPHS: [u8; 128] = {
    let mut table = [0u8; 128];
    table[b'0' as usize] = 0b_0011_1111;
    table[b'1' as usize] = 0b_0000_0110;
    table[b'2' as usize] = 0b_0101_1011;
    table[b'3' as usize] = 0b_0100_1111;
    table[b'4' as usize] = 0b_0110_0110;
    table[b'5' as usize] = 0b_0110_1101;
    table[b'6' as usize] = 0b_0111_1101;
    table[b'7' as usize] = 0b_0000_0111;
    table[b'8' as usize] = 0b_0111_1111;
    table[b'9' as usize] = 0b_0110_0111;
    // Own position, bottom segment only.
    table[b'.' as usize] = 0b_0000_1000;
    table[b'^' as usize] = 0b_0010_0011;
    // sin, cos, tan, log
    table[b's' as usize] = 0b_0110_1101;
    table[b'c' as usize] = 0b_0101_1000;
    table[b't' as usize] = 0b_0111_1000;
    table[b'l' as usize] = 0b_0011_1000;
    table[b'+' as usize] = 0b_0100_0110;
    table[b'*' as usize] = 0b_0111_0110;
    table[b'-' as usize] = 0b_0100_0000;
    table[b'/' as usize] = 0b_0110_0100;
    table[b'!' as usize] = 0b_0111_0001;
    table[b'(' as usize] = 0b_0011_1001;
    table[b')' as usize] = 0b_0000_1111;
    table
};

/// Returns the segment pattern for `character`, or [SegmentPattern::BLANK] if the
/// character has no glyph.
pub fn encode(character: char) -> SegmentPattern {
    if character.is_ascii() {
        SegmentPattern(GLYPHS[character as usize])
    } else {
        SegmentPattern::BLANK
    }
}

/// A bank of [DISPLAY_COUNT] seven-segment displays.
///
/// Implementors only provide [SegmentDisplay::write_pattern]; everything else is built on it.
pub trait SegmentDisplay: Debug {
    /// Shows `pattern` on the display at `position` (0 = rightmost).
    ///
    /// # Errors
    /// - `GpioError::InvalidArgument` if `position` is not below [DISPLAY_COUNT].
    fn write_pattern(&mut self, position: usize, pattern: SegmentPattern) -> GpioResult<()>;

    /// Shows `character` on the display at `position`.
    fn write_at(&mut self, character: char, position: usize) -> GpioResult<()> {
        self.write_pattern(position, encode(character))
    }

    /// Blanks every display, rightmost first.
    fn clear_all(&mut self) -> GpioResult<()> {
        for position in 0..DISPLAY_COUNT {
            self.write_pattern(position, SegmentPattern::BLANK)?;
        }
        Ok(())
    }

    /// Echoes the tail of the input buffer: the newest character sits at position 0,
    /// older ones move left. Positions not covered by the input are blanked.
    fn render_trailing_input(&mut self, input: &[char]) -> GpioResult<()> {
        if input.is_empty() {
            return self.clear_all();
        }

        for position in 0..DISPLAY_COUNT {
            let pattern = input
                .len()
                .checked_sub(position + 1)
                .map_or(SegmentPattern::BLANK, |index| encode(input[index]));
            self.write_pattern(position, pattern)?;
        }
        Ok(())
    }

    /// Shows the first characters of a formatted number, read left to right: the first
    /// character sits at position 5. Positions not covered are blanked.
    fn render_result(&mut self, numeric: &str) -> GpioResult<()> {
        let mut characters = numeric.chars();
        for position in (0..DISPLAY_COUNT).rev() {
            let pattern = characters.next().map_or(SegmentPattern::BLANK, encode);
            self.write_pattern(position, pattern)?;
        }
        Ok(())
    }

    /// Formats `value` with six fractional digits (like C's `%f`) and shows it with
    /// [SegmentDisplay::render_result].
    fn render_number(&mut self, value: f64) -> GpioResult<()> {
        self.render_result(&format!("{:.6}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GpioError;

    /// Keeps what was last written to each position.
    #[derive(Debug, Default)]
    struct ShadowDisplay {
        shown: [SegmentPattern; DISPLAY_COUNT],
        writes: Vec<usize>,
    }

    impl SegmentDisplay for ShadowDisplay {
        fn write_pattern(&mut self, position: usize, pattern: SegmentPattern) -> GpioResult<()> {
            let slot = self.shown.get_mut(position).ok_or(GpioError::InvalidArgument)?;
            *slot = pattern;
            self.writes.push(position);
            Ok(())
        }
    }

    fn text(s: &str) -> [SegmentPattern; DISPLAY_COUNT] {
        // Leftmost first in `s`, like reading the physical displays.
        let mut shown = [SegmentPattern::BLANK; DISPLAY_COUNT];
        for (i, c) in s.chars().enumerate() {
            shown[DISPLAY_COUNT - 1 - i] = encode(c);
        }
        shown
    }

    #[test]
    fn digits_match_the_usual_glyphs() {
        let expected: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x67];
        for (digit, bits) in ('0'..='9').zip(expected) {
            assert_eq!(encode(digit).bits(), bits, "{digit}");
        }
    }

    #[test]
    fn symbols_have_their_own_glyphs() {
        assert_eq!(encode('.'), SegmentPattern::from_bits(0b1000));
        assert!(encode('.').is_lit(Segment::D));
        assert_eq!(encode('-').bits(), 0b0100_0000);
        assert!(encode('-').is_lit(Segment::G));
        for c in ['^', 's', 'c', 't', 'l', '+', '*', '/', '!', '(', ')'] {
            assert!(!encode(c).is_blank(), "{c}");
        }
        // 's' and '5' share a glyph.
        assert_eq!(encode('s'), encode('5'));
    }

    #[test]
    fn unsupported_characters_are_blank() {
        for c in ['a', 'S', 'x', ' ', '=', '[', '\0', 'é', '∑'] {
            assert_eq!(encode(c), SegmentPattern::BLANK, "{c:?}");
        }
    }

    #[test]
    fn encode_is_stable() {
        for c in (0u8..128).map(char::from) {
            assert_eq!(encode(c), encode(c));
        }
    }

    #[test]
    fn trailing_input_grows_from_the_right() {
        let mut display = ShadowDisplay::default();
        display.render_trailing_input(&['1', '2', '+', '3']).unwrap();
        assert_eq!(display.shown, text("  12+3"));
        assert_eq!(display.shown[0], encode('3'));
        assert_eq!(display.shown[3], encode('1'));
    }

    #[test]
    fn trailing_input_keeps_only_the_last_six() {
        let mut display = ShadowDisplay::default();
        let input: Vec<char> = "12345678".chars().collect();
        display.render_trailing_input(&input).unwrap();
        assert_eq!(display.shown, text("345678"));
    }

    #[test]
    fn empty_input_clears_everything() {
        let mut display = ShadowDisplay::default();
        display.render_trailing_input(&['8', '8', '8', '8', '8', '8']).unwrap();
        display.writes.clear();

        display.render_trailing_input(&[]).unwrap();

        assert_eq!(display.shown, [SegmentPattern::BLANK; DISPLAY_COUNT]);
        assert_eq!(display.writes, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn result_reads_left_to_right() {
        let mut display = ShadowDisplay::default();
        display.render_result("3.14159").unwrap();
        assert_eq!(display.shown, text("3.1415"));
        assert_eq!(display.shown[5], encode('3'));
        assert_eq!(display.shown[4], encode('.'));
        assert_eq!(display.shown[0], encode('5'));
    }

    #[test]
    fn short_result_blanks_the_rest() {
        let mut display = ShadowDisplay::default();
        display.render_trailing_input(&['8'; 6]).unwrap();
        display.render_result("42").unwrap();
        assert_eq!(display.shown, text("42"));
    }

    #[test]
    fn numbers_are_formatted_like_printf() {
        let mut display = ShadowDisplay::default();
        display.render_number(2.5).unwrap();
        assert_eq!(display.shown, text("2.5000"));

        display.render_number(-12.0).unwrap();
        assert_eq!(display.shown, text("-12.00"));
    }

    #[test]
    fn clear_all_sweeps_from_the_right() {
        let mut display = ShadowDisplay::default();
        display.clear_all().unwrap();
        assert_eq!(display.writes, vec![0, 1, 2, 3, 4, 5]);
    }
}
