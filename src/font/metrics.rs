//! Advance widths for the standard PDF fonts.
//!
//! Widths come from the Adobe Font Metrics files, in 1/1000 em, for the
//! printable ASCII range (U+0020..=U+007E). Characters outside that range
//! use the font's average lowercase width. Oblique/italic faces reuse the
//! upright widths; Helvetica-Oblique is identical by construction and the
//! Times italic differences are small enough for wrapping purposes.

/// Width table for one standard face.
#[derive(Debug)]
pub struct StandardFontMetrics {
    /// Widths for U+0020..=U+007E.
    widths: [u16; 95],
    /// Width used for any character outside the table.
    default_width: u16,
}

impl StandardFontMetrics {
    /// Advance width of `ch` in points at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let units = match ch as u32 {
            code @ 0x20..=0x7E => self.widths[(code - 0x20) as usize],
            // Non-breaking space measures like a space.
            0xA0 => self.widths[0],
            _ => self.default_width,
        };
        units as f64 / 1000.0 * font_size
    }

    /// Width of `text` in points at `font_size`.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
        278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
        278, 278, 278, 469, 556, 333, // '['..'`'
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
        334, 260, 334, 584, // '{'..'~'
    ],
    default_width: 556,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ],
    default_width: 611,
};

pub static TIMES_ROMAN: StandardFontMetrics = StandardFontMetrics {
    widths: [
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        278, 278, 564, 564, 564, 444, 921,
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
        333, 278, 333, 469, 500, 333,
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
        480, 200, 480, 541,
    ],
    default_width: 500,
};

pub static TIMES_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: [
        250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
        333, 333, 570, 570, 570, 500, 930,
        722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
        722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
        333, 278, 333, 581, 500, 333,
        500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
        556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
        394, 220, 394, 520,
    ],
    default_width: 556,
};

/// Courier is monospaced: every glyph is 600 units.
pub static COURIER: StandardFontMetrics = StandardFontMetrics {
    widths: [600; 95],
    default_width: 600,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_space_width() {
        assert!((HELVETICA.char_width(' ', 12.0) - 3.336).abs() < 1e-9);
    }

    #[test]
    fn table_lookup_by_offset() {
        assert!((HELVETICA.char_width('A', 1000.0) - 667.0).abs() < 1e-9);
        assert!((HELVETICA.char_width('z', 1000.0) - 500.0).abs() < 1e-9);
        assert!((TIMES_ROMAN.char_width('W', 1000.0) - 944.0).abs() < 1e-9);
        assert!((HELVETICA_BOLD.char_width('~', 1000.0) - 584.0).abs() < 1e-9);
    }

    #[test]
    fn non_ascii_uses_default() {
        assert!((HELVETICA.char_width('é', 1000.0) - 556.0).abs() < 1e-9);
        assert!((TIMES_BOLD.char_width('→', 1000.0) - 556.0).abs() < 1e-9);
    }

    #[test]
    fn courier_is_monospaced() {
        let w = COURIER.measure_string("iiii", 10.0);
        let m = COURIER.measure_string("MMMM", 10.0);
        assert!((w - m).abs() < 1e-9);
        assert!((w - 24.0).abs() < 1e-9);
    }
}
