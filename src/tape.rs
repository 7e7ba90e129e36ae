//! TZe tape geometry for the PT-P710BT print head.

/// Pins on the PT-P710BT print head. Every raster line covers the whole head.
pub const TOTAL_PINS: u32 = 128;

/// Uncompressed size of one raster line in bytes.
pub const BYTES_PER_LINE: usize = (TOTAL_PINS / 8) as usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapeSpec {
    /// Tape width in mm as the printer reports it (3.5mm tape reports 3).
    pub width_mm: u8,
    /// Printable width in dots.
    pub width_dots: u32,
}

impl TapeSpec {
    /// Look up the printable dot count for a reported tape width.
    ///
    /// A width outside this table is an unsupported tape, never a silent
    /// default.
    pub fn from_width_mm(width_mm: u8) -> Option<Self> {
        let width_dots = match width_mm {
            3 => 24,
            6 => 32,
            9 => 50,
            12 => 70,
            18 => 112,
            24 => 128,
            _ => return None,
        };
        Some(TapeSpec {
            width_mm,
            width_dots,
        })
    }
}

impl std::fmt::Display for TapeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}mm ({} dots)", self.width_mm, self.width_dots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_widths_resolve() {
        let expected = [(3, 24), (6, 32), (9, 50), (12, 70), (18, 112), (24, 128)];
        for (mm, dots) in expected {
            let spec = TapeSpec::from_width_mm(mm).unwrap();
            assert_eq!(spec.width_mm, mm);
            assert_eq!(spec.width_dots, dots);
        }
    }

    #[test]
    fn unknown_widths_are_rejected() {
        for mm in [0, 1, 4, 10, 36, 255] {
            assert!(TapeSpec::from_width_mm(mm).is_none(), "{mm}mm should fail");
        }
    }

    #[test]
    fn widest_tape_fills_the_head() {
        let spec = TapeSpec::from_width_mm(24).unwrap();
        assert_eq!(spec.width_dots, TOTAL_PINS);
        assert_eq!(BYTES_PER_LINE, 16);
    }
}
