//! Color palette.

use crate::format::{CodecError, Result};

/// Maximum number of bitplanes (32 colors).
pub const MAX_BITPLANES: u8 = 5;

/// 24-bit RGB color. Alpha is discarded at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

impl From<[u8; 3]> for Color {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self { red, green, blue }
    }
}

/// Ordered set of `2^bitplanes` colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub bitplanes: u8,
    pub colors: Vec<Color>,
}

impl Palette {
    pub fn new(bitplanes: u8, colors: Vec<Color>) -> Self {
        Self { bitplanes, colors }
    }

    /// Smallest palette holding `colors`, padded with black up to the next
    /// power of two (minimum 2 colors).
    pub fn from_colors(mut colors: Vec<Color>) -> Result<Self> {
        if colors.len() > 1 << MAX_BITPLANES {
            return Err(CodecError::validation(format!(
                "Too many colors: {} (max {})",
                colors.len(),
                1 << MAX_BITPLANES
            )));
        }
        let mut bitplanes = 1;
        while (1 << bitplanes) < colors.len() {
            bitplanes += 1;
        }
        colors.resize(1 << bitplanes, Color::BLACK);
        Ok(Self { bitplanes, colors })
    }

    /// Number of colors implied by the bitplane count.
    #[inline]
    pub fn color_count(&self) -> usize {
        1usize
            .checked_shl(self.bitplanes.into())
            .unwrap_or(usize::MAX)
    }

    /// Highest legal color index.
    #[inline]
    pub fn maximum_color(&self) -> u8 {
        (self.color_count() - 1).min(u8::MAX as usize) as u8
    }

    pub fn get(&self, index: u8) -> Option<Color> {
        self.colors.get(index as usize).copied()
    }

    pub fn validate(&self) -> Result<()> {
        if self.bitplanes < 1 || self.bitplanes > MAX_BITPLANES {
            return Err(CodecError::validation(format!(
                "Illegal number of bitplanes: {}",
                self.bitplanes
            )));
        }
        if self.colors.len() != self.color_count() {
            return Err(CodecError::validation(format!(
                "Expected {} colors, got {}",
                self.color_count(),
                self.colors.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maximum_color() {
        let palette = Palette::new(3, vec![Color::BLACK; 8]);
        assert_eq!(palette.maximum_color(), 7);
        assert!(palette.validate().is_ok());
    }

    #[test]
    fn test_from_colors_pads() {
        let palette = Palette::from_colors(vec![Color::rgb(1, 2, 3); 5]).unwrap();
        assert_eq!(palette.bitplanes, 3);
        assert_eq!(palette.colors.len(), 8);
        assert_eq!(palette.colors[7], Color::BLACK);

        let palette = Palette::from_colors(vec![]).unwrap();
        assert_eq!(palette.bitplanes, 1);

        assert!(Palette::from_colors(vec![Color::BLACK; 33]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bitplanes() {
        assert!(Palette::new(0, vec![Color::BLACK]).validate().is_err());
        assert!(Palette::new(6, vec![Color::BLACK; 64]).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_color_count() {
        let err = Palette::new(2, vec![Color::BLACK; 3]).validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Expected 4 colors, got 3");
    }
}
