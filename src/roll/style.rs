use std::fs;
use std::path::Path;

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// White keys are every pitch class except the five sharps.
pub fn is_white_key(pitch: u8) -> bool {
    !matches!(pitch % 12, 1 | 3 | 6 | 8 | 10)
}

/// The immutable style palette handed to the renderer. No process-wide
/// styling state: whoever constructs the renderer decides the colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub white_key: Color,
    pub black_key: Color,
    pub border: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            white_key: Color::Cyan,
            black_key: Color::DarkGreen,
            border: Color::DarkGrey,
        }
    }
}

impl Palette {
    /// Loads a palette override from a RON theme file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;

        ron::from_str(&text).map_err(|source| Error::Theme {
            path: path.to_owned(),
            source,
        })
    }

    /// The note color for a pitch: white-key or black-key by pitch class.
    pub fn note(&self, pitch: u8) -> Color {
        if is_white_key(pitch) {
            self.white_key
        } else {
            self.black_key
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_periodic_in_octaves() {
        for pitch in 0..=115u8 {
            assert_eq!(is_white_key(pitch), is_white_key(pitch + 12));
        }
    }

    #[test]
    fn white_pitch_classes_match_keyboard_layout() {
        let whites: Vec<u8> = (0..12).filter(|&pc| is_white_key(pc)).collect();
        assert_eq!(whites, vec![0, 2, 4, 5, 7, 9, 11]);
    }

    #[test]
    fn note_color_follows_key_class() {
        let palette = Palette::default();
        assert_eq!(palette.note(60), palette.white_key);
        assert_eq!(palette.note(61), palette.black_key);
    }

    #[test]
    fn palette_round_trips_through_ron() {
        let palette = Palette::default();
        let text = ron::to_string(&palette).unwrap();
        let parsed: Palette = ron::from_str(&text).unwrap();
        assert_eq!(parsed.border, palette.border);
    }
}
