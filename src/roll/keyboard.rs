use std::fmt::Write as _;

use crossterm::style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor};

const OCTAVES: usize = 7;
const SHARP_OCTAVE: &str = "  #   #  │  #   #   #  │";
const FLAT_OCTAVE: &str = "  ▕   ▏  │  ▕   │   ▏  │";

/// The fixed keyboard strip shown under the roll: four lines with black-key
/// blocks, two with key-edge glyphs. Purely decorative, not derived from
/// the note data.
pub fn strip_lines() -> Vec<String> {
    let sharps = format!("  #  │{}  ", SHARP_OCTAVE.repeat(OCTAVES));
    let flats = format!("  ▏  │{}  ", FLAT_OCTAVE.repeat(OCTAVES));

    let mut lines = Vec::with_capacity(6);
    for _ in 0..4 {
        lines.push(key_line(&sharps));
    }
    for _ in 0..2 {
        lines.push(key_line(&flats));
    }
    lines
}

/// Renders one strip line: white background, dark-grey key outlines, with
/// every `#` replaced by a black-key cell. The leading space keeps the
/// strip aligned with the roll's first column.
fn key_line(pattern: &str) -> String {
    let mut line = format!(
        " {}{}",
        SetBackgroundColor(Color::White),
        SetForegroundColor(Color::DarkGrey)
    );

    for ch in pattern.chars() {
        if ch == '#' {
            let _ = write!(
                line,
                "{} {}",
                SetBackgroundColor(Color::Black),
                SetBackgroundColor(Color::White)
            );
        } else {
            line.push(ch);
        }
    }

    let _ = write!(line, "{ResetColor}");
    line
}
