mod grid;
mod keyboard;
mod render;
mod style;
mod sustain;

pub use grid::{Cell, Grid, PITCH_ROWS, index_by_tick};
pub use keyboard::strip_lines;
pub use render::{Renderer, ScrollOutcome, frame_interval};
pub use style::{Palette, is_white_key};
pub use sustain::fill_sustains;

use crate::events::NoteMarker;

/// Rendering options, one per recognized configuration flag.
#[derive(Debug, Clone)]
pub struct RollConfig {
    pub border: bool,
    pub color: bool,
    pub keyboard: bool,
    pub play: bool,
    pub resolution: u32,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            border: false,
            color: false,
            keyboard: false,
            play: false,
            resolution: 10,
        }
    }
}

/// Runs the full grid pipeline: place markers, fill sustain bars, orient
/// for top-down scrolling.
pub fn build(markers: &[NoteMarker], ticks_per_beat: u32, config: &RollConfig) -> Grid {
    let mut grid = Grid::from_markers(markers, ticks_per_beat, config.resolution);
    fill_sustains(&mut grid, config.border);
    grid.orient()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_is_deterministic() {
        let markers = [
            NoteMarker { pitch: 60, tick: 0 },
            NoteMarker { pitch: 64, tick: 48 },
            NoteMarker { pitch: 64, tick: 96 },
            NoteMarker { pitch: 60, tick: 144 },
        ];
        let config = RollConfig {
            border: true,
            ..RollConfig::default()
        };

        assert_eq!(
            build(&markers, 480, &config),
            build(&markers, 480, &config)
        );
    }

    #[test]
    fn oriented_grid_rows_count_markers() {
        let markers = [
            NoteMarker { pitch: 60, tick: 0 },
            NoteMarker { pitch: 60, tick: 480 },
        ];
        let grid = build(&markers, 480, &RollConfig::default());

        assert_eq!(grid.height(), markers.len());
        assert_eq!(grid.width(), PITCH_ROWS);
    }
}
