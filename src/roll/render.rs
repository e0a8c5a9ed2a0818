use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, MoveUp, Show};
use crossterm::style::{ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};

use super::RollConfig;
use super::grid::{Cell, Grid};
use super::keyboard;
use super::style::Palette;

const NOTE_GLYPH: &str = " █";
const PADDING: &str = "  ";
const BORDER_GLYPH: &str = "│ ";

/// How the animated scroll ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    Completed,
    Interrupted,
}

/// Seconds between animated frames, as a heuristic function of tempo. A
/// pathological tempo past 200 bpm bottoms out at zero sleep.
pub fn frame_interval(bpm: u32) -> Duration {
    let seconds = -0.0005 * bpm as f32 + 0.1;
    Duration::from_secs_f32(seconds.max(0.0))
}

/// Writes an oriented grid to a terminal, either as a one-shot dump or as
/// a timed scroll through a fixed-height window. Output goes through any
/// writer so tests can capture the byte stream.
pub struct Renderer {
    config: RollConfig,
    palette: Palette,
}

impl Renderer {
    pub fn new(config: RollConfig, palette: Palette) -> Self {
        Self { config, palette }
    }

    fn cell_text(&self, cell: Cell) -> String {
        match cell {
            Cell::Blank => PADDING.to_string(),
            Cell::Border => format!("{}{BORDER_GLYPH}", SetForegroundColor(self.palette.border)),
            Cell::Note { pitch } if self.config.color => {
                format!("{}{NOTE_GLYPH}", SetForegroundColor(self.palette.note(pitch)))
            }
            Cell::Note { .. } => NOTE_GLYPH.to_string(),
        }
    }

    fn row_text(&self, row: &[Cell]) -> String {
        row.iter().map(|&cell| self.cell_text(cell)).collect()
    }

    /// Prints every grid row once, trailing whitespace trimmed, then the
    /// keyboard strip when enabled.
    pub fn print<W: Write>(&self, grid: &Grid, out: &mut W) -> io::Result<()> {
        for row in grid.rows() {
            let line = self.row_text(row);
            writeln!(out, "{}", line.trim_end())?;
        }

        if self.config.keyboard {
            for line in keyboard::strip_lines() {
                writeln!(out, "{line}")?;
            }
        }

        if self.config.color || self.config.border {
            crossterm::queue!(out, ResetColor)?;
        }
        out.flush()
    }

    /// Scrolls the grid through a window of `height` rows, starting with
    /// the window pinned to the last rows and sliding back one row per
    /// frame. `wait` blocks for the frame interval and returns `false` to
    /// stop early. A grid shorter than the window renders nothing.
    pub fn scroll<W: Write>(
        &self,
        grid: &Grid,
        out: &mut W,
        height: usize,
        interval: Duration,
        mut wait: impl FnMut(Duration) -> bool,
    ) -> io::Result<ScrollOutcome> {
        let total = grid.height();
        if height == 0 || total < height {
            return Ok(ScrollOutcome::Completed);
        }

        let rows: Vec<&[Cell]> = grid.rows().collect();
        let strip = if self.config.keyboard {
            keyboard::strip_lines()
        } else {
            Vec::new()
        };

        for start in (0..=total - height).rev() {
            crossterm::queue!(out, Hide, MoveTo(0, 0))?;

            for row in &rows[start..start + height] {
                write!(out, "{} \r\n", self.row_text(row))?;
            }
            for line in &strip {
                write!(out, "{line}\r\n")?;
            }

            crossterm::queue!(out, Clear(ClearType::UntilNewLine), MoveUp(1))?;
            out.flush()?;

            if !wait(interval) {
                crossterm::execute!(out, Show, ResetColor)?;
                return Ok(ScrollOutcome::Interrupted);
            }
        }

        crossterm::execute!(out, Show, ResetColor)?;
        Ok(ScrollOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoteMarker;
    use crate::roll::{build, fill_sustains};

    fn plain_config() -> RollConfig {
        RollConfig {
            border: false,
            color: false,
            keyboard: false,
            play: false,
            resolution: 10,
        }
    }

    fn renderer(config: RollConfig) -> Renderer {
        Renderer::new(config, Palette::default())
    }

    #[test]
    fn static_dump_trims_trailing_padding() {
        let markers = [
            NoteMarker { pitch: 108, tick: 0 },
            NoteMarker { pitch: 108, tick: 48 },
        ];
        let config = plain_config();
        let grid = build(&markers, 480, &config);

        let mut out = Vec::new();
        renderer(config).print(&grid, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // Two oriented rows: the release column (all padding, trimmed to
        // nothing) scrolls in first, then the onset column with pitch 108
        // at the end of the reversed display row.
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "");
        assert!(lines[1].ends_with(" █"));
        assert_eq!(lines[1].chars().count(), 88 * 2);
    }

    #[test]
    fn empty_grid_prints_no_rows() {
        let config = plain_config();
        let grid = build(&[], 480, &config);

        let mut out = Vec::new();
        renderer(config).print(&grid, &mut out).unwrap();

        assert!(out.is_empty());
    }

    #[test]
    fn border_flag_off_emits_no_border_glyphs() {
        let markers = [
            NoteMarker { pitch: 60, tick: 0 },
            NoteMarker { pitch: 60, tick: 48 },
        ];
        let config = plain_config();
        let grid = build(&markers, 480, &config);

        let mut out = Vec::new();
        renderer(config).print(&grid, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains('│'));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn color_flag_styles_note_glyphs() {
        let markers = [
            NoteMarker { pitch: 60, tick: 0 },
            NoteMarker { pitch: 60, tick: 48 },
        ];
        let mut config = plain_config();
        config.color = true;
        let grid = build(&markers, 480, &config);

        let mut out = Vec::new();
        renderer(config).print(&grid, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\u{1b}["));
    }

    #[test]
    fn keyboard_strip_appends_after_static_rows() {
        let mut config = plain_config();
        config.keyboard = true;
        let grid = build(&[], 480, &config);

        let mut out = Vec::new();
        renderer(config).print(&grid, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 6);
    }

    #[test]
    fn scroll_emits_one_frame_per_window_position() {
        let markers: Vec<NoteMarker> = (0..6)
            .map(|i| NoteMarker { pitch: 60, tick: i * 48 })
            .collect();
        let config = plain_config();
        let grid = build(&markers, 480, &config);
        assert_eq!(grid.height(), 6);

        let mut out = Vec::new();
        let mut frames = 0;
        let outcome = renderer(config)
            .scroll(&grid, &mut out, 2, Duration::ZERO, |_| {
                frames += 1;
                true
            })
            .unwrap();

        assert_eq!(outcome, ScrollOutcome::Completed);
        assert_eq!(frames, 5);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\u{1b}[?25l"));
        assert!(text.contains("\u{1b}[1;1H"));
    }

    #[test]
    fn scroll_renders_nothing_when_window_exceeds_grid() {
        let config = plain_config();
        let grid = build(&[], 480, &config);

        let mut out = Vec::new();
        let mut frames = 0;
        let outcome = renderer(config)
            .scroll(&grid, &mut out, 24, Duration::ZERO, |_| {
                frames += 1;
                true
            })
            .unwrap();

        assert_eq!(outcome, ScrollOutcome::Completed);
        assert_eq!(frames, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn interrupted_wait_stops_the_scroll() {
        let markers: Vec<NoteMarker> = (0..4)
            .map(|i| NoteMarker { pitch: 60, tick: i * 48 })
            .collect();
        let config = plain_config();
        let grid = build(&markers, 480, &config);

        let mut out = Vec::new();
        let outcome = renderer(config)
            .scroll(&grid, &mut out, 2, Duration::ZERO, |_| false)
            .unwrap();

        assert_eq!(outcome, ScrollOutcome::Interrupted);
    }

    #[test]
    fn fast_tempo_clamps_interval_at_zero() {
        assert_eq!(frame_interval(300), Duration::ZERO);
        assert!(frame_interval(120) > Duration::ZERO);
    }

    #[test]
    fn single_step_note_fills_both_marker_columns() {
        // Both markers of one note bucket into column 0; the lone toggle
        // keeps the row inside to its end, so both oriented rows show it.
        let markers = [
            NoteMarker { pitch: 60, tick: 0 },
            NoteMarker { pitch: 60, tick: 10 },
        ];
        let config = plain_config();
        let mut grid = crate::roll::Grid::from_markers(&markers, 480, config.resolution);
        fill_sustains(&mut grid, false);

        let note = Cell::Note { pitch: 60 };
        assert_eq!(grid.cells[48], vec![note, note]);

        let oriented = grid.orient();
        assert_eq!(oriented.height(), 2);
        for row in oriented.rows() {
            assert_eq!(row[87 - 48], note);
            assert_eq!(
                row.iter().filter(|c| matches!(c, Cell::Note { .. })).count(),
                1
            );
        }
    }
}
