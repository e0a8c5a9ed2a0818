use super::grid::{Cell, Grid};

/// Rows on the fixed pitch-class boundaries get a vertical guide glyph
/// instead of blank padding. With `row = 108 - pitch`, the B/C boundary
/// lands on rows whose pitch class is C (`row % 12 == 0`) and the E/F
/// boundary on F (`row % 12 == 7`).
fn on_boundary(row: usize) -> bool {
    row % 12 == 0 || row % 12 == 7
}

/// Converts the sparse marker cells of each row into continuous sustain
/// bars. Scanning columns left to right, every note cell toggles an
/// "inside a note" flag; while inside, a column takes the most recently
/// seen note cell, otherwise it becomes padding (bordered on boundary rows
/// when `border` is set). A row with an odd number of markers stays inside
/// through its last column; unpaired input degrades this way by contract
/// rather than erroring.
pub fn fill_sustains(grid: &mut Grid, border: bool) {
    for (index, row) in grid.cells.iter_mut().enumerate() {
        let bordered = border && on_boundary(index);
        let mut inside = false;
        let mut bar = Cell::Blank;

        for cell in row.iter_mut() {
            if matches!(cell, Cell::Note { .. }) {
                inside = !inside;
                bar = *cell;
            }

            *cell = if inside {
                bar
            } else if bordered {
                Cell::Border
            } else {
                Cell::Blank
            };
        }
    }
}
