use crate::config::Appearance;
use crate::grid::Grid;

/// Render `grid` with the configured glyphs, one line per row.
pub fn render(grid: &Grid, appearance: &Appearance) -> String {
    let mut result = String::new();
    for row in grid.rows() {
        for &tile in row {
            result.push_str(appearance.glyph(tile));
        }
        result.push('\n');
    }
    result
}
