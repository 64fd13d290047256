use std::fmt;

use itertools::Itertools;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::grid::Grid;

pub const WALL_GLYPH: char = 'W';
pub const FLOOR_GLYPH: char = ' ';
pub const PATH_GLYPH: char = 'P';

/// Top down character map of a maze at twice the grid resolution.
///
/// Cell (x, y) sits at map position (2x + 1, 2y + 1). The map positions between two neighbouring cells
/// are floor when the cells are linked, and every remaining position is wall, so a `w * h` grid becomes
/// a `(2w + 1) * (2h + 1)` map with a solid outer border.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AsciiMap {
    columns: usize,
    rows: usize,
    glyphs: Vec<char>,
}

impl AsciiMap {

    pub fn from_grid(grid: &Grid) -> AsciiMap {
        let columns = grid.width().0 * 2 + 1;
        let rows = grid.height().0 * 2 + 1;
        let mut map = AsciiMap {
            columns,
            rows,
            glyphs: vec![WALL_GLYPH; columns * rows],
        };

        for cells_row in grid.iter_row() {
            for coord in cells_row {
                let (column, row) = AsciiMap::cell_centre(coord);
                map.set(column, row, FLOOR_GLYPH);

                // Only east and south so each passage is opened once
                if !grid.is_blocked(coord, CompassPrimary::East) {
                    map.set(column + 1, row, FLOOR_GLYPH);
                }
                if !grid.is_blocked(coord, CompassPrimary::South) {
                    map.set(column, row + 1, FLOOR_GLYPH);
                }
            }
        }
        map
    }

    /// Map position of a grid cell's centre.
    #[inline]
    pub fn cell_centre(coord: Cartesian2DCoordinate) -> (usize, usize) {
        (coord.x as usize * 2 + 1, coord.y as usize * 2 + 1)
    }

    /// Overwrite the centres of the path cells with the path glyph. Cells outside the map are skipped.
    pub fn mark_path(&mut self, path: &[Cartesian2DCoordinate]) {
        for &coord in path {
            let (column, row) = AsciiMap::cell_centre(coord);
            if column < self.columns && row < self.rows {
                self.set(column, row, PATH_GLYPH);
            }
        }
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn glyph(&self, column: usize, row: usize) -> Option<char> {
        if column < self.columns && row < self.rows {
            Some(self.glyphs[row * self.columns + column])
        } else {
            None
        }
    }

    fn set(&mut self, column: usize, row: usize, glyph: char) {
        self.glyphs[row * self.columns + column] = glyph;
    }
}

impl fmt::Display for AsciiMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = self.glyphs
            .chunks(self.columns)
            .map(|row| row.iter().collect::<String>())
            .join("\n");
        write!(f, "{}", text)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", AsciiMap::from_grid(self))
    }
}
