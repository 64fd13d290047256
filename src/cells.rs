use std::convert::From;
use std::fmt;

use crate::units::{ColumnIndex, RowIndex, Width};

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Cartesian2DCoordinate {
    pub x: u32,
    pub y: u32,
}

impl Cartesian2DCoordinate {
    pub fn new(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate { x, y }
    }

    #[inline]
    pub fn from_row_major_index(index: usize, width: Width) -> Cartesian2DCoordinate {
        let Width(row_length) = width;
        let x = index % row_length;
        let y = index / row_length;
        Cartesian2DCoordinate::new(x as u32, y as u32)
    }

    #[inline]
    pub fn from_row_column_indices(col_index: ColumnIndex, row_index: RowIndex) -> Self {
        let (ColumnIndex(col), RowIndex(row)) = (col_index, row_index);
        Cartesian2DCoordinate::new(col as u32, row as u32)
    }

    /// Creates a new coordinate offset 1 cell away in the given direction.
    /// Returns None if the coordinate is not representable, i.e. it would be negative.
    /// The caller still decides whether it is inside a particular grid.
    pub fn offset(&self, dir: CompassPrimary) -> Option<Cartesian2DCoordinate> {
        let (x, y) = (self.x, self.y);
        match dir {
            CompassPrimary::North => y.checked_sub(1).map(|north_y| Cartesian2DCoordinate::new(x, north_y)),
            CompassPrimary::South => y.checked_add(1).map(|south_y| Cartesian2DCoordinate::new(x, south_y)),
            CompassPrimary::East => x.checked_add(1).map(|east_x| Cartesian2DCoordinate::new(east_x, y)),
            CompassPrimary::West => x.checked_sub(1).map(|west_x| Cartesian2DCoordinate::new(west_x, y)),
        }
    }

    /// Grid steps between two cells ignoring walls, |Δx| + |Δy|.
    #[inline]
    pub fn manhattan_distance(&self, other: Cartesian2DCoordinate) -> u32 {
        let dx = if self.x > other.x { self.x - other.x } else { other.x - self.x };
        let dy = if self.y > other.y { self.y - other.y } else { other.y - self.y };
        dx + dy
    }

    /// Which direction leads from this cell to an adjacent `other` cell, if any.
    pub fn direction_to(&self, other: Cartesian2DCoordinate) -> Option<CompassPrimary> {
        CompassPrimary::ALL.iter()
            .cloned()
            .find(|dir| self.offset(*dir) == Some(other))
    }
}

impl From<(u32, u32)> for Cartesian2DCoordinate {
    fn from(x_y_pair: (u32, u32)) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for Cartesian2DCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four directions of travel in clockwise order, with y growing southwards.
/// A left turn is one step back in the cycle, a right turn one step forward.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

impl CompassPrimary {
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    #[inline]
    fn cycle_index(self) -> usize {
        match self {
            CompassPrimary::North => 0,
            CompassPrimary::East => 1,
            CompassPrimary::South => 2,
            CompassPrimary::West => 3,
        }
    }

    #[inline]
    fn from_cycle_index(index: usize) -> CompassPrimary {
        CompassPrimary::ALL[index % CompassPrimary::ALL.len()]
    }

    pub fn turn_left(self) -> CompassPrimary {
        CompassPrimary::from_cycle_index(self.cycle_index() + 3)
    }

    pub fn turn_right(self) -> CompassPrimary {
        CompassPrimary::from_cycle_index(self.cycle_index() + 1)
    }

    pub fn opposite(self) -> CompassPrimary {
        CompassPrimary::from_cycle_index(self.cycle_index() + 2)
    }

    pub fn name(self) -> &'static str {
        match self {
            CompassPrimary::North => "north",
            CompassPrimary::East => "east",
            CompassPrimary::South => "south",
            CompassPrimary::West => "west",
        }
    }
}

impl fmt::Display for CompassPrimary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn left_and_right_are_the_cyclic_neighbours() {
        for dir in CompassPrimary::ALL.iter().cloned() {
            assert_eq!(dir.turn_left().turn_right(), dir);
            assert_eq!(dir.turn_right().turn_left(), dir);
            assert_eq!(dir.turn_left().turn_left(), dir.opposite());
            assert_eq!(dir.turn_right().turn_right(), dir.opposite());
            assert_ne!(dir.turn_left(), dir);
            assert_ne!(dir.turn_right(), dir);
        }
        assert_eq!(CompassPrimary::North.turn_left(), CompassPrimary::West);
        assert_eq!(CompassPrimary::North.turn_right(), CompassPrimary::East);
        assert_eq!(CompassPrimary::West.turn_right(), CompassPrimary::North);
        assert_eq!(CompassPrimary::South.turn_left(), CompassPrimary::East);
    }

    #[test]
    fn opposite_offsets_cancel_out() {
        let centre = Cartesian2DCoordinate::new(5, 5);
        for dir in CompassPrimary::ALL.iter().cloned() {
            let step = centre.offset(dir).expect("centre has room on every side");
            assert_eq!(centre.manhattan_distance(step), 1);
            assert_eq!(step.offset(dir.opposite()), Some(centre));
            assert_eq!(centre.direction_to(step), Some(dir));
        }
    }

    #[test]
    fn offsets_off_the_origin_are_unrepresentable() {
        let origin = Cartesian2DCoordinate::new(0, 0);
        assert_eq!(origin.offset(CompassPrimary::North), None);
        assert_eq!(origin.offset(CompassPrimary::West), None);
        assert_eq!(origin.offset(CompassPrimary::East), Some(Cartesian2DCoordinate::new(1, 0)));
        assert_eq!(origin.offset(CompassPrimary::South), Some(Cartesian2DCoordinate::new(0, 1)));
    }

    #[test]
    fn row_major_index_round_trip() {
        let gc = Cartesian2DCoordinate::from_row_major_index(7, Width(3));
        assert_eq!(gc, Cartesian2DCoordinate::new(1, 2));
        assert_eq!(Cartesian2DCoordinate::from_row_column_indices(ColumnIndex(1), RowIndex(2)), gc);
    }

    #[test]
    fn direction_between_adjacent_cells() {
        let a = Cartesian2DCoordinate::new(1, 1);
        assert_eq!(a.direction_to(Cartesian2DCoordinate::new(1, 0)), Some(CompassPrimary::North));
        assert_eq!(a.direction_to(Cartesian2DCoordinate::new(0, 1)), Some(CompassPrimary::West));
        assert_eq!(a.direction_to(Cartesian2DCoordinate::new(2, 2)), None);
        assert_eq!(a.direction_to(a), None);
    }

    #[test]
    fn coordinates_order_by_x_then_y() {
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        assert!(gc(0, 9) < gc(1, 0));
        assert!(gc(1, 0) < gc(1, 1));
        assert_eq!(gc(3, 4).manhattan_distance(gc(1, 7)), 5);
    }
}
