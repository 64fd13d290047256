use std::error::Error;
use std::fmt;
use std::slice;

use petgraph::algo::connected_components;
use petgraph::graph;
use petgraph::{Graph, Undirected};
use rand::Rng;
use smallvec::SmallVec;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::grid_iterators::{CellIter, RowIter};
use crate::units::{EdgesCount, Height, NodesCount, Width};

pub type CoordinateSmallVec = SmallVec<[Cartesian2DCoordinate; 4]>;

/// A rectangular maze: the cells of a `width * height` grid and the passages (links) between them.
///
/// A wall stands between two adjacent cells unless they are linked, so the set of blocked directions at a
/// cell is everything except the directions of its links. Links are undirected edges of a graph whose node
/// indices are the row major cell indices, which keeps the walls symmetric by construction.
pub struct Grid {
    graph: Graph<(), (), Undirected, u32>,
    width: Width,
    height: Height,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum GridError {
    InvalidDimensions { width: usize, height: usize },
    /// Maze generation needs every cell fully walled.
    AlreadyCarved { links: usize },
    Link(CellLinkError),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            GridError::InvalidDimensions { width, height } => {
                write!(f, "invalid maze dimensions {}x{}", width, height)
            }
            GridError::AlreadyCarved { links } => {
                write!(f, "grid already has {} passages, a maze needs a fully walled grid", links)
            }
            GridError::Link(ref link_error) => write!(f, "failed to link cells: {}", link_error),
        }
    }
}

impl Error for GridError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            GridError::Link(ref link_error) => Some(link_error),
            _ => None,
        }
    }
}

impl From<CellLinkError> for GridError {
    fn from(link_error: CellLinkError) -> GridError {
        GridError::Link(link_error)
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum CellLinkError {
    InvalidGridCoordinate,
    SelfLink,
    NotNeighbours,
}

impl fmt::Display for CellLinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match *self {
            CellLinkError::InvalidGridCoordinate => "cell coordinate is outside the grid",
            CellLinkError::SelfLink => "a cell cannot be linked to itself",
            CellLinkError::NotNeighbours => "only adjacent cells can be linked",
        };
        write!(f, "{}", reason)
    }
}

impl Error for CellLinkError {}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: graph: {:?}, width: {:?}, height: {:?}",
               self.graph, self.width, self.height)
    }
}

impl Grid {
    /// A grid of fully walled cells.
    pub fn new(width: Width, height: Height) -> Result<Grid, GridError> {

        let invalid = GridError::InvalidDimensions { width: width.0, height: height.0 };
        let (NodesCount(nodes), EdgesCount(edges)) = graph_size(width, height).ok_or(invalid)?;

        let mut grid = Grid {
            graph: Graph::with_capacity(nodes, edges),
            width,
            height,
        };
        for _ in 0..nodes {
            let _ = grid.graph.add_node(());
        }

        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.width.0 * self.height.0
    }

    #[inline]
    pub fn links_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Cartesian2DCoordinate {
        let index = rng.gen_range(0..self.size());
        Cartesian2DCoordinate::from_row_major_index(index, self.width)
    }

    /// Link two adjacent cells, opening the wall between them from both sides.
    ///
    /// Linking cells that are already linked is a no-op.
    pub fn link(&mut self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> Result<(), CellLinkError> {
        if a == b {
            return Err(CellLinkError::SelfLink);
        }
        match (self.grid_coordinate_graph_index(a), self.grid_coordinate_graph_index(b)) {
            (Some(a_index), Some(b_index)) => {
                if a.direction_to(b).is_none() {
                    return Err(CellLinkError::NotNeighbours);
                }
                let _ = self.graph.update_edge(a_index, b_index, ());
                Ok(())
            }
            _ => Err(CellLinkError::InvalidGridCoordinate),
        }
    }

    /// Cell nodes that are linked to a particular node by a passage.
    pub fn links(&self, coord: Cartesian2DCoordinate) -> Option<CoordinateSmallVec> {

        self.grid_coordinate_graph_index(coord).map(|graph_node_index| {
            self.graph
                .neighbors(graph_node_index)
                .map(|linked_node_index| {
                    Cartesian2DCoordinate::from_row_major_index(linked_node_index.index(), self.width)
                })
                .collect()
        })
    }

    /// Cell nodes that are to the North, East, South or West of a particular node, but not
    /// necessarily linked by a passage.
    pub fn neighbours(&self, coord: Cartesian2DCoordinate) -> CoordinateSmallVec {
        CompassPrimary::ALL.iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        coord.offset(direction)
            .filter(|neighbour_coord| self.is_valid_coordinate(*neighbour_coord))
    }

    /// The neighbour in `direction` if there is a passage to it.
    pub fn linked_neighbour_at_direction(&self,
                                         coord: Cartesian2DCoordinate,
                                         direction: CompassPrimary)
                                         -> Option<Cartesian2DCoordinate> {
        self.neighbour_at_direction(coord, direction)
            .filter(|neighbour_coord| self.is_linked(coord, *neighbour_coord))
    }

    /// Are two cells in the grid linked?
    pub fn is_linked(&self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        if let (Some(a_index), Some(b_index)) = (self.grid_coordinate_graph_index(a),
                                                 self.grid_coordinate_graph_index(b)) {
            self.graph.find_edge(a_index, b_index).is_some()
        } else {
            false
        }
    }

    pub fn is_neighbour_linked(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.linked_neighbour_at_direction(coord, direction).is_some()
    }

    /// Is there a wall on the `direction` side of the cell?
    /// The outer boundary of the grid is always walled.
    #[inline]
    pub fn is_blocked(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        !self.is_neighbour_linked(coord, direction)
    }

    #[inline]
    pub fn okay_to_move_forward(&self, position: Cartesian2DCoordinate, facing: CompassPrimary) -> bool {
        !self.is_blocked(position, facing)
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }

    #[inline]
    pub fn iter(&self) -> CellIter {
        CellIter::new(self.width, self.height)
    }

    #[inline]
    pub fn iter_row(&self) -> RowIter {
        RowIter::new(self.width, self.height)
    }

    pub fn iter_links(&self) -> LinksIter<'_> {
        LinksIter {
            graph_edge_iter: self.graph.raw_edges().iter(),
            width: self.width,
        }
    }

    /// Do the links form a spanning tree, one simple path between any two cells?
    pub fn is_perfect(&self) -> bool {
        self.links_count() + 1 == self.size() && connected_components(&self.graph) == 1
    }

    /// Convert a grid coordinate into petgraph nodeindex
    /// Returns None if the grid coordinate is invalid (out of the grid's dimensions).
    #[inline]
    fn grid_coordinate_graph_index(&self, coord: Cartesian2DCoordinate) -> Option<graph::NodeIndex<u32>> {
        self.grid_coordinate_to_index(coord).map(graph::NodeIndex::<u32>::new)
    }
}

/// Node count and an edge capacity hint (a spanning tree) for the graph backing a grid.
/// None when the grid would be empty or its cells cannot all be indexed.
fn graph_size(width: Width, height: Height) -> Option<(NodesCount, EdgesCount)> {
    let (Width(w), Height(h)) = (width, height);
    w.checked_mul(h)
        .filter(|&cells_count| cells_count > 0 && cells_count < u32::MAX as usize)
        .map(|cells_count| (NodesCount(cells_count), EdgesCount(cells_count - 1)))
}

pub struct LinksIter<'a> {
    graph_edge_iter: slice::Iter<'a, graph::Edge<(), u32>>,
    width: Width,
}

impl<'a> Iterator for LinksIter<'a> {
    type Item = (Cartesian2DCoordinate, Cartesian2DCoordinate);

    fn next(&mut self) -> Option<Self::Item> {
        self.graph_edge_iter.next().map(|edge| {
            let src_cell_coord = Cartesian2DCoordinate::from_row_major_index(edge.source().index(),
                                                                             self.width);
            let dst_cell_coord = Cartesian2DCoordinate::from_row_major_index(edge.target().index(),
                                                                             self.width);
            (src_cell_coord, dst_cell_coord)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.graph_edge_iter.size_hint()
    }
}
impl<'a> ExactSizeIterator for LinksIter<'a> {} // default impl using size_hint()

impl<'a> fmt::Debug for LinksIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LinksIter :: edges iter : {:?}", self.graph_edge_iter)
    }
}


#[cfg(test)]
mod tests {

    use itertools::Itertools; // a trait

    use super::*;
    use crate::utils;

    fn small_grid(w: usize, h: usize) -> Grid {
        Grid::new(Width(w), Height(h)).expect("valid grid dimensions")
    }

    // Compare a smallvec to e.g. a vec! or &[T].
    // SmallVec really ruins the syntax ergonomics, hence this macro
    // The compiler often succeeds in automatically adding the correct & and derefs (*) but not here
    macro_rules! assert_smallvec_eq {
        ($x:expr, $y:expr) => (assert_eq!(&*$x, &*$y))
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        assert_eq!(Grid::new(Width(0), Height(4)).unwrap_err(),
                   GridError::InvalidDimensions { width: 0, height: 4 });
        assert_eq!(Grid::new(Width(4), Height(0)).unwrap_err(),
                   GridError::InvalidDimensions { width: 4, height: 0 });
        assert!(Grid::new(Width(1), Height(1)).is_ok());
    }

    #[test]
    fn neighbour_cells() {
        let g = small_grid(10, 10);

        let check_expected_neighbours = |coord, expected_neighbours: &[Cartesian2DCoordinate]| {
            let node_indices: Vec<Cartesian2DCoordinate> =
                g.neighbours(coord).iter().cloned().sorted().collect();
            let expected_indices: Vec<Cartesian2DCoordinate> = expected_neighbours.iter()
                .cloned()
                .sorted()
                .collect();
            assert_eq!(node_indices, expected_indices);
        };
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);

        // corners
        check_expected_neighbours(gc(0, 0), &[gc(1, 0), gc(0, 1)]);
        check_expected_neighbours(gc(9, 0), &[gc(8, 0), gc(9, 1)]);
        check_expected_neighbours(gc(0, 9), &[gc(0, 8), gc(1, 9)]);
        check_expected_neighbours(gc(9, 9), &[gc(9, 8), gc(8, 9)]);

        // side element examples
        check_expected_neighbours(gc(1, 0), &[gc(0, 0), gc(1, 1), gc(2, 0)]);
        check_expected_neighbours(gc(0, 1), &[gc(0, 0), gc(0, 2), gc(1, 1)]);
        check_expected_neighbours(gc(9, 8), &[gc(9, 7), gc(9, 9), gc(8, 8)]);

        // Some place with 4 neighbours inside the grid
        check_expected_neighbours(gc(1, 1), &[gc(0, 1), gc(1, 0), gc(2, 1), gc(1, 2)]);
    }

    #[test]
    fn neighbour_at_dir() {
        let g = small_grid(2, 3);
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        let check_neighbour = |coord, dir: CompassPrimary, expected| {
            assert_eq!(g.neighbour_at_direction(coord, dir), expected);
        };
        check_neighbour(gc(0, 0), CompassPrimary::North, None);
        check_neighbour(gc(0, 0), CompassPrimary::South, Some(gc(0, 1)));
        check_neighbour(gc(0, 0), CompassPrimary::East, Some(gc(1, 0)));
        check_neighbour(gc(0, 0), CompassPrimary::West, None);

        check_neighbour(gc(1, 2), CompassPrimary::North, Some(gc(1, 1)));
        check_neighbour(gc(1, 2), CompassPrimary::South, None);
        check_neighbour(gc(1, 2), CompassPrimary::East, None);
        check_neighbour(gc(1, 2), CompassPrimary::West, Some(gc(0, 2)));
    }

    #[test]
    fn grid_size() {
        let g = small_grid(10, 7);
        assert_eq!(g.size(), 70);
        assert_eq!(g.width(), Width(10));
        assert_eq!(g.height(), Height(7));
        assert_eq!(g.links_count(), 0);
    }

    #[test]
    fn grid_coordinate_as_index() {
        let g = small_grid(3, 3);
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        let coords = &[gc(0, 0), gc(1, 0), gc(2, 0), gc(0, 1), gc(1, 1), gc(2, 1), gc(0, 2),
                       gc(1, 2), gc(2, 2)];
        let indices: Vec<Option<usize>> = coords.iter()
            .map(|coord| g.grid_coordinate_to_index(*coord))
            .collect();
        let expected = (0..9).map(Some).collect::<Vec<Option<usize>>>();
        assert_eq!(expected, indices);

        assert_eq!(g.grid_coordinate_to_index(gc(2, 3)), None);
        assert_eq!(g.grid_coordinate_to_index(gc(3, 2)), None);
        assert_eq!(g.grid_coordinate_to_index(gc(u32::MAX, u32::MAX)), None);
    }

    #[test]
    fn random_cell() {
        let g = small_grid(4, 3);
        let mut rng = utils::weak_rng();
        for _ in 0..1000 {
            let coord = g.random_cell(&mut rng);
            assert!(g.is_valid_coordinate(coord));
        }
    }

    #[test]
    fn cell_iter() {
        let g = small_grid(2, 2);
        assert_eq!(g.iter().len(), 4);
        assert_eq!(g.iter().collect::<Vec<Cartesian2DCoordinate>>(),
                   &[Cartesian2DCoordinate::new(0, 0),
                     Cartesian2DCoordinate::new(1, 0),
                     Cartesian2DCoordinate::new(0, 1),
                     Cartesian2DCoordinate::new(1, 1)]);
    }

    #[test]
    fn row_iter() {
        let g = small_grid(2, 3);
        assert_eq!(g.iter_row().collect::<Vec<Vec<Cartesian2DCoordinate>>>(),
                   vec![vec![Cartesian2DCoordinate::new(0, 0), Cartesian2DCoordinate::new(1, 0)],
                        vec![Cartesian2DCoordinate::new(0, 1), Cartesian2DCoordinate::new(1, 1)],
                        vec![Cartesian2DCoordinate::new(0, 2), Cartesian2DCoordinate::new(1, 2)]]);
    }

    #[test]
    fn linking_cells() {
        let mut g = small_grid(4, 4);
        let a = Cartesian2DCoordinate::new(0, 1);
        let b = Cartesian2DCoordinate::new(0, 2);
        let c = Cartesian2DCoordinate::new(0, 3);

        // Testing the expected grid `links`
        let sorted_links = |grid: &Grid, coord| -> Vec<Cartesian2DCoordinate> {
            grid.links(coord).expect("coordinate is invalid").iter().cloned().sorted().collect()
        };

        // Testing `is_blocked` for all directions
        let directional_walls_check = |grid: &Grid,
                                       coord: Cartesian2DCoordinate,
                                       expected_dirs_open: &[CompassPrimary]| {
            for dir in CompassPrimary::ALL.iter() {
                assert_eq!(grid.is_blocked(coord, *dir), !expected_dirs_open.contains(dir));
            }
        };

        // a, b and c start with no links
        assert!(!g.is_linked(a, b) && !g.is_linked(b, a));
        assert_eq!(sorted_links(&g, a), Vec::<Cartesian2DCoordinate>::new());
        directional_walls_check(&g, a, &[]);
        directional_walls_check(&g, b, &[]);

        g.link(a, b).expect("link failed");
        // a - b linked bi-directionally
        assert!(g.is_linked(a, b) && g.is_linked(b, a));
        assert_eq!(sorted_links(&g, a), vec![b]);
        assert_eq!(sorted_links(&g, b), vec![a]);
        directional_walls_check(&g, a, &[CompassPrimary::South]);
        directional_walls_check(&g, b, &[CompassPrimary::North]);
        directional_walls_check(&g, c, &[]);

        g.link(c, b).expect("link failed");
        assert!(g.is_linked(b, c) && g.is_linked(c, b));
        assert!(!g.is_linked(a, c));
        assert_eq!(sorted_links(&g, b), vec![a, c]);
        directional_walls_check(&g, b, &[CompassPrimary::North, CompassPrimary::South]);
        directional_walls_check(&g, c, &[CompassPrimary::North]);
        assert_eq!(g.links_count(), 2);
        assert_eq!(g.linked_neighbour_at_direction(b, CompassPrimary::South), Some(c));
        assert_eq!(g.linked_neighbour_at_direction(b, CompassPrimary::East), None);
    }

    #[test]
    fn no_self_linked_cycles() {
        let mut g = small_grid(4, 4);
        let a = Cartesian2DCoordinate::new(0, 0);
        assert_eq!(g.link(a, a), Err(CellLinkError::SelfLink));
    }

    #[test]
    fn no_links_to_invalid_coordinates() {
        let mut g = small_grid(4, 4);
        let good_coord = Cartesian2DCoordinate::new(3, 3);
        let invalid_coord = Cartesian2DCoordinate::new(4, 3);
        assert_eq!(g.link(good_coord, invalid_coord), Err(CellLinkError::InvalidGridCoordinate));
        assert_eq!(g.links(invalid_coord), None);
    }

    #[test]
    fn no_links_between_distant_cells() {
        let mut g = small_grid(4, 4);
        let a = Cartesian2DCoordinate::new(0, 0);
        assert_eq!(g.link(a, Cartesian2DCoordinate::new(1, 1)), Err(CellLinkError::NotNeighbours));
        assert_eq!(g.link(a, Cartesian2DCoordinate::new(2, 0)), Err(CellLinkError::NotNeighbours));
        assert_eq!(g.links_count(), 0);
    }

    #[test]
    fn no_parallel_duplicated_linked_cells() {
        let mut g = small_grid(4, 4);
        let a = Cartesian2DCoordinate::new(0, 0);
        let b = Cartesian2DCoordinate::new(0, 1);
        g.link(a, b).expect("link failed");
        g.link(b, a).expect("link failed");
        assert_smallvec_eq!(g.links(a).unwrap(), &[b]);
        assert_smallvec_eq!(g.links(b).unwrap(), &[a]);
        assert_eq!(g.links_count(), 1);
    }

    #[test]
    fn outer_boundary_is_always_walled() {
        let mut g = small_grid(3, 3);
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        for (a, b) in vec![(gc(0, 0), gc(1, 0)), (gc(1, 0), gc(2, 0)), (gc(2, 0), gc(2, 1))] {
            g.link(a, b).expect("link failed");
        }
        for x in 0..3 {
            assert!(g.is_blocked(gc(x, 0), CompassPrimary::North));
            assert!(g.is_blocked(gc(x, 2), CompassPrimary::South));
        }
        for y in 0..3 {
            assert!(g.is_blocked(gc(0, y), CompassPrimary::West));
            assert!(g.is_blocked(gc(2, y), CompassPrimary::East));
        }
    }

    #[test]
    fn moving_forward_is_gated_by_walls() {
        let mut g = small_grid(3, 2);
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        g.link(gc(0, 0), gc(1, 0)).expect("link failed");
        g.link(gc(1, 0), gc(1, 1)).expect("link failed");
        for coord in g.iter() {
            for dir in CompassPrimary::ALL.iter() {
                assert_eq!(g.okay_to_move_forward(coord, *dir), !g.is_blocked(coord, *dir));
            }
        }
        assert!(g.okay_to_move_forward(gc(0, 0), CompassPrimary::East));
        assert!(!g.okay_to_move_forward(gc(0, 0), CompassPrimary::South));
        assert!(g.okay_to_move_forward(gc(1, 1), CompassPrimary::North));
    }

    #[test]
    fn links_iter_yields_each_passage_once() {
        let mut g = small_grid(2, 2);
        let gc = |x, y| Cartesian2DCoordinate::new(x, y);
        g.link(gc(0, 0), gc(1, 0)).expect("link failed");
        g.link(gc(1, 1), gc(1, 0)).expect("link failed");
        let links = g.iter_links().collect::<Vec<_>>();
        assert_eq!(g.iter_links().len(), 2);
        assert_eq!(links, vec![(gc(0, 0), gc(1, 0)), (gc(1, 1), gc(1, 0))]);
    }

    #[test]
    fn corridor_is_perfect() {
        let mut g = small_grid(1, 4);
        assert!(!g.is_perfect());
        for y in 0..3 {
            g.link(Cartesian2DCoordinate::new(0, y), Cartesian2DCoordinate::new(0, y + 1))
                .expect("link failed");
        }
        assert!(g.is_perfect());
    }
}
