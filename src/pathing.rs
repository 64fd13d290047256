use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::error::Error;
use std::fmt;
use std::time::Instant;

use smallvec::SmallVec;
use tracing::debug;

use crate::cells::Cartesian2DCoordinate;
use crate::grid::Grid;

/// Distances (link steps) from one start cell to every cell of a grid.
///
/// Built by a breadth first flood fill, so it needs no priority queue: every link costs one step and a
/// cell's distance is final the first time the fill reaches it.
#[derive(Debug, Clone)]
pub struct Distances {
    start_coordinate: Cartesian2DCoordinate,
    distances: Vec<Option<u32>>,
    max_distance: u32,
    grid_width: usize,
}

impl Distances {
    /// None if the start coordinate is not on the grid.
    pub fn for_grid(grid: &Grid, start_coordinate: Cartesian2DCoordinate) -> Option<Distances> {

        let start_index = grid.grid_coordinate_to_index(start_coordinate)?;

        let mut max = 0;
        let mut distances = vec![None; grid.size()];
        distances[start_index] = Some(0);

        // The distances vec tracks which cells were already processed, so the frontier never needs
        // de-duplicating.
        let mut frontier = vec![start_coordinate];
        while !frontier.is_empty() {

            let mut new_frontier = vec![];
            for cell_coord in &frontier {

                let distance_to_cell = grid.grid_coordinate_to_index(*cell_coord)
                    .and_then(|index| distances[index])
                    .unwrap_or(0);
                if distance_to_cell > max {
                    max = distance_to_cell;
                }

                let links = grid.links(*cell_coord).unwrap_or_default();
                for link_coordinate in &links {
                    if let Some(link_index) = grid.grid_coordinate_to_index(*link_coordinate) {
                        if distances[link_index].is_none() {
                            distances[link_index] = Some(distance_to_cell + 1);
                            new_frontier.push(*link_coordinate);
                        }
                    }
                }
            }
            frontier = new_frontier;
        }

        Some(Distances {
            start_coordinate,
            distances,
            max_distance: max,
            grid_width: grid.width().0,
        })
    }

    #[inline(always)]
    pub fn start(&self) -> Cartesian2DCoordinate {
        self.start_coordinate
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max_distance
    }

    /// None if the cell is unreachable from the start or not on the grid.
    pub fn distance_from_start_to(&self, coord: Cartesian2DCoordinate) -> Option<u32> {
        if coord.x as usize >= self.grid_width {
            return None;
        }
        let index = coord.y as usize * self.grid_width + coord.x as usize;
        self.distances.get(index).cloned().and_then(|d| d)
    }

    pub fn furthest_points_on_grid(&self) -> SmallVec<[Cartesian2DCoordinate; 8]> {
        let furthest_distance = self.max();
        self.distances
            .iter()
            .enumerate()
            .filter(|&(_, distance)| *distance == Some(furthest_distance))
            .map(|(index, _)| {
                Cartesian2DCoordinate::new((index % self.grid_width) as u32,
                                           (index / self.grid_width) as u32)
            })
            .collect()
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum PathingError {
    InvalidCoordinate(Cartesian2DCoordinate),
    Unreachable {
        start: Cartesian2DCoordinate,
        goal: Cartesian2DCoordinate,
    },
}

impl fmt::Display for PathingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PathingError::InvalidCoordinate(coord) => write!(f, "{} is not a cell of the maze", coord),
            PathingError::Unreachable { start, goal } => {
                write!(f, "there is no route from {} to {}", start, goal)
            }
        }
    }
}

impl Error for PathingError {}

/// The shortest route between two cells, listed from the `goal` back to the `start` (both included).
///
/// A* search over the passages of the grid with unit step costs and the Manhattan distance to the goal as
/// the heuristic. The frontier orders equal priorities by cell coordinate so the search, and the route it
/// picks when several are equally short, is deterministic.
///
/// A perfect maze has exactly one route between any two cells, so the search always succeeds on a grid from
/// the generators. Partially carved grids can leave the goal unreachable.
pub fn shortest_path(grid: &Grid,
                     start: Cartesian2DCoordinate,
                     goal: Cartesian2DCoordinate)
                     -> Result<Vec<Cartesian2DCoordinate>, PathingError> {

    let started = Instant::now();
    let start_index = grid.grid_coordinate_to_index(start)
        .ok_or(PathingError::InvalidCoordinate(start))?;
    let goal_index = grid.grid_coordinate_to_index(goal)
        .ok_or(PathingError::InvalidCoordinate(goal))?;

    let mut cost_so_far: Vec<Option<u32>> = vec![None; grid.size()];
    let mut came_from: Vec<Option<Cartesian2DCoordinate>> = vec![None; grid.size()];
    let mut frontier = BinaryHeap::new();

    cost_so_far[start_index] = Some(0);
    frontier.push(Reverse((start.manhattan_distance(goal), start)));

    let mut goal_reached = false;
    while let Some(Reverse((priority, current))) = frontier.pop() {

        if current == goal {
            goal_reached = true;
            break;
        }

        let current_index = grid.grid_coordinate_to_index(current)
            .ok_or(PathingError::InvalidCoordinate(current))?;
        let current_cost = cost_so_far[current_index].unwrap_or(0);

        // A cheaper entry for this cell was already expanded
        if priority > current_cost + current.manhattan_distance(goal) {
            continue;
        }

        let links = grid.links(current).unwrap_or_default();
        for next_cell in &links {
            let next_index = match grid.grid_coordinate_to_index(*next_cell) {
                Some(index) => index,
                None => continue,
            };
            let new_cost = current_cost + 1;
            let is_improvement = cost_so_far[next_index].map_or(true, |known_cost| new_cost < known_cost);
            if is_improvement {
                cost_so_far[next_index] = Some(new_cost);
                came_from[next_index] = Some(current);
                frontier.push(Reverse((new_cost + next_cell.manhattan_distance(goal), *next_cell)));
            }
        }
    }

    if !goal_reached {
        return Err(PathingError::Unreachable { start, goal });
    }

    let mut path = vec![goal];
    let mut current_index = goal_index;
    while current_index != start_index {
        let previous = came_from[current_index].ok_or(PathingError::Unreachable { start, goal })?;
        path.push(previous);
        current_index = grid.grid_coordinate_to_index(previous)
            .ok_or(PathingError::InvalidCoordinate(previous))?;
    }

    debug!(length = path.len(), elapsed = ?started.elapsed(), "path found");
    Ok(path)
}
