use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::cells::Cartesian2DCoordinate;
use crate::grid::{CoordinateSmallVec, Grid, GridError};
use crate::units::{Height, Width};

/// Build a new `width * height` grid and carve a perfect maze into it with the recursive backtracker.
pub fn generate_maze<R: Rng + ?Sized>(width: Width, height: Height, rng: &mut R) -> Result<Grid, GridError> {
    let mut grid = Grid::new(width, height)?;
    recursive_backtracker(&mut grid, rng)?;
    Ok(grid)
}

/// Apply the recursive backtracker maze generation algorithm to a fully walled grid.
///
/// A random walk that never steps onto an already visited cell. When the walk is boxed in it backtracks
/// along its own trail to the most recent cell that still has an unvisited neighbour and carries on from
/// there. The trail is an explicit stack, so the depth of the walk is not bounded by the call stack.
/// Every cell is visited exactly once and each visit carves exactly one passage, which leaves a perfect
/// maze: a spanning tree of the grid.
///
/// The outcome is fully determined by the random source, so a seeded generator reproduces the same maze.
/// A grid that already has passages is rejected with `GridError::AlreadyCarved` and left untouched.
pub fn recursive_backtracker<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Result<(), GridError> {

    if grid.links_count() > 0 {
        warn!(links = grid.links_count(), "refusing to carve a maze into a grid that already has passages");
        return Err(GridError::AlreadyCarved { links: grid.links_count() });
    }

    let started = Instant::now();
    let cells_count = grid.size();
    let Width(row_length) = grid.width();
    let visited_index = |coord: Cartesian2DCoordinate| coord.y as usize * row_length + coord.x as usize;

    let mut visited = vec![false; cells_count];
    let mut stack: Vec<Cartesian2DCoordinate> = Vec::with_capacity(cells_count);

    let start = grid.random_cell(rng);
    visited[visited_index(start)] = true;
    stack.push(start);

    let mut visited_count = 1;
    let mut reported_percent = 0;

    while let Some(&current) = stack.last() {

        let unvisited_neighbours: CoordinateSmallVec = grid.neighbours(current)
            .iter()
            .cloned()
            .filter(|neighbour| !visited[visited_index(*neighbour)])
            .collect();

        if let Some(&next) = unvisited_neighbours.choose(rng) {
            grid.link(current, next)?;
            visited[visited_index(next)] = true;
            stack.push(next);

            visited_count += 1;
            let percent_done = visited_count * 100 / cells_count;
            if percent_done > reported_percent {
                reported_percent = percent_done;
                trace!(percent_done, "maze generation progress");
            }
        } else {
            stack.pop();
        }
    }

    debug!(width = row_length,
           height = grid.height().0,
           elapsed = ?started.elapsed(),
           "maze generated");
    Ok(())
}
