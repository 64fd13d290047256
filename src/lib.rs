//! **mazewalk** generates perfect mazes, finds the shortest route through them, draws them as maps and
//! renders a first person ASCII view for walking through them.

pub mod cells;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod grid_iterators;
pub mod pathing;
pub mod renderers;
pub mod units;
pub mod utils;
pub mod views;
pub mod walker;
