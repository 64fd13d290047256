use std::fs::File;
use std::io;
use std::io::prelude::*;

use docopt::Docopt;
use error_chain::bail;
use serde_derive::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mazewalk::{
    cells::Cartesian2DCoordinate,
    generators,
    grid::Grid,
    grid_displays::AsciiMap,
    pathing,
    renderers,
    units::{Height, Width},
    utils,
    views::{self, FrameSet},
    walker::{Command, Walker},
};

const USAGE: &str = "Mazewalk

Usage:
    mazewalk_driver -h | --help
    mazewalk_driver [(--grid-size=<n>|[--width=<w> --height=<h>])] [--seed=<s>] [--start-x=<x> --start-y=<y>] [--goal-x=<x> --goal-y=<y>] [--views=<dir>] [--image-out=<path>] [--text-out=<path>] [--no-walk] [--verbose]

Options:
    -h --help            Show this screen.
    --grid-size=<n>      The grid size is n * n.
    --width=<w>          The grid width in a w*h grid [default: 10].
    --height=<h>         The grid height in a w*h grid [default: 10].
    --seed=<s>           Seed for the maze generator. A random maze is made if not given.
    --start-x=<x>        x coordinate of the start cell [default: 0].
    --start-y=<y>        y coordinate of the start cell [default: 0].
    --goal-x=<x>         x coordinate of the goal cell, the east edge if not given.
    --goal-y=<y>         y coordinate of the goal cell, the south edge if not given.
    --views=<dir>        Directory of first person view frames [default: views].
    --image-out=<path>   Output file path for a PNG map of the maze with the shortest path drawn on it [default: maze.png].
    --text-out=<path>    Output file path for a text map of the maze.
    --no-walk            Only generate and save the maze, do not walk through it.
    --verbose            Log generation and search details to stderr.
";
#[derive(Debug, Deserialize)]
struct MazeArgs {
    flag_grid_size: Option<usize>,
    flag_width: usize,
    flag_height: usize,
    flag_seed: Option<u64>,
    flag_start_x: u32,
    flag_start_y: u32,
    flag_goal_x: Option<u32>,
    flag_goal_y: Option<u32>,
    flag_views: String,
    flag_image_out: String,
    flag_text_out: String,
    flag_no_walk: bool,
    flag_verbose: bool,
}

mod errors {
    use error_chain::*;
    error_chain! {

        foreign_links {
            DocOptFailure(::docopt::Error);
            ImageWriteError(::image::ImageError);
            Io(::std::io::Error);
            Grid(::mazewalk::grid::GridError);
            Pathing(::mazewalk::pathing::PathingError);
            Views(::mazewalk::views::ViewError);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;
    init_logging(args.flag_verbose);

    let (width, height) = if let Some(square_grid_size) = args.flag_grid_size {
        (square_grid_size, square_grid_size)
    } else {
        (args.flag_width, args.flag_height)
    };

    let mut rng = match args.flag_seed {
        Some(seed) => utils::seeded_rng(seed),
        None => utils::weak_rng(),
    };
    let maze_grid = generators::generate_maze(Width(width), Height(height), &mut rng)?;

    let start = Cartesian2DCoordinate::new(args.flag_start_x, args.flag_start_y);
    let goal = Cartesian2DCoordinate::new(args.flag_goal_x.unwrap_or(width as u32 - 1),
                                          args.flag_goal_y.unwrap_or(height as u32 - 1));
    for &(label, coord) in [("start", start), ("goal", goal)].iter() {
        if !maze_grid.is_valid_coordinate(coord) {
            bail!("The {} cell {} is outside the {} x {} maze", label, coord, width, height);
        }
    }

    if let Some(distances) = pathing::Distances::for_grid(&maze_grid, start) {
        info!(depth = distances.max(),
              furthest = ?distances.furthest_points_on_grid(),
              "maze depth from the start cell");
    }

    let path = pathing::shortest_path(&maze_grid, start, goal)?;
    info!(length = path.len(), %start, %goal, "shortest path");

    let map = AsciiMap::from_grid(&maze_grid);
    if !args.flag_image_out.is_empty() {
        renderers::save_map_png(&map, Some(path.as_slice()), &args.flag_image_out)
            .chain_err(|| format!("Failed to write maze image {}", args.flag_image_out))?;
    }
    if !args.flag_text_out.is_empty() {
        let mut marked = map.clone();
        marked.mark_path(&path);
        write_text_to_file(&marked.to_string(), &args.flag_text_out)
            .chain_err(|| format!("Failed to write maze to text file {}", args.flag_text_out))?;
    } else if args.flag_no_walk {
        println!("{}", map);
    }

    if !args.flag_no_walk {
        let frames = FrameSet::from_directory(&args.flag_views)
            .chain_err(|| format!("Failed to load view frames from {}", args.flag_views))?;
        frames.validate()?;
        walk_maze(&maze_grid, &frames, Walker::new(start, goal))?;
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_directives = if verbose {
        "warn,mazewalk=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Read one command per line from stdin and show the view after each one, until the goal is reached,
/// the player quits or the input ends.
fn walk_maze(maze_grid: &Grid, frames: &FrameSet, mut walker: Walker) -> Result<()> {

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("{}", views::first_person_view(maze_grid, frames, walker.position, walker.facing)?);
    println!("goal: {}", walker.goal);

    loop {
        if walker.has_won() {
            println!("You win");
            break;
        }
        println!("{}", walker);

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        match Command::parse(&line) {
            Some(Command::Quit) => break,
            Some(command) => {
                walker.apply(maze_grid, command);
            }
            None => continue,
        }

        println!("{}", views::first_person_view(maze_grid, frames, walker.position, walker.facing)?);
    }
    Ok(())
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
