use std::fmt;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::grid::Grid;

/// One move typed by the player.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Command {
    Forward,
    TurnLeft,
    TurnRight,
    Quit,
}

impl Command {
    /// `w` forward, `a` turn left, `d` turn right and `q` quit. Anything else is not a command.
    pub fn parse(input: &str) -> Option<Command> {
        match input.trim() {
            "w" | "W" => Some(Command::Forward),
            "a" | "A" => Some(Command::TurnLeft),
            "d" | "D" => Some(Command::TurnRight),
            "q" | "Q" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// The player's place in the maze.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Walker {
    pub position: Cartesian2DCoordinate,
    pub facing: CompassPrimary,
    pub goal: Cartesian2DCoordinate,
}

impl Walker {
    /// A walker at `start` looking east.
    pub fn new(start: Cartesian2DCoordinate, goal: Cartesian2DCoordinate) -> Walker {
        Walker {
            position: start,
            facing: CompassPrimary::East,
            goal,
        }
    }

    /// Carry out `command`, returning whether the walker moved or turned. Walking into a wall does
    /// nothing and quitting is left to the caller.
    pub fn apply(&mut self, grid: &Grid, command: Command) -> bool {
        match command {
            Command::Forward => {
                if !grid.okay_to_move_forward(self.position, self.facing) {
                    return false;
                }
                match grid.linked_neighbour_at_direction(self.position, self.facing) {
                    Some(next) => {
                        self.position = next;
                        true
                    }
                    None => false,
                }
            }
            Command::TurnLeft => {
                self.facing = self.facing.turn_left();
                true
            }
            Command::TurnRight => {
                self.facing = self.facing.turn_right();
                true
            }
            Command::Quit => false,
        }
    }

    pub fn has_won(&self) -> bool {
        self.position == self.goal
    }

    pub fn facing_name(&self) -> &'static str {
        self.facing.name()
    }
}

impl fmt::Display for Walker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "position: {}\nfacing {}", self.position, self.facing_name())
    }
}
