use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::grid::Grid;
use crate::utils::{self, FnvHashMap};

/// How many cells ahead of the walker can be seen, counting the cell they stand in as distance 0.
pub const MAX_VIEW_DEPTH: usize = 4;

/// Overlay glyph that lets the layer underneath show through.
pub const TRANSPARENT_GLYPH: char = ' ';

/// Overlay glyph that blanks out whatever the layer underneath drew.
pub const CLEAR_GLYPH: char = 'x';

/// A rectangular block of characters, one visual layer of the first person view.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ViewFrame {
    width: usize,
    height: usize,
    glyphs: Vec<char>,
}

impl ViewFrame {

    /// A frame of the given size that draws nothing.
    pub fn blank(width: usize, height: usize) -> ViewFrame {
        ViewFrame {
            width,
            height,
            glyphs: vec![TRANSPARENT_GLYPH; width * height],
        }
    }

    /// Build a frame from lines of text. Short lines are padded to the longest one with the
    /// transparent glyph so the frame is always rectangular.
    pub fn parse(text: &str) -> ViewFrame {
        let lines: Vec<Vec<char>> = text.lines().map(|line| line.chars().collect()).collect();
        let width = lines.iter().map(|line| line.len()).max().unwrap_or(0);
        let height = lines.len();

        let mut glyphs = Vec::with_capacity(width * height);
        for line in &lines {
            glyphs.extend(line.iter().cloned());
            glyphs.extend((line.len()..width).map(|_| TRANSPARENT_GLYPH));
        }

        ViewFrame { width, height, glyphs }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn glyph(&self, column: usize, row: usize) -> Option<char> {
        if column < self.width && row < self.height {
            Some(self.glyphs[row * self.width + column])
        } else {
            None
        }
    }

    /// The frame one row of text at a time, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        // chunks panics on a zero chunk size
        self.glyphs
            .chunks(self.width.max(1))
            .take(self.height)
            .map(|row| row.iter().collect::<String>())
    }
}

impl fmt::Display for ViewFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.rows().join("\n"))
    }
}

#[derive(Debug)]
pub enum ViewError {
    FrameDimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    MissingFrame(String),
    /// Two frame files in one directory gave the same frame name.
    DuplicateFrame(String),
    EmptyFrameFile(PathBuf),
    Io(io::Error),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ViewError::FrameDimensionMismatch { expected, found } => {
                write!(f,
                       "view frame is {}x{} but the other frames are {}x{}",
                       found.0,
                       found.1,
                       expected.0,
                       expected.1)
            }
            ViewError::MissingFrame(ref name) => write!(f, "no view frame named '{}'", name),
            ViewError::DuplicateFrame(ref name) => write!(f, "more than one view frame named '{}'", name),
            ViewError::EmptyFrameFile(ref path) => {
                write!(f, "view frame file {} has no frame name line", path.display())
            }
            ViewError::Io(ref e) => write!(f, "failed to read view frames: {}", e),
        }
    }
}

impl Error for ViewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            ViewError::Io(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ViewError {
    fn from(e: io::Error) -> ViewError {
        ViewError::Io(e)
    }
}

/// Merge `overlay` on top of `base`, character by character.
///
/// Where the overlay has the transparent glyph the base shows through, where it has the clear glyph the
/// result is blank, and any other overlay glyph replaces the base glyph.
pub fn overlay(base: &ViewFrame, overlay: &ViewFrame) -> Result<ViewFrame, ViewError> {
    if base.dimensions() != overlay.dimensions() {
        return Err(ViewError::FrameDimensionMismatch {
            expected: base.dimensions(),
            found: overlay.dimensions(),
        });
    }

    let glyphs = base.glyphs
        .iter()
        .zip(overlay.glyphs.iter())
        .map(|(&under, &over)| match over {
            TRANSPARENT_GLYPH => under,
            CLEAR_GLYPH => TRANSPARENT_GLYPH,
            _ => over,
        })
        .collect();

    Ok(ViewFrame {
        width: base.width,
        height: base.height,
        glyphs,
    })
}

/// One named layer of the first person view. Distances count cells ahead of the walker, 0 being the
/// cell they stand in.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum ViewLayer {
    Base,
    /// A wall closing off the corridor at the far side of the cell at this distance.
    Wall(u8),
    /// A passage opening to the walker's left at this distance.
    OpenLeft(u8),
    OpenRight(u8),
}

impl ViewLayer {
    /// Every layer a complete frame set has to provide.
    pub fn all() -> Vec<ViewLayer> {
        let depths = 0..MAX_VIEW_DEPTH as u8;
        let walls = depths.clone().map(ViewLayer::Wall);
        let lefts = depths.clone().map(ViewLayer::OpenLeft);
        let rights = depths.map(ViewLayer::OpenRight);
        Some(ViewLayer::Base).into_iter().chain(walls).chain(lefts).chain(rights).collect()
    }
}

impl fmt::Display for ViewLayer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ViewLayer::Base => write!(f, "base"),
            ViewLayer::Wall(d) => write!(f, "wall{}", d),
            ViewLayer::OpenLeft(d) => write!(f, "open{}l", d),
            ViewLayer::OpenRight(d) => write!(f, "open{}r", d),
        }
    }
}

/// Source of the named view frames.
pub trait FrameProvider {
    fn frame(&self, name: &str) -> Option<&ViewFrame>;
}

/// The table of view frames for a session, keyed by name. Loaded once, then only read.
#[derive(Clone, Debug, Default)]
pub struct FrameSet {
    frames: FnvHashMap<String, ViewFrame>,
}

impl FrameSet {
    pub fn new() -> FrameSet {
        FrameSet { frames: utils::fnv_hashmap(ViewLayer::all().len()) }
    }

    /// Load every regular file in `directory` as one frame. The first line of a file names the frame
    /// and the remaining lines are the frame itself. Each name may appear in only one file.
    pub fn from_directory<P: AsRef<Path>>(directory: P) -> Result<FrameSet, ViewError> {
        let directory = directory.as_ref();
        let mut paths = Vec::new();
        for entry in fs::read_dir(directory)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut frame_set = FrameSet::new();
        for path in paths {
            let text = fs::read_to_string(&path)?;
            let (name, frame_text) = match text.split_once('\n') {
                Some((first_line, rest)) => (first_line.trim(), rest),
                None => (text.trim(), ""),
            };
            if name.is_empty() {
                return Err(ViewError::EmptyFrameFile(path));
            }

            let frame = ViewFrame::parse(frame_text);
            trace!(frame = name, width = frame.width(), height = frame.height(), path = %path.display(), "view frame read");
            if frame_set.insert(name, frame).is_some() {
                return Err(ViewError::DuplicateFrame(name.to_string()));
            }
        }

        debug!(frames = frame_set.len(), directory = %directory.display(), "view frames loaded");
        Ok(frame_set)
    }

    /// Add or replace a frame, returning the one it replaced.
    pub fn insert<S: Into<String>>(&mut self, name: S, frame: ViewFrame) -> Option<ViewFrame> {
        self.frames.insert(name.into(), frame)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Names of all the frames the first person view can ask for.
    pub fn required_names() -> Vec<String> {
        ViewLayer::all().iter().map(|layer| layer.to_string()).collect()
    }

    /// Check that every required frame is present and that they all have the dimensions of `base`.
    pub fn validate(&self) -> Result<(), ViewError> {
        let base_name = ViewLayer::Base.to_string();
        let base = self.frames.get(&base_name).ok_or(ViewError::MissingFrame(base_name))?;

        for name in FrameSet::required_names() {
            let frame = self.frames.get(&name).ok_or(ViewError::MissingFrame(name))?;
            if frame.dimensions() != base.dimensions() {
                return Err(ViewError::FrameDimensionMismatch {
                    expected: base.dimensions(),
                    found: frame.dimensions(),
                });
            }
        }
        Ok(())
    }
}

impl FrameProvider for FrameSet {
    fn frame(&self, name: &str) -> Option<&ViewFrame> {
        self.frames.get(name)
    }
}

/// Choose the layers that make up the view from `position` looking towards `facing`.
///
/// Looks ahead cell by cell, up to `MAX_VIEW_DEPTH` cells, stopping at the first cell whose way forward
/// is walled. If the walk stopped short of the maximum depth a wall layer is drawn at that distance.
/// Side openings are drawn for every distance up to the last one scanned, capped at the deepest
/// distance the frame set has layers for.
pub fn view_layers(grid: &Grid, position: Cartesian2DCoordinate, facing: CompassPrimary) -> Vec<ViewLayer> {
    let (left, right) = (facing.turn_left(), facing.turn_right());

    let mut side_openings = Vec::with_capacity(MAX_VIEW_DEPTH + 1);
    let mut current = position;
    let mut last_distance = 0;

    for distance in 0..=MAX_VIEW_DEPTH {
        last_distance = distance;
        side_openings.push((!grid.is_blocked(current, left), !grid.is_blocked(current, right)));

        if distance == MAX_VIEW_DEPTH {
            break;
        }
        match grid.linked_neighbour_at_direction(current, facing) {
            Some(next) => current = next,
            None => break,
        }
    }

    let mut layers = vec![ViewLayer::Base];
    if last_distance < MAX_VIEW_DEPTH {
        layers.push(ViewLayer::Wall(last_distance as u8));
    }

    let drawn_depth = last_distance.min(MAX_VIEW_DEPTH - 1);
    for (distance, &(left_open, right_open)) in side_openings.iter().enumerate().take(drawn_depth + 1) {
        if left_open {
            layers.push(ViewLayer::OpenLeft(distance as u8));
        }
        if right_open {
            layers.push(ViewLayer::OpenRight(distance as u8));
        }
    }
    layers
}

/// Overlay the frames for `layers` in order, the first layer being the bottom one.
pub fn compose<P: FrameProvider + ?Sized>(frames: &P, layers: &[ViewLayer]) -> Result<ViewFrame, ViewError> {
    let lookup = |layer: &ViewLayer| {
        let name = layer.to_string();
        frames.frame(&name).ok_or(ViewError::MissingFrame(name))
    };

    let (bottom, rest) = match layers.split_first() {
        Some(split) => split,
        None => return Err(ViewError::MissingFrame(ViewLayer::Base.to_string())),
    };

    let mut view = lookup(bottom)?.clone();
    for layer in rest {
        view = overlay(&view, lookup(layer)?)?;
    }
    Ok(view)
}

/// The composed first person view from `position` looking towards `facing`.
pub fn first_person_view<P: FrameProvider + ?Sized>(grid: &Grid,
                                                     frames: &P,
                                                     position: Cartesian2DCoordinate,
                                                     facing: CompassPrimary)
                                                     -> Result<ViewFrame, ViewError> {
    compose(frames, &view_layers(grid, position, facing))
}
