use std::path::Path;

use image::{ImageFormat, ImageResult, Rgb, RgbImage};
use tracing::debug;

use crate::cells::Cartesian2DCoordinate;
use crate::grid_displays::{AsciiMap, PATH_GLYPH, WALL_GLYPH};

pub const WALL_COLOUR: Rgb<u8> = Rgb([0, 0, 0]);
pub const PATH_COLOUR: Rgb<u8> = Rgb([0, 0, 0xff]);
pub const FLOOR_COLOUR: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// Rasterize the map at one pixel per map character.
pub fn map_image(map: &AsciiMap) -> RgbImage {
    RgbImage::from_fn(map.columns() as u32, map.rows() as u32, |x, y| {
        match map.glyph(x as usize, y as usize) {
            Some(WALL_GLYPH) => WALL_COLOUR,
            Some(PATH_GLYPH) => PATH_COLOUR,
            _ => FLOOR_COLOUR,
        }
    })
}

/// Write the map as a PNG file, with the path drawn on it if there is one. The given map is not
/// modified.
pub fn save_map_png<P: AsRef<Path>>(map: &AsciiMap,
                                    path: Option<&[Cartesian2DCoordinate]>,
                                    file: P)
                                    -> ImageResult<()> {
    let image = match path {
        Some(path) => {
            let mut marked = map.clone();
            marked.mark_path(path);
            map_image(&marked)
        }
        None => map_image(map),
    };

    image.save_with_format(file.as_ref(), ImageFormat::Png)?;
    debug!(file = %file.as_ref().display(),
           width = image.width(),
           height = image.height(),
           "maze image saved");
    Ok(())
}
