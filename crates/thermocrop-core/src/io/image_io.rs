use std::path::Path;

use image::metadata::Orientation;
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader};
use ndarray::Array2;
use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::{ColorFrame, Frame, PixelGrid};

/// Load an image file as an 8-bit grid, rotated upright according to its
/// EXIF orientation.
///
/// An unreadable orientation tag is not an error: it is logged and the image
/// is used as stored.
pub fn load_image(path: &Path) -> Result<PixelGrid> {
    let mut decoder = ImageReader::open(path)?
        .with_guessed_format()?
        .into_decoder()?;

    let orientation = match decoder.orientation() {
        Ok(o) => o,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Unreadable EXIF orientation, using image as stored"
            );
            Orientation::NoTransforms
        }
    };

    let mut img = DynamicImage::from_decoder(decoder)?;
    if orientation != Orientation::NoTransforms {
        debug!(path = %path.display(), ?orientation, "Applying EXIF orientation");
        img.apply_orientation(orientation);
    }

    Ok(grid_from_dynamic(&img))
}

/// Convert a decoded image into a gray or RGB grid depending on its channels.
pub fn grid_from_dynamic(img: &DynamicImage) -> PixelGrid {
    match img.color() {
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
            let gray = img.to_luma8();
            let (w, h) = gray.dimensions();
            let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
                gray.get_pixel(col as u32, row as u32).0[0]
            });
            PixelGrid::Gray(Frame::new(data))
        }
        _ => {
            let rgb = img.to_rgb8();
            let (w, h) = rgb.dimensions();
            let (h, w) = (h as usize, w as usize);
            let mut red = Array2::<u8>::zeros((h, w));
            let mut green = Array2::<u8>::zeros((h, w));
            let mut blue = Array2::<u8>::zeros((h, w));

            for (col, row, pixel) in rgb.enumerate_pixels() {
                let (row, col) = (row as usize, col as usize);
                red[[row, col]] = pixel.0[0];
                green[[row, col]] = pixel.0[1];
                blue[[row, col]] = pixel.0[2];
            }

            PixelGrid::Color(ColorFrame {
                red: Frame::new(red),
                green: Frame::new(green),
                blue: Frame::new(blue),
            })
        }
    }
}
