pub mod crop;
pub mod image_io;

pub use crop::{crop_color, crop_frame, crop_grid, CropRect};
pub use image_io::load_image;
