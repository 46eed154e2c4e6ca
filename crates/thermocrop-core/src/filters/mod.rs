pub mod clahe;
pub mod gaussian_blur;

pub use clahe::{clahe, ClaheConfig};
pub use gaussian_blur::gaussian_blur;
