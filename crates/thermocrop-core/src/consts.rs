/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// ITU-R BT.601 luminance coefficient for the red channel.
pub const LUMINANCE_R: f32 = 0.299;

/// ITU-R BT.601 luminance coefficient for the green channel.
pub const LUMINANCE_G: f32 = 0.587;

/// ITU-R BT.601 luminance coefficient for the blue channel.
pub const LUMINANCE_B: f32 = 0.114;

/// Largest 8-bit intensity; the linear calibration divides by this.
pub const MAX_INTENSITY: f64 = 255.0;

/// Number of distinct 8-bit intensity levels (histogram bins).
pub const INTENSITY_LEVELS: usize = 256;

/// Hue values are stored on the 8-bit half-degree scale [0, 180).
pub const HUE_RANGE: f32 = 180.0;

/// Hue of pure blue on the half-degree scale. Anything above is clipped
/// here before inversion (violet tones are palette noise, not heat).
pub const HUE_COLD_LIMIT: f64 = 120.0;

/// Below this many foreground pixels a mask is considered degenerate and the
/// whole region is used instead.
pub const MIN_FOREGROUND_PIXELS: usize = 10;

/// Side length of the square Gaussian kernel applied before thresholding.
pub const DEFAULT_BLUR_KERNEL_SIZE: usize = 5;

/// Contrast-limited equalization clip limit (multiple of the mean bin count).
pub const DEFAULT_CLAHE_CLIP_LIMIT: f32 = 2.0;

/// Contrast-limited equalization tile grid, per axis.
pub const DEFAULT_CLAHE_TILES: usize = 8;

/// Keys cubic convolution parameter (same value as common image libraries).
pub const BICUBIC_A: f64 = -0.75;

/// Default floor on the normalized cross-correlation score of a located crop.
pub const DEFAULT_MIN_MATCH_SCORE: f64 = 0.5;

/// Lowest possible correlation score; as a floor it accepts every location.
pub const MATCH_SCORE_UNCHECKED: f64 = -1.0;

/// Separator between filename tokens.
pub const DEFAULT_TOKEN_DELIMITER: char = '_';

/// Ambient preset assumed when a filename carries no usable tokens.
pub const DEFAULT_AMBIENT_PRESET: &str = "27";

/// Marker written into identity fields that could not be parsed.
pub const UNKNOWN_MARKER: &str = "N/A";

/// Minimum number of positional tokens for a fully parsed filename.
pub const METADATA_TOKEN_COUNT: usize = 5;

/// Leading lines of a matrix file inspected to pick its delimiter.
pub const MATRIX_SNIFF_LINES: usize = 8;
