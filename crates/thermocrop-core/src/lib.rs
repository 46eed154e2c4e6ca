pub mod calibration;
pub mod consts;
pub mod error;
pub mod extract;
pub mod filters;
pub mod frame;
pub mod io;
pub mod metadata;
pub mod pipeline;
pub mod reconstruct;
pub mod registration;
pub mod segmentation;
pub mod session;
pub mod stats;
