pub mod render;

pub use render::{SurfaceRenderer, SurfaceView};
