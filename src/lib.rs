pub mod camera;
pub mod config;
pub mod geometry;
pub mod renderer;
pub mod scene;
pub mod util;

pub use camera::Camera;
pub use config::RenderConfig;
pub use renderer::{
    BufferedRenderer, PixelBuffer, RenderError, RenderInfo, Renderer, SerialRenderer, Shading,
    TileRenderer,
};
pub use scene::{Scene, WorldId};
