mod buffered;
mod machinery;
mod traversal;
mod worker;

use std::sync::Arc;

use assert2::assert;
use bon::bon;
use thiserror::Error;

use crate::geometry::{Frame, WorldPoint};
use crate::scene::{Scene, WorldId};

pub use buffered::BufferedRenderer;
pub use machinery::{SerialRenderer, TileRenderer};
pub use traversal::{ANTI_ALIAS_OFFSETS, primary_ray, render_pixel, render_rows, trace};

/// How a ray that stops on an opaque surface is colored.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Shading {
    /// Portals and mirrors only; opaque hits are shaded by the angle of incidence.
    #[default]
    Skybox,
    /// Opaque surfaces reflect the ray; brightness grows with the total distance travelled.
    MirrorHall,
}

/// Everything needed to render one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderInfo {
    pub world: WorldId,
    pub eye: WorldPoint,
    pub frame: Frame,
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: usize,
    /// Maximum number of portal passes per sample.
    pub cast_limit: u32,
    pub anti_alias: bool,
    pub shading: Shading,
}

#[bon]
impl RenderInfo {
    #[builder]
    pub fn new(
        world: WorldId,
        eye: WorldPoint,
        frame: Frame,
        width: u32,
        height: u32,
        #[builder(default = 3)] bytes_per_pixel: usize,
        cast_limit: u32,
        anti_alias: bool,
        #[builder(default)] shading: Shading,
    ) -> Self {
        assert!(bytes_per_pixel >= 3);

        RenderInfo {
            world,
            eye,
            frame,
            width,
            height,
            bytes_per_pixel,
            cast_limit,
            anti_alias,
            shading,
        }
    }
}

impl RenderInfo {
    pub fn stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel
    }

    /// Checks the info against the scene and the output buffer.
    /// Every portal of the scene must lead to one of its worlds.
    pub fn validate(&self, scene: &Scene, buffer: &PixelBuffer) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyImage);
        }
        if scene.get(self.world).is_none() {
            return Err(RenderError::UnknownWorld(self.world));
        }
        if let Some(target) = scene.dangling_target() {
            return Err(RenderError::UnknownWorld(target));
        }
        let expected = (self.width, self.height, self.bytes_per_pixel);
        let actual = (buffer.width, buffer.height, buffer.bytes_per_pixel);
        if expected != actual {
            return Err(RenderError::BufferMismatch { expected, actual });
        }
        Ok(())
    }
}

/// Row-major image bytes. RGB of each pixel is stored in its first three bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize) -> PixelBuffer {
        PixelBuffer {
            width,
            height,
            bytes_per_pixel,
            pixels: vec![0; width as usize * height as usize * bytes_per_pixel],
        }
    }

    /// Buffer matching the image size of the render info.
    pub fn for_info(info: &RenderInfo) -> PixelBuffer {
        Self::new(info.width, info.height, info.bytes_per_pixel)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    pub fn stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes of rows `start..end`.
    pub fn rows_mut(&mut self, start: u32, end: u32) -> &mut [u8] {
        let stride = self.stride();
        &mut self.pixels[start as usize * stride..end as usize * stride]
    }

    /// RGB of a single pixel.
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let offset = y as usize * self.stride() + x as usize * self.bytes_per_pixel;
        [self.pixels[offset], self.pixels[offset + 1], self.pixels[offset + 2]]
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Image has zero size")]
    EmptyImage,

    #[error("World {0:?} is not part of the scene")]
    UnknownWorld(WorldId),

    #[error("Pixel buffer is {actual:?} (width, height, bytes per pixel), expected {expected:?}")]
    BufferMismatch {
        expected: (u32, u32, usize),
        actual: (u32, u32, usize),
    },

    #[error("Renderer was built for {renderer} rows, the image has {image}")]
    HeightMismatch { renderer: u32, image: u32 },

    #[error("Failed to spawn a render thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Render thread exited unexpectedly")]
    WorkerLost,
}

/// Fills a pixel buffer with a view of the scene.
pub trait Renderer {
    /// Blocks until the whole buffer is written.
    fn render(
        &mut self,
        scene: &Arc<Scene>,
        info: &RenderInfo,
        buffer: &mut PixelBuffer,
    ) -> Result<(), RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(
        &mut self,
        scene: &Arc<Scene>,
        info: &RenderInfo,
        buffer: &mut PixelBuffer,
    ) -> Result<(), RenderError> {
        (**self).render(scene, info, buffer)
    }
}
