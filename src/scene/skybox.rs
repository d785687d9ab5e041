use std::f64::consts::{PI, TAU};
use std::path::Path;

use image::RgbImage;

use crate::geometry::{FloatType, WorldVector};
use crate::util::{Color, lerp};

/// Background of a world, sampled by direction.
pub trait Skybox: Send + Sync {
    /// `horizontal` is in [0, 1), `vertical` in [0, 1] going from straight up to straight down.
    fn sample(&self, horizontal: FloatType, vertical: FloatType) -> Color;

    fn sample_direction(&self, direction: &WorldVector) -> Color {
        let (horizontal, vertical) = direction_angles(direction);
        self.sample(horizontal, vertical)
    }
}

/// Maps a unit direction to the skybox sampling coordinates.
pub fn direction_angles(direction: &WorldVector) -> (FloatType, FloatType) {
    let horizontal = (direction.x.atan2(direction.z) / TAU).rem_euclid(1.0);
    // rem_euclid rounds tiny negative values up to exactly 1.
    let horizontal = if horizontal < 1.0 { horizontal } else { 0.0 };
    let vertical = (-direction.y).clamp(-1.0, 1.0).asin() / PI + 0.5;
    (horizontal, vertical)
}

/// Same color in every direction.
#[derive(Copy, Clone, Debug)]
pub struct SolidSkybox(pub Color);

impl Skybox for SolidSkybox {
    fn sample(&self, _horizontal: FloatType, _vertical: FloatType) -> Color {
        self.0
    }
}

/// Vertical gradient: zenith -> horizon -> nadir.
#[derive(Copy, Clone, Debug)]
pub struct GradientSkybox {
    pub zenith: Color,
    pub horizon: Color,
    pub nadir: Color,
}

impl Skybox for GradientSkybox {
    fn sample(&self, _horizontal: FloatType, vertical: FloatType) -> Color {
        if vertical < 0.5 {
            lerp(self.zenith, self.horizon, vertical * 2.0)
        } else {
            lerp(self.horizon, self.nadir, vertical * 2.0 - 1.0)
        }
    }
}

/// Checkerboard in angle space. Makes orientation visible in renders.
#[derive(Copy, Clone, Debug)]
pub struct CheckerSkybox {
    pub even: Color,
    pub odd: Color,
    /// Number of cells around the horizon; vertically there is half as many.
    pub cells: u32,
}

impl Skybox for CheckerSkybox {
    fn sample(&self, horizontal: FloatType, vertical: FloatType) -> Color {
        let cells = self.cells.max(1) as FloatType;
        let x = (horizontal * cells).floor() as i64;
        let y = (vertical * cells / 2.0).floor() as i64;
        if (x + y).rem_euclid(2) == 0 {
            self.even
        } else {
            self.odd
        }
    }
}

/// Equirectangular panorama.
#[derive(Clone, Debug)]
pub struct ImageSkybox {
    image: RgbImage,
}

impl ImageSkybox {
    pub fn new(image: RgbImage) -> ImageSkybox {
        ImageSkybox { image }
    }

    pub fn open(path: impl AsRef<Path>) -> image::ImageResult<ImageSkybox> {
        Ok(Self::new(image::open(path)?.to_rgb8()))
    }
}

impl Skybox for ImageSkybox {
    fn sample(&self, horizontal: FloatType, vertical: FloatType) -> Color {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return Color::new(0.0, 0.0, 0.0);
        }
        let x = ((horizontal * width as FloatType) as i64).clamp(0, width as i64 - 1) as u32;
        let y = ((vertical * height as FloatType) as i64).clamp(0, height as i64 - 1) as u32;
        let [r, g, b] = self.image.get_pixel(x, y).0;
        let scale = 1.0 / 255.0;
        Color::new(r as FloatType * scale, g as FloatType * scale, b as FloatType * scale)
    }
}
