use crate::camera::view_direction;
use crate::geometry::{FloatType, Ray};
use crate::scene::{RayCast, RayHit, Scene};
use crate::util::{Color, average, color_to_bytes, gray};

use super::{RenderInfo, Shading};

/// Sub-pixel sample positions used with anti-aliasing, in pixels.
pub const ANTI_ALIAS_OFFSETS: [(FloatType, FloatType); 4] =
    [(-0.25, -0.25), (0.25, -0.25), (-0.25, 0.25), (0.25, 0.25)];

/// Ray through the pixel `(x, y)`, shifted by `offset` pixels from the pixel center.
///
/// The vertical field of view spans from -1 to 1 at unit distance, pixel rows go from top to bottom.
pub fn primary_ray(info: &RenderInfo, x: u32, y: u32, offset: (FloatType, FloatType)) -> RayCast {
    let width = info.width as FloatType;
    let height = info.height as FloatType;
    let sx = (2.0 * (x as FloatType + 0.5 + offset.0) / width - 1.0) * width / height;
    let sy = 1.0 - 2.0 * (y as FloatType + 0.5 + offset.1) / height;

    RayCast::new(Ray::new(info.eye, view_direction(&info.frame, sx, sy)), info.world)
}

/// Follows the cast through at most `cast_limit` portals and returns its color.
pub fn trace(scene: &Scene, mut cast: RayCast, cast_limit: u32, shading: Shading) -> Color {
    let mut total_distance2 = 0.0;

    for _ in 0..cast_limit {
        match scene.ray_cast(&cast) {
            RayHit::Miss => break,
            RayHit::Portal { cast: next, distance2 } => {
                total_distance2 += distance2;
                cast = next;
            }
            RayHit::Opaque { surface, distance2 } => match shading {
                Shading::Skybox => return gray(cast.ray.direction.dot(&surface.direction).abs()),
                Shading::MirrorHall => {
                    total_distance2 += distance2;
                    cast = cast.rebase(surface.origin, &surface.direction);
                }
            },
        }
    }

    // Also reached when the limit runs out, then the ray's current world and direction are used.
    match shading {
        Shading::Skybox => scene.world(cast.world).skybox.sample_direction(&cast.ray.direction),
        Shading::MirrorHall => gray(total_distance2 / 1000.0),
    }
}

pub fn render_pixel(scene: &Scene, info: &RenderInfo, x: u32, y: u32) -> Color {
    let sample = |offset| {
        let cast = primary_ray(info, x, y, offset);
        trace(scene, cast, info.cast_limit, info.shading)
    };
    if info.anti_alias {
        average(ANTI_ALIAS_OFFSETS.iter().copied().map(sample))
    } else {
        sample((0.0, 0.0))
    }
}

/// Renders rows `start..end` into `output`, which holds exactly these rows.
/// Bytes past the RGB of each pixel are left untouched.
pub fn render_rows(scene: &Scene, info: &RenderInfo, start: u32, end: u32, output: &mut [u8]) {
    let stride = info.stride();
    debug_assert_eq!(output.len(), (end - start) as usize * stride);

    for (row, y) in output.chunks_exact_mut(stride).zip(start..end) {
        for (pixel, x) in row.chunks_exact_mut(info.bytes_per_pixel).zip(0..info.width) {
            pixel[..3].copy_from_slice(&color_to_bytes(render_pixel(scene, info, x, y)));
        }
    }
}
