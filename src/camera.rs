use assert2::assert;
use bon::bon;

use crate::geometry::{
    CAST_EPSILON, FloatType, Frame, Ray, VectorExt as _, WorldPoint, WorldVector,
};
use crate::renderer::RenderError;
use crate::scene::{RayCast, RayHit, Scene, Shape as _, WorldId};

/// Maximal number of portals passed during a single [`Camera::travel`].
pub const MAX_TRAVEL_HOPS: usize = 5;

/// Direction through normalized screen coordinates, `sx` going right and `sy` going up.
pub fn view_direction(frame: &Frame, sx: FloatType, sy: FloatType) -> WorldVector {
    (frame.forward + frame.right * sx + frame.up * sy).unit()
}

/// Observer moving through the world graph.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub world: WorldId,
    pub eye: WorldPoint,
    pub frame: Frame,
    /// Direction that [`Camera::upright`] turns the frame's up vector towards.
    pub true_up: WorldVector,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        world: WorldId,
        eye: WorldPoint,
        #[builder(default)] frame: Frame,
        #[builder(default = WorldVector::y())] true_up: WorldVector,
    ) -> Self {
        assert!(true_up.norm_squared() > 0.0, "True up must be non-zero");

        Camera {
            world,
            eye,
            frame,
            true_up: true_up.unit(),
        }
    }
}

impl Camera {
    /// Moves the eye by `displacement`, passing through portals on the way.
    ///
    /// After each portal the rest of the movement continues along the rebased direction,
    /// with the camera adopting the rebased frame and world.
    /// Opaque surfaces stop the movement just before them.
    /// Returns the number of portals passed.
    pub fn travel(
        &mut self,
        scene: &Scene,
        displacement: &WorldVector,
    ) -> Result<usize, RenderError> {
        let mut remaining = *displacement;
        let mut hops = 0;

        while hops < MAX_TRAVEL_HOPS && remaining.norm_squared() > 0.0 {
            let world = scene
                .get(self.world)
                .ok_or(RenderError::UnknownWorld(self.world))?;
            let length = remaining.norm();
            let cast = RayCast::new(Ray::new(self.eye, remaining / length), self.world)
                .with_frame(self.frame);

            match world.root.ray_cast(&cast) {
                RayHit::Miss => break,
                RayHit::Portal { cast, distance2 } => {
                    let distance = distance2.sqrt();
                    if distance > length {
                        break;
                    }
                    if scene.get(cast.world).is_none() {
                        return Err(RenderError::UnknownWorld(cast.world));
                    }
                    self.eye = cast.ray.origin;
                    self.world = cast.world;
                    if let Some(frame) = cast.frame {
                        self.frame = frame;
                    }
                    remaining = cast.ray.direction * (length - distance);
                    hops += 1;
                }
                RayHit::Opaque { distance2, .. } => {
                    let distance = distance2.sqrt();
                    if distance > length {
                        break;
                    }
                    remaining = cast.ray.direction * (distance - CAST_EPSILON).max(0.0);
                    break;
                }
            }
        }

        self.eye += remaining;
        Ok(hops)
    }

    /// Mouse look: yaw around the true up and pitch around the frame's right vector.
    ///
    /// Both are flipped in mirrored frames and yaw is flipped when upside down,
    /// so that the view always follows the mouse.
    pub fn look(&mut self, yaw: FloatType, pitch: FloatType) {
        let handedness = self.frame.handedness();
        // Level counts as upside down.
        let orientation = if self.frame.up.dot(&self.true_up) > 0.0 {
            1.0
        } else {
            -1.0
        };
        let yawed = self.frame.rotate(&self.true_up, orientation * handedness * yaw);
        self.frame = yawed.rotate(&yawed.right, handedness * pitch);
    }

    /// Gradually removes roll, see [`Frame::upright`].
    pub fn upright(&mut self, dt: FloatType) {
        self.frame = self.frame.upright(dt, &self.true_up);
    }
}
