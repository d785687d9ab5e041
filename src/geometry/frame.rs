use super::{FloatType, VectorExt as _, WorldVector};

/// Maximal angular speed (radians per second) of the roll correction done by [`Frame::upright`].
pub const UPRIGHT_SPEED: FloatType = 2.0;

/// Orientation given by three vectors.
///
/// The vectors are expected to be unit length and mutually perpendicular. Rotation and
/// reflection keep that; other compositions should finish with [`Frame::orthonormalize`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    pub right: WorldVector,
    pub up: WorldVector,
    pub forward: WorldVector,
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            right: WorldVector::x(),
            up: WorldVector::y(),
            forward: WorldVector::z(),
        }
    }
}

impl Frame {
    pub fn new(right: WorldVector, up: WorldVector, forward: WorldVector) -> Frame {
        Frame { right, up, forward }
    }

    /// Some frame with positive handedness whose forward vector points along `forward`.
    pub fn from_forward(forward: &WorldVector) -> Frame {
        let forward = forward.unit();
        let helper = if forward.y.abs() < 0.9 {
            WorldVector::y()
        } else {
            WorldVector::x()
        };
        let right = helper.flatten(&forward).unit();
        let up = forward.cross(&right);
        Frame { right, up, forward }
    }

    /// The same frame looking the opposite way, with opposite handedness.
    pub fn reversed(&self) -> Frame {
        Frame {
            forward: -self.forward,
            ..*self
        }
    }

    /// Converts a vector expressed in this frame's coordinates to global coordinates.
    pub fn to_global(&self, v: &WorldVector) -> WorldVector {
        self.right * v.x + self.up * v.y + self.forward * v.z
    }

    /// Converts a global vector to coordinates of this frame.
    pub fn to_local(&self, v: &WorldVector) -> WorldVector {
        WorldVector::new(v.dot(&self.right), v.dot(&self.up), v.dot(&self.forward))
    }

    pub fn frame_to_global(&self, frame: &Frame) -> Frame {
        Frame::map(frame, |v| self.to_global(v))
    }

    pub fn frame_to_local(&self, frame: &Frame) -> Frame {
        Frame::map(frame, |v| self.to_local(v))
    }

    pub fn rotate(&self, axis: &WorldVector, angle: FloatType) -> Frame {
        Frame::map(self, |v| v.rotate(axis, angle))
    }

    pub fn reflect(&self, normal: &WorldVector) -> Frame {
        Frame::map(self, |v| v.reflect(normal))
    }

    /// 1 if `(forward x right) . up` is positive, -1 otherwise.
    pub fn handedness(&self) -> FloatType {
        if self.forward.cross(&self.right).dot(&self.up) > 0.0 {
            1.0
        } else {
            -1.0
        }
    }

    /// Makes the frame orthonormal again, keeping forward direction and handedness.
    pub fn orthonormalize(&self) -> Frame {
        let forward = self.forward.unit();
        let right = self.right.flatten(&forward).unit();
        let up = forward.cross(&right) * self.handedness();
        Frame { right, up, forward }
    }

    /// Removes roll: turns `right` around `forward` toward the horizontal plane given by `true_up`.
    /// The turn is limited to `UPRIGHT_SPEED * dt` radians, so repeated calls correct smoothly.
    pub fn upright(&self, dt: FloatType, true_up: &WorldVector) -> Frame {
        let forward = self.forward.unit();
        let right = self.right.flatten(&forward).unit();
        let target = self.right.flatten(true_up).flatten(&forward).unit();

        if target == WorldVector::zeros() {
            // Right is parallel to true up, there is no preferred direction.
            return self.orthonormalize();
        }

        let angle = right.dot(&target).clamp(-1.0, 1.0).acos();
        let max_step = UPRIGHT_SPEED * dt;
        let right = if angle <= max_step {
            target
        } else if right.cross(&target).dot(&forward) >= 0.0 {
            right.rotate(&forward, max_step)
        } else {
            right.rotate(&forward, -max_step)
        };

        let up = forward.cross(&right) * self.handedness();
        Frame { right, up, forward }
    }

    fn map<F: Fn(&WorldVector) -> WorldVector>(frame: &Frame, f: F) -> Frame {
        Frame {
            right: f(&frame.right),
            up: f(&frame.up),
            forward: f(&frame.forward),
        }
    }
}
