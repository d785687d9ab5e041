use crate::geometry::{
    FloatType, RayIntersectionExt as _, VectorExt as _, WorldBox, WorldPoint, WorldVector,
};

use super::{RayCast, RayHit, SceneNode, Shape};

/// Skips the child shape for rays that don't pass through the box.
/// Purely an optimization, never changes the result.
#[derive(Clone, Debug)]
pub struct BoundingBox {
    pub bounds: WorldBox,
    pub child: Box<SceneNode>,
}

impl BoundingBox {
    pub fn new(min: WorldPoint, max: WorldPoint, child: impl Into<SceneNode>) -> BoundingBox {
        BoundingBox {
            bounds: WorldBox::new(min, max),
            child: Box::new(child.into()),
        }
    }
}

impl Shape for BoundingBox {
    fn ray_cast(&self, cast: &RayCast) -> RayHit {
        if self.bounds.overlaps(&cast.ray) {
            self.child.ray_cast(cast)
        } else {
            RayHit::Miss
        }
    }
}

/// Union of shapes, tested one after another.
#[derive(Clone, Debug, Default)]
pub struct LinearCompound {
    pub children: Vec<SceneNode>,
}

impl LinearCompound {
    pub fn new(children: Vec<SceneNode>) -> LinearCompound {
        LinearCompound { children }
    }

    pub fn push(&mut self, child: impl Into<SceneNode>) {
        self.children.push(child.into());
    }
}

impl<T: Into<SceneNode>> FromIterator<T> for LinearCompound {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        LinearCompound::new(iter.into_iter().map(Into::into).collect())
    }
}

impl Shape for LinearCompound {
    /// Returns the nearest hit, earlier children win ties.
    fn ray_cast(&self, cast: &RayCast) -> RayHit {
        let mut best = RayHit::Miss;
        let mut best_distance2 = FloatType::INFINITY;

        for child in &self.children {
            let hit = child.ray_cast(cast);
            if let Some(distance2) = hit.distance2() {
                if distance2 < best_distance2 {
                    best_distance2 = distance2;
                    best = hit;
                }
            }
        }

        best
    }
}

/// Ripples the normals of opaque surfaces of the child shape.
///
/// The distortion depends only on the hit position, not on time.
#[derive(Clone, Debug)]
pub struct Waves {
    /// Spatial frequency and direction of the ripples.
    pub velocity: WorldVector,
    /// `amplitude * velocity.unit()`
    velocity_hat: WorldVector,
    pub child: Box<SceneNode>,
}

impl Waves {
    pub fn new(amplitude: FloatType, velocity: WorldVector, child: impl Into<SceneNode>) -> Waves {
        Waves {
            velocity,
            velocity_hat: velocity.unit() * amplitude,
            child: Box::new(child.into()),
        }
    }

    pub fn amplitude(&self) -> FloatType {
        self.velocity_hat.norm()
    }

    /// Replaces the ripple velocity, keeping the amplitude.
    pub fn set_velocity(&mut self, velocity: WorldVector) {
        self.velocity_hat = velocity.unit() * self.amplitude();
        self.velocity = velocity;
    }
}

impl Shape for Waves {
    fn ray_cast(&self, cast: &RayCast) -> RayHit {
        match self.child.ray_cast(cast) {
            RayHit::Opaque {
                mut surface,
                distance2,
            } => {
                let phase = self.velocity.dot(&surface.origin.coords);
                surface.direction = (surface.direction + self.velocity_hat * phase.sin()).unit();
                RayHit::Opaque { surface, distance2 }
            }
            other => other,
        }
    }
}
