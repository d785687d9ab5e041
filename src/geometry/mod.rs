mod aabb;
mod frame;
mod ray_box_intersection;

pub use aabb::WorldBox;
pub use frame::{Frame, UPRIGHT_SPEED};
pub use ray_box_intersection::RayIntersectionExt;

pub type FloatType = f64;
pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;

/// Smallest ray parameter that still counts as a hit.
/// A ray that was just rebased onto a surface must not hit that same surface again.
pub const CAST_EPSILON: FloatType = 0.001;

/// Vector operations used by the portal math that nalgebra doesn't provide directly.
pub trait VectorExt {
    /// Unit vector in the same direction. Zero vector is returned unchanged.
    fn unit(&self) -> Self;

    /// Mirror the vector about a plane with the given unit normal.
    fn reflect(&self, normal: &Self) -> Self;

    /// Remove the component along the given unit normal.
    fn flatten(&self, normal: &Self) -> Self;

    /// Rotate around a unit axis by `angle` radians (Rodrigues' formula).
    fn rotate(&self, axis: &Self, angle: FloatType) -> Self;
}

impl VectorExt for WorldVector {
    fn unit(&self) -> Self {
        let length = self.norm();
        if length == 0.0 { *self } else { self / length }
    }

    fn reflect(&self, normal: &Self) -> Self {
        self - normal * (2.0 * self.dot(normal))
    }

    fn flatten(&self, normal: &Self) -> Self {
        self - normal * self.dot(normal)
    }

    fn rotate(&self, axis: &Self, angle: FloatType) -> Self {
        let (sin, cos) = angle.sin_cos();
        self * cos + axis.cross(self) * sin + axis * ((1.0 - cos) * axis.dot(self))
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Direction of the ray, expected to be unit length by the intersection code.
    pub direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray { origin, direction }
    }

    pub fn point_at(&self, t: FloatType) -> WorldPoint {
        self.origin + self.direction * t
    }

    pub fn reflect(&self, normal: &WorldVector) -> Ray {
        Ray::new(self.origin, self.direction.reflect(normal))
    }
}
