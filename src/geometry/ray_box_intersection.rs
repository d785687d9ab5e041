use crate::geometry::{FloatType, Ray, WorldBox};

pub trait RayIntersectionExt {
    /// Checks whether the line of the ray passes through the box.
    fn overlaps(&self, ray: &Ray) -> bool;
}

impl RayIntersectionExt for WorldBox {
    /// Slab test. Only used to skip shapes, so it may report overlaps that
    /// lie behind the ray origin.
    ///
    /// Zero direction components produce infinite inverse directions; the comparisons
    /// against the resulting infinities (or NaNs) then sort the case out without
    /// special handling.
    fn overlaps(&self, ray: &Ray) -> bool {
        let slab = |origin: FloatType, direction: FloatType, axis: usize| {
            let inv = 1.0 / direction;
            let negative = direction < 0.0;
            let near = (self.bound(negative)[axis] - origin) * inv;
            let far = (self.bound(!negative)[axis] - origin) * inv;
            (near, far)
        };

        let (mut t_min, mut t_max) = slab(ray.origin.x, ray.direction.x, 0);
        let (ty_min, ty_max) = slab(ray.origin.y, ray.direction.y, 1);

        if t_min > ty_max || ty_min > t_max {
            return false;
        }
        if ty_min > t_min {
            t_min = ty_min;
        }
        if ty_max < t_max {
            t_max = ty_max;
        }

        let (tz_min, tz_max) = slab(ray.origin.z, ray.direction.z, 2);

        !(t_min > tz_max || tz_min > t_max)
    }
}
