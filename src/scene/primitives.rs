use crate::geometry::{CAST_EPSILON, FloatType, Frame, Ray, WorldPoint, WorldVector};

use super::{Anchor, RayCast, RayHit, Shape, WorldId};

/// Where a sphere portal leads: rays come out of the surface of another sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SphereTarget {
    pub world: WorldId,
    pub center: WorldPoint,
    pub radius: FloatType,
}

/// Sphere that is only visible from outside.
///
/// Without a target the sphere is a mirror; with a target it reflects the target world.
#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: WorldPoint,
    pub radius: FloatType,
    target: Option<SphereTarget>,
    opaque: bool,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType) -> Sphere {
        Sphere {
            center,
            radius,
            target: None,
            opaque: false,
        }
    }

    pub fn with_target(mut self, target: SphereTarget) -> Sphere {
        self.set_target(target);
        self
    }

    /// Makes the sphere report opaque hits instead of acting as a portal.
    pub fn opaque(mut self) -> Sphere {
        self.opaque = true;
        self
    }

    pub fn set_target(&mut self, target: SphereTarget) {
        self.target = Some(target);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<&SphereTarget> {
        self.target.as_ref()
    }

    pub fn normal_at(&self, point: &WorldPoint) -> WorldVector {
        (point - self.center) / self.radius
    }

    fn hit_at(&self, cast: &RayCast, t: FloatType) -> RayHit {
        let ray = &cast.ray;
        let location = ray.point_at(t);
        let normal = self.normal_at(&location);

        // Back faces are invisible, otherwise a ray rebased onto the surface could get stuck inside.
        if normal.dot(&ray.direction) >= 0.0 {
            return RayHit::Miss;
        }

        let distance2 = (location - ray.origin).norm_squared();

        if self.opaque {
            return RayHit::Opaque {
                surface: Ray::new(location, normal),
                distance2,
            };
        }

        let mut new_cast = cast.rebase(location, &normal);
        if let Some(target) = &self.target {
            new_cast.world = target.world;
            new_cast.ray.origin = target.center + normal * target.radius;
        }
        RayHit::Portal {
            cast: new_cast,
            distance2,
        }
    }
}

impl Shape for Sphere {
    fn ray_cast(&self, cast: &RayCast) -> RayHit {
        let ray = &cast.ray;
        let oc = ray.origin - self.center;
        let a = ray.direction.norm_squared();
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.norm_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return RayHit::Miss;
        }

        let sqrt_disc = discriminant.sqrt();
        let denominator = 1.0 / (2.0 * a);
        let t_near = (-b - sqrt_disc) * denominator;
        let t_far = (-b + sqrt_disc) * denominator;

        if t_near > CAST_EPSILON {
            self.hit_at(cast, t_near)
        } else if t_far > CAST_EPSILON {
            self.hit_at(cast, t_far)
        } else {
            RayHit::Miss
        }
    }
}

/// Where a plane portal leads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneTarget {
    pub world: WorldId,
    /// Exit anchor. Its frame should have the opposite handedness of the plane's frame
    /// for the passage to be seamless (see [`Frame::reversed`]).
    pub anchor: Anchor,
}

/// One sided infinite plane, visible only from the side its normal points to.
#[derive(Clone, Debug)]
pub struct Plane {
    anchor: Anchor,
    target: Option<PlaneTarget>,
    opaque: bool,
}

impl Plane {
    pub fn new(origin: WorldPoint, normal: WorldVector) -> Plane {
        Self::with_frame(origin, Frame::from_forward(&normal))
    }

    /// Plane through `origin` whose normal is `frame.forward`.
    pub fn with_frame(origin: WorldPoint, frame: Frame) -> Plane {
        Plane {
            anchor: Anchor { origin, frame },
            target: None,
            opaque: false,
        }
    }

    pub fn with_target(mut self, target: PlaneTarget) -> Plane {
        self.set_target(target);
        self
    }

    /// Makes the plane report opaque hits instead of acting as a portal.
    pub fn opaque(mut self) -> Plane {
        self.opaque = true;
        self
    }

    pub fn set_target(&mut self, target: PlaneTarget) {
        self.target = Some(target);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    pub fn target(&self) -> Option<&PlaneTarget> {
        self.target.as_ref()
    }

    pub fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    pub fn normal(&self) -> &WorldVector {
        &self.anchor.frame.forward
    }
}

impl Shape for Plane {
    fn ray_cast(&self, cast: &RayCast) -> RayHit {
        let ray = &cast.ray;
        let normal = self.normal();
        let facing = ray.direction.dot(normal);
        if facing > 0.0 {
            return RayHit::Miss;
        }

        let t = (self.anchor.origin - ray.origin).dot(normal) / facing;
        // Rays parallel to the plane give infinite or NaN t.
        if !(t > CAST_EPSILON && t.is_finite()) {
            return RayHit::Miss;
        }

        let hit_point = ray.point_at(t);
        let distance2 = (hit_point - ray.origin).norm_squared();

        if self.opaque {
            return RayHit::Opaque {
                surface: Ray::new(hit_point, *normal),
                distance2,
            };
        }

        let new_cast = match &self.target {
            None => cast.rebase(hit_point, normal),
            Some(target) => {
                cast.rebase_between(hit_point, normal, &self.anchor, target.world, &target.anchor)
            }
        };
        RayHit::Portal {
            cast: new_cast,
            distance2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{VectorExt as _, test::assert_vectors_close};
    use assert2::assert;
    use test_case::test_case;

    fn world(index: usize) -> WorldId {
        WorldId::from_usize(index)
    }

    fn cast(origin: [f64; 3], direction: [f64; 3]) -> RayCast {
        RayCast::new(
            Ray::new(origin.into(), WorldVector::from(direction).unit()),
            world(0),
        )
    }

    fn unit_sphere() -> Sphere {
        Sphere::new(WorldPoint::origin(), 1.0)
    }

    #[test]
    fn sphere_direct_hit() {
        let hit = unit_sphere().ray_cast(&cast([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]));
        let RayHit::Portal { cast, distance2 } = hit else {
            panic!("We should have a hit!");
        };
        assert!(cast.ray.origin == WorldPoint::new(0.0, 0.0, -1.0));
        assert!(cast.ray.direction == WorldVector::new(0.0, 0.0, -1.0));
        assert!((distance2 - 16.0).abs() < 1e-9);
    }

    #[test]
    fn sphere_opaque_reports_normal() {
        let hit = unit_sphere()
            .opaque()
            .ray_cast(&cast([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]));
        let RayHit::Opaque { surface, distance2 } = hit else {
            panic!("We should have an opaque hit!");
        };
        assert!(surface.origin == WorldPoint::new(0.0, 0.0, -1.0));
        assert!(surface.direction == WorldVector::new(0.0, 0.0, -1.0));
        assert!((distance2 - 16.0).abs() < 1e-9);
    }

    #[test_case([0.0, 0.0, -5.0], [0.0, 0.0, -1.0] ; "pointing_away")]
    #[test_case([0.0, 1.01, -5.0], [0.0, 0.0, 1.0] ; "narrow_miss")]
    #[test_case([0.0, 0.0, 0.0], [0.3, 0.2, 1.0] ; "from_inside")]
    #[test_case([0.0, 0.0, -1.0], [0.0, 0.0, -1.0] ; "leaving_surface")]
    fn sphere_misses(origin: [f64; 3], direction: [f64; 3]) {
        assert!(unit_sphere().ray_cast(&cast(origin, direction)) == RayHit::Miss);
    }

    #[test]
    fn sphere_grazing_hit() {
        let hit = unit_sphere().ray_cast(&cast([0.999, 0.0, -5.0], [0.0, 0.0, 1.0]));
        assert!(!hit.is_miss());
    }

    #[test]
    fn sphere_target_moves_origin() {
        let target = SphereTarget {
            world: world(7),
            center: WorldPoint::new(10.0, 0.0, 0.0),
            radius: 2.0,
        };
        let hit = unit_sphere()
            .with_target(target)
            .ray_cast(&cast([0.0, 0.0, -5.0], [0.0, 0.0, 1.0]));
        let RayHit::Portal { cast, .. } = hit else {
            panic!("We should have a hit!");
        };
        assert!(cast.world == world(7));
        assert!(cast.ray.origin == WorldPoint::new(10.0, 0.0, -2.0));
        assert!(cast.ray.direction == WorldVector::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn sphere_target_can_be_cleared() {
        let mut sphere = unit_sphere().with_target(SphereTarget {
            world: world(1),
            center: WorldPoint::origin(),
            radius: 1.0,
        });
        assert!(sphere.target().is_some());
        sphere.clear_target();
        assert!(sphere.target().is_none());
    }

    #[test]
    fn plane_hit() {
        let plane = Plane::new(WorldPoint::origin(), WorldVector::y());
        let hit = plane.ray_cast(&cast([0.0, 5.0, 0.0], [0.0, -1.0, 0.0]));
        let RayHit::Portal { cast, distance2 } = hit else {
            panic!("We should have a hit!");
        };
        assert!(cast.ray.origin == WorldPoint::origin());
        assert!(cast.ray.direction == WorldVector::y());
        assert!((distance2 - 25.0).abs() < 1e-9);
    }

    #[test_case([0.0, 5.0, 0.0], [0.0, 1.0, 0.0] ; "wrong_side")]
    #[test_case([0.0, -5.0, 0.0], [0.0, 1.0, 0.0] ; "from_behind")]
    #[test_case([0.0, 5.0, 0.0], [1.0, 0.0, 0.0] ; "parallel")]
    #[test_case([0.0, 0.0, 0.0], [0.0, -1.0, 0.0] ; "on_surface")]
    fn plane_misses(origin: [f64; 3], direction: [f64; 3]) {
        let plane = Plane::new(WorldPoint::origin(), WorldVector::y());
        assert!(plane.ray_cast(&cast(origin, direction)) == RayHit::Miss);
    }

    /// Going through a portal and straight back returns the ray to where it entered.
    #[test]
    fn plane_portal_round_trip() {
        let entry_frame = Frame::from_forward(&WorldVector::y());
        let exit_origin = WorldPoint::new(10.0, 0.0, 0.0);
        let entry = Plane::with_frame(WorldPoint::origin(), entry_frame).with_target(PlaneTarget {
            world: world(1),
            anchor: Anchor {
                origin: exit_origin,
                frame: entry_frame.reversed(),
            },
        });
        let back = Plane::with_frame(exit_origin, entry_frame.reversed()).with_target(PlaneTarget {
            world: world(0),
            anchor: Anchor {
                origin: WorldPoint::origin(),
                frame: entry_frame,
            },
        });

        let observer = Frame::default().rotate(&WorldVector::x(), 0.3);
        let start = cast([1.0, 5.0, 2.0], [0.3, -1.0, 0.2]).with_frame(observer);
        let RayHit::Portal { cast: through, .. } = entry.ray_cast(&start) else {
            panic!("Entry portal should be hit");
        };
        assert!(through.world == world(1));

        let reversed = RayCast {
            ray: Ray::new(
                through.ray.point_at(3.0),
                -through.ray.direction,
            ),
            ..through
        };
        let RayHit::Portal { cast: returned, .. } = back.ray_cast(&reversed) else {
            panic!("Exit portal should be hit from the other side");
        };

        let entry_point = start.ray.point_at(5.0 / (-start.ray.direction.y));
        assert!(returned.world == world(0));
        assert_vectors_close(&returned.ray.origin.coords, &entry_point.coords, 1e-9);
        assert_vectors_close(&-returned.ray.direction, &start.ray.direction, 1e-9);
        let frame = returned.frame.unwrap();
        assert_vectors_close(&frame.right, &observer.right, 1e-9);
        assert_vectors_close(&frame.up, &observer.up, 1e-9);
        assert_vectors_close(&frame.forward, &observer.forward, 1e-9);
    }

    #[test]
    fn plane_without_target_mirrors() {
        let plane = Plane::new(WorldPoint::origin(), WorldVector::y());
        let hit = plane.ray_cast(&cast([0.0, 1.0, -1.0], [0.0, -1.0, 1.0]));
        let RayHit::Portal { cast, .. } = hit else {
            panic!("We should have a hit!");
        };
        assert_vectors_close(&cast.ray.direction, &WorldVector::new(0.0, 1.0, 1.0).unit(), 1e-12);
        assert!(cast.world == world(0));
    }
}
