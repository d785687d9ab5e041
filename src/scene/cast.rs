use crate::geometry::{FloatType, Frame, Ray, WorldPoint, WorldVector};

use super::WorldId;

/// Position and orientation of one side of a portal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Anchor {
    pub origin: WorldPoint,
    pub frame: Frame,
}

/// A ray travelling through the world graph.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayCast {
    pub ray: Ray,
    /// World whose scene the ray is currently in.
    pub world: WorldId,
    /// Observer orientation carried along the ray, transformed by every portal it passes.
    pub frame: Option<Frame>,
}

impl RayCast {
    pub fn new(ray: Ray, world: WorldId) -> RayCast {
        RayCast {
            ray,
            world,
            frame: None,
        }
    }

    pub fn with_frame(self, frame: Frame) -> RayCast {
        RayCast {
            frame: Some(frame),
            ..self
        }
    }

    pub fn reflect(&self, normal: &WorldVector) -> RayCast {
        RayCast {
            ray: self.ray.reflect(normal),
            world: self.world,
            frame: self.frame.map(|frame| frame.reflect(normal)),
        }
    }

    /// Mirror the cast about `normal` and restart it from `hit_point`.
    pub fn rebase(&self, hit_point: WorldPoint, normal: &WorldVector) -> RayCast {
        let mut cast = self.reflect(normal);
        cast.ray.origin = hit_point;
        cast
    }

    /// Move the cast from one portal anchor to another, possibly in a different world.
    ///
    /// The cast is mirrored about the surface normal first, then its hit point, direction
    /// and frame are expressed in `source` coordinates and re-expressed in `destination`
    /// coordinates. A destination frame with handedness opposite to `source` makes the
    /// transition seamless.
    pub fn rebase_between(
        &self,
        hit_point: WorldPoint,
        normal: &WorldVector,
        source: &Anchor,
        destination_world: WorldId,
        destination: &Anchor,
    ) -> RayCast {
        let mirrored = self.reflect(normal);
        let transfer = |v: &WorldVector| destination.frame.to_global(&source.frame.to_local(v));

        RayCast {
            ray: Ray::new(
                destination.origin + transfer(&(hit_point - source.origin)),
                transfer(&mirrored.ray.direction),
            ),
            world: destination_world,
            frame: mirrored.frame.map(|frame| {
                destination
                    .frame
                    .frame_to_global(&source.frame.frame_to_local(&frame))
            }),
        }
    }
}

/// Outcome of casting a ray against a shape.
#[derive(Clone, Debug, PartialEq)]
pub enum RayHit {
    /// Nothing was hit, the ray continues to the background.
    Miss,
    /// The ray went through a portal and continues as `cast`.
    Portal {
        cast: RayCast,
        /// Squared distance from the ray origin to the portal surface.
        distance2: FloatType,
    },
    /// The ray stopped at a solid surface.
    Opaque {
        /// Hit point and outward unit normal.
        surface: Ray,
        distance2: FloatType,
    },
}

impl RayHit {
    pub fn is_miss(&self) -> bool {
        matches!(self, RayHit::Miss)
    }

    pub fn distance2(&self) -> Option<FloatType> {
        match self {
            RayHit::Miss => None,
            RayHit::Portal { distance2, .. } | RayHit::Opaque { distance2, .. } => Some(*distance2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{VectorExt as _, test::assert_vectors_close};
    use assert2::assert;

    fn world(index: usize) -> WorldId {
        WorldId::from_usize(index)
    }

    #[test]
    fn rebase_mirrors_frame() {
        let cast = RayCast::new(
            Ray::new(WorldPoint::new(0.0, 5.0, 0.0), -WorldVector::y()),
            world(0),
        )
        .with_frame(Frame::default());
        let rebased = cast.rebase(WorldPoint::origin(), &WorldVector::y());

        assert!(rebased.ray.origin == WorldPoint::origin());
        assert!(rebased.ray.direction == WorldVector::y());
        assert!(rebased.frame.map(|f| f.handedness()) == Some(-1.0));
        assert!(rebased.world == world(0));
    }

    #[test]
    fn rebase_without_frame_stays_without_frame() {
        let cast = RayCast::new(Ray::new(WorldPoint::origin(), WorldVector::z()), world(0));
        assert!(cast.rebase(WorldPoint::origin(), &-WorldVector::z()).frame == None);
    }

    /// Falling through a floor and coming out of a ceiling keeps direction and orientation.
    #[test]
    fn floor_to_ceiling_keeps_momentum() {
        let floor = Anchor {
            origin: WorldPoint::new(0.0, -5.0, 0.0),
            frame: Frame::from_forward(&WorldVector::y()),
        };
        let ceiling_exit = Anchor {
            origin: WorldPoint::new(0.0, 5.0, 0.0),
            frame: floor.frame.reversed(),
        };
        let direction = WorldVector::new(0.3, -1.0, 0.2).unit();
        let observer = Frame::default().rotate(&WorldVector::y(), 0.4);
        let cast = RayCast::new(Ray::new(WorldPoint::new(1.0, 0.0, 2.0), direction), world(0))
            .with_frame(observer);

        let hit_point = WorldPoint::new(1.5, -5.0, 2.5);
        let moved =
            cast.rebase_between(hit_point, &floor.frame.forward, &floor, world(3), &ceiling_exit);

        assert!(moved.world == world(3));
        assert_vectors_close(&moved.ray.origin.coords, &WorldVector::new(1.5, 5.0, 2.5), 1e-12);
        assert_vectors_close(&moved.ray.direction, &direction, 1e-12);
        let frame = moved.frame.unwrap();
        assert_vectors_close(&frame.right, &observer.right, 1e-12);
        assert_vectors_close(&frame.up, &observer.up, 1e-12);
        assert_vectors_close(&frame.forward, &observer.forward, 1e-12);
    }

    #[test]
    fn hit_distances() {
        assert!(RayHit::Miss.distance2() == None);
        assert!(RayHit::Miss.is_miss());
        let opaque = RayHit::Opaque {
            surface: Ray::new(WorldPoint::origin(), WorldVector::y()),
            distance2: 4.0,
        };
        assert!(opaque.distance2() == Some(4.0));
        assert!(!opaque.is_miss());
    }
}
