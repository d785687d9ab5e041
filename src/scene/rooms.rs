//! Ready made world graphs.

use std::sync::Arc;

use crate::geometry::{FloatType, WorldPoint, WorldVector};

use super::{
    Anchor, BoundingBox, LinearCompound, Plane, PlaneTarget, Scene, Skybox, Sphere, SphereTarget,
    Waves, WorldId,
};

pub const GRID_SIZE: usize = 3;
/// Distance from the room center to its floor and ceiling.
pub const GRID_SPACING: FloatType = 5.0;

pub type RoomIds = [[[WorldId; GRID_SIZE]; GRID_SIZE]; GRID_SIZE];

/// Handles of the worlds created by [`room_grid`].
#[derive(Copy, Clone, Debug)]
pub struct RoomGrid {
    /// Indexed as `rooms[x][y][z]`.
    pub rooms: RoomIds,
    pub star_world: WorldId,
    /// Middle room, where the observer starts.
    pub start: WorldId,
}

impl RoomGrid {
    pub fn room(&self, x: usize, y: usize, z: usize) -> WorldId {
        self.rooms[x][y][z]
    }
}

fn below(y: usize) -> usize {
    (y + GRID_SIZE - 1) % GRID_SIZE
}

fn above(y: usize) -> usize {
    (y + 1) % GRID_SIZE
}

/// Grid of rooms stacked vertically, wrapping around.
///
/// Falling through the floor of a room brings the ray out of the ceiling of the room below,
/// the bottom layer connects back to the top one. Each room has a mirror sphere in its center,
/// the one in the far corner leads to a separate star world.
/// Layer `y` of the grid uses `layer_skyboxes[y]`.
pub fn room_grid(
    scene: &mut Scene,
    layer_skyboxes: [Arc<dyn Skybox>; GRID_SIZE],
    star_skybox: Arc<dyn Skybox>,
) -> RoomGrid {
    let star_world = scene.add_world(star_skybox);
    scene.set_root(
        star_world,
        Plane::new(WorldPoint::new(0.0, -2.0 * GRID_SPACING, 0.0), WorldVector::y()),
    );

    let rooms: RoomIds = std::array::from_fn(|_x| {
        std::array::from_fn(|y| {
            std::array::from_fn(|_z| scene.add_world(Arc::clone(&layer_skyboxes[y])))
        })
    });

    for x in 0..GRID_SIZE {
        for y in 0..GRID_SIZE {
            for z in 0..GRID_SIZE {
                let floor = Plane::new(WorldPoint::new(0.0, -GRID_SPACING, 0.0), WorldVector::y());
                let floor_exit = Anchor {
                    origin: WorldPoint::new(0.0, GRID_SPACING, 0.0),
                    frame: floor.anchor().frame.reversed(),
                };
                let floor = floor.with_target(PlaneTarget {
                    world: rooms[x][below(y)][z],
                    anchor: floor_exit,
                });

                let ceiling =
                    Plane::new(WorldPoint::new(0.0, GRID_SPACING, 0.0), -WorldVector::y());
                let ceiling_exit = Anchor {
                    origin: WorldPoint::new(0.0, -GRID_SPACING, 0.0),
                    frame: ceiling.anchor().frame.reversed(),
                };
                let ceiling = ceiling.with_target(PlaneTarget {
                    world: rooms[x][above(y)][z],
                    anchor: ceiling_exit,
                });

                let mut sphere = Sphere::new(WorldPoint::origin(), 1.0);
                if (x, y, z) == (GRID_SIZE - 1, GRID_SIZE - 1, GRID_SIZE - 1) {
                    sphere.set_target(SphereTarget {
                        world: star_world,
                        center: WorldPoint::origin(),
                        radius: 1.0,
                    });
                }

                let root = LinearCompound::new(vec![
                    floor.into(),
                    ceiling.into(),
                    BoundingBox::new(
                        WorldPoint::new(-1.0, -1.0, -1.0),
                        WorldPoint::new(1.0, 1.0, 1.0),
                        sphere,
                    )
                    .into(),
                ]);
                scene.set_root(rooms[x][y][z], root);
            }
        }
    }

    RoomGrid {
        rooms,
        star_world,
        start: rooms[1][1][1],
    }
}

/// Cluster of four unit spheres, bounded.
fn ball_cluster(x: FloatType, center: Sphere) -> BoundingBox {
    let cluster = LinearCompound::new(vec![
        center.into(),
        Sphere::new(WorldPoint::new(x - 2.0, 0.0, 0.0), 1.0).into(),
        Sphere::new(WorldPoint::new(x + 2.0, 0.0, 0.0), 1.0).into(),
        Sphere::new(WorldPoint::new(x, 2.0, 0.0), 1.0).into(),
    ]);
    BoundingBox::new(
        WorldPoint::new(x - 3.0, -1.0, -1.0),
        WorldPoint::new(x + 3.0, 3.0, 1.0),
        cluster,
    )
}

fn mirror_ball_row(target: SphereTarget) -> LinearCompound {
    let left: LinearCompound = (-5..0)
        .map(|i| {
            let x = 8.0 * i as FloatType;
            ball_cluster(x, Sphere::new(WorldPoint::new(x, 0.0, 0.0), 1.0))
        })
        .collect();
    let right: LinearCompound = (0..=5)
        .map(|i| {
            let x = 8.0 * i as FloatType;
            let mut center = Sphere::new(WorldPoint::new(x, 0.0, 0.0), 1.0);
            if i == 0 {
                center.set_target(target);
            }
            ball_cluster(x, center)
        })
        .collect();

    LinearCompound::new(vec![
        Plane::new(WorldPoint::new(0.0, -4.0, 0.0), WorldVector::y()).into(),
        BoundingBox::new(
            WorldPoint::new(-43.0, -1.0, -1.0),
            WorldPoint::new(3.0, 3.0, 1.0),
            left,
        )
        .into(),
        BoundingBox::new(
            WorldPoint::new(-3.0, -1.0, -1.0),
            WorldPoint::new(43.0, 3.0, 1.0),
            right,
        )
        .into(),
    ])
}

/// Two copies of a row of mirror balls above a mirror floor.
/// The ball at the origin of each world is a portal into the other one.
pub fn mirror_balls(scene: &mut Scene, skyboxes: [Arc<dyn Skybox>; 2]) -> [WorldId; 2] {
    let [first_skybox, second_skybox] = skyboxes;
    let first = scene.add_world(first_skybox);
    let second = scene.add_world(second_skybox);

    let to = |world| SphereTarget {
        world,
        center: WorldPoint::origin(),
        radius: 1.0,
    };
    scene.set_root(first, mirror_ball_row(to(second)));
    scene.set_root(second, mirror_ball_row(to(first)));

    [first, second]
}

/// Opaque spheres over a rippled opaque floor, meant for mirror hall shading.
pub fn mirror_hall(scene: &mut Scene, skybox: Arc<dyn Skybox>) -> WorldId {
    let world = scene.add_world(skybox);

    let mut root = LinearCompound::default();
    root.push(Waves::new(
        0.1,
        WorldVector::new(1.5, 0.0, 0.7),
        Plane::new(WorldPoint::new(0.0, -2.0, 0.0), WorldVector::y()).opaque(),
    ));
    for i in -3..=3 {
        let x = 3.0 * i as FloatType;
        let spheres: LinearCompound = [4.0, 8.0]
            .iter()
            .map(|&z| Sphere::new(WorldPoint::new(x, 0.0, z), 1.0).opaque())
            .collect();
        root.push(BoundingBox::new(
            WorldPoint::new(x - 1.0, -1.0, 3.0),
            WorldPoint::new(x + 1.0, 1.0, 9.0),
            spheres,
        ));
    }
    scene.set_root(world, root);

    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Ray, VectorExt as _, test::assert_vectors_close};
    use crate::scene::skybox::SolidSkybox;
    use crate::scene::{RayCast, RayHit};
    use crate::util::gray;
    use assert2::assert;

    fn sky(value: f64) -> Arc<dyn Skybox> {
        Arc::new(SolidSkybox(gray(value)))
    }

    fn grid(scene: &mut Scene) -> RoomGrid {
        room_grid(scene, [sky(0.1), sky(0.2), sky(0.3)], sky(0.9))
    }

    #[test]
    fn grid_world_count() {
        let mut scene = Scene::new();
        let grid = grid(&mut scene);
        assert!(scene.len() == GRID_SIZE * GRID_SIZE * GRID_SIZE + 1);
        assert!(grid.start == grid.room(1, 1, 1));
    }

    #[test]
    fn falling_through_floor() {
        let mut scene = Scene::new();
        let grid = grid(&mut scene);
        let direction = WorldVector::new(0.1, -1.0, 0.3).unit();
        let cast = RayCast::new(Ray::new(WorldPoint::new(2.0, 0.0, 2.0), direction), grid.start);

        let RayHit::Portal { cast, distance2 } = scene.ray_cast(&cast) else {
            panic!("Expected the floor portal");
        };
        assert!(cast.world == grid.room(1, 0, 1));
        assert!((cast.ray.origin.y - GRID_SPACING).abs() < 1e-9);
        assert_vectors_close(&cast.ray.direction, &direction, 1e-12);
        assert!(distance2 > GRID_SPACING * GRID_SPACING);
    }

    #[test]
    fn ceiling_of_top_layer_wraps() {
        let mut scene = Scene::new();
        let grid = grid(&mut scene);
        let cast = RayCast::new(
            Ray::new(WorldPoint::new(3.0, 0.0, 0.0), WorldVector::y()),
            grid.room(0, 2, 2),
        );

        let RayHit::Portal { cast, .. } = scene.ray_cast(&cast) else {
            panic!("Expected the ceiling portal");
        };
        assert!(cast.world == grid.room(0, 0, 2));
        let exit = WorldVector::new(3.0, -GRID_SPACING, 0.0);
        assert_vectors_close(&cast.ray.origin.coords, &exit, 1e-9);
        assert_vectors_close(&cast.ray.direction, &WorldVector::y(), 1e-12);
    }

    #[test]
    fn corner_sphere_leads_to_stars() {
        let mut scene = Scene::new();
        let grid = grid(&mut scene);
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, -3.0), WorldVector::z());

        let RayHit::Portal { cast, .. } = scene.ray_cast(&RayCast::new(ray, grid.room(2, 2, 2)))
        else {
            panic!("Expected the star sphere");
        };
        assert!(cast.world == grid.star_world);

        let RayHit::Portal { cast, .. } = scene.ray_cast(&RayCast::new(ray, grid.room(0, 0, 0)))
        else {
            panic!("Expected a mirror sphere");
        };
        assert!(cast.world == grid.room(0, 0, 0));
        assert!(cast.ray.direction == -WorldVector::z());
    }

    #[test]
    fn mirror_balls_link_each_other() {
        let mut scene = Scene::new();
        let [first, second] = mirror_balls(&mut scene, [sky(0.2), sky(0.8)]);
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, -5.0), WorldVector::z());

        let RayHit::Portal { cast, distance2 } = scene.ray_cast(&RayCast::new(ray, first)) else {
            panic!("Expected the portal ball");
        };
        assert!(cast.world == second);
        assert!((distance2 - 16.0).abs() < 1e-9);

        let RayHit::Portal { cast, .. } = scene.ray_cast(&RayCast::new(ray, second)) else {
            panic!("Expected the portal ball");
        };
        assert!(cast.world == first);
    }

    #[test]
    fn mirror_balls_side_cluster_is_a_mirror() {
        let mut scene = Scene::new();
        let [first, _] = mirror_balls(&mut scene, [sky(0.2), sky(0.8)]);
        let ray = Ray::new(WorldPoint::new(-16.0, 0.0, -5.0), WorldVector::z());

        let RayHit::Portal { cast, .. } = scene.ray_cast(&RayCast::new(ray, first)) else {
            panic!("Expected a mirror ball");
        };
        assert!(cast.world == first);
    }

    #[test]
    fn mirror_hall_is_opaque() {
        let mut scene = Scene::new();
        let world = mirror_hall(&mut scene, sky(0.0));
        let ray = Ray::new(WorldPoint::origin(), WorldVector::z());

        let RayHit::Opaque { surface, distance2 } = scene.ray_cast(&RayCast::new(ray, world)) else {
            panic!("Expected the first sphere");
        };
        assert!(surface.origin == WorldPoint::new(0.0, 0.0, 3.0));
        assert!((distance2 - 9.0).abs() < 1e-9);
    }
}
