pub mod cast;
pub mod compound;
pub mod primitives;
pub mod rooms;
pub mod skybox;

use std::sync::Arc;

use index_vec::IndexVec;

pub use cast::{Anchor, RayCast, RayHit};
pub use compound::{BoundingBox, LinearCompound, Waves};
pub use primitives::{Plane, PlaneTarget, Sphere, SphereTarget};
pub use skybox::Skybox;

index_vec::define_index_type! {
    /// Handle of a world inside a [`Scene`].
    pub struct WorldId = u32;
}

/// Anything a ray can be cast against.
pub trait Shape {
    fn ray_cast(&self, cast: &RayCast) -> RayHit;
}

/// Node of a world's shape tree.
#[derive(Clone, Debug)]
pub enum SceneNode {
    Sphere(Sphere),
    Plane(Plane),
    BoundingBox(BoundingBox),
    LinearCompound(LinearCompound),
    Waves(Waves),
}

impl Shape for SceneNode {
    fn ray_cast(&self, cast: &RayCast) -> RayHit {
        match self {
            SceneNode::Sphere(shape) => shape.ray_cast(cast),
            SceneNode::Plane(shape) => shape.ray_cast(cast),
            SceneNode::BoundingBox(shape) => shape.ray_cast(cast),
            SceneNode::LinearCompound(shape) => shape.ray_cast(cast),
            SceneNode::Waves(shape) => shape.ray_cast(cast),
        }
    }
}

impl SceneNode {
    /// Calls `f` with the target world of every portal in the tree.
    pub fn visit_targets(&self, f: &mut dyn FnMut(WorldId)) {
        match self {
            SceneNode::Sphere(sphere) => {
                if let Some(target) = sphere.target() {
                    f(target.world);
                }
            }
            SceneNode::Plane(plane) => {
                if let Some(target) = plane.target() {
                    f(target.world);
                }
            }
            SceneNode::BoundingBox(shape) => shape.child.visit_targets(f),
            SceneNode::LinearCompound(shape) => {
                for child in &shape.children {
                    child.visit_targets(f);
                }
            }
            SceneNode::Waves(shape) => shape.child.visit_targets(f),
        }
    }
}

impl From<Sphere> for SceneNode {
    fn from(value: Sphere) -> Self {
        SceneNode::Sphere(value)
    }
}

impl From<Plane> for SceneNode {
    fn from(value: Plane) -> Self {
        SceneNode::Plane(value)
    }
}

impl From<BoundingBox> for SceneNode {
    fn from(value: BoundingBox) -> Self {
        SceneNode::BoundingBox(value)
    }
}

impl From<LinearCompound> for SceneNode {
    fn from(value: LinearCompound) -> Self {
        SceneNode::LinearCompound(value)
    }
}

impl From<Waves> for SceneNode {
    fn from(value: Waves) -> Self {
        SceneNode::Waves(value)
    }
}

/// Self contained scene with its own background.
#[derive(Clone)]
pub struct World {
    pub root: SceneNode,
    pub skybox: Arc<dyn Skybox>,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// All worlds reachable through portals.
///
/// Worlds refer to each other only by [`WorldId`], so the portal graph may contain cycles.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    worlds: IndexVec<WorldId, World>,
}

impl Scene {
    pub fn new() -> Scene {
        Self::default()
    }

    /// Adds a world with an empty scene.
    /// The handle can be used as a portal target before the world's shapes are built.
    pub fn add_world(&mut self, skybox: Arc<dyn Skybox>) -> WorldId {
        self.worlds.push(World {
            root: LinearCompound::default().into(),
            skybox,
        })
    }

    pub fn set_root(&mut self, world: WorldId, root: impl Into<SceneNode>) {
        self.worlds[world].root = root.into();
    }

    /// Panics if the world doesn't belong to this scene.
    pub fn world(&self, world: WorldId) -> &World {
        &self.worlds[world]
    }

    pub fn world_mut(&mut self, world: WorldId) -> &mut World {
        &mut self.worlds[world]
    }

    pub fn get(&self, world: WorldId) -> Option<&World> {
        self.worlds.get(world)
    }

    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    /// First portal target that is not a world of this scene.
    pub fn dangling_target(&self) -> Option<WorldId> {
        let mut dangling = None;
        for world in &self.worlds {
            world.root.visit_targets(&mut |target| {
                if dangling.is_none() && self.worlds.get(target).is_none() {
                    dangling = Some(target);
                }
            });
        }
        dangling
    }

    /// Casts the ray against the scene of the world it is currently in.
    pub fn ray_cast(&self, cast: &RayCast) -> RayHit {
        self.world(cast.world).root.ray_cast(cast)
    }
}
