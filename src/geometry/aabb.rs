use super::WorldPoint;

/// Axis aligned box in world coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldBox {
    pub min: WorldPoint,
    pub max: WorldPoint,
}

impl WorldBox {
    pub fn new(min: WorldPoint, max: WorldPoint) -> WorldBox {
        WorldBox { min, max }
    }

    /// Returns the corner selected per axis: `false` picks `min`, `true` picks `max`.
    pub(super) fn bound(&self, upper: bool) -> &WorldPoint {
        if upper { &self.max } else { &self.min }
    }
}
