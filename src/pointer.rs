use crate::Vec2;
use rand::Rng;

/// An active pointer as seen by one tick of the simulation.
///
/// Positions are normalized to `[0, 1]^2` with y measured from the bottom.
/// `delta` is the displacement since the previous sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub id: u64,
    pub position: Vec2,
    pub delta: Vec2,
    pub color: [f32; 3],
}

impl Pointer {
    pub fn new(id: u64, position: Vec2, color: [f32; 3]) -> Self {
        Self {
            id,
            position,
            delta: Vec2::zero(),
            color,
        }
    }

    /// Press with a random color in `[0, 1)` per component.
    pub fn with_random_color(id: u64, position: Vec2, rng: &mut impl Rng) -> Self {
        let color = [rng.gen(), rng.gen(), rng.gen()];
        Self::new(id, position, color)
    }

    /// Moves to `position`, recording the displacement. Color is kept.
    pub fn move_to(&mut self, position: Vec2) {
        self.delta = position.sub(self.position);
        self.position = position;
    }
}
