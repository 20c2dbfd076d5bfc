use crate::{DoubleField2, Field2};

/// Wall treatment applied to the outer ring of a field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Boundary {
    /// Border = -neighbor. Solid wall for velocity.
    Reflect,
    /// Border = neighbor. Zero normal gradient, used for pressure.
    Neumann,
    /// Border = 0. Dye vanishes at the wall.
    Absorb,
    /// Border = alpha * neighbor.
    Scale(f32),
}

impl Boundary {
    pub fn alpha(self) -> f32 {
        match self {
            Boundary::Reflect => -1.0,
            Boundary::Neumann => 1.0,
            Boundary::Absorb => 0.0,
            Boundary::Scale(alpha) => alpha,
        }
    }
}

/// Rewrites the border ring of the committed state and commits the result.
pub fn apply_boundary(pair: &mut DoubleField2, boundary: Boundary) {
    let alpha = boundary.alpha();
    pair.update(|read, write| apply_boundary_into(write, read, alpha));
}

/// Copies `field` into `out`, replacing every border cell with `alpha` times
/// its inward neighbor. Corners use the diagonal neighbor.
pub fn apply_boundary_into(out: &mut Field2, field: &Field2, alpha: f32) {
    out.assert_same_shape(field);
    let grid = field.grid();
    let w = grid.width();
    let h = grid.height();
    out.fill_with_index(|x, y, cell| {
        let left = (x == 0) as i32;
        let right = (x + 1 == w) as i32;
        let bottom = (y == 0) as i32;
        let top = (y + 1 == h) as i32;
        if left + right + bottom + top == 0 {
            cell.copy_from_slice(field.get(x, y));
            return;
        }
        let nx = (x as i32 + left - right) as usize;
        let ny = (y as i32 + bottom - top) as usize;
        for (out_value, value) in cell.iter_mut().zip(field.get(nx, ny)) {
            *out_value = alpha * value;
        }
    });
}
