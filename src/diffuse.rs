use crate::{DoubleField2, Field2};

/// Implicit viscous diffusion, `(I - nu*dt*lap) x_new = x_old`, relaxed with a
/// fixed number of Jacobi sweeps.
///
/// Each sweep reads only the previous sweep's committed grid. Border cells are
/// not relaxed; they carry whatever the boundary pass wrote before the call.
pub fn diffuse(field: &mut DoubleField2, viscosity: f32, dt: f32, iterations: usize) {
    let a = viscosity * dt;
    for _ in 0..iterations {
        field.update(|read, write| jacobi_diffusion_into(write, read, a));
    }
}

/// One Jacobi sweep with coupling `a = nu*dt`.
pub fn jacobi_diffusion_into(out: &mut Field2, field: &Field2, a: f32) {
    out.assert_same_shape(field);
    let grid = field.grid();
    let denom = 1.0 + 4.0 * a;
    out.fill_with_index(|x, y, cell| {
        let center = field.get(x, y);
        if grid.is_border(x, y) {
            cell.copy_from_slice(center);
            return;
        }
        let left = field.get(x - 1, y);
        let right = field.get(x + 1, y);
        let bottom = field.get(x, y - 1);
        let top = field.get(x, y + 1);
        for c in 0..cell.len() {
            let neighbors = left[c] + right[c] + bottom[c] + top[c];
            cell[c] = (a * neighbors + center[c]) / denom;
        }
    });
}
