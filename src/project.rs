use crate::{apply_boundary, Boundary, DoubleField2, Field2, Grid2};

/// Single-buffered intermediates for [`project`], sized to the velocity grid.
#[derive(Clone, Debug)]
pub struct ProjectionScratch {
    divergence: Field2,
    gradient: Field2,
}

impl ProjectionScratch {
    pub fn new(grid: Grid2) -> Self {
        Self {
            divergence: Field2::zeros(grid, 1),
            gradient: Field2::zeros(grid, 2),
        }
    }

    pub fn grid(&self) -> Grid2 {
        self.divergence.grid()
    }

    pub fn divergence(&self) -> &Field2 {
        &self.divergence
    }

    pub fn gradient(&self) -> &Field2 {
        &self.gradient
    }
}

/// Removes the divergent part of `velocity`.
///
/// The pressure solve is warm-started from `retention` times the previous
/// pressure and runs a fixed number of Jacobi sweeps.
pub fn project(
    velocity: &mut DoubleField2,
    pressure: &mut DoubleField2,
    scratch: &mut ProjectionScratch,
    retention: f32,
    iterations: usize,
) {
    velocity.read().assert_same_grid(pressure.read());
    assert_eq!(scratch.grid(), velocity.grid(), "field grid mismatch");
    apply_boundary(velocity, Boundary::Reflect);
    divergence_into(&mut scratch.divergence, velocity.read());
    seed_pressure(pressure, retention);
    for _ in 0..iterations {
        apply_boundary(pressure, Boundary::Neumann);
        let divergence = &scratch.divergence;
        pressure.update(|read, write| jacobi_pressure_into(write, read, divergence));
    }
    apply_boundary(velocity, Boundary::Reflect);
    apply_boundary(pressure, Boundary::Neumann);
    pressure_gradient_into(&mut scratch.gradient, pressure.read());
    let gradient = &scratch.gradient;
    velocity.update(|read, write| subtract_gradient_into(write, read, gradient));
}

/// Scales the committed pressure by `retention`.
pub fn seed_pressure(pressure: &mut DoubleField2, retention: f32) {
    pressure.update(|read, write| {
        write.fill_with_index(|x, y, cell| {
            for (value, old) in cell.iter_mut().zip(read.get(x, y)) {
                *value = retention * old;
            }
        });
    });
}

/// Central-difference divergence of the first two channels. Border cells
/// are zero.
pub fn divergence_into(out: &mut Field2, velocity: &Field2) {
    out.assert_same_grid(velocity);
    let grid = velocity.grid();
    out.fill_with_index(|x, y, cell| {
        if grid.is_border(x, y) {
            cell[0] = 0.0;
            return;
        }
        let left = velocity.get(x - 1, y)[0];
        let right = velocity.get(x + 1, y)[0];
        let bottom = velocity.get(x, y - 1)[1];
        let top = velocity.get(x, y + 1)[1];
        cell[0] = ((right - left) + (top - bottom)) / 2.0;
    });
}

/// One Jacobi sweep of the pressure Poisson equation. Border cells carry the
/// committed values.
pub fn jacobi_pressure_into(out: &mut Field2, pressure: &Field2, divergence: &Field2) {
    out.assert_same_shape(pressure);
    pressure.assert_same_grid(divergence);
    let grid = pressure.grid();
    out.fill_with_index(|x, y, cell| {
        if grid.is_border(x, y) {
            cell[0] = pressure.get(x, y)[0];
            return;
        }
        let sum = pressure.get(x - 1, y)[0]
            + pressure.get(x + 1, y)[0]
            + pressure.get(x, y - 1)[0]
            + pressure.get(x, y + 1)[0];
        cell[0] = (sum - divergence.get(x, y)[0]) / 4.0;
    });
}

/// Central-difference pressure gradient. Border cells are zero.
pub fn pressure_gradient_into(out: &mut Field2, pressure: &Field2) {
    out.assert_same_grid(pressure);
    let grid = pressure.grid();
    out.fill_with_index(|x, y, cell| {
        if grid.is_border(x, y) {
            cell[0] = 0.0;
            cell[1] = 0.0;
            return;
        }
        cell[0] = (pressure.get(x + 1, y)[0] - pressure.get(x - 1, y)[0]) / 2.0;
        cell[1] = (pressure.get(x, y + 1)[0] - pressure.get(x, y - 1)[0]) / 2.0;
    });
}

pub fn subtract_gradient_into(out: &mut Field2, velocity: &Field2, gradient: &Field2) {
    out.assert_same_shape(velocity);
    out.assert_same_shape(gradient);
    out.fill_with_index(|x, y, cell| {
        let v = velocity.get(x, y);
        let g = gradient.get(x, y);
        cell[0] = v[0] - g[0];
        cell[1] = v[1] - g[1];
    });
}

/// Mean absolute divergence over interior cells.
pub fn mean_abs_divergence(velocity: &Field2) -> f32 {
    let grid = velocity.grid();
    let mut divergence = Field2::zeros(grid, 1);
    divergence_into(&mut divergence, velocity);
    let interior = (grid.width() - 2) * (grid.height() - 2);
    if interior == 0 {
        return 0.0;
    }
    divergence.abs_sum() / interior as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn random_velocity(grid: Grid2, seed: u64) -> Field2 {
        let mut rng = StdRng::seed_from_u64(seed);
        let values: Vec<f32> = (0..grid.size() * 2)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();
        Field2::from_fn(grid, 2, |x, y, cell| {
            let i = grid.idx(x, y) * 2;
            cell.copy_from_slice(&values[i..i + 2]);
        })
    }

    #[test]
    fn divergence_of_constant_velocity_is_zero() {
        let grid = Grid2::new(8, 6);
        let velocity = Field2::from_fn(grid, 2, |_x, _y, cell| {
            cell[0] = 1.0;
            cell[1] = -1.0;
        });
        assert_close(mean_abs_divergence(&velocity), 0.0, 1e-6);
    }

    #[test]
    fn divergence_of_linear_expansion() {
        let grid = Grid2::new(6, 6);
        let velocity = Field2::from_fn(grid, 2, |x, y, cell| {
            cell[0] = x as f32;
            cell[1] = 2.0 * y as f32;
        });
        let mut div = Field2::zeros(grid, 1);
        divergence_into(&mut div, &velocity);
        assert_close(div.get(2, 3)[0], 3.0, 1e-6);
        assert_close(div.get(0, 3)[0], 0.0, 1e-6);
    }

    #[test]
    fn gradient_of_linear_pressure() {
        let grid = Grid2::new(5, 5);
        let pressure = Field2::from_fn(grid, 1, |x, y, cell| cell[0] = (3 * x + y) as f32);
        let mut grad = Field2::zeros(grid, 2);
        pressure_gradient_into(&mut grad, &pressure);
        assert_eq!(grad.get(2, 2), &[3.0, 1.0]);
        assert_eq!(grad.get(0, 2), &[0.0, 0.0]);
    }

    #[test]
    fn seed_pressure_scales_previous_state() {
        let grid = Grid2::new(4, 4);
        let mut pressure = DoubleField2::new(grid, 1, 2.0);
        seed_pressure(&mut pressure, 0.25);
        assert!(pressure.read().as_slice().iter().all(|v| *v == 0.5));
        seed_pressure(&mut pressure, 0.0);
        assert!(pressure.read().as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn projection_reduces_divergence_of_random_fields() {
        for (w, h, seed) in [(8, 8, 1), (8, 8, 2), (12, 9, 3), (16, 16, 4)] {
            let grid = Grid2::new(w, h);
            let start = random_velocity(grid, seed);
            let before = mean_abs_divergence(&start);
            let mut velocity = DoubleField2::from_field(start);
            let mut pressure = DoubleField2::new(grid, 1, 0.0);
            let mut scratch = ProjectionScratch::new(grid);
            project(&mut velocity, &mut pressure, &mut scratch, 0.5, 40);
            let after = mean_abs_divergence(velocity.read());
            assert!(
                after < before,
                "{w}x{h} seed {seed}: divergence {before} -> {after}"
            );
            assert!(velocity.read().is_finite());
        }
    }

    #[test]
    fn divergence_free_field_is_left_alone() {
        let grid = Grid2::new(8, 8);
        let mut velocity = DoubleField2::new(grid, 2, 0.0);
        let mut pressure = DoubleField2::new(grid, 1, 0.0);
        let mut scratch = ProjectionScratch::new(grid);
        project(&mut velocity, &mut pressure, &mut scratch, 0.8, 40);
        assert_close(velocity.read().abs_sum(), 0.0, 1e-9);
        assert_close(pressure.read().abs_sum(), 0.0, 1e-9);
    }

    #[test]
    fn pressure_border_satisfies_neumann_after_projection() {
        let grid = Grid2::new(8, 8);
        let mut velocity = DoubleField2::from_field(random_velocity(grid, 9));
        let mut pressure = DoubleField2::new(grid, 1, 0.0);
        let mut scratch = ProjectionScratch::new(grid);
        project(&mut velocity, &mut pressure, &mut scratch, 0.5, 10);
        let p = pressure.read();
        assert_eq!(p.get(0, 3)[0], p.get(1, 3)[0]);
        assert_eq!(p.get(7, 7)[0], p.get(6, 6)[0]);
    }

    #[test]
    #[should_panic(expected = "field grid mismatch")]
    fn mismatched_pressure_grid_panics() {
        let mut velocity = DoubleField2::new(Grid2::new(8, 8), 2, 0.0);
        let mut pressure = DoubleField2::new(Grid2::new(4, 4), 1, 0.0);
        let mut scratch = ProjectionScratch::new(Grid2::new(8, 8));
        project(&mut velocity, &mut pressure, &mut scratch, 0.5, 1);
    }
}
