use crate::{Grid2, Vec2};
use rayon::prelude::*;
use std::sync::OnceLock;

const PAR_THRESHOLD_DEFAULT: usize = 262_144;
const PAR_MIN_WORK_PER_THREAD: usize = 4096;

/// Largest supported channel count.
pub const MAX_CHANNELS: usize = 4;

/// One sample of a field. Channels beyond the field's count are zero.
pub type Texel = [f32; MAX_CHANNELS];

fn parallel_threshold() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("SIM_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

fn should_parallel(len: usize) -> bool {
    if len < parallel_threshold() {
        return false;
    }
    let threads = rayon::current_num_threads().max(1);
    len / threads >= PAR_MIN_WORK_PER_THREAD
}

/// A 2D grid of fixed-width samples (1, 2 or 4 floats per cell).
#[derive(Clone, Debug, PartialEq)]
pub struct Field2 {
    grid: Grid2,
    channels: usize,
    data: Vec<f32>,
}

impl Field2 {
    pub fn new(grid: Grid2, channels: usize, fill: f32) -> Self {
        assert!(
            matches!(channels, 1 | 2 | 4),
            "channel count must be 1, 2 or 4"
        );
        let data = vec![fill; grid.size() * channels];
        Self {
            grid,
            channels,
            data,
        }
    }

    pub fn zeros(grid: Grid2, channels: usize) -> Self {
        Self::new(grid, channels, 0.0)
    }

    pub fn from_fn(
        grid: Grid2,
        channels: usize,
        f: impl Fn(usize, usize, &mut [f32]) + Sync,
    ) -> Self {
        let mut field = Self::zeros(grid, channels);
        field.fill_with_index(f);
        field
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const f32 {
        self.data.as_ptr()
    }

    pub fn get(&self, x: usize, y: usize) -> &[f32] {
        let start = self.grid.idx(x, y) * self.channels;
        &self.data[start..start + self.channels]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut [f32] {
        let start = self.grid.idx(x, y) * self.channels;
        &mut self.data[start..start + self.channels]
    }

    pub fn texel(&self, x: usize, y: usize) -> Texel {
        let mut out = [0.0; MAX_CHANNELS];
        out[..self.channels].copy_from_slice(self.get(x, y));
        out
    }

    /// Reads the cell at `(x, y)`, clamping out-of-range coordinates to the
    /// nearest edge cell.
    pub fn sample_clamped(&self, x: i32, y: i32) -> &[f32] {
        let (cx, cy) = self.grid.clamp_coord(x, y);
        self.get(cx, cy)
    }

    /// Bilinear sample at a normalized position. Positions outside the unit
    /// square read the nearest edge cells; there is no wraparound.
    pub fn sample_linear(&self, pos: Vec2) -> Texel {
        let (gx, gy) = self.grid.to_grid_coords(pos);
        // Past one cell outside the grid every corner reads the edge anyway;
        // clamping keeps the corner indices inside i32.
        let gx = gx.clamp(-1.0, self.grid.width() as f32);
        let gy = gy.clamp(-1.0, self.grid.height() as f32);
        let x0 = gx.floor() as i32;
        let y0 = gy.floor() as i32;
        let sx = gx - x0 as f32;
        let sy = gy - y0 as f32;
        let v00 = self.sample_clamped(x0, y0);
        let v10 = self.sample_clamped(x0 + 1, y0);
        let v01 = self.sample_clamped(x0, y0 + 1);
        let v11 = self.sample_clamped(x0 + 1, y0 + 1);
        let mut out = [0.0; MAX_CHANNELS];
        for c in 0..self.channels {
            let vx0 = v00[c] + (v10[c] - v00[c]) * sx;
            let vx1 = v01[c] + (v11[c] - v01[c]) * sx;
            out[c] = vx0 + (vx1 - vx0) * sy;
        }
        out
    }

    /// First two channels at a normalized position, as a vector.
    pub fn sample_vec2(&self, pos: Vec2) -> Vec2 {
        let texel = self.sample_linear(pos);
        Vec2::new(texel[0], texel[1])
    }

    /// Overwrites every cell. Each call to `f` sees only its own cell, so cells
    /// may be filled in parallel.
    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize, &mut [f32]) + Sync) {
        let grid = self.grid;
        let channels = self.channels;
        if should_parallel(self.data.len()) {
            self.data
                .par_chunks_mut(channels)
                .enumerate()
                .for_each(|(i, cell)| {
                    let (x, y) = grid.coord(i);
                    f(x, y, cell);
                });
        } else {
            for (i, cell) in self.data.chunks_mut(channels).enumerate() {
                let (x, y) = grid.coord(i);
                f(x, y, cell);
            }
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.assert_same_shape(other);
        self.data.copy_from_slice(&other.data);
    }

    /// Bilinearly resamples this field onto a new grid.
    pub fn resampled(&self, grid: Grid2) -> Self {
        Self::from_fn(grid, self.channels, |x, y, cell| {
            let texel = self.sample_linear(grid.cell_center(x, y));
            cell.copy_from_slice(&texel[..cell.len()]);
        })
    }

    pub fn channel_sum(&self, channel: usize) -> f32 {
        assert!(channel < self.channels, "channel out of range");
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .sum()
    }

    pub fn abs_sum(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().map(|value| value.abs()).sum()
        } else {
            self.data.iter().map(|value| value.abs()).sum()
        }
    }

    /// Largest Euclidean norm over all cells.
    pub fn max_magnitude(&self) -> f32 {
        let norm = |cell: &[f32]| cell.iter().map(|v| v * v).sum::<f32>().sqrt();
        if should_parallel(self.data.len()) {
            self.data
                .par_chunks(self.channels)
                .map(norm)
                .reduce(|| 0.0_f32, f32::max)
        } else {
            self.data
                .chunks(self.channels)
                .map(norm)
                .fold(0.0_f32, f32::max)
        }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }

    pub(crate) fn assert_same_shape(&self, other: &Self) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
        assert_eq!(self.channels, other.channels, "field channel mismatch");
    }

    pub(crate) fn assert_same_grid(&self, other: &Self) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn from_fn_maps_coords() {
        let grid = Grid2::new(3, 2);
        let field = Field2::from_fn(grid, 2, |x, y, cell| {
            cell[0] = (x + y * 10) as f32;
            cell[1] = -(x as f32);
        });
        assert_eq!(field.get(2, 1), &[12.0, -2.0]);
        assert_eq!(field.texel(2, 1), [12.0, -2.0, 0.0, 0.0]);
    }

    #[test]
    fn sample_linear_matches_cell_center() {
        let grid = Grid2::new(4, 3);
        let field = Field2::from_fn(grid, 1, |x, y, cell| cell[0] = (x + y * 4) as f32);
        let texel = field.sample_linear(grid.cell_center(2, 1));
        assert_close(texel[0], 6.0, 1e-5);
    }

    #[test]
    fn sample_linear_interpolates_between_centers() {
        let grid = Grid2::new(2, 2);
        let field = Field2::from_fn(grid, 1, |x, _y, cell| cell[0] = x as f32);
        let texel = field.sample_linear(Vec2::new(0.5, 0.5));
        assert_close(texel[0], 0.5, 1e-6);
    }

    #[test]
    fn sample_linear_clamps_outside_domain() {
        let grid = Grid2::new(4, 4);
        let field = Field2::from_fn(grid, 1, |x, _y, cell| cell[0] = x as f32);
        assert_close(field.sample_linear(Vec2::new(-3.0, 0.5))[0], 0.0, 1e-6);
        assert_close(field.sample_linear(Vec2::new(7.0, 0.5))[0], 3.0, 1e-6);
    }

    #[test]
    fn resample_constant_is_constant() {
        let grid = Grid2::new(7, 5);
        let field = Field2::new(grid, 4, 0.25);
        for target in [Grid2::new(2, 2), Grid2::new(13, 9), Grid2::new(64, 3)] {
            let there = field.resampled(target);
            let back = there.resampled(grid);
            for value in there.as_slice().iter().chain(back.as_slice()) {
                assert_close(*value, 0.25, 1e-6);
            }
        }
    }

    #[test]
    fn channel_sum_reads_one_channel() {
        let grid = Grid2::new(2, 2);
        let field = Field2::from_fn(grid, 2, |x, y, cell| {
            cell[0] = 1.0;
            cell[1] = (x + y) as f32;
        });
        assert_close(field.channel_sum(0), 4.0, 1e-6);
        assert_close(field.channel_sum(1), 4.0, 1e-6);
    }

    #[test]
    fn max_magnitude_uses_vector_norm() {
        let grid = Grid2::new(2, 2);
        let field = Field2::from_fn(grid, 2, |x, y, cell| {
            if x == 1 && y == 1 {
                cell[0] = 3.0;
                cell[1] = -4.0;
            }
        });
        assert_close(field.max_magnitude(), 5.0, 1e-6);
    }

    #[test]
    fn large_grid_kernels_match_sequential() {
        let grid = Grid2::new(1024, 512);
        let value = |x: usize, y: usize| ((x * 7 + y * 13) % 31) as f32 - 15.0;
        let field = Field2::from_fn(grid, 2, |x, y, cell| {
            cell[0] = value(x, y);
            cell[1] = 0.5 * value(y, x);
        });
        assert!(should_parallel(field.as_slice().len()) || rayon::current_num_threads() > 256);

        let mut abs_sum = 0.0_f64;
        let mut max_norm = 0.0_f32;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let (a, b) = (value(x, y), 0.5 * value(y, x));
                assert_eq!(field.get(x, y), &[a, b]);
                abs_sum += (a.abs() + b.abs()) as f64;
                max_norm = max_norm.max((a * a + b * b).sqrt());
            }
        }
        let relative = (field.abs_sum() as f64 - abs_sum).abs() / abs_sum;
        assert!(relative < 1e-4, "abs_sum relative error {relative}");
        assert_eq!(field.max_magnitude(), max_norm);
    }

    #[test]
    #[should_panic(expected = "field grid mismatch")]
    fn copy_from_rejects_other_grid() {
        let mut a = Field2::zeros(Grid2::new(3, 3), 1);
        let b = Field2::zeros(Grid2::new(4, 3), 1);
        a.copy_from(&b);
    }

    #[test]
    #[should_panic(expected = "channel count must be 1, 2 or 4")]
    fn rejects_three_channels() {
        let _ = Field2::zeros(Grid2::new(3, 3), 3);
    }
}
