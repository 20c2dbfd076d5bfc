use crate::Vec2;

/// Shape of a cell-centered grid covering the unit square.
///
/// Cell `(x, y)` spans `[x/W, (x+1)/W) x [y/H, (y+1)/H)` with the origin at the
/// bottom-left corner. Storage is row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid2 {
    width: usize,
    height: usize,
}

impl Grid2 {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width >= 2, "width must be >= 2");
        assert!(height >= 2, "height must be >= 2");
        Self { width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn coord(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    pub fn clamp_coord(&self, x: i32, y: i32) -> (usize, usize) {
        let max_x = (self.width - 1) as i32;
        let max_y = (self.height - 1) as i32;
        let cx = x.clamp(0, max_x) as usize;
        let cy = y.clamp(0, max_y) as usize;
        (cx, cy)
    }

    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }

    /// Normalized position of the center of cell `(x, y)`.
    pub fn cell_center(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            (x as f32 + 0.5) / self.width as f32,
            (y as f32 + 0.5) / self.height as f32,
        )
    }

    /// Maps a normalized position to continuous grid coordinates where integer
    /// values land on cell centers.
    pub fn to_grid_coords(&self, pos: Vec2) -> (f32, f32) {
        (
            pos.x * self.width as f32 - 0.5,
            pos.y * self.height as f32 - 0.5,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idx_and_coord_are_inverse() {
        let grid = Grid2::new(5, 3);
        for i in 0..grid.size() {
            let (x, y) = grid.coord(i);
            assert_eq!(grid.idx(x, y), i);
        }
    }

    #[test]
    fn cell_center_round_trips_to_grid_coords() {
        let grid = Grid2::new(8, 4);
        let (gx, gy) = grid.to_grid_coords(grid.cell_center(3, 2));
        assert!((gx - 3.0).abs() < 1e-5);
        assert!((gy - 2.0).abs() < 1e-5);
    }

    #[test]
    fn border_ring_detection() {
        let grid = Grid2::new(4, 3);
        assert!(grid.is_border(0, 1));
        assert!(grid.is_border(3, 1));
        assert!(grid.is_border(2, 0));
        assert!(grid.is_border(2, 2));
        assert!(!grid.is_border(1, 1));
        assert!(!grid.is_border(2, 1));
    }

    #[test]
    fn clamp_coord_stays_inside() {
        let grid = Grid2::new(4, 4);
        assert_eq!(grid.clamp_coord(-3, 7), (0, 3));
        assert_eq!(grid.clamp_coord(2, 1), (2, 1));
    }

    #[test]
    #[should_panic(expected = "width must be >= 2")]
    fn rejects_degenerate_width() {
        let _ = Grid2::new(1, 4);
    }
}
