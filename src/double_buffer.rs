use crate::{Field2, Grid2};

/// Two same-shaped fields: `read` holds the last committed state, `write` is
/// the target of the operator currently running.
///
/// Operators fill `write` from `read` (and other committed inputs) and then
/// call [`DoubleField2::swap`] exactly once.
#[derive(Clone, Debug)]
pub struct DoubleField2 {
    read: Field2,
    write: Field2,
}

impl DoubleField2 {
    pub fn new(grid: Grid2, channels: usize, fill: f32) -> Self {
        Self {
            read: Field2::new(grid, channels, fill),
            write: Field2::new(grid, channels, fill),
        }
    }

    /// Wraps an existing field as the committed state.
    pub fn from_field(read: Field2) -> Self {
        let write = read.clone();
        Self { read, write }
    }

    pub fn grid(&self) -> Grid2 {
        self.read.grid()
    }

    pub fn channels(&self) -> usize {
        self.read.channels()
    }

    pub fn read(&self) -> &Field2 {
        &self.read
    }

    /// Mutable access to the committed state, for callers seeding initial
    /// conditions outside of an operator.
    pub fn read_mut(&mut self) -> &mut Field2 {
        &mut self.read
    }

    pub fn write(&self) -> &Field2 {
        &self.write
    }

    /// Borrows the committed state and the scratch target at once.
    pub fn split(&mut self) -> (&Field2, &mut Field2) {
        (&self.read, &mut self.write)
    }

    /// Exchanges the read and write roles without copying sample data.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    /// Runs `f(read, write)` and commits the result.
    pub fn update(&mut self, f: impl FnOnce(&Field2, &mut Field2)) {
        let (read, write) = self.split();
        f(read, write);
        self.swap();
    }

    /// Rebuilds both buffers on a new grid, bilinearly resampling the
    /// committed state.
    pub fn resample(&mut self, grid: Grid2) {
        if grid == self.grid() {
            return;
        }
        let read = self.read.resampled(grid);
        *self = Self::from_field(read);
    }
}
