use crate::{
    advect, advect_self, apply_boundary, diffuse, project, splat, Boundary, DoubleField2, Field2,
    Grid2, Pointer, ProjectionScratch, SimConfig, SimParams, SolverIterations,
};

pub const VELOCITY_CHANNELS: usize = 2;
pub const PRESSURE_CHANNELS: usize = 1;
pub const DYE_CHANNELS: usize = 4;

/// Which committed field a presentation layer wants to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayField {
    Velocity,
    Pressure,
    Dye,
}

/// Simulation context: owns every field and the parameters the next step
/// will read.
#[derive(Clone, Debug)]
pub struct FluidSim {
    velocity: DoubleField2,
    pressure: DoubleField2,
    dye: DoubleField2,
    scratch: ProjectionScratch,
    params: SimParams,
    iterations: SolverIterations,
}

impl FluidSim {
    /// Builds a zeroed simulation. `config` should already be validated;
    /// resolutions below 2x2 panic.
    pub fn new(config: &SimConfig) -> Self {
        let sim_grid = Grid2::new(config.sim_resolution.width, config.sim_resolution.height);
        let dye_grid = Grid2::new(config.dye_resolution.width, config.dye_resolution.height);
        Self::with_grids(sim_grid, dye_grid, config.params, config.iterations)
    }

    pub fn with_grids(
        sim_grid: Grid2,
        dye_grid: Grid2,
        params: SimParams,
        iterations: SolverIterations,
    ) -> Self {
        log::debug!(
            "creating fluid sim: velocity {}x{}, dye {}x{}",
            sim_grid.width(),
            sim_grid.height(),
            dye_grid.width(),
            dye_grid.height()
        );
        Self {
            velocity: DoubleField2::new(sim_grid, VELOCITY_CHANNELS, 0.0),
            pressure: DoubleField2::new(sim_grid, PRESSURE_CHANNELS, 0.0),
            dye: DoubleField2::new(dye_grid, DYE_CHANNELS, 0.0),
            scratch: ProjectionScratch::new(sim_grid),
            params,
            iterations,
        }
    }

    pub fn sim_grid(&self) -> Grid2 {
        self.velocity.grid()
    }

    pub fn dye_grid(&self) -> Grid2 {
        self.dye.grid()
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SimParams {
        &mut self.params
    }

    pub fn set_params(&mut self, params: SimParams) {
        self.params = params;
    }

    pub fn iterations(&self) -> SolverIterations {
        self.iterations
    }

    pub fn set_iterations(&mut self, iterations: SolverIterations) {
        self.iterations = iterations;
    }

    pub fn velocity(&self) -> &Field2 {
        self.velocity.read()
    }

    pub fn pressure(&self) -> &Field2 {
        self.pressure.read()
    }

    pub fn dye(&self) -> &Field2 {
        self.dye.read()
    }

    pub fn velocity_mut(&mut self) -> &mut DoubleField2 {
        &mut self.velocity
    }

    pub fn pressure_mut(&mut self) -> &mut DoubleField2 {
        &mut self.pressure
    }

    pub fn dye_mut(&mut self) -> &mut DoubleField2 {
        &mut self.dye
    }

    pub fn display(&self, which: DisplayField) -> &Field2 {
        match which {
            DisplayField::Velocity => self.velocity(),
            DisplayField::Pressure => self.pressure(),
            DisplayField::Dye => self.dye(),
        }
    }

    /// Advances one frame. Every stage runs unconditionally, including for
    /// `dt <= 0`.
    pub fn step(&mut self, dt: f32, pointers: &[Pointer]) {
        log::trace!("step dt={dt} pointers={}", pointers.len());
        let params = self.params;
        let iterations = self.iterations;

        for pointer in pointers {
            self.inject(pointer, &params);
        }

        apply_boundary(&mut self.velocity, Boundary::Reflect);
        advect_self(&mut self.velocity, dt, params.velocity_dissipation);

        apply_boundary(&mut self.dye, Boundary::Absorb);
        advect(
            self.velocity.read(),
            &mut self.dye,
            dt,
            params.dye_dissipation,
        );

        apply_boundary(&mut self.velocity, Boundary::Reflect);
        diffuse(
            &mut self.velocity,
            params.viscosity,
            dt,
            iterations.diffusion,
        );

        project(
            &mut self.velocity,
            &mut self.pressure,
            &mut self.scratch,
            params.pressure_retention,
            iterations.pressure,
        );
    }

    /// Splats momentum proportional to the pointer's drag and a dye trail in
    /// its color.
    fn inject(&mut self, pointer: &Pointer, params: &SimParams) {
        let force = pointer.delta.scale(params.splat_force);
        let sim_aspect = self.sim_grid().aspect();
        splat(
            &mut self.velocity,
            pointer.position,
            &[force.x, force.y],
            params.splat_radius,
            sim_aspect,
        );
        let [r, g, b] = pointer.color;
        let deposit = params.dye_deposit;
        let dye_aspect = self.dye_grid().aspect();
        splat(
            &mut self.dye,
            pointer.position,
            &[r * deposit, g * deposit, b * deposit, deposit],
            params.splat_radius,
            dye_aspect,
        );
    }

    /// Rebuilds the fields at new resolutions, resampling their contents.
    /// Scratch fields are reallocated.
    pub fn resize(&mut self, sim_grid: Grid2, dye_grid: Grid2) {
        if sim_grid == self.sim_grid() && dye_grid == self.dye_grid() {
            return;
        }
        log::debug!(
            "resizing fluid sim: velocity {}x{} -> {}x{}, dye {}x{} -> {}x{}",
            self.sim_grid().width(),
            self.sim_grid().height(),
            sim_grid.width(),
            sim_grid.height(),
            self.dye_grid().width(),
            self.dye_grid().height(),
            dye_grid.width(),
            dye_grid.height()
        );
        self.velocity.resample(sim_grid);
        self.pressure.resample(sim_grid);
        self.dye.resample(dye_grid);
        if self.scratch.grid() != sim_grid {
            self.scratch = ProjectionScratch::new(sim_grid);
        }
    }
}
