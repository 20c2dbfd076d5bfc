mod advect;
mod boundary;
mod config;
mod diffuse;
mod double_buffer;
mod field;
mod grid;
mod pointer;
mod project;
mod sim;
mod splat;
mod vec2;

pub use advect::{advect, advect_into, advect_self};
pub use boundary::{apply_boundary, apply_boundary_into, Boundary};
pub use config::{
    ConfigError, Resolution, SimConfig, SimParams, SolverIterations, DIFFUSION_ITERATIONS,
    PRESSURE_ITERATIONS,
};
pub use diffuse::{diffuse, jacobi_diffusion_into};
pub use double_buffer::DoubleField2;
pub use field::{Field2, Texel, MAX_CHANNELS};
pub use grid::Grid2;
pub use pointer::Pointer;
pub use project::{
    divergence_into, jacobi_pressure_into, mean_abs_divergence, pressure_gradient_into, project,
    seed_pressure, subtract_gradient_into, ProjectionScratch,
};
pub use sim::{DisplayField, FluidSim, DYE_CHANNELS, PRESSURE_CHANNELS, VELOCITY_CHANNELS};
pub use splat::{splat, splat_into, splat_weight};
pub use vec2::Vec2;
