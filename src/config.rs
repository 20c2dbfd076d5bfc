use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DIFFUSION_ITERATIONS: usize = 20;
pub const PRESSURE_ITERATIONS: usize = 40;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{name} resolution {width}x{height} is below 2x2")]
    InvalidResolution {
        name: &'static str,
        width: usize,
        height: usize,
    },
    #[error("{name} iteration count must be > 0")]
    InvalidIterations { name: &'static str },
}

/// Physical parameters, read fresh on every step. No range checks are made.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub viscosity: f32,
    /// Fraction of last tick's pressure used to seed the solve.
    pub pressure_retention: f32,
    pub splat_radius: f32,
    /// Multiplier on pointer displacement for velocity splats.
    pub splat_force: f32,
    /// Multiplier on pointer color for dye splats.
    pub dye_deposit: f32,
    pub velocity_dissipation: f32,
    pub dye_dissipation: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            viscosity: 0.0001,
            pressure_retention: 0.8,
            splat_radius: 0.01,
            splat_force: 10.0,
            dye_deposit: 0.2,
            velocity_dissipation: 0.99,
            dye_dissipation: 0.99,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverIterations {
    pub diffusion: usize,
    pub pressure: usize,
}

impl Default for SolverIterations {
    fn default() -> Self {
        Self {
            diffusion: DIFFUSION_ITERATIONS,
            pressure: PRESSURE_ITERATIONS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
}

impl Resolution {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    fn check(self, name: &'static str) -> Result<(), ConfigError> {
        if self.width < 2 || self.height < 2 {
            return Err(ConfigError::InvalidResolution {
                name,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub params: SimParams,
    pub iterations: SolverIterations,
    pub sim_resolution: Resolution,
    pub dye_resolution: Resolution,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            params: SimParams::default(),
            iterations: SolverIterations::default(),
            sim_resolution: Resolution::new(128, 128),
            dye_resolution: Resolution::new(512, 512),
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks grid shapes and iteration counts. Physical parameters pass
    /// through as given.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sim_resolution.check("sim")?;
        self.dye_resolution.check("dye")?;
        if self.iterations.diffusion == 0 {
            return Err(ConfigError::InvalidIterations { name: "diffusion" });
        }
        if self.iterations.pressure == 0 {
            return Err(ConfigError::InvalidIterations { name: "pressure" });
        }
        Ok(())
    }
}
