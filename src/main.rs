use anyhow::{Context, Result};
use dye_sim::{mean_abs_divergence, DisplayField, FluidSim, Pointer, SimConfig, Vec2};
use rand::{rngs::StdRng, SeedableRng};
use std::f32::consts::TAU;

const DEFAULT_FRAMES: usize = 600;
const FRAME_DT: f32 = 1.0 / 60.0;
const REPORT_EVERY: usize = 60;

/// A pointer dragged around a circle, standing in for a user's drag.
#[derive(Clone, Copy, Debug)]
struct Orbit {
    center: Vec2,
    radius: f32,
    period: f32,
}

impl Orbit {
    fn position(&self, t: f32) -> Vec2 {
        let angle = TAU * t / self.period;
        Vec2::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }
}

fn parse_args() -> Result<(SimConfig, usize)> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(&path)
            .with_context(|| format!("loading simulation config from {path}"))?,
        None => SimConfig::default(),
    };
    let frames = match args.next() {
        Some(value) => value
            .parse::<usize>()
            .with_context(|| format!("invalid frame count {value:?}"))?,
        None => DEFAULT_FRAMES,
    };
    Ok((config, frames))
}

fn report(sim: &FluidSim, frame: usize) {
    let velocity = sim.display(DisplayField::Velocity);
    let dye = sim.display(DisplayField::Dye);
    let (p_min, p_max) = sim
        .display(DisplayField::Pressure)
        .as_slice()
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    log::info!(
        "frame {frame}: max speed {:.4}, dye mass {:.3}, mean |div| {:.2e}, pressure [{:.3}, {:.3}]",
        velocity.max_magnitude(),
        dye.channel_sum(3),
        mean_abs_divergence(velocity),
        p_min,
        p_max
    );
    if !velocity.is_finite() || !dye.is_finite() {
        log::warn!("frame {frame}: non-finite values in simulation state");
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let (config, frames) = parse_args()?;
    log::info!(
        "running {frames} frames at {}x{} (dye {}x{})",
        config.sim_resolution.width,
        config.sim_resolution.height,
        config.dye_resolution.width,
        config.dye_resolution.height
    );
    let mut sim = FluidSim::new(&config);
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let orbits = [
        Orbit {
            center: Vec2::new(0.5, 0.5),
            radius: 0.25,
            period: 4.0,
        },
        Orbit {
            center: Vec2::new(0.35, 0.6),
            radius: 0.1,
            period: -2.5,
        },
    ];
    let mut pointers: Vec<Pointer> = orbits
        .iter()
        .enumerate()
        .map(|(id, orbit)| Pointer::with_random_color(id as u64, orbit.position(0.0), &mut rng))
        .collect();
    for frame in 1..=frames {
        let t = frame as f32 * FRAME_DT;
        for (pointer, orbit) in pointers.iter_mut().zip(orbits.iter()) {
            pointer.move_to(orbit.position(t));
        }
        sim.step(FRAME_DT, &pointers);
        if frame % REPORT_EVERY == 0 || frame == frames {
            report(&sim, frame);
        }
    }
    Ok(())
}
