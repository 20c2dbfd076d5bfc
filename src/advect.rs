use crate::{DoubleField2, Field2, Vec2};

/// Semi-Lagrangian advection of `target` through `velocity`.
///
/// Velocity is in normalized units per unit time. The x component is divided
/// by the velocity grid's aspect ratio so a unit of speed covers the same
/// physical distance along both axes.
pub fn advect(velocity: &Field2, target: &mut DoubleField2, dt: f32, dissipation: f32) {
    target.update(|read, write| advect_into(write, read, velocity, dt, dissipation));
}

/// Self-advection: the velocity field transports itself.
pub fn advect_self(velocity: &mut DoubleField2, dt: f32, dissipation: f32) {
    velocity.update(|read, write| advect_into(write, read, read, dt, dissipation));
}

/// Traces every cell of `out` backward through `velocity`, samples `source`
/// there and scales the sample by `dissipation`.
pub fn advect_into(
    out: &mut Field2,
    source: &Field2,
    velocity: &Field2,
    dt: f32,
    dissipation: f32,
) {
    out.assert_same_shape(source);
    assert!(velocity.channels() >= 2, "velocity needs two channels");
    let grid = source.grid();
    let aspect = velocity.grid().aspect();
    out.fill_with_index(|x, y, cell| {
        let pos = grid.cell_center(x, y);
        let v = velocity.sample_vec2(pos);
        let back = pos.sub(Vec2::new(v.x / aspect, v.y).scale(dt));
        let sample = source.sample_linear(back);
        for (value, sampled) in cell.iter_mut().zip(sample) {
            *value = dissipation * sampled;
        }
    });
}
