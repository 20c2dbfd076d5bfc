use crate::{DoubleField2, Field2, Vec2};

/// Adds a Gaussian-weighted `value` centered at the normalized `point`.
///
/// `aspect_ratio` stretches horizontal distances so the footprint is round
/// in physical space. `value` holds one entry per channel of the field.
pub fn splat(
    field: &mut DoubleField2,
    point: Vec2,
    value: &[f32],
    radius: f32,
    aspect_ratio: f32,
) {
    field.update(|read, write| splat_into(write, read, point, value, radius, aspect_ratio));
}

pub fn splat_into(
    out: &mut Field2,
    field: &Field2,
    point: Vec2,
    value: &[f32],
    radius: f32,
    aspect_ratio: f32,
) {
    out.assert_same_shape(field);
    assert_eq!(value.len(), field.channels(), "field channel mismatch");
    let grid = field.grid();
    out.fill_with_index(|x, y, cell| {
        let weight = splat_weight(grid.cell_center(x, y), point, radius, aspect_ratio);
        for ((out_value, current), add) in cell.iter_mut().zip(field.get(x, y)).zip(value) {
            *out_value = current + weight * add;
        }
    });
}

/// `exp(-|d|^2 / radius)` with `d.x` scaled by `aspect_ratio`.
pub fn splat_weight(pos: Vec2, point: Vec2, radius: f32, aspect_ratio: f32) -> f32 {
    let d = pos.sub(point);
    let d = Vec2::new(d.x * aspect_ratio, d.y);
    (-d.length_squared() / radius).exp()
}
