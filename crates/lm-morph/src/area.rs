use lm_core::{Error, Polygon};

use crate::config::check_scale;

/// Shoelace area in square pixels.
///
/// The point "before" the first vertex is the last one, so the ring is
/// closed implicitly. Orientation does not matter. Fewer than three vertices
/// is an error; three or more vertices with fewer than three distinct ones
/// measure zero.
pub fn polygon_area_px2(poly: &Polygon) -> Result<f64, Error> {
    if poly.len() < 3 {
        return Err(Error::InsufficientPoints {
            needed: 3,
            actual: poly.len(),
        });
    }
    if !poly.is_finite() {
        return Err(Error::NonFiniteInput);
    }

    let (mut x_dot_prev_y, mut y_dot_prev_x) = (0.0, 0.0);
    for (prev, cur) in poly.edges() {
        x_dot_prev_y += cur.x * prev.y;
        y_dot_prev_x += cur.y * prev.x;
    }

    Ok(0.5 * (x_dot_prev_y - y_dot_prev_x).abs())
}

/// Shoelace area converted to mm² with `pixel_size_mm` millimetres per pixel.
pub fn polygon_area_mm2(poly: &Polygon, pixel_size_mm: f64) -> Result<f64, Error> {
    check_scale(pixel_size_mm)?;
    Ok(polygon_area_px2(poly)? * pixel_size_mm.powi(2))
}
