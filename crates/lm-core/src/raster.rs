//! Polygon rasterization onto [`Mask`] buffers.
//!
//! Integer coordinates refer to pixel centres. A pixel belongs to a polygon
//! when its centre lies inside under the even-odd rule. Rows and spans are
//! half-open (top-left rule), so shared vertices are not counted twice and an
//! axis-aligned rectangle covers exactly its area in pixels.

use crate::Error;
use crate::image::{Image, Mask};
use crate::polygon::Polygon;

/// Fills every pixel whose centre is inside `poly` with `value`.
///
/// Pixels outside the image are clipped. Returns the number of pixels
/// written.
pub fn fill_polygon(mask: &mut Mask, poly: &Polygon, value: u8) -> Result<usize, Error> {
    if !poly.is_finite() {
        return Err(Error::NonFiniteInput);
    }
    if poly.len() < 3 || mask.width() == 0 || mask.height() == 0 {
        return Ok(0);
    }
    let Some(bb) = poly.bounding_box() else {
        return Ok(0);
    };

    let max_row = (mask.height() - 1) as f64;
    let max_col = (mask.width() - 1) as f64;
    let row_lo = bb.min.y.ceil().max(0.0);
    let row_hi = bb.max.y.floor().min(max_row);
    if row_lo > row_hi {
        return Ok(0);
    }

    let mut written = 0;
    let mut xs: Vec<f64> = Vec::with_capacity(8);
    for row in row_lo as usize..=row_hi as usize {
        let y = row as f64;
        xs.clear();
        for (a, b) in poly.edges() {
            let crosses = (a.y <= y && y < b.y) || (b.y <= y && y < a.y);
            if crosses {
                xs.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        xs.sort_by(f64::total_cmp);

        for span in xs.chunks_exact(2) {
            let lo = span[0].ceil().max(0.0);
            let hi = (span[1].ceil() - 1.0).min(max_col);
            if lo > hi {
                continue;
            }
            for col in lo as usize..=hi as usize {
                mask.set(col, row, value)?;
                written += 1;
            }
        }
    }

    Ok(written)
}

/// Binary (0/1) mask of `poly` on a `width` x `height` grid.
pub fn polygon_mask(poly: &Polygon, width: usize, height: usize) -> Result<Mask, Error> {
    let mut mask = Image::new_fill(width, height, 0u8)?;
    fill_polygon(&mut mask, poly, 1)?;
    Ok(mask)
}
