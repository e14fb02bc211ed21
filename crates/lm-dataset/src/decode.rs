//! Polygon payloads as stored by the two annotation tools.
//!
//! Lipid sacs come as `[[[x, y], ...], ...]` in absolute pixels; only the
//! first ring is used. Prosomes come from Label Studio as a list of regions
//! whose `points` are percentages of the original image size.

use lm_core::Polygon;
use serde::Deserialize;

use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStudioPolygon {
    /// Absolute pixel coordinates.
    pub polygon: Polygon,
    pub original_width: u32,
    pub original_height: u32,
}

#[derive(Debug, Deserialize)]
struct LabelStudioRegion {
    points: Vec<[f64; 2]>,
    original_width: f64,
    original_height: f64,
}

pub fn decode_lipid_polygon(payload: &str) -> Result<Polygon, DecodeError> {
    let rings: Vec<Vec<[f64; 2]>> = serde_json::from_str(payload)?;
    let first = rings.into_iter().next().ok_or(DecodeError::EmptyAnnotation)?;
    if first.is_empty() {
        return Err(DecodeError::EmptyAnnotation);
    }
    Ok(Polygon::from_pairs(first))
}

/// Decodes the first Label Studio region and converts its points to pixels.
///
/// Each coordinate becomes `trunc(p * size / 100)`, which snaps the outline
/// to the integer pixel grid the way the annotation export was consumed
/// historically.
pub fn decode_prosome_polygon(payload: &str) -> Result<LabelStudioPolygon, DecodeError> {
    let regions: Vec<LabelStudioRegion> = serde_json::from_str(payload)?;
    let region = regions
        .into_iter()
        .next()
        .ok_or(DecodeError::EmptyAnnotation)?;
    if region.points.is_empty() {
        return Err(DecodeError::EmptyAnnotation);
    }

    let (w, h) = (region.original_width, region.original_height);
    let valid_dim = |v: f64| v.is_finite() && v >= 1.0 && v <= u32::MAX as f64 && v.fract() == 0.0;
    if !valid_dim(w) || !valid_dim(h) {
        return Err(DecodeError::InvalidImageSize {
            width: w,
            height: h,
        });
    }

    let polygon = Polygon::from_pairs(
        region
            .points
            .iter()
            .map(|&[x, y]| [(x * w / 100.0).trunc(), (y * h / 100.0).trunc()]),
    );

    Ok(LabelStudioPolygon {
        polygon,
        original_width: w as u32,
        original_height: h as u32,
    })
}

/// `[[x, y], ...]` text for a polygon, as stored in derived tables.
pub fn encode_points_json(poly: &Polygon) -> Result<String, DecodeError> {
    let pairs: Vec<[f64; 2]> = poly.points.iter().map(|&p| p.into()).collect();
    Ok(serde_json::to_string(&pairs)?)
}
