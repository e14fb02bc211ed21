use core::fmt;

use lm_core::{Error, Point2, Polygon};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::area::polygon_area_mm2;
use crate::axes::{Axis, major_axis, minor_axis_from_area};
use crate::config::MorphConfig;
use crate::lipid::{Fullness, LipidContent};
use crate::volume::ellipsoid_volume_mm3;

/// Per-polygon shape features. Derived once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub area_mm2: f64,
    pub major: Axis,
    pub minor: Axis,
    pub centroid: Point2,
    pub volume_mm3: f64,
}

/// polygon -> area -> major axis -> minor axis -> volume.
pub fn compute_features(poly: &Polygon, pixel_size_mm: f64) -> Result<FeatureRecord, Error> {
    let area_mm2 = polygon_area_mm2(poly, pixel_size_mm)?;
    let major = major_axis(poly, pixel_size_mm)?;
    let minor = minor_axis_from_area(area_mm2, &major.axis, pixel_size_mm)?;
    let volume_mm3 = ellipsoid_volume_mm3(major.axis.length_mm, minor.length_mm);

    Ok(FeatureRecord {
        area_mm2,
        major: major.axis,
        minor,
        centroid: major.centroid,
        volume_mm3,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonRole {
    Prosome,
    Lipid,
}

impl fmt::Display for PolygonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prosome => write!(f, "prosome"),
            Self::Lipid => write!(f, "lipid"),
        }
    }
}

/// Geometry failure tagged with the polygon it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureError {
    pub role: PolygonRole,
    pub source: Error,
}

impl fmt::Display for FeatureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} polygon: {}", self.role, self.source)
    }
}

impl std::error::Error for FeatureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Prosome and lipid sac outlines of one annotated object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectPolygons {
    pub prosome: Polygon,
    pub lipid: Polygon,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectFeatures {
    pub prosome: FeatureRecord,
    pub lipid: FeatureRecord,
    pub lipid_content: LipidContent,
    pub fullness: Fullness,
}

pub fn compute_object_features(
    prosome: &Polygon,
    lipid: &Polygon,
    cfg: &MorphConfig,
) -> Result<ObjectFeatures, FeatureError> {
    let prosome = compute_features(prosome, cfg.pixel_size_mm).map_err(|source| FeatureError {
        role: PolygonRole::Prosome,
        source,
    })?;
    let lipid = compute_features(lipid, cfg.pixel_size_mm).map_err(|source| FeatureError {
        role: PolygonRole::Lipid,
        source,
    })?;

    Ok(ObjectFeatures {
        prosome,
        lipid,
        lipid_content: LipidContent::from_area(lipid.area_mm2),
        fullness: Fullness::from_measures(
            lipid.area_mm2,
            prosome.area_mm2,
            lipid.volume_mm3,
            prosome.volume_mm3,
        ),
    })
}

/// Computes every object independently. Output order matches input order;
/// skip/abort decisions on failures are left to the caller.
pub fn compute_batch(
    objects: &[ObjectPolygons],
    cfg: &MorphConfig,
) -> Vec<Result<ObjectFeatures, FeatureError>> {
    let out: Vec<_> = objects
        .par_iter()
        .map(|o| compute_object_features(&o.prosome, &o.lipid, cfg))
        .collect();

    let failed = out.iter().filter(|r| r.is_err()).count();
    tracing::debug!(total = out.len(), failed, "morphometric batch computed");
    out
}
