use core::f64::consts::{FRAC_PI_2, PI};

use lm_core::{Error, Point2, Polygon, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::check_scale;

/// Axis segment in pixel space with its physical length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub end_1: Point2,
    pub end_2: Point2,
    pub length_mm: f64,
}

impl Axis {
    pub fn midpoint(&self) -> Point2 {
        self.end_1.midpoint(self.end_2)
    }

    /// Direction angle from `end_1` to `end_2`, in radians.
    pub fn angle(&self) -> f64 {
        (self.end_2 - self.end_1).angle()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MajorAxis {
    pub axis: Axis,
    /// Mean of the polygon vertices; the axis is re-centred on it.
    pub centroid: Point2,
}

/// Longest vertex-to-vertex chord, re-centred on the vertex centroid.
///
/// All unordered vertex pairs are scanned in order and only a strictly longer
/// chord replaces the current one, so ties keep the first pair found. The
/// returned endpoints lie at `centroid ± unit * max_dist / 2`.
pub fn major_axis(poly: &Polygon, pixel_size_mm: f64) -> Result<MajorAxis, Error> {
    check_scale(pixel_size_mm)?;
    let pts = &poly.points;
    if pts.len() < 2 {
        return Err(Error::InsufficientPoints {
            needed: 2,
            actual: pts.len(),
        });
    }
    if !poly.is_finite() {
        return Err(Error::NonFiniteInput);
    }

    let mut max_dist = 0.0;
    let mut ends: Option<(Point2, Point2)> = None;
    for (i, &p1) in pts.iter().enumerate() {
        for &p2 in &pts[i + 1..] {
            let dist = p1.distance(p2);
            if dist > max_dist {
                max_dist = dist;
                ends = Some((p1, p2));
            }
        }
    }

    let Some((p1, p2)) = ends else {
        return Err(Error::InsufficientPoints {
            needed: 2,
            actual: poly.distinct_len(),
        });
    };
    let centroid = poly.vertex_centroid().ok_or(Error::InsufficientPoints {
        needed: 2,
        actual: 0,
    })?;

    let half = (p2 - p1).normalize() * (max_dist / 2.0);
    Ok(MajorAxis {
        axis: Axis {
            end_1: centroid - half,
            end_2: centroid + half,
            length_mm: max_dist * pixel_size_mm,
        },
        centroid,
    })
}

/// Minor axis length solved from the ellipse area identity
/// `area = PI * (major / 2) * (minor / 2)`, i.e. `minor = 4 * area / (PI * major)`.
///
/// The endpoints are synthesized for visual inspection only: they sit at 90°
/// to the major axis and cross it at its midpoint, which a real body outline
/// need not do.
pub fn minor_axis_from_area(
    area_mm2: f64,
    major: &Axis,
    pixel_size_mm: f64,
) -> Result<Axis, Error> {
    check_scale(pixel_size_mm)?;
    if !area_mm2.is_finite() {
        return Err(Error::NonFiniteInput);
    }
    if area_mm2 < 0.0 {
        return Err(Error::NegativeMeasure(area_mm2));
    }
    if !major.length_mm.is_finite() || major.length_mm <= 0.0 {
        return Err(Error::DegenerateAxis);
    }

    let length_mm = (4.0 * area_mm2) / (PI * major.length_mm);

    let center = major.midpoint();
    let half_px = (length_mm / pixel_size_mm) / 2.0;
    let offset = Vec2::from_angle(major.angle() + FRAC_PI_2) * half_px;

    Ok(Axis {
        end_1: center + offset,
        end_2: center - offset,
        length_mm,
    })
}
