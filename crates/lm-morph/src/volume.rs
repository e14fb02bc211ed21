use core::f64::consts::PI;

/// Prolate-spheroid volume from full axis lengths:
/// `V = 4/3 * PI * (major / 2) * (minor / 2)^2`.
///
/// The same approximation is applied to the lipid sac and the prosome.
pub fn ellipsoid_volume_mm3(major_mm: f64, minor_mm: f64) -> f64 {
    (4.0 / 3.0) * PI * (major_mm / 2.0) * (minor_mm / 2.0).powi(2)
}
