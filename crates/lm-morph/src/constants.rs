//! Literature constants. These are external calibrations, not tunables.

/// LOKI camera pixel footprint, in millimetres per pixel.
pub const PIXEL_SIZE_MM: f64 = 0.023;

/// Lipid sac area (mm²) to total lipid mass (mg) power law,
/// `mass = 0.167 * area^1.42` (Vogedes et al., 2010).
pub const VOGEDES_MASS_COEFF: f64 = 0.167;
pub const VOGEDES_MASS_EXPONENT: f64 = 1.42;

/// Carbon fraction of wax-ester lipids (Tarling et al., 2022).
pub const LIPID_CARBON_FRACTION: f64 = 0.79;

/// Dry-mass fraction of copepod body tissue (Ikeda & Skjoldal, 1989).
pub const PROSOME_DRY_MASS_FRACTION: f64 = 0.2;

/// Carbon fraction of copepod dry mass (Ikeda & Skjoldal, 1989).
pub const PROSOME_CARBON_FRACTION: f64 = 0.45;

pub const UG_PER_MG: f64 = 1000.0;
