//! Lipid mass, carbon and fullness derivations.
//!
//! Ratios with a zero denominator are `NaN`, never an error: downstream
//! tables and plots drop such rows rather than abort a batch.

use serde::{Deserialize, Serialize};

use crate::constants::{
    LIPID_CARBON_FRACTION, PROSOME_CARBON_FRACTION, PROSOME_DRY_MASS_FRACTION, UG_PER_MG,
    VOGEDES_MASS_COEFF, VOGEDES_MASS_EXPONENT,
};

/// Total lipid mass (mg) from lipid sac area (mm²).
pub fn lipid_mass_mg(lipid_area_mm2: f64) -> f64 {
    VOGEDES_MASS_COEFF * lipid_area_mm2.powf(VOGEDES_MASS_EXPONENT)
}

/// Lipid carbon content (µg C) from lipid mass (mg).
pub fn lipid_carbon_ug(lipid_mass_mg: f64) -> f64 {
    lipid_mass_mg * LIPID_CARBON_FRACTION * UG_PER_MG
}

/// Lipid area over prosome area.
pub fn fullness_ratio_area(lipid_area_mm2: f64, prosome_area_mm2: f64) -> f64 {
    ratio(lipid_area_mm2, prosome_area_mm2)
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { f64::NAN } else { num / den }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LipidContent {
    pub mass_mg: f64,
    pub carbon_ug: f64,
}

impl LipidContent {
    pub fn from_area(lipid_area_mm2: f64) -> Self {
        let mass_mg = lipid_mass_mg(lipid_area_mm2);
        Self {
            mass_mg,
            carbon_ug: lipid_carbon_ug(mass_mg),
        }
    }
}

/// Carbon-equivalent split of a body into lipid and non-lipid tissue.
///
/// Sizes are areas (mm²) or volumes (mm³); both use the same factors. The
/// prosome term is negative when the lipid outline exceeds the prosome one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonPartition {
    pub lipid: f64,
    pub prosome: f64,
}

impl CarbonPartition {
    pub fn from_sizes(prosome_size: f64, lipid_size: f64) -> Self {
        Self {
            lipid: LIPID_CARBON_FRACTION * lipid_size,
            prosome: (prosome_size - lipid_size) * PROSOME_DRY_MASS_FRACTION
                * PROSOME_CARBON_FRACTION,
        }
    }

    /// `lipid / (prosome + lipid)`.
    pub fn fullness_ratio(&self) -> f64 {
        ratio(self.lipid, self.prosome + self.lipid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fullness {
    pub ratio_area: f64,
    pub carbon_area: CarbonPartition,
    pub ratio_carbon_area: f64,
    pub carbon_volume: CarbonPartition,
    pub ratio_carbon_volume: f64,
}

impl Fullness {
    pub fn from_measures(
        lipid_area_mm2: f64,
        prosome_area_mm2: f64,
        lipid_volume_mm3: f64,
        prosome_volume_mm3: f64,
    ) -> Self {
        let carbon_area = CarbonPartition::from_sizes(prosome_area_mm2, lipid_area_mm2);
        let carbon_volume = CarbonPartition::from_sizes(prosome_volume_mm3, lipid_volume_mm3);
        Self {
            ratio_area: fullness_ratio_area(lipid_area_mm2, prosome_area_mm2),
            carbon_area,
            ratio_carbon_area: carbon_area.fullness_ratio(),
            carbon_volume,
            ratio_carbon_volume: carbon_volume.fullness_ratio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{
        CarbonPartition, Fullness, LipidContent, fullness_ratio_area, lipid_carbon_ug,
        lipid_mass_mg,
    };

    #[test]
    fn mass_power_law_and_carbon() {
        let area = 0.000529;
        let mass = lipid_mass_mg(area);
        assert_eq!(mass, 0.167 * 0.000529_f64.powf(1.42));
        assert_eq!(lipid_carbon_ug(mass), mass * 0.79 * 1000.0);

        let c = LipidContent::from_area(area);
        assert_eq!(c.mass_mg, mass);
        assert_eq!(c.carbon_ug, mass * 0.79 * 1000.0);
        assert_eq!(LipidContent::from_area(0.0).carbon_ug, 0.0);
    }

    #[test]
    fn area_ratio() {
        assert_relative_eq!(fullness_ratio_area(0.3, 1.2), 0.25, max_relative = 1e-12);
        assert!(fullness_ratio_area(0.0, 0.0).is_nan());
        assert!(fullness_ratio_area(0.1, 0.0).is_nan());
    }

    #[test]
    fn carbon_partition_uses_literature_factors() {
        let c = CarbonPartition::from_sizes(1.0, 0.4);
        assert_relative_eq!(c.lipid, 0.79 * 0.4, max_relative = 1e-12);
        assert_relative_eq!(c.prosome, 0.6 * 0.2 * 0.45, max_relative = 1e-12);
        assert_relative_eq!(
            c.fullness_ratio(),
            0.316 / (0.316 + 0.054),
            max_relative = 1e-12
        );
    }

    #[test]
    fn carbon_ratio_is_nan_for_empty_object() {
        let c = CarbonPartition::from_sizes(0.0, 0.0);
        assert!(c.fullness_ratio().is_nan());
    }

    #[test]
    fn fullness_combines_area_and_volume() {
        let f = Fullness::from_measures(0.2, 1.0, 0.05, 0.5);
        assert_relative_eq!(f.ratio_area, 0.2);
        assert_eq!(f.ratio_carbon_area, f.carbon_area.fullness_ratio());
        assert_eq!(f.ratio_carbon_volume, f.carbon_volume.fullness_ratio());
        assert!(f.ratio_carbon_volume > 0.0 && f.ratio_carbon_volume < 1.0);
    }
}
