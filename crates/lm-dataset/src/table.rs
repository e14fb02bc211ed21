use std::collections::{BTreeMap, BTreeSet};

use lm_core::Point2;
use lm_morph::{MorphConfig, ObjectFeatures, ObjectPolygons, compute_batch};
use serde::{Deserialize, Serialize};

use crate::decode::{decode_lipid_polygon, decode_prosome_polygon, encode_points_json};
use crate::error::DatasetError;
use crate::records::{ClassificationRow, MergedRow};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureTableConfig {
    pub morph: MorphConfig,
    /// Drop objects whose geometry fails instead of aborting the table.
    pub skip_invalid: bool,
}

/// Merged row plus every derived column. Axis endpoints and centroids are
/// split into `_x`/`_y` pixel columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub object_id: String,
    pub object_date: String,
    pub object_annotation_category: String,
    pub lipid_polygon: String,
    pub shape_lipid_polygon: Option<String>,
    pub shape_y_lipid_polygon: Option<u32>,
    pub shape_x_lipid_polygon: Option<u32>,
    pub prosome_polygon: String,
    pub prosome_polygon_points_px: String,

    pub lipid_area_mm2: f64,
    pub prosome_area_mm2: f64,
    pub total_lipids_mg: f64,
    #[serde(rename = "total_lipids_ugC")]
    pub total_lipids_ug_c: f64,
    pub fullness_ratio_area: f64,
    pub total_lipids_carbon_area: f64,
    pub prosome_carbon_area: f64,
    pub fullness_ratio_carbon_area: f64,

    pub prosome_major_end_1_x: f64,
    pub prosome_major_end_1_y: f64,
    pub prosome_major_end_2_x: f64,
    pub prosome_major_end_2_y: f64,
    pub prosome_major_axis_mm: f64,
    pub prosome_centroid_x: f64,
    pub prosome_centroid_y: f64,
    pub prosome_minor_axis_mm: f64,
    pub prosome_minor_end_1_x: f64,
    pub prosome_minor_end_1_y: f64,
    pub prosome_minor_end_2_x: f64,
    pub prosome_minor_end_2_y: f64,

    pub lipid_major_end_1_x: f64,
    pub lipid_major_end_1_y: f64,
    pub lipid_major_end_2_x: f64,
    pub lipid_major_end_2_y: f64,
    pub lipid_major_axis_mm: f64,
    pub lipid_centroid_x: f64,
    pub lipid_centroid_y: f64,
    pub lipid_minor_axis_mm: f64,
    pub lipid_minor_end_1_x: f64,
    pub lipid_minor_end_1_y: f64,
    pub lipid_minor_end_2_x: f64,
    pub lipid_minor_end_2_y: f64,

    pub prosome_volume_mm3: f64,
    pub lipid_volume_mm3: f64,
    pub total_lipids_carbon_volume: f64,
    pub prosome_carbon_volume: f64,
    pub fullness_ratio_carbon_volume: f64,
}

impl FeatureRow {
    pub fn new(merged: &MergedRow, prosome_points_px: String, f: &ObjectFeatures) -> Self {
        let xy = |p: Point2| (p.x, p.y);
        let (pm1x, pm1y) = xy(f.prosome.major.end_1);
        let (pm2x, pm2y) = xy(f.prosome.major.end_2);
        let (pn1x, pn1y) = xy(f.prosome.minor.end_1);
        let (pn2x, pn2y) = xy(f.prosome.minor.end_2);
        let (lm1x, lm1y) = xy(f.lipid.major.end_1);
        let (lm2x, lm2y) = xy(f.lipid.major.end_2);
        let (ln1x, ln1y) = xy(f.lipid.minor.end_1);
        let (ln2x, ln2y) = xy(f.lipid.minor.end_2);

        Self {
            object_id: merged.object_id.clone(),
            object_date: merged.object_date.clone(),
            object_annotation_category: merged.object_annotation_category.clone(),
            lipid_polygon: merged.lipid_polygon.clone().unwrap_or_default(),
            shape_lipid_polygon: merged.shape_lipid_polygon.clone(),
            shape_y_lipid_polygon: merged.shape_y_lipid_polygon,
            shape_x_lipid_polygon: merged.shape_x_lipid_polygon,
            prosome_polygon: merged.prosome_polygon.clone().unwrap_or_default(),
            prosome_polygon_points_px: prosome_points_px,

            lipid_area_mm2: f.lipid.area_mm2,
            prosome_area_mm2: f.prosome.area_mm2,
            total_lipids_mg: f.lipid_content.mass_mg,
            total_lipids_ug_c: f.lipid_content.carbon_ug,
            fullness_ratio_area: f.fullness.ratio_area,
            total_lipids_carbon_area: f.fullness.carbon_area.lipid,
            prosome_carbon_area: f.fullness.carbon_area.prosome,
            fullness_ratio_carbon_area: f.fullness.ratio_carbon_area,

            prosome_major_end_1_x: pm1x,
            prosome_major_end_1_y: pm1y,
            prosome_major_end_2_x: pm2x,
            prosome_major_end_2_y: pm2y,
            prosome_major_axis_mm: f.prosome.major.length_mm,
            prosome_centroid_x: f.prosome.centroid.x,
            prosome_centroid_y: f.prosome.centroid.y,
            prosome_minor_axis_mm: f.prosome.minor.length_mm,
            prosome_minor_end_1_x: pn1x,
            prosome_minor_end_1_y: pn1y,
            prosome_minor_end_2_x: pn2x,
            prosome_minor_end_2_y: pn2y,

            lipid_major_end_1_x: lm1x,
            lipid_major_end_1_y: lm1y,
            lipid_major_end_2_x: lm2x,
            lipid_major_end_2_y: lm2y,
            lipid_major_axis_mm: f.lipid.major.length_mm,
            lipid_centroid_x: f.lipid.centroid.x,
            lipid_centroid_y: f.lipid.centroid.y,
            lipid_minor_axis_mm: f.lipid.minor.length_mm,
            lipid_minor_end_1_x: ln1x,
            lipid_minor_end_1_y: ln1y,
            lipid_minor_end_2_x: ln2x,
            lipid_minor_end_2_y: ln2y,

            prosome_volume_mm3: f.prosome.volume_mm3,
            lipid_volume_mm3: f.lipid.volume_mm3,
            total_lipids_carbon_volume: f.fullness.carbon_volume.lipid,
            prosome_carbon_volume: f.fullness.carbon_volume.prosome,
            fullness_ratio_carbon_volume: f.fullness.ratio_carbon_volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedObject {
    pub object_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
    pub skipped: Vec<SkippedObject>,
}

/// Decoded polygons of one merged row, or `None` when an annotation is
/// missing.
pub fn decode_row(row: &MergedRow) -> Result<Option<ObjectPolygons>, DatasetError> {
    let (Some(lipid), Some(prosome)) = (&row.lipid_polygon, &row.prosome_polygon) else {
        return Ok(None);
    };

    let decode_err = |column, source| DatasetError::Decode {
        object_id: row.object_id.clone(),
        column,
        source,
    };
    let lipid = decode_lipid_polygon(lipid).map_err(|e| decode_err("lipid_polygon", e))?;
    let prosome = decode_prosome_polygon(prosome)
        .map_err(|e| decode_err("prosome_polygon", e))?
        .polygon;

    Ok(Some(ObjectPolygons { prosome, lipid }))
}

/// Computes the feature table for merged rows.
///
/// Rows missing an annotation are always skipped. Rows whose polygons fail
/// to decode or measure abort the table unless `skip_invalid` is set.
pub fn build_feature_table(
    merged: &[MergedRow],
    cfg: &FeatureTableConfig,
) -> Result<FeatureTable, DatasetError> {
    let mut table = FeatureTable::default();
    let mut sources: Vec<&MergedRow> = Vec::with_capacity(merged.len());
    let mut objects: Vec<ObjectPolygons> = Vec::with_capacity(merged.len());

    for row in merged {
        match decode_row(row) {
            Ok(Some(obj)) => {
                sources.push(row);
                objects.push(obj);
            }
            Ok(None) => {
                tracing::warn!(object_id = %row.object_id, "missing lipid or prosome polygon, skipped");
                table.skipped.push(SkippedObject {
                    object_id: row.object_id.clone(),
                    reason: "missing annotation".to_owned(),
                });
            }
            Err(e) if cfg.skip_invalid => {
                tracing::warn!(object_id = %row.object_id, error = %e, "undecodable polygon, skipped");
                table.skipped.push(SkippedObject {
                    object_id: row.object_id.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    let results = compute_batch(&objects, &cfg.morph);
    for ((row, obj), result) in sources.into_iter().zip(&objects).zip(results) {
        match result {
            Ok(features) => {
                let points_px =
                    encode_points_json(&obj.prosome).map_err(|source| DatasetError::Decode {
                        object_id: row.object_id.clone(),
                        column: "prosome_polygon_points_px",
                        source,
                    })?;
                table.rows.push(FeatureRow::new(row, points_px, &features));
            }
            Err(source) if cfg.skip_invalid => {
                tracing::warn!(object_id = %row.object_id, error = %source, "invalid geometry, skipped");
                table.skipped.push(SkippedObject {
                    object_id: row.object_id.clone(),
                    reason: source.to_string(),
                });
            }
            Err(source) => {
                return Err(DatasetError::Feature {
                    object_id: row.object_id.clone(),
                    source,
                });
            }
        }
    }

    tracing::info!(
        rows = table.rows.len(),
        skipped = table.skipped.len(),
        "feature table built"
    );
    Ok(table)
}

/// Rows whose `object_date` is not in `dates`.
pub fn exclude_dates(rows: &[FeatureRow], dates: &[String]) -> Vec<FeatureRow> {
    rows.iter()
        .filter(|r| !dates.iter().any(|d| d == &r.object_date))
        .cloned()
        .collect()
}

/// Columns consumed by the life-history model calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRow {
    pub object_annotation_category: String,
    #[serde(rename = "total_lipids_ugC")]
    pub total_lipids_ug_c: f64,
    pub fullness_ratio_carbon_volume: f64,
}

impl From<&FeatureRow> for CalibrationRow {
    fn from(r: &FeatureRow) -> Self {
        Self {
            object_annotation_category: r.object_annotation_category.clone(),
            total_lipids_ug_c: r.total_lipids_ug_c,
            fullness_ratio_carbon_volume: r.fullness_ratio_carbon_volume,
        }
    }
}

/// Object counts per sampling date and category, zero-filled.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SummaryTable {
    pub categories: Vec<String>,
    /// `(date, counts)` with counts aligned to `categories`.
    pub rows: Vec<(String, Vec<usize>)>,
}

impl SummaryTable {
    pub fn from_rows(rows: &[ClassificationRow]) -> Self {
        let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
        let mut categories: BTreeSet<&str> = BTreeSet::new();
        for r in rows {
            *counts
                .entry(r.object_date.as_str())
                .or_default()
                .entry(r.object_annotation_category.as_str())
                .or_default() += 1;
            categories.insert(r.object_annotation_category.as_str());
        }

        let categories: Vec<&str> = categories.into_iter().collect();
        let rows = counts
            .into_iter()
            .map(|(date, per_cat)| {
                let cells = categories
                    .iter()
                    .map(|c| per_cat.get(c).copied().unwrap_or(0))
                    .collect();
                (date.to_owned(), cells)
            })
            .collect();

        Self {
            categories: categories.into_iter().map(str::to_owned).collect(),
            rows,
        }
    }

    pub fn count(&self, date: &str, category: &str) -> Option<usize> {
        let col = self.categories.iter().position(|c| c == category)?;
        let (_, cells) = self.rows.iter().find(|(d, _)| d == date)?;
        cells.get(col).copied()
    }
}
