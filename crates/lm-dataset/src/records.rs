use serde::{Deserialize, Deserializer, Serialize};

/// EcoTaxa export row. Other export columns are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRow {
    pub object_id: String,
    pub object_date: String,
    pub object_annotation_category: String,
}

/// Lipid sac segmentation row (`;`-separated export).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LipidAnnotationRow {
    pub filename: String,
    pub segmentation: String,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default, deserialize_with = "lenient_dim")]
    pub shape_y: Option<u32>,
    #[serde(default, deserialize_with = "lenient_dim")]
    pub shape_x: Option<u32>,
}

/// Label Studio prosome export row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProsomeAnnotationRow {
    pub image: String,
    pub label: String,
}

/// Classification joined with both annotations. Unmatched annotation
/// columns stay empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MergedRow {
    pub object_id: String,
    pub object_date: String,
    pub object_annotation_category: String,
    #[serde(default)]
    pub lipid_polygon: Option<String>,
    #[serde(default)]
    pub shape_lipid_polygon: Option<String>,
    #[serde(default, deserialize_with = "lenient_dim")]
    pub shape_y_lipid_polygon: Option<u32>,
    #[serde(default, deserialize_with = "lenient_dim")]
    pub shape_x_lipid_polygon: Option<u32>,
    #[serde(default)]
    pub prosome_polygon: Option<String>,
}

impl LipidAnnotationRow {
    pub fn object_id(&self) -> String {
        lipid_object_id(&self.filename)
    }
}

impl ProsomeAnnotationRow {
    pub fn object_id(&self) -> String {
        prosome_object_id(&self.image)
    }
}

/// Lipid exports name files after the object id: `<object_id>.bmp`.
pub fn lipid_object_id(filename: &str) -> String {
    filename.replace(".bmp", "")
}

/// Maps a Label Studio image path back to the EcoTaxa object id.
///
/// Keeps the file name, drops `.bmp`/`.jpg`, keeps what follows the last `-`
/// (the upload prefix) and turns `_` back into spaces.
pub fn prosome_object_id(image_path: &str) -> String {
    let name = image_path.rsplit('/').next().unwrap_or(image_path);
    let name = name.replace(".bmp", "").replace(".jpg", "");
    let name = match name.rsplit_once('-') {
        Some((_, tail)) => tail,
        None => name.as_str(),
    };
    name.replace('_', " ")
}

/// Image dimensions may be written as `512` or, after a pass through a
/// dataframe with missing values, as `512.0`.
fn lenient_dim<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let v: f64 = raw
        .parse()
        .map_err(|_| serde::de::Error::custom(format!("invalid image dimension '{raw}'")))?;
    if !(v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64) {
        return Err(serde::de::Error::custom(format!(
            "invalid image dimension '{raw}'"
        )));
    }
    Ok(Some(v as u32))
}
