//! Tabular side of the lipid morphometry pipeline.
//!
//! - [`merge_annotations`] links EcoTaxa classifications with lipid sac and
//!   prosome annotations on object id.
//! - [`build_feature_table`] decodes both polygons of every merged row and
//!   runs the `lm-morph` feature chain over them.
//! - [`CalibrationRow`] and [`SummaryTable`] are the reduced views handed to
//!   model calibration and to exploratory reporting.
//!
//! Lipid polygons are stored in absolute pixels; prosome polygons come from
//! Label Studio in percent of the image and are converted on decode.

mod decode;
mod error;
mod io;
mod merge;
mod records;
mod table;

pub use decode::{
    LabelStudioPolygon, decode_lipid_polygon, decode_prosome_polygon, encode_points_json,
};
pub use error::{DatasetError, DecodeError};
pub use io::{
    Delimiter, read_rows, read_rows_from_path, write_rows, write_rows_to_path, write_summary,
};
pub use merge::{MergeConfig, merge_annotations};
pub use records::{
    ClassificationRow, LipidAnnotationRow, MergedRow, ProsomeAnnotationRow, lipid_object_id,
    prosome_object_id,
};
pub use table::{
    CalibrationRow, FeatureRow, FeatureTable, FeatureTableConfig, SkippedObject, SummaryTable,
    build_feature_table, decode_row, exclude_dates,
};
