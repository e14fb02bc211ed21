//! Morphometric features of annotated copepod outlines.
//!
//! Each polygon runs through a fixed chain of closed-form steps:
//! - area by the shoelace formula, scaled to mm²;
//! - major axis as the longest vertex chord, re-centred on the vertex mean;
//! - minor axis solved from the ellipse area identity (length only; its
//!   endpoints are a visualization aid);
//! - prolate-spheroid volume from both axes.
//!
//! For an object with a prosome and a lipid sac outline, [`compute_object_features`]
//! adds lipid mass and carbon plus three fullness ratios. All functions are
//! pure; [`compute_batch`] maps objects in parallel and keeps input order.

mod area;
mod axes;
mod config;
pub mod constants;
mod features;
mod lipid;
mod volume;

pub use area::{polygon_area_mm2, polygon_area_px2};
pub use axes::{Axis, MajorAxis, major_axis, minor_axis_from_area};
pub use config::MorphConfig;
pub use features::{
    FeatureError, FeatureRecord, ObjectFeatures, ObjectPolygons, PolygonRole, compute_batch,
    compute_features, compute_object_features,
};
pub use lipid::{
    CarbonPartition, Fullness, LipidContent, fullness_ratio_area, lipid_carbon_ug, lipid_mass_mg,
};
pub use volume::ellipsoid_volume_mm3;
