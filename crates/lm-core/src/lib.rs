//! Foundational primitives for polygon morphometry.
//!
//! ## Coordinates
//! Points are `f64` pixel coordinates with `x` to the right and `y` down.
//! Integer coordinates refer to pixel centres, matching how annotation tools
//! export vertices and how masks are rasterized.
//!
//! ## Polygons
//! A [`Polygon`] is an ordered boundary walk with an implicit closing edge.
//! It is never repaired: self-intersecting input is measured as given.
//!
//! ## Masks
//! [`Image`] is a plain row-major buffer. [`fill_polygon`] rasterizes
//! annotations onto it for overlays and pixel-count checks.

mod error;
mod geom;
mod image;
mod polygon;
mod raster;

pub use error::Error;
pub use geom::{Point2, Vec2};
pub use image::{Image, Mask};
pub use polygon::{BoundingBox, Polygon};
pub use raster::{fill_polygon, polygon_mask};
