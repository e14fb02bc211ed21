//! Umbrella crate for the `lipid-morphometry` workspace.
//!
//! Re-exports the geometry primitives, the per-object feature chain and the
//! dataset pipeline so downstream code can depend on a single crate.

pub use lm_core::*;
pub use lm_dataset::*;
pub use lm_morph::*;
