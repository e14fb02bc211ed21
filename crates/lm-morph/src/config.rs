use lm_core::Error;
use serde::{Deserialize, Serialize};

use crate::constants::PIXEL_SIZE_MM;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorphConfig {
    /// Millimetres per pixel, constant across a dataset.
    pub pixel_size_mm: f64,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            pixel_size_mm: PIXEL_SIZE_MM,
        }
    }
}

impl MorphConfig {
    pub fn validate(&self) -> Result<(), Error> {
        check_scale(self.pixel_size_mm)
    }
}

pub(crate) fn check_scale(pixel_size_mm: f64) -> Result<(), Error> {
    if pixel_size_mm.is_finite() && pixel_size_mm > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidScale(pixel_size_mm))
    }
}
