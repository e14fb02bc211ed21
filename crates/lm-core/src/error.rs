use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Polygon has too few (distinct) vertices for the requested measure.
    InsufficientPoints { needed: usize, actual: usize },
    /// Major axis of length zero; the area-derived minor axis is undefined.
    DegenerateAxis,
    NonFiniteInput,
    /// An area or length that must not be negative.
    NegativeMeasure(f64),
    InvalidScale(f64),
    SizeMismatch { expected: usize, actual: usize },
    OutOfBounds,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientPoints { needed, actual } => {
                write!(f, "insufficient polygon points: need {needed}, got {actual}")
            }
            Self::DegenerateAxis => write!(f, "degenerate geometry: zero-length major axis"),
            Self::NonFiniteInput => write!(f, "non-finite coordinate or measurement"),
            Self::NegativeMeasure(v) => write!(f, "negative measure: {v}"),
            Self::InvalidScale(s) => write!(f, "invalid pixel size: {s} mm/px"),
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::OutOfBounds => write!(f, "out of bounds"),
        }
    }
}

impl std::error::Error for Error {}
