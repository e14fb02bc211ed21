use core::fmt;

use lm_morph::FeatureError;

/// Failure decoding a polygon payload stored in a table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    Json(String),
    EmptyAnnotation,
    InvalidImageSize { width: f64, height: f64 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "malformed polygon json: {msg}"),
            Self::EmptyAnnotation => write!(f, "annotation holds no polygon"),
            Self::InvalidImageSize { width, height } => {
                write!(f, "invalid original image size {width}x{height}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Csv(csv::Error),
    Decode {
        object_id: String,
        column: &'static str,
        source: DecodeError,
    },
    Feature {
        object_id: String,
        source: FeatureError,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Decode {
                object_id,
                column,
                source,
            } => write!(f, "object '{object_id}', column {column}: {source}"),
            Self::Feature { object_id, source } => write!(f, "object '{object_id}': {source}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Decode { source, .. } => Some(source),
            Self::Feature { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for DatasetError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}
