use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Failure to read one of the input files
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid GeoJSON", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("{}: expected a GeoJSON FeatureCollection", path.display())]
    NotFeatureCollection { path: PathBuf },

    #[error("failed to parse CSV {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("{}: missing column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: String },
}

pub type LoadResult<T> = Result<T, LoadError>;
