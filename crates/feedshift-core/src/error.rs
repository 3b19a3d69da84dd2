// crates/feedshift-core/src/error.rs

use thiserror::Error;

use crate::fetch::FetchError;
use crate::settings::ConfigError;
use crate::transform::TransformError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed download failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("XML error: {0}")]
    Xml(#[from] feedshift_parser::XmlError),

    #[error("Transformation failed: {0}")]
    Transform(#[from] TransformError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
