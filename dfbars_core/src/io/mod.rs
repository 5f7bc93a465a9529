//! Module for reading experiment definitions and writing trajectories
pub mod json;
pub mod table;

use thiserror::Error;

/// Errors raised while reading or writing run artifacts
#[derive(Error, Debug)]
pub enum IoError {
    /// The requested file could not be read
    #[error("Could not read file {0}")]
    FileNotFound(String),
    /// The file contents could not be deserialized
    #[error("Could not deserialize experiment: {0}")]
    Deserialize(#[from] serde_json::Error),
    /// The deserialized experiment was incomplete
    #[error("Invalid experiment definition: {0}")]
    InvalidExperiment(String),
    /// Writing the trajectory table failed
    #[error("Could not write trajectory: {0}")]
    Csv(#[from] csv::Error),
}
