use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::pdbqt::PdbqtError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: PdbqtError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
