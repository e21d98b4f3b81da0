use std::io;
use std::path::PathBuf;

use json_decoder::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{source_name}: {source}")]
    Decode {
        source_name: String,
        #[source]
        source: DecodeError,
    },

    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),

    #[error("failed to serialize summary: {0}")]
    Serialize(#[from] serde_json::Error),
}
