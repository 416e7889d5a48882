use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to render: the rolling window table is empty")]
    EmptyTable,

    #[error("Failed to serialize the chart figure: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open {} in a viewer: {source}", .path.display())]
    Viewer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
