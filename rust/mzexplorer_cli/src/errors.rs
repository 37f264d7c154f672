use mzexplorer::{
    ExplorerError,
    GatewayError,
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Explorer(#[from] ExplorerError),

    #[error("Error setting up the data service client: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Error reading file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error starting the async runtime: {0}")]
    Runtime(std::io::Error),

    #[error("Error writing output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Exploration finished with an error: {0}")]
    Session(String),
}
