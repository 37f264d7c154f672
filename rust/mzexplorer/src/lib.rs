#![doc = include_str!("../README.md")]

// Declare modules
pub mod closest_scan;
pub mod config;
pub mod errors;
pub mod events;
pub mod explorer;
pub mod gateway;
pub mod integration;
pub mod models;
pub mod selection;
pub mod state;
pub mod stick_spectrum;
pub mod tolerance;
pub mod zoom;

// Re-export main structures
pub use crate::config::ExplorerConfig;
pub use crate::explorer::{
    Explorer,
    ExplorerCommand,
};
pub use crate::gateway::{
    DataGateway,
    HttpGateway,
};
pub use crate::models::{
    Chromatogram,
    ChromatogramSource,
    FragmentSpectrum,
    ScanSummary,
    Spectrum,
};
pub use crate::state::ExplorationState;
pub use crate::tolerance::{
    MzWindow,
    XicInput,
};

// Re-export errors
pub use crate::errors::{
    ExplorerError,
    GatewayError,
};
