//! Boundary to the remote data service.
//!
//! [`DataGateway`] is the only thing in the crate that performs I/O. The rest
//! of the core builds [`FetchRequest`]s, hands them to [`execute`], and
//! applies the resulting [`FetchOutcome`].

mod http;
pub mod wire;

pub use http::HttpGateway;

use serde::Serialize;
use tracing::instrument;

use crate::errors::GatewayError;
use crate::models::{
    Chromatogram,
    FragmentSpectrum,
    ScanSummary,
    Spectrum,
};
use crate::tolerance::MzWindow;

/// Operations offered by the data service.
#[allow(async_fn_in_trait)]
pub trait DataGateway {
    /// Upload a raw file, returning the service-side path to open.
    async fn upload_file(&self, file_name: &str, payload: Vec<u8>)
    -> Result<String, GatewayError>;
    /// Path of the bundled demo dataset.
    async fn demo_dataset(&self) -> Result<String, GatewayError>;
    async fn total_chromatogram(&self, filepath: &str) -> Result<Chromatogram, GatewayError>;
    async fn scan_list(&self, filepath: &str) -> Result<Vec<ScanSummary>, GatewayError>;
    async fn extract_chromatogram(
        &self,
        filepath: &str,
        window: MzWindow,
    ) -> Result<Chromatogram, GatewayError>;
    async fn spectrum(&self, filepath: &str, rt_seconds: f64) -> Result<Spectrum, GatewayError>;
    async fn fragment_spectrum(
        &self,
        filepath: &str,
        precursor_mz: f64,
        rt_seconds: f64,
    ) -> Result<FragmentSpectrum, GatewayError>;
}

/// Identifies the request a response belongs to.
///
/// A response is applied only while both generations are still the latest
/// ones issued for the open file and for the request's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub file_generation: u64,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    DemoDataset {
        ticket: Ticket,
    },
    Upload {
        ticket: Ticket,
        file_name: String,
        payload: Vec<u8>,
    },
    TotalChromatogram {
        ticket: Ticket,
        filepath: String,
    },
    ScanList {
        ticket: Ticket,
        filepath: String,
    },
    ExtractedChromatogram {
        ticket: Ticket,
        filepath: String,
        window: MzWindow,
    },
    Spectrum {
        ticket: Ticket,
        filepath: String,
        rt_seconds: f64,
    },
    FragmentSpectrum {
        ticket: Ticket,
        filepath: String,
        precursor_mz: f64,
        rt_seconds: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    DemoDataset {
        ticket: Ticket,
        result: Result<String, GatewayError>,
    },
    Upload {
        ticket: Ticket,
        result: Result<String, GatewayError>,
    },
    TotalChromatogram {
        ticket: Ticket,
        result: Result<Chromatogram, GatewayError>,
    },
    ScanList {
        ticket: Ticket,
        result: Result<Vec<ScanSummary>, GatewayError>,
    },
    ExtractedChromatogram {
        ticket: Ticket,
        window: MzWindow,
        result: Result<Chromatogram, GatewayError>,
    },
    Spectrum {
        ticket: Ticket,
        rt_seconds: f64,
        result: Result<Spectrum, GatewayError>,
    },
    FragmentSpectrum {
        ticket: Ticket,
        precursor_mz: f64,
        result: Result<FragmentSpectrum, GatewayError>,
    },
}

/// Run one request against the gateway.
#[instrument(level = "debug", skip_all)]
pub async fn execute<G: DataGateway>(gateway: &G, request: FetchRequest) -> FetchOutcome {
    match request {
        FetchRequest::DemoDataset { ticket } => FetchOutcome::DemoDataset {
            ticket,
            result: gateway.demo_dataset().await,
        },
        FetchRequest::Upload {
            ticket,
            file_name,
            payload,
        } => FetchOutcome::Upload {
            ticket,
            result: gateway.upload_file(&file_name, payload).await,
        },
        FetchRequest::TotalChromatogram { ticket, filepath } => FetchOutcome::TotalChromatogram {
            ticket,
            result: gateway.total_chromatogram(&filepath).await,
        },
        FetchRequest::ScanList { ticket, filepath } => FetchOutcome::ScanList {
            ticket,
            result: gateway.scan_list(&filepath).await,
        },
        FetchRequest::ExtractedChromatogram {
            ticket,
            filepath,
            window,
        } => FetchOutcome::ExtractedChromatogram {
            ticket,
            window,
            result: gateway.extract_chromatogram(&filepath, window).await,
        },
        FetchRequest::Spectrum {
            ticket,
            filepath,
            rt_seconds,
        } => FetchOutcome::Spectrum {
            ticket,
            rt_seconds,
            result: gateway.spectrum(&filepath, rt_seconds).await,
        },
        FetchRequest::FragmentSpectrum {
            ticket,
            filepath,
            precursor_mz,
            rt_seconds,
        } => FetchOutcome::FragmentSpectrum {
            ticket,
            precursor_mz,
            result: gateway
                .fragment_spectrum(&filepath, precursor_mz, rt_seconds)
                .await,
        },
    }
}
