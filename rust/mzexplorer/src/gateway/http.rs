use reqwest::Url;
use reqwest::multipart::{
    Form,
    Part,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{
    debug,
    instrument,
};

use super::DataGateway;
use super::wire::{
    self,
    ChromatogramResponse,
    DemoResponse,
    ExtractRequest,
    FilepathRequest,
    FragmentRequest,
    FragmentResponse,
    ScanRow,
    SpectrumRequest,
    SpectrumResponse,
    UploadResponse,
};
use crate::errors::GatewayError;
use crate::models::{
    Chromatogram,
    ChromatogramSource,
    FragmentSpectrum,
    ScanSummary,
    Spectrum,
};
use crate::tolerance::MzWindow;

const UPLOAD: &str = "upload";
const DEMO_PATH: &str = "get-demo-path";
const TIC: &str = "get-tic";
const SCAN_LIST: &str = "get-scan-list";
const EXTRACT: &str = "extract-chromatogram";
const SPECTRUM: &str = "get-spectrum";
const MS2_SPECTRUM: &str = "get-ms2-spectrum";

/// [`DataGateway`] over the service's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|e| GatewayError::Transport(format!("invalid base url '{base_url}': {e}")))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::Transport(format!("invalid endpoint '{path}': {e}")))
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, GatewayError> {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!("Service returned {} with body: {}", status, body);
        return Err(GatewayError::Status {
            status: status.as_u16(),
            detail: wire::detail_from_body(&body),
        });
    }
    Ok(response.json::<R>().await?)
}

impl DataGateway for HttpGateway {
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn upload_file(
        &self,
        file_name: &str,
        payload: Vec<u8>,
    ) -> Result<String, GatewayError> {
        let part = Part::bytes(payload).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(self.endpoint(UPLOAD)?)
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = read_json(response).await?;
        Ok(uploaded.filepath)
    }

    #[instrument(skip(self))]
    async fn demo_dataset(&self) -> Result<String, GatewayError> {
        let response = self.client.get(self.endpoint(DEMO_PATH)?).send().await?;
        let demo: DemoResponse = read_json(response).await?;
        Ok(demo.path)
    }

    #[instrument(skip(self))]
    async fn total_chromatogram(&self, filepath: &str) -> Result<Chromatogram, GatewayError> {
        let resp: ChromatogramResponse = self
            .post_json(TIC, &FilepathRequest { filepath })
            .await?;
        resp.into_chromatogram(ChromatogramSource::Total)
    }

    #[instrument(skip(self))]
    async fn scan_list(&self, filepath: &str) -> Result<Vec<ScanSummary>, GatewayError> {
        let rows: Vec<ScanRow> = self
            .post_json(SCAN_LIST, &FilepathRequest { filepath })
            .await?;
        wire::scan_list_from_rows(rows)
    }

    #[instrument(skip(self))]
    async fn extract_chromatogram(
        &self,
        filepath: &str,
        window: MzWindow,
    ) -> Result<Chromatogram, GatewayError> {
        let body = ExtractRequest {
            filepath,
            min_mz: window.min_mz,
            max_mz: window.max_mz,
        };
        let resp: ChromatogramResponse = self.post_json(EXTRACT, &body).await?;
        resp.into_chromatogram(ChromatogramSource::Extracted(window))
    }

    #[instrument(skip(self))]
    async fn spectrum(&self, filepath: &str, rt_seconds: f64) -> Result<Spectrum, GatewayError> {
        let body = SpectrumRequest {
            filepath,
            rt: rt_seconds,
        };
        let resp: SpectrumResponse = self.post_json(SPECTRUM, &body).await?;
        Spectrum::try_from(resp)
    }

    #[instrument(skip(self))]
    async fn fragment_spectrum(
        &self,
        filepath: &str,
        precursor_mz: f64,
        rt_seconds: f64,
    ) -> Result<FragmentSpectrum, GatewayError> {
        let body = FragmentRequest {
            filepath,
            precursor_mz,
            rt: rt_seconds,
        };
        let resp: FragmentResponse = self.post_json(MS2_SPECTRUM, &body).await?;
        FragmentSpectrum::try_from(resp)
    }
}
