//! JSON bodies exchanged with the data service.
//!
//! Responses are validated here before they become model types, so a
//! misaligned array pair surfaces as [`GatewayError::Malformed`].

use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::GatewayError;
use crate::models::scan::validate_scan_list;
use crate::models::{
    Chromatogram,
    ChromatogramSource,
    FragmentSpectrum,
    ScanSummary,
    ShapeError,
    Spectrum,
};

impl From<ShapeError> for GatewayError {
    fn from(e: ShapeError) -> Self {
        GatewayError::Malformed(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct FilepathRequest<'a> {
    pub filepath: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ExtractRequest<'a> {
    pub filepath: &'a str,
    pub min_mz: f64,
    pub max_mz: f64,
}

#[derive(Debug, Serialize)]
pub struct SpectrumRequest<'a> {
    pub filepath: &'a str,
    pub rt: f64,
}

#[derive(Debug, Serialize)]
pub struct FragmentRequest<'a> {
    pub filepath: &'a str,
    pub precursor_mz: f64,
    pub rt: f64,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub filepath: String,
}

#[derive(Debug, Deserialize)]
pub struct DemoResponse {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct ChromatogramResponse {
    pub rts: Vec<f64>,
    pub ints: Vec<f64>,
}

impl ChromatogramResponse {
    pub fn into_chromatogram(
        self,
        source: ChromatogramSource,
    ) -> Result<Chromatogram, GatewayError> {
        Ok(Chromatogram::try_new(source, self.rts, self.ints)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanRow {
    pub id: usize,
    pub rt: f64,
    pub tic: f64,
    pub base_peak_mz: f64,
    pub base_peak_int: f64,
}

pub fn scan_list_from_rows(rows: Vec<ScanRow>) -> Result<Vec<ScanSummary>, GatewayError> {
    let scans: Vec<ScanSummary> = rows
        .into_iter()
        .map(|row| ScanSummary {
            index: row.id,
            retention_time_seconds: row.rt,
            total_intensity: row.tic,
            base_peak_mz: row.base_peak_mz,
            base_peak_intensity: row.base_peak_int,
        })
        .collect();
    validate_scan_list(&scans)?;
    Ok(scans)
}

#[derive(Debug, Deserialize)]
pub struct SpectrumResponse {
    pub mzs: Vec<f64>,
    pub ints: Vec<f64>,
    pub rt: f64,
    #[serde(default)]
    pub has_ms2: Option<Vec<f64>>,
}

impl TryFrom<SpectrumResponse> for Spectrum {
    type Error = GatewayError;

    fn try_from(value: SpectrumResponse) -> Result<Self, Self::Error> {
        Ok(Spectrum::try_new(
            value.mzs,
            value.ints,
            value.rt,
            value.has_ms2.unwrap_or_default(),
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct FragmentResponse {
    pub mzs: Vec<f64>,
    pub ints: Vec<f64>,
    pub rt: f64,
    pub precursor_mz: f64,
}

impl TryFrom<FragmentResponse> for FragmentSpectrum {
    type Error = GatewayError;

    fn try_from(value: FragmentResponse) -> Result<Self, Self::Error> {
        Ok(FragmentSpectrum::try_new(
            value.mzs,
            value.ints,
            value.rt,
            value.precursor_mz,
        )?)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Pull the `detail` message out of an error body, if there is one.
pub fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_without_ms2_flags() {
        let resp: SpectrumResponse =
            serde_json::from_str(r#"{"mzs":[100.0,200.0],"ints":[1.0,2.0],"rt":12.5}"#).unwrap();
        let spec = Spectrum::try_from(resp).unwrap();
        assert_eq!(spec.retention_time_seconds(), 12.5);
        assert!(spec.precursor_mzs_with_fragments().is_empty());
    }

    #[test]
    fn test_spectrum_length_mismatch_is_malformed() {
        let resp: SpectrumResponse = serde_json::from_str(
            r#"{"mzs":[100.0,200.0],"ints":[1.0],"rt":12.5,"has_ms2":[100.0]}"#,
        )
        .unwrap();
        assert!(matches!(
            Spectrum::try_from(resp),
            Err(GatewayError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        assert!(serde_json::from_str::<ChromatogramResponse>(r#"{"rts":[1.0]}"#).is_err());
    }

    #[test]
    fn test_chromatogram_mismatch_is_malformed() {
        let resp: ChromatogramResponse =
            serde_json::from_str(r#"{"rts":[1.0,2.0],"ints":[3.0]}"#).unwrap();
        assert!(matches!(
            resp.into_chromatogram(ChromatogramSource::Total),
            Err(GatewayError::Malformed(_))
        ));
    }

    #[test]
    fn test_scan_rows() {
        let rows: Vec<ScanRow> = serde_json::from_str(
            r#"[
                {"id":0,"rt":1.5,"tic":1000.0,"base_peak_mz":445.12,"base_peak_int":300.0},
                {"id":1,"rt":3.0,"tic":800.0,"base_peak_mz":391.28,"base_peak_int":120.0}
            ]"#,
        )
        .unwrap();
        let scans = scan_list_from_rows(rows).unwrap();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[1].index, 1);
        assert_eq!(scans[1].base_peak_mz, 391.28);
    }

    #[test]
    fn test_fragment_response() {
        let resp: FragmentResponse = serde_json::from_str(
            r#"{"mzs":[147.1,260.2],"ints":[10.0,4.0],"rt":30.2,"precursor_mz":445.12}"#,
        )
        .unwrap();
        let frag = FragmentSpectrum::try_from(resp).unwrap();
        assert_eq!(frag.precursor_mz(), 445.12);
        assert_eq!(frag.mzs().len(), 2);
    }

    #[test]
    fn test_detail_from_body() {
        assert_eq!(
            detail_from_body(r#"{"detail":"File not found"}"#),
            Some("File not found".to_string())
        );
        assert_eq!(detail_from_body("<html>oops</html>"), None);
        assert_eq!(detail_from_body(r#"{"other":1}"#), None);
        assert!(detail_from_body(r#"{"detail":[{"loc":["body","rt"]}]}"#).is_some());
    }

    #[test]
    fn test_request_bodies() {
        let body = serde_json::to_value(ExtractRequest {
            filepath: "/data/run.mzML",
            min_mz: 149.97,
            max_mz: 150.03,
        })
        .unwrap();
        assert_eq!(body["filepath"], "/data/run.mzML");
        assert_eq!(body["min_mz"], 149.97);
    }
}
