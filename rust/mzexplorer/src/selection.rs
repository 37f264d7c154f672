//! Turning pointer, keyboard and table input into a retention time.
//!
//! These resolve *what* to fetch. Issuing the fetch and applying its result
//! is the controller's job.

use crate::events::{
    PixelToData,
    ScanStep,
};
use crate::models::{
    ScanSummary,
    Spectrum,
};

/// How a spectrum fetch was triggered, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumTrigger {
    ChartClick,
    KeyboardStep,
    TableRow,
    Direct,
}

/// Minutes-domain x of a chromatogram click.
///
/// Uses the hit data point when there is one, otherwise inverts the pixel
/// position through `axis`.
pub fn resolve_click_minutes(
    x: Option<f64>,
    pixel_x: Option<f64>,
    axis: Option<&dyn PixelToData>,
) -> Option<f64> {
    if let Some(x) = x.filter(|x| x.is_finite()) {
        return Some(x);
    }
    let pixel_x = pixel_x?;
    axis?.x_from_pixel(pixel_x).filter(|x| x.is_finite())
}

/// Row to move to for a keyboard step, `None` at either end of the list or
/// when no row is selected.
pub fn step_target(scans: &[ScanSummary], current: Option<usize>, step: ScanStep) -> Option<usize> {
    let current = current?;
    let target = match step {
        ScanStep::Previous => current.checked_sub(1)?,
        ScanStep::Next => current + 1,
    };
    (target < scans.len()).then_some(target)
}

/// Exact stored retention time of table row `index`.
pub fn row_retention_time(scans: &[ScanSummary], index: usize) -> Option<f64> {
    scans.get(index).map(|s| s.retention_time_seconds)
}

/// The precursor and retention time to request an MS2 spectrum for, when
/// `clicked_mz` lands on a peak flagged as having fragment data.
pub fn fragment_target(spectrum: Option<&Spectrum>, clicked_mz: f64) -> Option<(f64, f64)> {
    let spec = spectrum?;
    let precursor = spec.precursor_near(clicked_mz)?;
    Some((precursor, spec.retention_time_seconds()))
}
