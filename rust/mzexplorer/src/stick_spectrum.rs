//! Stick (stem) rendering of centroided peaks as two line series.
//!
//! Every peak becomes three samples: `(mz, 0)`, `(mz, intensity)` and a
//! `None` break. Drawn as a connected line this yields one vertical stick
//! per peak, and the break keeps neighbouring sticks from being joined.

use serde::Serialize;

use crate::models::PRECURSOR_MATCH_TOLERANCE_DA;

/// Line-series coordinates for normal and highlighted peaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StickSeries {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub highlighted_x: Vec<Option<f64>>,
    pub highlighted_y: Vec<Option<f64>>,
}

impl StickSeries {
    pub fn normal_peak_count(&self) -> usize {
        self.x.len() / 3
    }

    pub fn highlighted_peak_count(&self) -> usize {
        self.highlighted_x.len() / 3
    }

    /// Peaks across both channels.
    pub fn peak_count(&self) -> usize {
        self.normal_peak_count() + self.highlighted_peak_count()
    }
}

fn push_stick(xs: &mut Vec<Option<f64>>, ys: &mut Vec<Option<f64>>, mz: f64, intensity: f64) {
    xs.extend([Some(mz), Some(mz), None]);
    ys.extend([Some(0.0), Some(intensity), None]);
}

/// Build stick series, routing peaks within 0.1 Da of any `highlight_mzs`
/// value into the highlighted channel.
///
/// `mzs` and `intensities` are index-aligned; extra trailing values on either
/// side are ignored.
pub fn build_stick_series(mzs: &[f64], intensities: &[f64], highlight_mzs: &[f64]) -> StickSeries {
    let mut out = StickSeries::default();
    for (&mz, &intensity) in mzs.iter().zip(intensities.iter()) {
        let highlighted = highlight_mzs
            .iter()
            .any(|h| (h - mz).abs() < PRECURSOR_MATCH_TOLERANCE_DA);
        if highlighted {
            push_stick(
                &mut out.highlighted_x,
                &mut out.highlighted_y,
                mz,
                intensity,
            );
        } else {
            push_stick(&mut out.x, &mut out.y, mz, intensity);
        }
    }
    out
}
