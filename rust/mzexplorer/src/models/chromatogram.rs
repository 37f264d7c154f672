use serde::Serialize;

use super::{
    ShapeError,
    check_aligned,
};
use crate::tolerance::MzWindow;

/// Where a chromatogram came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ChromatogramSource {
    /// Total ion current of every MS1 scan.
    Total,
    /// Ion current restricted to an m/z window.
    Extracted(MzWindow),
}

/// Intensity over retention time, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chromatogram {
    source: ChromatogramSource,
    times_seconds: Vec<f64>,
    intensities: Vec<f64>,
}

impl Chromatogram {
    pub fn try_new(
        source: ChromatogramSource,
        times_seconds: Vec<f64>,
        intensities: Vec<f64>,
    ) -> Result<Self, ShapeError> {
        check_aligned(
            "rts",
            times_seconds.len(),
            "ints",
            intensities.len(),
        )?;
        Ok(Self {
            source,
            times_seconds,
            intensities,
        })
    }

    pub fn source(&self) -> ChromatogramSource {
        self.source
    }

    pub fn times_seconds(&self) -> &[f64] {
        &self.times_seconds
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn len(&self) -> usize {
        self.times_seconds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times_seconds.is_empty()
    }

    /// Samples as `(minutes, intensity)`, the domain the chromatogram pane plots in.
    pub fn points_minutes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times_seconds
            .iter()
            .zip(self.intensities.iter())
            .map(|(&t, &y)| (t / 60.0, y))
    }
}
