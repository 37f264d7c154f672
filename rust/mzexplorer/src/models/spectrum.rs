use serde::Serialize;

use super::{
    ShapeError,
    check_aligned,
};

/// Absolute tolerance (Da) used to match a peak against a precursor with fragment data.
pub const PRECURSOR_MATCH_TOLERANCE_DA: f64 = 0.1;

/// MS1 spectrum at one retention time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    mzs: Vec<f64>,
    intensities: Vec<f64>,
    retention_time_seconds: f64,
    precursor_mzs_with_fragments: Vec<f64>,
}

impl Spectrum {
    pub fn try_new(
        mzs: Vec<f64>,
        intensities: Vec<f64>,
        retention_time_seconds: f64,
        precursor_mzs_with_fragments: Vec<f64>,
    ) -> Result<Self, ShapeError> {
        check_aligned("mzs", mzs.len(), "ints", intensities.len())?;
        Ok(Self {
            mzs,
            intensities,
            retention_time_seconds,
            precursor_mzs_with_fragments,
        })
    }

    pub fn mzs(&self) -> &[f64] {
        &self.mzs
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn retention_time_seconds(&self) -> f64 {
        self.retention_time_seconds
    }

    pub fn precursor_mzs_with_fragments(&self) -> &[f64] {
        &self.precursor_mzs_with_fragments
    }

    pub fn max_intensity(&self) -> f64 {
        max_of(&self.intensities)
    }

    /// Intensities scaled so the base peak reads 100.
    ///
    /// Returns the raw intensities when the spectrum is empty or all zero.
    pub fn normalized_intensities(&self) -> Vec<f64> {
        let max = self.max_intensity();
        if max <= 0.0 {
            return self.intensities.clone();
        }
        self.intensities.iter().map(|i| i * 100.0 / max).collect()
    }

    /// The flagged precursor within tolerance of `mz`, if any.
    pub fn precursor_near(&self, mz: f64) -> Option<f64> {
        self.precursor_mzs_with_fragments
            .iter()
            .copied()
            .find(|p| (p - mz).abs() < PRECURSOR_MATCH_TOLERANCE_DA)
    }
}

/// MS2 spectrum of one precursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentSpectrum {
    mzs: Vec<f64>,
    intensities: Vec<f64>,
    retention_time_seconds: f64,
    precursor_mz: f64,
}

impl FragmentSpectrum {
    pub fn try_new(
        mzs: Vec<f64>,
        intensities: Vec<f64>,
        retention_time_seconds: f64,
        precursor_mz: f64,
    ) -> Result<Self, ShapeError> {
        check_aligned("mzs", mzs.len(), "ints", intensities.len())?;
        Ok(Self {
            mzs,
            intensities,
            retention_time_seconds,
            precursor_mz,
        })
    }

    pub fn mzs(&self) -> &[f64] {
        &self.mzs
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    pub fn retention_time_seconds(&self) -> f64 {
        self.retention_time_seconds
    }

    pub fn precursor_mz(&self) -> f64 {
        self.precursor_mz
    }
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_misaligned_spectrum() {
        assert!(Spectrum::try_new(vec![100.0], vec![], 10.0, vec![]).is_err());
        assert!(FragmentSpectrum::try_new(vec![], vec![1.0], 10.0, 500.0).is_err());
    }

    #[test]
    fn test_normalized_intensities() {
        let spec = Spectrum::try_new(vec![100.0, 200.0], vec![5.0, 20.0], 1.0, vec![]).unwrap();
        assert_eq!(spec.normalized_intensities(), vec![25.0, 100.0]);
    }

    #[test]
    fn test_normalized_all_zero_is_unchanged() {
        let spec = Spectrum::try_new(vec![100.0], vec![0.0], 1.0, vec![]).unwrap();
        assert_eq!(spec.normalized_intensities(), vec![0.0]);
    }

    #[test]
    fn test_precursor_near_uses_absolute_tolerance() {
        let spec = Spectrum::try_new(vec![], vec![], 1.0, vec![445.12, 600.3]).unwrap();
        assert_eq!(spec.precursor_near(445.18), Some(445.12));
        assert_eq!(spec.precursor_near(445.25), None);
        assert_eq!(spec.precursor_near(600.3), Some(600.3));
    }
}
