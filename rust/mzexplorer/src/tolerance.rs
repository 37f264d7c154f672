use serde::{
    Deserialize,
    Serialize,
};

/// Symmetric m/z window used to extract an ion chromatogram.
///
/// Convention: the window is inclusive on both ends, `min_mz <= mz <= max_mz`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MzWindow {
    pub min_mz: f64,
    pub max_mz: f64,
}

impl MzWindow {
    pub fn contains(&self, mz: f64) -> bool {
        self.min_mz <= mz && mz <= self.max_mz
    }

    pub fn width(&self) -> f64 {
        self.max_mz - self.min_mz
    }
}

/// Calculate the window for `target_mz` at a tolerance of `ppm` parts-per-million.
///
/// Total over finite floats. Callers guard user-typed input before calling,
/// non-finite values propagate into the window unchanged.
///
/// ```
/// use mzexplorer::tolerance::mz_window;
///
/// let window = mz_window(150.0, 200.0);
/// assert!((window.min_mz - 149.97).abs() < 1e-9);
/// assert!((window.max_mz - 150.03).abs() < 1e-9);
/// ```
pub fn mz_window(target_mz: f64, ppm: f64) -> MzWindow {
    let delta = target_mz * ppm * 1e-6;
    MzWindow {
        min_mz: target_mz - delta,
        max_mz: target_mz + delta,
    }
}

/// Raw user input for the extracted chromatogram, kept as typed.
///
/// The window is derived on demand from the current values and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XicInput {
    pub target_mz: f64,
    pub ppm: f64,
}

impl XicInput {
    /// The window for the current input, or `None` when the input cannot
    /// describe one (non-finite or non-positive values).
    pub fn window(&self) -> Option<MzWindow> {
        let valid = self.target_mz.is_finite()
            && self.ppm.is_finite()
            && self.target_mz > 0.0
            && self.ppm >= 0.0;
        valid.then(|| mz_window(self.target_mz, self.ppm))
    }
}
