//! Per-pane zoom windows.
//!
//! Each pane keeps its own x window; `None` means "fit all data". The y-axis
//! upper bound is never stored, it is derived from the samples inside the
//! current window every time it is asked for.

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pane {
    Chromatogram,
    Ms1,
    Ms2,
}

impl Pane {
    pub const ALL: [Pane; 3] = [Pane::Chromatogram, Pane::Ms1, Pane::Ms2];
}

/// Explicit x-axis bounds of a zoomed pane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomWindow {
    pub min_x: f64,
    pub max_x: f64,
}

impl ZoomWindow {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            min_x: a.min(b),
            max_x: a.max(b),
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        self.min_x <= x && x <= self.max_x
    }
}

/// Axis notification coming back from a rendered pane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AxisEvent {
    /// The user zoomed or panned to explicit bounds.
    RangeChanged { min: f64, max: f64 },
    /// Double-click reset or "autoscale".
    AutoRange,
    /// The pane was resized and refit its data.
    Resized,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZoomWindows {
    chromatogram: Option<ZoomWindow>,
    ms1: Option<ZoomWindow>,
    ms2: Option<ZoomWindow>,
}

impl ZoomWindows {
    pub fn get(&self, pane: Pane) -> Option<ZoomWindow> {
        *self.slot(pane)
    }

    pub fn apply(&mut self, pane: Pane, event: AxisEvent) {
        let slot = self.slot_mut(pane);
        *slot = match event {
            AxisEvent::RangeChanged { min, max } if min.is_finite() && max.is_finite() => {
                Some(ZoomWindow::new(min, max))
            }
            AxisEvent::RangeChanged { .. } => {
                tracing::warn!("Ignoring non-finite axis range for {:?}", pane);
                return;
            }
            AxisEvent::AutoRange | AxisEvent::Resized => None,
        };
    }

    pub fn reset(&mut self, pane: Pane) {
        *self.slot_mut(pane) = None;
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    pub fn is_all_reset(&self) -> bool {
        Pane::ALL.iter().all(|&p| self.get(p).is_none())
    }

    fn slot(&self, pane: Pane) -> &Option<ZoomWindow> {
        match pane {
            Pane::Chromatogram => &self.chromatogram,
            Pane::Ms1 => &self.ms1,
            Pane::Ms2 => &self.ms2,
        }
    }

    fn slot_mut(&mut self, pane: Pane) -> &mut Option<ZoomWindow> {
        match pane {
            Pane::Chromatogram => &mut self.chromatogram,
            Pane::Ms1 => &mut self.ms1,
            Pane::Ms2 => &mut self.ms2,
        }
    }
}

/// Upper y bound for a pane: `1.1 *` the largest intensity whose x is inside
/// `window` (all samples when `window` is `None`).
///
/// With `normalize_to` set, intensities are first scaled by `100 / normalize_to`.
/// A window with no samples, or only non-positive ones, yields `1.0`.
pub fn y_axis_upper_bound(
    xs: &[f64],
    intensities: &[f64],
    window: Option<ZoomWindow>,
    normalize_to: Option<f64>,
) -> f64 {
    let scale = match normalize_to {
        Some(max) if max > 0.0 => 100.0 / max,
        _ => 1.0,
    };
    let max_in_window = xs
        .iter()
        .zip(intensities.iter())
        .filter(|(x, _)| window.is_none_or(|w| w.contains(**x)))
        .map(|(_, &y)| y * scale)
        .fold(f64::NEG_INFINITY, f64::max);

    if max_in_window > 0.0 {
        max_in_window * 1.1
    } else {
        1.0
    }
}
