//! Inputs coming from the rendering layer.
//!
//! Pointer and selection callbacks arrive as a small closed set of tagged
//! variants. Keyboard steps are delivered through a [`KeyboardHub`]
//! subscription owned by the controller.

use serde::{
    Deserialize,
    Serialize,
};
use std::sync::mpsc::{
    Receiver,
    Sender,
};
use std::sync::{
    Arc,
    Mutex,
};

/// Pointer interaction on the chromatogram pane, x in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChartEvent {
    /// A click. `x` is set when a data point was hit, otherwise the pixel
    /// position is resolved through the registered [`PixelToData`].
    PointClick {
        x: Option<f64>,
        pixel_x: Option<f64>,
    },
    /// Box selection with explicit bounds.
    RangeSelect { min_x: f64, max_x: f64 },
    /// Lasso or multi-point selection without explicit bounds.
    PointsSelect { xs: Vec<f64> },
}

/// Inverse transform from a pane's pixel space to its data space.
pub trait PixelToData {
    fn x_from_pixel(&self, pixel_x: f64) -> Option<f64>;
}

/// Linear pixel-to-data mapping for a plot area spanning
/// `[pixel_left, pixel_left + pixel_width]` and showing `[data_min, data_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearAxis {
    pub pixel_left: f64,
    pub pixel_width: f64,
    pub data_min: f64,
    pub data_max: f64,
}

impl PixelToData for LinearAxis {
    fn x_from_pixel(&self, pixel_x: f64) -> Option<f64> {
        if self.pixel_width <= 0.0 || !pixel_x.is_finite() {
            return None;
        }
        let fraction = (pixel_x - self.pixel_left) / self.pixel_width;
        Some(self.data_min + fraction * (self.data_max - self.data_min))
    }
}

/// Move the scan selection by one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStep {
    Previous,
    Next,
}

/// Fan-out of keyboard scan steps to subscribers.
///
/// Subscribers are channel receivers; dropping one unsubscribes it, and the
/// hub forgets it on the next emit.
#[derive(Debug, Clone, Default)]
pub struct KeyboardHub {
    subscribers: Arc<Mutex<Vec<Sender<ScanStep>>>>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<ScanStep> {
        let (tx, rx) = std::sync::mpsc::channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    pub fn emit(&self, step: ScanStep) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|tx| tx.send(step).is_ok());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}
