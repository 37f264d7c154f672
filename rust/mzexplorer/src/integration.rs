//! Trapezoidal peak area over a selected retention-time window.

use serde::{
    Deserialize,
    Serialize,
};

use crate::models::Chromatogram;

/// What the user selected on the chromatogram, in minutes.
///
/// An explicit range takes precedence; without one the range spans the
/// x-coordinates of the selected points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSelection {
    pub range_minutes: Option<(f64, f64)>,
    pub point_xs_minutes: Vec<f64>,
}

impl IntegrationSelection {
    pub fn from_range(min_x: f64, max_x: f64) -> Self {
        Self {
            range_minutes: Some((min_x, max_x)),
            point_xs_minutes: Vec::new(),
        }
    }

    pub fn from_points(xs: Vec<f64>) -> Self {
        Self {
            range_minutes: None,
            point_xs_minutes: xs,
        }
    }

    /// `(min, max)` in minutes, or `None` when nothing was selected.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        if let Some((a, b)) = self.range_minutes {
            return Some((a.min(b), a.max(b)));
        }
        let mut xs = self.point_xs_minutes.iter().copied().filter(|x| x.is_finite());
        let first = xs.next()?;
        Some(xs.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
    }
}

/// Area under the active chromatogram plus the samples it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationResult {
    pub area: f64,
    pub sample_times_minutes: Vec<f64>,
    pub sample_intensities: Vec<f64>,
}

/// Integrate `chromatogram` over the selected window.
///
/// Samples are kept when `time_seconds / 60` lies in the inclusive window, in
/// their original order. Fewer than two qualifying samples yield `None` and
/// the caller keeps whatever result it had. The area uses seconds on x:
/// `sum((y[i] + y[i+1]) / 2 * (t[i+1] - t[i]))`.
pub fn integrate(
    selection: &IntegrationSelection,
    chromatogram: &Chromatogram,
) -> Option<IntegrationResult> {
    let (min_x, max_x) = selection.bounds()?;

    let (sample_times_minutes, sample_intensities): (Vec<f64>, Vec<f64>) = chromatogram
        .points_minutes()
        .filter(|&(x, _)| min_x <= x && x <= max_x)
        .unzip();

    if sample_times_minutes.len() < 2 {
        return None;
    }

    let area = sample_times_minutes
        .windows(2)
        .zip(sample_intensities.windows(2))
        .map(|(x, y)| (y[0] + y[1]) / 2.0 * (x[1] * 60.0 - x[0] * 60.0))
        .sum();

    Some(IntegrationResult {
        area,
        sample_times_minutes,
        sample_intensities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChromatogramSource;

    fn ramp() -> Chromatogram {
        Chromatogram::try_new(
            ChromatogramSource::Total,
            vec![0.0, 60.0, 120.0],
            vec![0.0, 10.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_linear_ramp_area() {
        let result = integrate(&IntegrationSelection::from_range(0.0, 2.0), &ramp()).unwrap();
        assert!((result.area - 600.0).abs() < 1e-9);
        assert_eq!(result.sample_times_minutes, vec![0.0, 1.0, 2.0]);
        assert_eq!(result.sample_intensities, vec![0.0, 10.0, 0.0]);
    }

    #[test]
    fn test_window_is_inclusive() {
        let result = integrate(&IntegrationSelection::from_range(1.0, 2.0), &ramp()).unwrap();
        assert_eq!(result.sample_times_minutes, vec![1.0, 2.0]);
        assert!((result.area - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_is_no_result() {
        assert!(integrate(&IntegrationSelection::from_range(0.9, 1.1), &ramp()).is_none());
        assert!(integrate(&IntegrationSelection::from_range(5.0, 6.0), &ramp()).is_none());
    }

    #[test]
    fn test_points_define_range_when_no_explicit_range() {
        let selection = IntegrationSelection::from_points(vec![2.0, 0.0, 1.0]);
        assert_eq!(selection.bounds(), Some((0.0, 2.0)));
        let result = integrate(&selection, &ramp()).unwrap();
        assert!((result.area - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_range_wins_over_points() {
        let selection = IntegrationSelection {
            range_minutes: Some((1.0, 2.0)),
            point_xs_minutes: vec![0.0, 2.0],
        };
        assert_eq!(selection.bounds(), Some((1.0, 2.0)));
    }

    #[test]
    fn test_reversed_range_is_normalized() {
        let selection = IntegrationSelection::from_range(2.0, 0.0);
        assert_eq!(selection.bounds(), Some((0.0, 2.0)));
    }

    #[test]
    fn test_empty_selection_has_no_bounds() {
        assert_eq!(IntegrationSelection::default().bounds(), None);
        assert!(integrate(&IntegrationSelection::default(), &ramp()).is_none());
    }
}
