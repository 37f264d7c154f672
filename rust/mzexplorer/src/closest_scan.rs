use crate::models::ScanSummary;

/// Index of the scan whose retention time is closest to `target_seconds`.
///
/// Scans left to right and only replaces the best on a strictly smaller
/// distance, so the first of several equidistant scans wins. Returns `None`
/// for an empty list.
pub fn closest_scan_index(scans: &[ScanSummary], target_seconds: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, scan) in scans.iter().enumerate() {
        let distance = (scan.retention_time_seconds - target_seconds).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((idx, distance)),
        }
    }
    best.map(|(idx, _)| idx)
}
