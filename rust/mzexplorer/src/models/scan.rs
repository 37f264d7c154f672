use serde::Serialize;

use super::ShapeError;

/// One row of the scan table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub index: usize,
    pub retention_time_seconds: f64,
    pub total_intensity: f64,
    pub base_peak_mz: f64,
    pub base_peak_intensity: f64,
}

/// Check that indices are dense `0..N-1` and retention times never decrease.
pub(crate) fn validate_scan_list(scans: &[ScanSummary]) -> Result<(), ShapeError> {
    for (position, scan) in scans.iter().enumerate() {
        if scan.index != position {
            return Err(ShapeError::NonDenseScanIndex {
                position,
                index: scan.index,
            });
        }
        if position > 0 && scan.retention_time_seconds < scans[position - 1].retention_time_seconds {
            return Err(ShapeError::UnorderedScans { position });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(index: usize, rt: f64) -> ScanSummary {
        ScanSummary {
            index,
            retention_time_seconds: rt,
            total_intensity: 0.0,
            base_peak_mz: 0.0,
            base_peak_intensity: 0.0,
        }
    }

    #[test]
    fn test_accepts_dense_sorted_list() {
        let scans = vec![scan(0, 1.0), scan(1, 1.0), scan(2, 3.5)];
        assert!(validate_scan_list(&scans).is_ok());
        assert!(validate_scan_list(&[]).is_ok());
    }

    #[test]
    fn test_rejects_gap_in_indices() {
        let scans = vec![scan(0, 1.0), scan(2, 2.0)];
        assert_eq!(
            validate_scan_list(&scans),
            Err(ShapeError::NonDenseScanIndex {
                position: 1,
                index: 2
            })
        );
    }

    #[test]
    fn test_rejects_unordered_times() {
        let scans = vec![scan(0, 5.0), scan(1, 2.0)];
        assert_eq!(
            validate_scan_list(&scans),
            Err(ShapeError::UnorderedScans { position: 1 })
        );
    }
}
