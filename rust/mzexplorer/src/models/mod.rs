//! Plain data entering the exploration core.
//!
//! Every array pair is index-aligned; constructors reject mismatched lengths
//! so nothing downstream has to re-check.

pub mod chromatogram;
pub mod scan;
pub mod spectrum;

pub use chromatogram::{
    Chromatogram,
    ChromatogramSource,
};
pub use scan::ScanSummary;
pub use spectrum::{
    FragmentSpectrum,
    PRECURSOR_MATCH_TOLERANCE_DA,
    Spectrum,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("expected {left} and {right} to have the same length, got {left_len} and {right_len}")]
    LengthMismatch {
        left: &'static str,
        right: &'static str,
        left_len: usize,
        right_len: usize,
    },

    #[error("scan at position {position} has index {index}")]
    NonDenseScanIndex { position: usize, index: usize },

    #[error("scan list is not ordered by retention time at position {position}")]
    UnorderedScans { position: usize },
}

pub(crate) fn check_aligned(
    left: &'static str,
    left_len: usize,
    right: &'static str,
    right_len: usize,
) -> Result<(), ShapeError> {
    if left_len != right_len {
        return Err(ShapeError::LengthMismatch {
            left,
            right,
            left_len,
            right_len,
        });
    }
    Ok(())
}
