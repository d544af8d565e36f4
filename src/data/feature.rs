use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Serialize, Deserialize};

use crate::data::identification::PeptideHit;

/// Id of a feature that has not yet been inserted into a run.
pub const UNASSIGNED_FEATURE_ID: i64 = -1;

/// Run tag of a feature that has not yet been assigned to a run.
pub const UNASSIGNED_RUN_ID: i64 = -1;

/// A detected analyte signal from one LC-MS run.
///
/// Features are produced by an upstream feature detector and stored, sorted
/// and tagged by [`LcMsRun`](crate::data::run::LcMsRun). The container takes
/// features by value and never shares mutable identity with the caller.
///
/// # Examples
///
/// ```
/// use lfqcore::data::feature::{Feature, UNASSIGNED_FEATURE_ID};
///
/// let feature = Feature::new(512.25, 1800.0, 2, 1.0e6);
/// assert_eq!(feature.feature_id, UNASSIGNED_FEATURE_ID);
/// assert!(!feature.has_ms2_info());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub feature_id: i64,
    pub mono_mz: f64,
    pub retention_time: f64,
    pub charge: i32,
    pub intensity: f64,
    pub run_id: i64,
    pub ms2_info: Option<PeptideHit>,
}

impl Feature {
    /// Creates a new `Feature` with an unassigned id and run tag.
    ///
    /// # Arguments
    ///
    /// * `mono_mz` - The monoisotopic m/z of the detected signal.
    /// * `retention_time` - The retention time in seconds.
    /// * `charge` - The charge state.
    /// * `intensity` - The integrated signal intensity.
    pub fn new(mono_mz: f64, retention_time: f64, charge: i32, intensity: f64) -> Self {
        Feature {
            feature_id: UNASSIGNED_FEATURE_ID,
            mono_mz,
            retention_time,
            charge,
            intensity,
            run_id: UNASSIGNED_RUN_ID,
            ms2_info: None,
        }
    }

    /// Returns true if the feature carries MS2-derived identification info.
    pub fn has_ms2_info(&self) -> bool {
        self.ms2_info.is_some()
    }

    /// Returns true if the feature carries identification info whose
    /// probability exceeds the given threshold.
    pub fn has_ms2_info_above(&self, probability_threshold: f64) -> bool {
        match &self.ms2_info {
            Some(hit) => hit.score > probability_threshold,
            None => false,
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "Feature(id: {}, mono_mz: {}, retention_time: {}, charge: {}, run_id: {})",
            self.feature_id, self.mono_mz, self.retention_time, self.charge, self.run_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms2_info_threshold_is_strict() {
        let mut feature = Feature::new(512.25, 1800.0, 2, 1.0e6);
        feature.ms2_info = Some(PeptideHit::new("PEPTIDER".to_string(), 2, 0.9));

        assert!(feature.has_ms2_info());
        assert!(feature.has_ms2_info_above(0.8));
        // equal to the threshold does not count as above
        assert!(!feature.has_ms2_info_above(0.9));
    }

    #[test]
    fn test_unidentified_feature_never_passes_threshold() {
        let feature = Feature::new(512.25, 1800.0, 2, 1.0e6);
        assert!(!feature.has_ms2_info());
        assert!(!feature.has_ms2_info_above(0.0));
    }
}
