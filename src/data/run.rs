use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use ordered_float::OrderedFloat;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::data::feature::{Feature, UNASSIGNED_FEATURE_ID, UNASSIGNED_RUN_ID};
use crate::error::LfqError;

/// Probability thresholds applied when counting and filtering identified
/// features.
///
/// Process-wide tunables, set once at pipeline startup and passed explicitly
/// to the counting operations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentificationThresholds {
    pub minimal_peptide_probability: f64,
    pub peptide_probability: f64,
}

impl Default for IdentificationThresholds {
    fn default() -> Self {
        IdentificationThresholds { minimal_peptide_probability: 0.0, peptide_probability: 0.9 }
    }
}

/// Total order on features: ascending monoisotopic m/z, ties broken by
/// ascending retention time.
pub fn compare_mz_then_rt(a: &Feature, b: &Feature) -> Ordering {
    OrderedFloat(a.mono_mz)
        .cmp(&OrderedFloat(b.mono_mz))
        .then_with(|| OrderedFloat(a.retention_time).cmp(&OrderedFloat(b.retention_time)))
}

/// One LC-MS run: the detected features of a single experiment together with
/// its per-run metadata.
///
/// Besides the feature list, a run carries the names of the raw data files it
/// was built from and the retention-time-dependent alignment error band the
/// cross-run matching stage queries via [`alignment_error_at`](Self::alignment_error_at).
///
/// # Examples
///
/// ```
/// use lfqcore::data::feature::Feature;
/// use lfqcore::data::run::LcMsRun;
///
/// let mut run = LcMsRun::new("sample_01".to_string(), 3);
/// let id = run.add_feature(Feature::new(512.25, 1800.0, 2, 1.0e6));
/// assert_eq!(id, 0);
/// assert_eq!(run.feature_count(), 1);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LcMsRun {
    name: String,
    features: Vec<Feature>,
    run_id: i64,
    master_run_id: Option<i64>,
    raw_source_names: BTreeMap<i64, String>,
    alignment_error: BTreeMap<OrderedFloat<f64>, (f64, f64)>,
}

impl LcMsRun {
    pub fn new(name: String, run_id: i64) -> Self {
        LcMsRun {
            name,
            features: Vec::new(),
            run_id,
            master_run_id: None,
            raw_source_names: BTreeMap::new(),
            alignment_error: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Compares this run's label against the given name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn set_run_id(&mut self, run_id: i64) {
        self.run_id = run_id;
    }

    /// The reference run this run was aligned against, once alignment has
    /// been established.
    pub fn master_run_id(&self) -> Option<i64> {
        self.master_run_id
    }

    pub fn set_master_run_id(&mut self, master_run_id: i64) {
        self.master_run_id = Some(master_run_id);
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut [Feature] {
        &mut self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn clear_features(&mut self) {
        self.features.clear();
    }

    /// Adds a feature to the run, taking ownership of it.
    ///
    /// A feature with an unassigned id receives the current feature count as
    /// its id. Explicitly assigned ids are kept unchanged; the caller must
    /// coordinate them to avoid collisions after removals. Returns the id the
    /// feature was stored under.
    pub fn add_feature(&mut self, mut feature: Feature) -> i64 {
        if feature.feature_id == UNASSIGNED_FEATURE_ID {
            feature.feature_id = self.features.len() as i64;
        }
        let feature_id = feature.feature_id;
        self.features.push(feature);
        feature_id
    }

    /// Removes the feature at the given position, returning it, or `None` if
    /// the position is out of range. Out-of-range removal leaves the run
    /// unchanged.
    pub fn remove_feature(&mut self, index: usize) -> Option<Feature> {
        if index < self.features.len() {
            Some(self.features.remove(index))
        } else {
            None
        }
    }

    /// Removes the first feature with the given id, returning it, or `None`
    /// if no feature carries that id.
    pub fn remove_feature_by_id(&mut self, feature_id: i64) -> Option<Feature> {
        let index = self.features.iter().position(|f| f.feature_id == feature_id)?;
        Some(self.features.remove(index))
    }

    /// Searches the feature list for the feature with the given id.
    pub fn find_feature_by_id(&self, feature_id: i64) -> Option<&Feature> {
        self.features.iter().find(|f| f.feature_id == feature_id)
    }

    /// Writes this run's id into every feature's run tag, so features can be
    /// traced back to their origin after runs are merged.
    pub fn tag_features_with_run_id(&mut self) {
        for feature in &mut self.features {
            feature.run_id = self.run_id;
        }
    }

    /// Sorts the feature list in place by ascending monoisotopic m/z, with
    /// ties broken by ascending retention time. The sort is stable.
    pub fn order_by_mass(&mut self) {
        self.features.sort_by(compare_mz_then_rt);
    }

    /// Counts the features tagged with the given run id, a quick overlap
    /// metric used during alignment quality assessment.
    pub fn count_common_peaks(&self, other_run_id: i64) -> usize {
        self.features.iter().filter(|f| f.run_id == other_run_id).count()
    }

    /// Counts the features that carry MS2 identification info.
    pub fn count_identified_features(&self) -> usize {
        self.features.iter().filter(|f| f.has_ms2_info()).count()
    }

    /// Counts the features whose MS2 identification probability exceeds the
    /// given threshold.
    pub fn count_identified_features_above(&self, probability_threshold: f64) -> usize {
        self.features
            .iter()
            .filter(|f| f.has_ms2_info_above(probability_threshold))
            .count()
    }

    /// Registers a raw data file under the given id, overwriting any entry
    /// already stored at that id.
    pub fn add_raw_source(&mut self, id: i64, name: String) {
        self.raw_source_names.insert(id, name);
    }

    pub fn remove_raw_source(&mut self, id: i64) -> Option<String> {
        self.raw_source_names.remove(&id)
    }

    pub fn raw_source_name(&self, id: i64) -> Option<&str> {
        self.raw_source_names.get(&id).map(String::as_str)
    }

    pub fn has_raw_source(&self, id: i64) -> bool {
        self.raw_source_names.contains_key(&id)
    }

    pub fn raw_source_count(&self) -> usize {
        self.raw_source_names.len()
    }

    pub fn raw_sources(&self) -> impl Iterator<Item = (i64, &str)> {
        self.raw_source_names.iter().map(|(&id, name)| (id, name.as_str()))
    }

    /// Merges another run's raw source registry into this one.
    ///
    /// An incoming id that is already registered is offset by the current
    /// registry size, repeatedly until a free id is found, so no entry is
    /// lost or overwritten.
    pub fn merge_raw_sources(&mut self, sources: BTreeMap<i64, String>) {
        for (mut id, name) in sources {
            while self.raw_source_names.contains_key(&id) {
                debug!(raw_source_id = id, "raw source id collision, renumbering");
                id += self.raw_source_names.len() as i64;
            }
            self.raw_source_names.insert(id, name);
        }
    }

    /// Records the alignment error band at the given retention time,
    /// overwriting any entry recorded at exactly that retention time.
    pub fn add_alignment_error(&mut self, retention_time: f64, error_up: f64, error_down: f64) {
        self.alignment_error
            .insert(OrderedFloat(retention_time), (error_up, error_down));
    }

    pub fn alignment_error_count(&self) -> usize {
        self.alignment_error.len()
    }

    /// Returns the `(error_up, error_down)` correction applicable at the
    /// given retention time.
    ///
    /// The table is sparse: a query at a recorded retention time returns the
    /// stored pair, a query between two recorded points linearly interpolates
    /// both components, and a query outside the recorded range clamps to the
    /// nearest end entry. Querying an empty table is an error, there is no
    /// sane default correction.
    pub fn alignment_error_at(&self, retention_time: f64) -> Result<(f64, f64), LfqError> {
        let key = OrderedFloat(retention_time);
        if let Some(&errors) = self.alignment_error.get(&key) {
            return Ok(errors);
        }
        let below = self.alignment_error.range(..key).next_back();
        let above = self.alignment_error.range(key..).next();
        match (below, above) {
            (Some((&t0, &(up0, down0))), Some((&t1, &(up1, down1)))) => {
                let frac = (retention_time - t0.into_inner())
                    / (t1.into_inner() - t0.into_inner());
                Ok((up0 + frac * (up1 - up0), down0 + frac * (down1 - down0)))
            }
            (Some((_, &errors)), None) | (None, Some((_, &errors))) => Ok(errors),
            (None, None) => Err(LfqError::EmptyAlignmentTable),
        }
    }
}

impl Default for LcMsRun {
    fn default() -> Self {
        LcMsRun::new(String::new(), UNASSIGNED_RUN_ID)
    }
}

impl Display for LcMsRun {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "LcMsRun(name: {}, run_id: {}, features: {}, identified: {}, raw_sources: {})",
            self.name,
            self.run_id,
            self.features.len(),
            self.count_identified_features(),
            self.raw_source_names.len()
        )
    }
}
