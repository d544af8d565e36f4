use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::data::identification::{PeptideHit, PeptideIdentification};
use crate::error::LfqError;

/// The hits collected for one distinct peptide sequence during a consensus
/// pass.
///
/// The charge is the one of the first hit that opened the group; later
/// occurrences of the same sequence only contribute their score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SequenceGroup {
    pub charge: i32,
    pub scores: Vec<f64>,
}

/// Mapping from peptide sequence to its collected hits, built fresh per
/// consensus invocation. `BTreeMap` keeps iteration deterministic.
pub type SequenceGrouping = BTreeMap<String, SequenceGroup>;

/// Groups all hits across all input identifications by peptide sequence.
/// Every input hit contributes exactly one score to exactly one group.
pub fn group_hits(ids: &[PeptideIdentification]) -> SequenceGrouping {
    let mut grouping = SequenceGrouping::new();
    for hit in ids.iter().flat_map(|id| id.hits.iter()) {
        grouping
            .entry(hit.sequence.clone())
            .and_modify(|group| group.scores.push(hit.score))
            .or_insert_with(|| SequenceGroup { charge: hit.charge, scores: vec![hit.score] });
    }
    grouping
}

/// Consensus over multiple identification results for the same spectrum,
/// keeping the best score per distinct peptide sequence.
///
/// # Examples
///
/// ```
/// use lfqcore::algorithm::consensus::ConsensusIdBest;
/// use lfqcore::data::identification::{PeptideHit, PeptideIdentification};
///
/// let mut first = PeptideIdentification::new("XTandem".to_string(), true);
/// first.insert_hit(PeptideHit::new("PEPTIDER".to_string(), 2, 0.7));
/// let mut second = PeptideIdentification::new("XTandem".to_string(), true);
/// second.insert_hit(PeptideHit::new("PEPTIDER".to_string(), 2, 0.9));
///
/// let mut ids = vec![first, second];
/// ConsensusIdBest::new().apply(&mut ids).unwrap();
///
/// assert_eq!(ids.len(), 1);
/// assert_eq!(ids[0].hits[0].score, 0.9);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsensusIdBest;

impl ConsensusIdBest {
    pub fn new() -> Self {
        ConsensusIdBest
    }

    /// Collapses the input identifications into a single consensus result,
    /// in place.
    ///
    /// All inputs must share the score type and polarity of the first
    /// element; a mismatch is reported as a data error and the input is left
    /// untouched. The consensus result holds one hit per distinct sequence,
    /// scored with the group maximum when higher scores are better and the
    /// group minimum otherwise. An empty input is an error, there is no
    /// consensus to produce.
    pub fn apply(&self, ids: &mut Vec<PeptideIdentification>) -> Result<(), LfqError> {
        let first = ids.first().ok_or(LfqError::EmptyIdentifications)?;
        let score_type = first.score_type.clone();
        let higher_better = first.higher_score_better;

        for id in ids.iter().skip(1) {
            if id.score_type != score_type {
                return Err(LfqError::ScoreTypeMismatch {
                    expected: score_type,
                    found: id.score_type.clone(),
                });
            }
            if id.higher_score_better != higher_better {
                return Err(LfqError::PolarityMismatch {
                    expected_higher_better: higher_better,
                });
            }
        }

        let grouping = group_hits(ids);

        let mut consensus =
            PeptideIdentification::new(format!("Consensus_best ({})", score_type), higher_better);
        for (sequence, group) in grouping {
            let best = group.scores.iter().copied().reduce(|acc, score| {
                if higher_better { acc.max(score) } else { acc.min(score) }
            });
            let Some(score) = best else {
                // a group is never opened without a score
                continue;
            };
            let hit = PeptideHit { sequence, charge: group.charge, score };
            debug!(sequence = %hit.sequence, score = hit.score, "consensus output hit");
            consensus.insert_hit(hit);
        }

        ids.clear();
        ids.push(consensus);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identification(score_type: &str, higher_better: bool, hits: &[(&str, i32, f64)]) -> PeptideIdentification {
        let mut id = PeptideIdentification::new(score_type.to_string(), higher_better);
        for &(sequence, charge, score) in hits {
            id.insert_hit(PeptideHit::new(sequence.to_string(), charge, score));
        }
        id
    }

    #[test]
    fn test_singleton_is_idempotent() {
        let mut ids = vec![identification("XTandem", true, &[("PEPTIDE", 2, 0.9)])];
        ConsensusIdBest::new().apply(&mut ids).unwrap();

        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].score_type, "Consensus_best (XTandem)");
        assert!(ids[0].higher_score_better);
        assert_eq!(ids[0].hits, vec![PeptideHit::new("PEPTIDE".to_string(), 2, 0.9)]);
    }

    #[test]
    fn test_higher_better_keeps_maximum() {
        let mut ids = vec![
            identification("XTandem", true, &[("PEPTIDE", 2, 0.7)]),
            identification("XTandem", true, &[("PEPTIDE", 2, 0.9)]),
        ];
        ConsensusIdBest::new().apply(&mut ids).unwrap();

        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].hits.len(), 1);
        assert_eq!(ids[0].hits[0].score, 0.9);
    }

    #[test]
    fn test_lower_better_keeps_minimum() {
        let mut ids = vec![
            identification("Posterior Error Probability", false, &[("PEPTIDE", 2, 0.7)]),
            identification("Posterior Error Probability", false, &[("PEPTIDE", 2, 0.9)]),
        ];
        ConsensusIdBest::new().apply(&mut ids).unwrap();

        assert_eq!(ids[0].hits[0].score, 0.7);
        assert!(!ids[0].higher_score_better);
    }

    #[test]
    fn test_one_output_hit_per_distinct_sequence() {
        let mut ids = vec![
            identification("XTandem", true, &[("PEPTIDE", 2, 0.7), ("ELVISLIVES", 3, 0.4)]),
            identification("XTandem", true, &[("PEPTIDE", 2, 0.8)]),
            identification("XTandem", true, &[("DEADBEEF", 1, 0.2), ("ELVISLIVES", 3, 0.6)]),
        ];
        ConsensusIdBest::new().apply(&mut ids).unwrap();

        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].hits.len(), 3);

        let elvis = ids[0].hits.iter().find(|h| h.sequence == "ELVISLIVES").unwrap();
        assert_eq!(elvis.score, 0.6);
    }

    #[test]
    fn test_first_seen_charge_wins() {
        let mut ids = vec![
            identification("XTandem", true, &[("PEPTIDE", 2, 0.5)]),
            identification("XTandem", true, &[("PEPTIDE", 3, 0.9)]),
        ];
        ConsensusIdBest::new().apply(&mut ids).unwrap();

        assert_eq!(ids[0].hits[0].charge, 2);
        assert_eq!(ids[0].hits[0].score, 0.9);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let mut ids: Vec<PeptideIdentification> = Vec::new();
        let result = ConsensusIdBest::new().apply(&mut ids);
        assert_eq!(result, Err(LfqError::EmptyIdentifications));
    }

    #[test]
    fn test_score_type_mismatch_is_reported() {
        let mut ids = vec![
            identification("XTandem", true, &[("PEPTIDE", 2, 0.7)]),
            identification("Mascot", true, &[("PEPTIDE", 2, 0.9)]),
        ];
        let result = ConsensusIdBest::new().apply(&mut ids);
        assert_eq!(
            result,
            Err(LfqError::ScoreTypeMismatch {
                expected: "XTandem".to_string(),
                found: "Mascot".to_string(),
            })
        );
        // input untouched on error
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_polarity_mismatch_is_reported() {
        let mut ids = vec![
            identification("XTandem", true, &[("PEPTIDE", 2, 0.7)]),
            identification("XTandem", false, &[("PEPTIDE", 2, 0.9)]),
        ];
        let result = ConsensusIdBest::new().apply(&mut ids);
        assert_eq!(result, Err(LfqError::PolarityMismatch { expected_higher_better: true }));
    }

    #[test]
    fn test_group_hits_collects_every_score() {
        let ids = vec![
            identification("XTandem", true, &[("PEPTIDE", 2, 0.7), ("PEPTIDE", 2, 0.8)]),
            identification("XTandem", true, &[("ELVISLIVES", 3, 0.4)]),
        ];
        let grouping = group_hits(&ids);

        assert_eq!(grouping.len(), 2);
        assert_eq!(grouping["PEPTIDE"].scores, vec![0.7, 0.8]);
        assert_eq!(grouping["ELVISLIVES"].scores, vec![0.4]);
    }
}
