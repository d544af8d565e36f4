use serde::{Serialize, Deserialize};

/// A single candidate sequence assignment for a spectrum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeptideHit {
    pub sequence: String,
    pub charge: i32,
    pub score: f64,
}

impl PeptideHit {
    pub fn new(sequence: String, charge: i32, score: f64) -> Self {
        PeptideHit { sequence, charge, score }
    }
}

/// One identification result for a spectrum, holding the candidate hits of a
/// single search engine together with the score type they were ranked by.
///
/// # Examples
///
/// ```
/// use lfqcore::data::identification::{PeptideHit, PeptideIdentification};
///
/// let mut id = PeptideIdentification::new("Posterior Error Probability".to_string(), false);
/// id.insert_hit(PeptideHit::new("PEPTIDER".to_string(), 2, 0.01));
/// assert_eq!(id.hits.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeptideIdentification {
    pub score_type: String,
    pub higher_score_better: bool,
    pub hits: Vec<PeptideHit>,
}

impl PeptideIdentification {
    pub fn new(score_type: String, higher_score_better: bool) -> Self {
        PeptideIdentification { score_type, higher_score_better, hits: Vec::new() }
    }

    pub fn insert_hit(&mut self, hit: PeptideHit) {
        self.hits.push(hit);
    }
}
