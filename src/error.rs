use std::fmt::Display;

/// Errors reported by the run container and the consensus step.
///
/// Lookup misses on features or raw sources are not errors, they are `None`
/// returns on the respective accessors. The variants here are the fatal
/// precondition violations: operations that have no sane result to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum LfqError {
    /// Alignment error was queried on a run with an empty correction table.
    EmptyAlignmentTable,
    /// Consensus was requested over an empty list of identifications.
    EmptyIdentifications,
    /// Input identifications carry different score types.
    ScoreTypeMismatch { expected: String, found: String },
    /// Input identifications disagree on score polarity.
    PolarityMismatch { expected_higher_better: bool },
}

impl Display for LfqError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyAlignmentTable => {
                write!(f, "no alignment error recorded for this run")
            }
            Self::EmptyIdentifications => {
                write!(f, "cannot build a consensus from zero identifications")
            }
            Self::ScoreTypeMismatch { expected, found } => {
                write!(f, "score type mismatch: expected '{}', found '{}'", expected, found)
            }
            Self::PolarityMismatch { expected_higher_better } => {
                write!(
                    f,
                    "score polarity mismatch: expected higher_score_better = {}",
                    expected_higher_better
                )
            }
        }
    }
}

impl std::error::Error for LfqError {}
