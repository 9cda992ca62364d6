use thiserror::Error;

/// The source data of a problem cannot be converted into groups.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// A subtask is scored neither as `min` nor as `sum`.
    #[error("Unsupported subtask type {kind:?} in subtask {subtask}, only \"min\" and \"sum\" are supported")]
    UnsupportedSubtaskType {
        /// 1-based number of the subtask.
        subtask: usize,
        /// The type found in the data.
        kind: String,
    },
    /// A file named by the data is not in the archive.
    #[error("{0} is missing from the archive")]
    MissingArchiveMember(String),
    /// The score of a subtask is not a non-negative integer.
    #[error("Invalid score {score:?} for subtask {subtask}")]
    InvalidScore {
        /// 1-based number of the subtask.
        subtask: usize,
        /// The score found in the data.
        score: String,
    },
    /// The requested groups need more tests than available.
    #[error("The group sizes sum up to {requested}, but there are only {available} tests")]
    TooManyTestsInGroups {
        /// Sum of the group sizes.
        requested: usize,
        /// Number of tests.
        available: usize,
    },
}
