use std::fmt;

use thiserror::Error;

/// Source relation named in join key errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationName {
    Student,
    Performance,
    Hiring,
    Company,
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationName::Student => "student",
            RelationName::Performance => "performance",
            RelationName::Hiring => "hiring",
            RelationName::Company => "company",
        };
        f.write_str(name)
    }
}

/// Malformed join keys. Any of these aborts the pipeline run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JoinKeyError {
    #[error("{relation} relation has no `{column}` column")]
    MissingColumn {
        relation: RelationName,
        column: &'static str,
    },
    #[error("{relation} row {row} has a blank `{column}` key")]
    BlankKey {
        relation: RelationName,
        row: usize,
        column: &'static str,
    },
    #[error("{relation} relation repeats key `{key}`")]
    DuplicateKey { relation: RelationName, key: String },
}
