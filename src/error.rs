use crate::rules::SearchOperator;
use thiserror::Error;

/// Errors raised while compiling a filter rule into a predicate.
///
/// All fallibility is front-loaded into compilation: once a predicate is
/// built, evaluating it cannot fail.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("filter rule must contain at least one condition")]
    EmptyRule,
    #[error("invalid group {start}..{end} at level {level}: {reason}")]
    InvalidGroup { start: usize, end: usize, level: u32, reason: GroupViolation },
    #[error("property not found: {0}")]
    UnknownProperty(String),
    #[error("cannot convert value '{value}' to type '{target}'")]
    Conversion { value: String, target: &'static str },
    #[error("operator {operator:?} is not supported for type '{target}'")]
    UnsupportedOperator { operator: SearchOperator, target: &'static str },
}

/// The specific group invariant a [`Error::InvalidGroup`] violated.
#[derive(Debug, PartialEq, Eq)]
pub enum GroupViolation {
    /// `start >= end` — a group must span at least two conditions.
    Inverted,
    /// Bounds fall outside `1..=len(conditions)`.
    OutOfRange,
    /// Intersects another group at the same level.
    Overlapping,
    /// Partially intersects a group at a lower level instead of containing it.
    Crossing,
}

impl std::fmt::Display for GroupViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupViolation::Inverted => write!(f, "start must be less than end"),
            GroupViolation::OutOfRange => write!(f, "bounds exceed the condition list"),
            GroupViolation::Overlapping => write!(f, "overlaps a group at the same level"),
            GroupViolation::Crossing => write!(f, "crosses a group at a lower level"),
        }
    }
}
