//! Input model for serialized filter rules: a flat ordered list of field
//! conditions plus grouping annotations that encode operator precedence.

use serde::{Deserialize, Serialize};

/// Comparison applied by a single [`Condition`].
///
/// Ordering operators apply to numeric, decimal, date/time, char and byte
/// fields; the substring operators apply to string fields only;
/// `Exists`/`NotExists` apply to nullable and string fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOperator {
    Equals,
    NotEquals,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Exists,
    NotExists,
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
}

/// Logical connector joining a condition (or a collapsed group) to its
/// left neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl std::fmt::Display for Combinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Combinator::And => write!(f, "and"),
            Combinator::Or => write!(f, "or"),
        }
    }
}

/// One field-level test: property, raw value(s), operator, and the
/// combinator attaching it to whatever precedes it. The combinator of the
/// first condition in a rule is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub property_name: String,
    /// Raw textual values; `None` is an explicit null. Coerced against the
    /// field's type when the rule is compiled.
    pub values: Vec<Option<String>>,
    pub operator: SearchOperator,
    #[serde(default)]
    pub combinator: Combinator,
}

impl Condition {
    pub fn new(
        property_name: impl Into<String>,
        operator: SearchOperator,
        values: Vec<Option<String>>,
    ) -> Self {
        Self { property_name: property_name.into(), values, operator, combinator: Combinator::And }
    }

    /// A condition joined to its left neighbor with an explicit combinator.
    pub fn combined(
        property_name: impl Into<String>,
        operator: SearchOperator,
        values: Vec<Option<String>>,
        combinator: Combinator,
    ) -> Self {
        Self { property_name: property_name.into(), values, operator, combinator }
    }
}

/// Declares that conditions `start..=end` (1-based, inclusive) form one
/// nested unit. Higher `level` means outer: level 1 groups collapse first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub start: usize,
    pub end: usize,
    pub level: u32,
}

/// A complete serialized filter: ordered conditions plus grouping
/// annotations. Compiled once into a reusable predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl FilterRule {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions, groups: Vec::new() }
    }

    pub fn grouped(conditions: Vec<Condition>, groups: Vec<Group>) -> Self {
        Self { conditions, groups }
    }
}
