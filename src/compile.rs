//! Compiles an assembled expression tree into one reusable predicate.
//!
//! Every fallible step — accessor lookup, value coercion, operator/type
//! checking — happens here, before a predicate exists. Evaluation itself
//! cannot fail and is safe to run concurrently: the compiled closures
//! close only over immutable coerced values and accessor references.

use crate::assemble::assemble;
use crate::ast::Node;
use crate::error::Error;
use crate::rules::{Combinator, Condition, FilterRule, SearchOperator};
use crate::schema::{Filterable, Schema};
use crate::value::{coerce, FieldType, FieldValue};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

type Eval<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// A compiled, stateless filter predicate over records of type `R`.
pub struct Predicate<R> {
    eval: Eval<R>,
}

impl<R> Clone for Predicate<R> {
    fn clone(&self) -> Self {
        Self { eval: self.eval.clone() }
    }
}

impl<R> std::fmt::Debug for Predicate<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

impl<R> Predicate<R> {
    pub fn matches(&self, record: &R) -> bool {
        (self.eval)(record)
    }
}

impl FilterRule {
    /// Assemble the rule's expression tree without compiling it. Useful
    /// for diagnostics: `ast()?.render()` gives the canonical
    /// parenthesized form.
    pub fn ast(&self) -> Result<Node, Error> {
        assemble(&self.conditions, &self.groups)
    }

    /// Compile against the record type's published schema.
    pub fn compile<R: Filterable + 'static>(&self) -> Result<Predicate<R>, Error> {
        self.compile_with(&R::schema())
    }

    /// Compile against an explicit accessor registry.
    pub fn compile_with<R: 'static>(&self, schema: &Schema<R>) -> Result<Predicate<R>, Error> {
        debug!(
            conditions = self.conditions.len(),
            groups = self.groups.len(),
            "compiling filter rule"
        );
        let ast = assemble(&self.conditions, &self.groups)?;
        compile_node(schema, &ast).map(|eval| Predicate { eval })
    }
}

fn compile_node<R: 'static>(schema: &Schema<R>, node: &Node) -> Result<Eval<R>, Error> {
    match node {
        Node::Leaf { condition, .. } => build_leaf(schema, condition),
        Node::Composite { combinator, left, right } => {
            let left = compile_node(schema, left)?;
            let right = compile_node(schema, right)?;
            Ok(match combinator {
                Combinator::And => Arc::new(move |record| left(record) && right(record)),
                Combinator::Or => Arc::new(move |record| left(record) || right(record)),
            })
        }
    }
}

/// Build the elementary predicate for one condition: resolve the
/// accessor, coerce the raw values, and select operator semantics.
fn build_leaf<R: 'static>(schema: &Schema<R>, condition: &Condition) -> Result<Eval<R>, Error> {
    let accessor = schema
        .accessor(&condition.property_name)
        .ok_or_else(|| Error::UnknownProperty(condition.property_name.clone()))?;
    let ty = *accessor.ty();
    let nullable = accessor.nullable();
    let target = ty.name();
    let operator = condition.operator;
    let unsupported = || Error::UnsupportedOperator { operator, target };

    // Operator/type applicability needs no operand; check it before
    // touching the raw values so an incompatible pairing surfaces even
    // when a value happens not to parse.
    match operator {
        SearchOperator::Greater
        | SearchOperator::GreaterOrEqual
        | SearchOperator::Less
        | SearchOperator::LessOrEqual
            if !ty.is_ordered() =>
        {
            return Err(unsupported());
        }
        SearchOperator::Exists | SearchOperator::NotExists
            if !nullable && ty != FieldType::String =>
        {
            return Err(unsupported());
        }
        SearchOperator::StartsWith
        | SearchOperator::EndsWith
        | SearchOperator::Contains
        | SearchOperator::NotContains
            if ty != FieldType::String =>
        {
            return Err(unsupported());
        }
        _ => {}
    }

    // Every raw value is coerced so a malformed entry fails the build,
    // though the operators below only consume the first.
    let mut operands = condition
        .values
        .iter()
        .map(|value| coerce(value.as_deref(), &ty, nullable))
        .collect::<Result<Vec<_>, Error>>()?;
    let operand = if operands.is_empty() { FieldValue::Null } else { operands.remove(0) };

    let read = accessor.reader();

    Ok(match operator {
        SearchOperator::Equals => Arc::new(move |record| read(record).loose_eq(&operand)),
        SearchOperator::NotEquals => Arc::new(move |record| !read(record).loose_eq(&operand)),
        SearchOperator::Greater
        | SearchOperator::GreaterOrEqual
        | SearchOperator::Less
        | SearchOperator::LessOrEqual => {
            if operand.is_null() {
                // a null bound never holds, whatever the field value
                return Ok(Arc::new(|_: &R| false));
            }
            Arc::new(move |record| match read(record).compare(&operand) {
                Some(ordering) => ordering_matches(operator, ordering),
                None => false,
            })
        }
        SearchOperator::Exists | SearchOperator::NotExists => {
            let negate = operator == SearchOperator::NotExists;
            Arc::new(move |record| read(record).exists() != negate)
        }
        SearchOperator::StartsWith
        | SearchOperator::EndsWith
        | SearchOperator::Contains
        | SearchOperator::NotContains => {
            let needle = match operand {
                FieldValue::String(s) => s.to_lowercase(),
                // nothing contains a null pattern
                _ => {
                    return Ok(if operator == SearchOperator::NotContains {
                        Arc::new(|_: &R| true)
                    } else {
                        Arc::new(|_: &R| false)
                    });
                }
            };
            Arc::new(move |record| match read(record) {
                FieldValue::String(haystack) => {
                    let haystack = haystack.to_lowercase();
                    match operator {
                        SearchOperator::StartsWith => haystack.starts_with(&needle),
                        SearchOperator::EndsWith => haystack.ends_with(&needle),
                        SearchOperator::Contains => haystack.contains(&needle),
                        SearchOperator::NotContains => !haystack.contains(&needle),
                        _ => unreachable!(),
                    }
                }
                // a null field never satisfies a positive form
                _ => operator == SearchOperator::NotContains,
            })
        }
    })
}

fn ordering_matches(operator: SearchOperator, ordering: Ordering) -> bool {
    match operator {
        SearchOperator::Greater => ordering == Ordering::Greater,
        SearchOperator::GreaterOrEqual => ordering != Ordering::Less,
        SearchOperator::Less => ordering == Ordering::Less,
        SearchOperator::LessOrEqual => ordering != Ordering::Greater,
        _ => false,
    }
}
