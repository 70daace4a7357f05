//! Compiles serialized, data-driven filter rules into reusable boolean
//! predicates.
//!
//! A [`FilterRule`] is a flat ordered list of field [`Condition`]s plus a
//! set of [`Group`] annotations encoding operator precedence. Compiling a
//! rule against a record type's [`Schema`] coerces the raw rule values,
//! checks operator/type compatibility, assembles the grouped boolean
//! expression tree, and yields a [`Predicate`] that can be evaluated
//! against any number of records without ever failing.
//!
//! ```
//! use autofilter::{
//!     Combinator, Condition, FieldType, FilterRule, Filterable, Schema, SearchOperator,
//! };
//!
//! struct User {
//!     name: String,
//!     age: i32,
//! }
//!
//! impl Filterable for User {
//!     fn schema() -> Schema<Self> {
//!         Schema::new()
//!             .field("name", FieldType::String, |u: &User| u.name.clone().into())
//!             .field("age", FieldType::I32, |u: &User| u.age.into())
//!     }
//! }
//!
//! let rule = FilterRule::new(vec![
//!     Condition::new("name", SearchOperator::StartsWith, vec![Some("al".into())]),
//!     Condition::combined("age", SearchOperator::Less, vec![Some("40".into())], Combinator::And),
//! ]);
//!
//! let predicate = rule.compile::<User>().unwrap();
//! assert!(predicate.matches(&User { name: "Alice".into(), age: 30 }));
//! assert!(!predicate.matches(&User { name: "Alice".into(), age: 40 }));
//! ```

pub mod ast;
pub mod error;
pub mod rules;
pub mod schema;
pub mod selection;
pub mod value;

mod assemble;
mod compile;

pub use compile::Predicate;
pub use error::{Error, GroupViolation};
pub use rules::{Combinator, Condition, FilterRule, Group, SearchOperator};
pub use schema::{FieldAccessor, Filterable, Schema};
pub use value::{FieldType, FieldValue};
