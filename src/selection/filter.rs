//! Apply a compiled predicate to a sequence of records. This is the
//! in-memory consumer; the predicate itself neither knows nor cares what
//! kind of source the records come from.

use crate::compile::Predicate;

/// Outcome of testing one record. Compiled predicates cannot fail at
/// evaluation time, so there is no error arm.
#[derive(Debug, PartialEq)]
pub enum FilterResult<R> {
    Pass(R),
    Skip(R),
}

impl<R> FilterResult<R> {
    pub fn passed(&self) -> bool {
        matches!(self, FilterResult::Pass(_))
    }

    pub fn into_record(self) -> R {
        match self {
            FilterResult::Pass(record) | FilterResult::Skip(record) => record,
        }
    }
}

/// Iterator adapter tagging each record with the predicate's verdict.
pub struct FilterIterator<I, R> {
    iter: I,
    predicate: Predicate<R>,
}

impl<I, R> FilterIterator<I, R>
where
    I: Iterator<Item = R>,
{
    pub fn new(iter: I, predicate: Predicate<R>) -> Self {
        Self { iter, predicate }
    }
}

impl<I, R> Iterator for FilterIterator<I, R>
where
    I: Iterator<Item = R>,
{
    type Item = FilterResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|record| {
            if self.predicate.matches(&record) {
                FilterResult::Pass(record)
            } else {
                FilterResult::Skip(record)
            }
        })
    }
}

impl<R> Predicate<R> {
    /// Lazily yields only the records this predicate passes.
    pub fn filter<I>(&self, iter: I) -> impl Iterator<Item = R>
    where
        I: Iterator<Item = R>,
    {
        let predicate = self.clone();
        iter.filter(move |record| predicate.matches(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Combinator, Condition, FilterRule, Group, SearchOperator};
    use crate::schema::{Filterable, Schema};
    use crate::value::FieldType;

    #[derive(Debug, Clone, PartialEq)]
    struct TestRecord {
        name: String,
        age: i32,
    }

    impl TestRecord {
        fn new(name: &str, age: i32) -> Self {
            Self { name: name.to_string(), age }
        }
    }

    impl Filterable for TestRecord {
        fn schema() -> Schema<Self> {
            Schema::new()
                .field("name", FieldType::String, |r: &TestRecord| r.name.clone().into())
                .field("age", FieldType::I32, |r: &TestRecord| r.age.into())
        }
    }

    fn eq(name: &str, value: &str) -> Condition {
        Condition::new(name, SearchOperator::Equals, vec![Some(value.to_string())])
    }

    #[test]
    fn test_simple_equality() {
        let records = vec![
            TestRecord::new("Alice", 30),
            TestRecord::new("Bob", 25),
            TestRecord::new("Charlie", 35),
        ];

        let rule = FilterRule::new(vec![eq("name", "Alice")]);
        let predicate = rule.compile::<TestRecord>().unwrap();
        let results: Vec<_> = FilterIterator::new(records.into_iter(), predicate).collect();

        assert_eq!(results, vec![
            FilterResult::Pass(TestRecord::new("Alice", 30)),
            FilterResult::Skip(TestRecord::new("Bob", 25)),
            FilterResult::Skip(TestRecord::new("Charlie", 35)),
        ]);
    }

    #[test]
    fn test_and_condition() {
        let records = vec![
            TestRecord::new("Alice", 30),
            TestRecord::new("Bob", 30),
            TestRecord::new("Charlie", 35),
        ];

        let rule = FilterRule::new(vec![
            eq("name", "Alice"),
            Condition::combined(
                "age",
                SearchOperator::Equals,
                vec![Some("30".to_string())],
                Combinator::And,
            ),
        ]);
        let predicate = rule.compile::<TestRecord>().unwrap();
        let passed: Vec<_> = predicate.filter(records.into_iter()).collect();

        assert_eq!(passed, vec![TestRecord::new("Alice", 30)]);
    }

    #[test]
    fn test_grouped_condition() {
        let records = vec![
            TestRecord::new("Alice", 20),
            TestRecord::new("Bob", 25),
            TestRecord::new("Charlie", 30),
            TestRecord::new("David", 35),
            TestRecord::new("Eve", 40),
        ];

        // (name = Alice or name = Charlie) and age >= 30 and age <= 40
        let rule = FilterRule::grouped(
            vec![
                eq("name", "Alice"),
                Condition::combined(
                    "name",
                    SearchOperator::Equals,
                    vec![Some("Charlie".to_string())],
                    Combinator::Or,
                ),
                Condition::combined(
                    "age",
                    SearchOperator::GreaterOrEqual,
                    vec![Some("30".to_string())],
                    Combinator::And,
                ),
                Condition::combined(
                    "age",
                    SearchOperator::LessOrEqual,
                    vec![Some("40".to_string())],
                    Combinator::And,
                ),
            ],
            vec![Group { start: 1, end: 2, level: 1 }],
        );

        assert_eq!(rule.ast().unwrap().render(), "((1 or 2) and 3) and 4");

        let predicate = rule.compile::<TestRecord>().unwrap();
        let passed: Vec<_> = predicate.filter(records.into_iter()).collect();

        assert_eq!(passed, vec![TestRecord::new("Charlie", 30)]);
    }
}
