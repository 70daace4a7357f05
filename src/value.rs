//! Typed field values and coercion of raw rule values into them.
//!
//! Coercion happens once, when a rule is compiled; evaluation only ever
//! sees already-typed values.

use crate::error::Error;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::str::FromStr;

/// Semantic type of a record field. Nullability is tracked separately on
/// the field accessor, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    I16,
    I32,
    I64,
    /// Unsigned byte.
    Byte,
    F32,
    F64,
    /// Fixed-point decimal.
    Decimal,
    DateTime,
    Char,
    String,
    /// Enumeration with a fixed set of variant names.
    Enum(&'static [&'static str]),
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::I16 => "i16",
            FieldType::I32 => "i32",
            FieldType::I64 => "i64",
            FieldType::Byte => "u8",
            FieldType::F32 => "f32",
            FieldType::F64 => "f64",
            FieldType::Decimal => "Decimal",
            FieldType::DateTime => "DateTime",
            FieldType::Char => "char",
            FieldType::String => "String",
            FieldType::Enum(_) => "enum",
        }
    }

    /// Types the ordering operators (`Greater`, `Less`, ...) accept.
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            FieldType::I16
                | FieldType::I32
                | FieldType::I64
                | FieldType::Byte
                | FieldType::F32
                | FieldType::F64
                | FieldType::Decimal
                | FieldType::DateTime
                | FieldType::Char
        )
    }

    /// Float and fixed-point targets get a comma normalized to a period
    /// before parsing.
    fn is_fractional(&self) -> bool {
        matches!(self, FieldType::F32 | FieldType::F64 | FieldType::Decimal)
    }
}

/// A dynamically typed field value, produced either by a schema reader or
/// by coercing a raw rule value.
///
/// `Date` only occurs as a coerced operand: a date/time rule value that
/// carried no time-of-day component. Readers always produce `DateTime`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    Byte(u8),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Char(char),
    String(String),
    Enum(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// `Exists` semantics: non-null, and for strings additionally non-empty.
    pub(crate) fn exists(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Equality between a field value and a coerced operand. Null equals
    /// only null. A `DateTime` compared against a date-only operand is
    /// projected onto its calendar date first.
    pub(crate) fn loose_eq(&self, operand: &FieldValue) -> bool {
        match (self, operand) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Null, _) | (_, FieldValue::Null) => false,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::I16(a), FieldValue::I16(b)) => a == b,
            (FieldValue::I32(a), FieldValue::I32(b)) => a == b,
            (FieldValue::I64(a), FieldValue::I64(b)) => a == b,
            (FieldValue::Byte(a), FieldValue::Byte(b)) => a == b,
            (FieldValue::F32(a), FieldValue::F32(b)) => a == b,
            (FieldValue::F64(a), FieldValue::F64(b)) => a == b,
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => a == b,
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a == b,
            (FieldValue::DateTime(a), FieldValue::Date(b)) => a.date() == *b,
            (FieldValue::Date(a), FieldValue::Date(b)) => a == b,
            (FieldValue::Char(a), FieldValue::Char(b)) => a == b,
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Enum(a), FieldValue::Enum(b)) => a == b,
            _ => false,
        }
    }

    /// Ordering between a field value and a coerced operand. `None` when
    /// either side is null (a null never satisfies an ordering operator)
    /// or the comparison is undefined (NaN).
    pub(crate) fn compare(&self, operand: &FieldValue) -> Option<Ordering> {
        match (self, operand) {
            (FieldValue::I16(a), FieldValue::I16(b)) => Some(a.cmp(b)),
            (FieldValue::I32(a), FieldValue::I32(b)) => Some(a.cmp(b)),
            (FieldValue::I64(a), FieldValue::I64(b)) => Some(a.cmp(b)),
            (FieldValue::Byte(a), FieldValue::Byte(b)) => Some(a.cmp(b)),
            (FieldValue::F32(a), FieldValue::F32(b)) => a.partial_cmp(b),
            (FieldValue::F64(a), FieldValue::F64(b)) => a.partial_cmp(b),
            (FieldValue::Decimal(a), FieldValue::Decimal(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::Date(b)) => {
                Some(a.cmp(&b.and_time(NaiveTime::MIN)))
            }
            (FieldValue::Char(a), FieldValue::Char(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}
impl From<i16> for FieldValue {
    fn from(v: i16) -> Self {
        FieldValue::I16(v)
    }
}
impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::I32(v)
    }
}
impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::I64(v)
    }
}
impl From<u8> for FieldValue {
    fn from(v: u8) -> Self {
        FieldValue::Byte(v)
    }
}
impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::F32(v)
    }
}
impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::F64(v)
    }
}
impl From<Decimal> for FieldValue {
    fn from(v: Decimal) -> Self {
        FieldValue::Decimal(v)
    }
}
impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::DateTime(v)
    }
}
impl From<char> for FieldValue {
    fn from(v: char) -> Self {
        FieldValue::Char(v)
    }
}
impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}
impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}
impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => FieldValue::Null,
        }
    }
}

/// Date/time formats accepted for rule values, culture-invariant. The
/// date-only forms mark the operand for calendar-date comparison.
const DATE_TIME_FORMATS: &[&str] =
    &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%m/%d/%Y %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Coerce one raw rule value into a typed value matching the field's type.
///
/// A null raw value always yields `Null`, whatever the target. An empty
/// string on a nullable field also yields `Null`; operator semantics
/// decide what that means. Parsing is culture-invariant, with a comma
/// accepted as the decimal separator for fractional targets.
pub(crate) fn coerce(
    raw: Option<&str>,
    ty: &FieldType,
    nullable: bool,
) -> Result<FieldValue, Error> {
    let raw = match raw {
        None => return Ok(FieldValue::Null),
        Some("") if nullable => return Ok(FieldValue::Null),
        Some(raw) => raw,
    };

    let conversion_error = || Error::Conversion { value: raw.to_string(), target: ty.name() };

    let normalized;
    let text = if ty.is_fractional() {
        normalized = raw.replace(',', ".");
        normalized.as_str()
    } else {
        raw
    };
    let text = text.trim();

    match ty {
        FieldType::Bool => match text {
            t if t.eq_ignore_ascii_case("true") => Ok(FieldValue::Bool(true)),
            t if t.eq_ignore_ascii_case("false") => Ok(FieldValue::Bool(false)),
            _ => Err(conversion_error()),
        },
        FieldType::I16 => text.parse().map(FieldValue::I16).map_err(|_| conversion_error()),
        FieldType::I32 => text.parse().map(FieldValue::I32).map_err(|_| conversion_error()),
        FieldType::I64 => text.parse().map(FieldValue::I64).map_err(|_| conversion_error()),
        FieldType::Byte => text.parse().map(FieldValue::Byte).map_err(|_| conversion_error()),
        FieldType::F32 => text.parse().map(FieldValue::F32).map_err(|_| conversion_error()),
        FieldType::F64 => text.parse().map(FieldValue::F64).map_err(|_| conversion_error()),
        FieldType::Decimal => {
            Decimal::from_str(text).map(FieldValue::Decimal).map_err(|_| conversion_error())
        }
        FieldType::DateTime => parse_date_time(text).ok_or_else(conversion_error),
        FieldType::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(FieldValue::Char(c)),
                _ => Err(conversion_error()),
            }
        }
        FieldType::String => Ok(FieldValue::String(raw.to_string())),
        FieldType::Enum(variants) => variants
            .iter()
            .find(|v| **v == text)
            .map(|v| FieldValue::Enum(v.to_string()))
            .ok_or_else(conversion_error),
    }
}

fn parse_date_time(text: &str) -> Option<FieldValue> {
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(FieldValue::DateTime(dt));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            return Some(FieldValue::Date(d));
        }
    }
    None
}
