//! Column descriptors, typed values and the text conversion shared by every
//! record type.
//!
//! Each record publishes a static table of [`Column`]s. Rendering and parsing
//! switch over [`ColumnType`] exactly once here, in both directions, so the
//! editing surface and the archive interchange use the same code path and
//! only differ by [`TextMode`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use thiserror::Error;

const NEUTRAL_DATE: &str = "%Y-%m-%d";
const NEUTRAL_TIME: &str = "%H:%M:%S";
const NEUTRAL_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Fraction digits used when a decimal is rendered for editing.
const AWARE_DECIMAL_SCALE: u32 = 3;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Whole number.
    Integer,
    /// Exact decimal number.
    Decimal,
    /// `True` / `False`.
    Boolean,
    /// Calendar date.
    Date,
    /// Time of day, whole seconds.
    Time,
    /// Date and time of day, whole seconds.
    DateTime,
    /// Free text.
    Text,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::DateTime => "date-time",
            ColumnType::Text => "text",
        };
        f.write_str(name)
    }
}

/// Static description of one column of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name, used by the storage schema and the archive document.
    pub name: &'static str,
    /// Semantic type.
    pub ty: ColumnType,
    /// Whether the column may be absent.
    pub required: bool,
    /// Maximum length in characters for text columns.
    pub max_len: Option<usize>,
}

impl Column {
    /// A column that must always carry a value.
    pub const fn required(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            required: true,
            max_len: None,
        }
    }

    /// A column that may be absent.
    pub const fn optional(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            required: false,
            max_len: None,
        }
    }

    /// Limits a text column to `max_len` characters.
    pub const fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

/// A typed column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Absent value.
    Null,
    /// Whole number.
    Integer(i64),
    /// Exact decimal number.
    Decimal(Decimal),
    /// Boolean flag.
    Boolean(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Date and time of day.
    DateTime(NaiveDateTime),
    /// Free text.
    Text(String),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "date-time",
            Value::Text(_) => "text",
        }
    }

    /// Total ordering used for sorting rows by a column. Absent values sort
    /// first; text compares case-insensitively.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Time(a), Value::Time(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (a, b) => a.kind_name().cmp(b.kind_name()),
        }
    }
}

/// Locale conventions used by [`TextMode::Aware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// Decimal separator.
    pub decimal_point: char,
    /// `chrono` format string for dates.
    pub date_format: &'static str,
    /// `chrono` format string for times of day.
    pub time_format: &'static str,
}

impl Locale {
    /// `C`/POSIX conventions with a four digit year.
    pub const POSIX: Locale = Locale::new('.', "%m/%d/%Y", "%H:%M:%S");
    /// Decimal comma and day-first dates.
    pub const CENTRAL_EUROPEAN: Locale = Locale::new(',', "%d.%m.%Y", "%H:%M:%S");

    /// Builds a locale from its separator and format strings.
    pub const fn new(
        decimal_point: char,
        date_format: &'static str,
        time_format: &'static str,
    ) -> Self {
        Self {
            decimal_point,
            date_format,
            time_format,
        }
    }

    fn datetime_format(&self) -> String {
        format!("{} {}", self.date_format, self.time_format)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::POSIX
    }
}

/// Text conversion mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// Locale formatting, for interactive editing.
    Aware(Locale),
    /// Fixed machine formats, for interchange.
    Neutral,
}

/// Format errors raised while converting between text and typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// The record type has no such column.
    #[error("{table} has no column '{column}'")]
    UnknownColumn {
        /// Table of the record.
        table: &'static str,
        /// Requested column name.
        column: String,
    },
    /// Text could not be parsed as the column type.
    #[error("invalid {expected} '{text}' for column '{column}'")]
    Format {
        /// Column name.
        column: String,
        /// Offending text.
        text: String,
        /// Expected column type.
        expected: ColumnType,
    },
    /// A required column was given no value.
    #[error("column '{column}' requires a value")]
    Required {
        /// Column name.
        column: String,
    },
    /// Text exceeds the column length limit.
    #[error("value '{text}' for column '{column}' is longer than {max_len} characters")]
    TooLong {
        /// Column name.
        column: String,
        /// Offending text.
        text: String,
        /// Column limit.
        max_len: usize,
    },
    /// A typed value of the wrong kind was assigned.
    #[error("column '{column}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Expected value kind.
        expected: &'static str,
        /// Supplied value kind.
        found: &'static str,
    },
    /// An integer does not fit the column's storage width.
    #[error("value {value} is out of range for column '{column}'")]
    OutOfRange {
        /// Column name.
        column: String,
        /// Offending value.
        value: i64,
    },
}

/// Renders `value` as text. Absent values render as the empty string.
pub fn render(value: &Value, mode: TextMode) -> String {
    match (value, mode) {
        (Value::Null, _) => String::new(),
        (Value::Integer(v), _) => v.to_string(),
        (Value::Boolean(v), _) => (if *v { "True" } else { "False" }).to_string(),
        (Value::Text(v), _) => v.clone(),
        (Value::Decimal(v), TextMode::Neutral) => v.to_string(),
        (Value::Decimal(v), TextMode::Aware(locale)) => {
            let mut d = *v;
            if d.scale() < AWARE_DECIMAL_SCALE {
                d.rescale(AWARE_DECIMAL_SCALE);
            }
            let text = d.to_string();
            if locale.decimal_point == '.' {
                text
            } else {
                text.replace('.', &locale.decimal_point.to_string())
            }
        }
        (Value::Date(v), TextMode::Neutral) => v.format(NEUTRAL_DATE).to_string(),
        (Value::Date(v), TextMode::Aware(locale)) => v.format(locale.date_format).to_string(),
        (Value::Time(v), TextMode::Neutral) => v.format(NEUTRAL_TIME).to_string(),
        (Value::Time(v), TextMode::Aware(locale)) => v.format(locale.time_format).to_string(),
        (Value::DateTime(v), TextMode::Neutral) => v.format(NEUTRAL_DATETIME).to_string(),
        (Value::DateTime(v), TextMode::Aware(locale)) => {
            v.format(&locale.datetime_format()).to_string()
        }
    }
}

/// Parses `text` into a value of `column`'s type.
///
/// Empty text is absent; that is an error for required columns.
pub fn parse(column: &Column, text: &str, mode: TextMode) -> Result<Value, ColumnError> {
    if text.is_empty() {
        if column.required {
            return Err(ColumnError::Required {
                column: column.name.to_string(),
            });
        }
        return Ok(Value::Null);
    }

    let format_err = || ColumnError::Format {
        column: column.name.to_string(),
        text: text.to_string(),
        expected: column.ty,
    };

    let value = match column.ty {
        ColumnType::Integer => Value::Integer(text.trim().parse().map_err(|_| format_err())?),
        ColumnType::Decimal => {
            let normalized = match mode {
                TextMode::Aware(locale) if locale.decimal_point != '.' => {
                    text.trim().replace(locale.decimal_point, ".")
                }
                _ => text.trim().to_string(),
            };
            Value::Decimal(Decimal::from_str(&normalized).map_err(|_| format_err())?)
        }
        ColumnType::Boolean => match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Value::Boolean(true),
            t if t.eq_ignore_ascii_case("false") => Value::Boolean(false),
            _ => return Err(format_err()),
        },
        ColumnType::Date => {
            let fmt = match mode {
                TextMode::Aware(locale) => locale.date_format,
                TextMode::Neutral => NEUTRAL_DATE,
            };
            Value::Date(NaiveDate::parse_from_str(text.trim(), fmt).map_err(|_| format_err())?)
        }
        ColumnType::Time => {
            let fmt = match mode {
                TextMode::Aware(locale) => locale.time_format,
                TextMode::Neutral => NEUTRAL_TIME,
            };
            Value::Time(NaiveTime::parse_from_str(text.trim(), fmt).map_err(|_| format_err())?)
        }
        ColumnType::DateTime => {
            let parsed = match mode {
                TextMode::Aware(locale) => {
                    NaiveDateTime::parse_from_str(text.trim(), &locale.datetime_format())
                }
                TextMode::Neutral => NaiveDateTime::parse_from_str(text.trim(), NEUTRAL_DATETIME),
            };
            Value::DateTime(parsed.map_err(|_| format_err())?)
        }
        ColumnType::Text => {
            if let Some(max_len) = column.max_len {
                if text.chars().count() > max_len {
                    return Err(ColumnError::TooLong {
                        column: column.name.to_string(),
                        text: text.to_string(),
                        max_len,
                    });
                }
            }
            Value::Text(text.to_string())
        }
    };
    Ok(value)
}

/// Typed extraction of a field from a [`Value`].
pub trait FromValue: Sized {
    /// Converts `value`, naming `column` in errors.
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError>;
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> ColumnError {
    if found.is_null() {
        return ColumnError::Required {
            column: column.to_string(),
        };
    }
    ColumnError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: found.kind_name(),
    }
}

impl FromValue for i64 {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        match value {
            Value::Integer(v) => Ok(v),
            other => Err(mismatch(column, "integer", &other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        let wide = i64::from_value(column, value)?;
        i32::try_from(wide).map_err(|_| ColumnError::OutOfRange {
            column: column.to_string(),
            value: wide,
        })
    }
}

impl FromValue for Decimal {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::Integer(v) => Ok(Decimal::from(v)),
            other => Err(mismatch(column, "decimal", &other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        match value {
            Value::Boolean(v) => Ok(v),
            other => Err(mismatch(column, "boolean", &other)),
        }
    }
}

impl FromValue for String {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        match value {
            Value::Text(v) => Ok(v),
            other => Err(mismatch(column, "text", &other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        match value {
            Value::Date(v) => Ok(v),
            other => Err(mismatch(column, "date", &other)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        match value {
            Value::Time(v) => Ok(v.with_nanosecond(0).unwrap_or(v)),
            other => Err(mismatch(column, "time", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        match value {
            Value::DateTime(v) => Ok(v.with_nanosecond(0).unwrap_or(v)),
            other => Err(mismatch(column, "date-time", &other)),
        }
    }
}

/// Absent and empty text both map to `None`.
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(column: &str, value: Value) -> Result<Self, ColumnError> {
        match value {
            Value::Null => Ok(None),
            Value::Text(ref s) if s.is_empty() => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEIGHT: Column = Column::optional("glider_weight", ColumnType::Integer);
    const COEFFICIENT: Column = Column::optional("coefficient", ColumnType::Decimal);
    const CODE: Column = Column::required("code", ColumnType::Text).max_len(4);

    #[test]
    fn aware_decimal_uses_locale_separator_and_three_digits() {
        let mode = TextMode::Aware(Locale::CENTRAL_EUROPEAN);
        let value = Value::Decimal(Decimal::new(115, 2));
        assert_eq!(render(&value, mode), "1,150");
        assert_eq!(parse(&COEFFICIENT, "1,150", mode).unwrap(), value);
    }

    #[test]
    fn malformed_integer_names_column_and_text() {
        let err = parse(&WEIGHT, "12kg", TextMode::Neutral).unwrap_err();
        assert_eq!(
            err,
            ColumnError::Format {
                column: "glider_weight".to_string(),
                text: "12kg".to_string(),
                expected: ColumnType::Integer,
            }
        );
        assert!(err.to_string().contains("glider_weight"));
    }

    #[test]
    fn empty_text_is_absent_only_for_optional_columns() {
        assert_eq!(parse(&WEIGHT, "", TextMode::Neutral).unwrap(), Value::Null);
        assert!(matches!(
            parse(&CODE, "", TextMode::Neutral),
            Err(ColumnError::Required { .. })
        ));
    }

    #[test]
    fn text_longer_than_limit_is_rejected() {
        assert!(matches!(
            parse(&CODE, "ABCDE", TextMode::Neutral),
            Err(ColumnError::TooLong { max_len: 4, .. })
        ));
    }

    #[test]
    fn null_sorts_before_values() {
        assert_eq!(Value::Null.compare(&Value::Integer(0)), Ordering::Less);
        assert_eq!(
            Value::from("alpha").compare(&Value::from("Beta")),
            Ordering::Less
        );
    }
}
