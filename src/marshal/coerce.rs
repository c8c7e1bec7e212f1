//! Cell text <-> typed value conversion.
//!
//! Import dispatches on the attribute's declared [`ValueType`]:
//!
//! | declared type        | rule                                                        |
//! |----------------------|-------------------------------------------------------------|
//! | text                 | passed through unchanged                                    |
//! | i16 / i32 / i64      | base-10 integer                                             |
//! | f32 / f64            | decimal number                                              |
//! | char                 | first character; an empty cell leaves the attribute as-is   |
//! | decimal              | exact decimal literal                                       |
//! | date/time            | `MM/dd/yyyy HH:mm` ([`DATE_TIME_FORMAT`])                   |
//! | other                | raw text handed to the attribute                            |
//!
//! `Option<_>` attributes additionally map an empty cell to `None`.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::error::{ErrorCause, MarshalError, MarshalResult};
use crate::types::{DATE_TIME_FORMAT, Value, ValueType};

/// Export form of a value: `Null` becomes `""`, everything else its canonical string.
pub fn to_display(value: &Value) -> String {
    value.to_string()
}

/// Convert cell text to a value of `value_type`.
///
/// Returns `Ok(None)` when the attribute must be left untouched (an empty cell for a `char`
/// attribute).
pub fn from_text(text: &str, value_type: ValueType, nullable: bool) -> MarshalResult<Option<Value>> {
    if nullable && text.is_empty() {
        return Ok(Some(Value::Null));
    }

    let value = match value_type {
        ValueType::Text | ValueType::Other(_) => Value::Text(text.to_string()),
        ValueType::Int16 => Value::Int16(parse_number(text, value_type)?),
        ValueType::Int32 => Value::Int32(parse_number(text, value_type)?),
        ValueType::Int64 => Value::Int64(parse_number(text, value_type)?),
        ValueType::Float32 => Value::Float32(parse_number(text, value_type)?),
        ValueType::Float64 => Value::Float64(parse_number(text, value_type)?),
        ValueType::Decimal => Value::Decimal(parse_number::<BigDecimal>(text, value_type)?),
        ValueType::Char => match text.chars().next() {
            Some(c) => Value::Char(c),
            None => return Ok(None),
        },
        ValueType::DateTime => Value::DateTime(parse_date_time(text)?),
    };
    Ok(Some(value))
}

fn parse_number<N>(text: &str, expected: ValueType) -> MarshalResult<N>
where
    N: FromStr,
    N::Err: std::fmt::Display,
{
    text.parse::<N>().map_err(|e| {
        MarshalError::new(ErrorCause::InvalidNumericFormat {
            raw: text.to_string(),
            expected,
            reason: e.to_string(),
        })
    })
}

fn parse_date_time(text: &str) -> MarshalResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT).map_err(|e| {
        MarshalError::new(ErrorCause::InvalidDateFormat {
            raw: text.to_string(),
            reason: e.to_string(),
        })
    })
}
