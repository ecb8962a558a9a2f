//! Decoded result values.
use std::fmt;

use time::{
    OffsetDateTime,
    format_description::{BorrowedFormatItem as I, Component as C, modifier},
};

use crate::pg_type::{self, Oid};

/// A single result cell, decoded from the text format by data type OID.
///
/// Types without a dedicated variant arrive as [`Value::Text`] carrying the
/// output of the server side conversion function verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL, regardless of column type.
    Null,
    Bool(bool),
    /// Any of int2, int4, int8 and oid.
    Int(i64),
    Text(String),
    Json(serde_json::Value),
    Timestamptz(OffsetDateTime),
}

impl Value {
    /// Decode one text-format cell by its data type OID.
    pub fn decode(text: &str, oid: Oid) -> Result<Value, DecodeError> {
        Ok(match oid {
            pg_type::BOOL => match text {
                "t" => Self::Bool(true),
                "f" => Self::Bool(false),
                other => return Err(DecodeError::Bool(other.into())),
            },
            pg_type::INT2 | pg_type::INT4 | pg_type::INT8 | pg_type::OID => {
                Self::Int(text.parse().map_err(DecodeError::Int)?)
            }
            pg_type::JSON | pg_type::JSONB => {
                Self::Json(serde_json::from_str(text).map_err(DecodeError::Json)?)
            }
            pg_type::TIMESTAMPTZ => Self::Timestamptz(
                OffsetDateTime::parse(text, TIMESTAMPTZ).map_err(DecodeError::Time)?,
            ),
            _ => Self::Text(text.to_owned()),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Self::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// The text output format for `timestamptz` under the default `DateStyle`,
/// e.g. `2024-01-15 10:23:54.123456+02`. Subseconds and offset minutes only
/// appear when nonzero.
const TIMESTAMPTZ: &[I<'_>] = &[
    I::Component(C::Year(modifier::Year::default())),
    I::Literal(b"-"),
    I::Component(C::Month(modifier::Month::default())),
    I::Literal(b"-"),
    I::Component(C::Day(modifier::Day::default())),
    I::Literal(b" "),
    I::Component(C::Hour(modifier::Hour::default())),
    I::Literal(b":"),
    I::Component(C::Minute(modifier::Minute::default())),
    I::Literal(b":"),
    I::Component(C::Second(modifier::Second::default())),
    I::Optional(&I::Compound(&[
        I::Literal(b"."),
        I::Component(C::Subsecond(modifier::Subsecond::default())),
    ])),
    I::Component(C::OffsetHour(modifier::OffsetHour::default())),
    I::Optional(&I::Compound(&[
        I::Literal(b":"),
        I::Component(C::OffsetMinute(modifier::OffsetMinute::default())),
    ])),
];

/// An error when decoding a text-format cell.
pub enum DecodeError {
    /// A bool cell that is neither `t` nor `f`.
    Bool(String),
    Int(std::num::ParseIntError),
    Json(serde_json::Error),
    Time(time::error::Parse),
}

impl std::error::Error for DecodeError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(found) => write!(f, "invalid bool `{found}`"),
            Self::Int(e) => write!(f, "invalid integer: {e}"),
            Self::Json(e) => write!(f, "invalid json: {e}"),
            Self::Time(e) => write!(f, "invalid timestamptz: {e}"),
        }
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}
