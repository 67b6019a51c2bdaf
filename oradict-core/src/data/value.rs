use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use enum_as_inner::EnumAsInner;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single column value read from a data dictionary view
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, EnumAsInner)]
pub enum DataValue {
    Null,
    Utf8String(String),
    Binary(Vec<u8>),
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    /// Oracle NUMBER columns
    Decimal(Decimal),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DataValue {
    /// Returns the textual form of the value, `None` for nulls.
    /// Binary data is hex encoded.
    pub fn to_text(&self) -> Option<String> {
        Some(match self {
            DataValue::Null => return None,
            DataValue::Utf8String(s) => s.clone(),
            DataValue::Binary(b) => b.iter().map(|i| format!("{:02X}", i)).collect(),
            DataValue::Boolean(b) => b.to_string(),
            DataValue::Int32(i) => i.to_string(),
            DataValue::Int64(i) => i.to_string(),
            DataValue::Float64(f) => f.to_string(),
            DataValue::Decimal(d) => d.normalize().to_string(),
            DataValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            DataValue::DateTime(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "NULL"),
        }
    }
}

impl From<&str> for DataValue {
    fn from(str: &str) -> Self {
        DataValue::Utf8String(str.to_string())
    }
}

impl From<String> for DataValue {
    fn from(str: String) -> Self {
        DataValue::Utf8String(str)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Int32(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int64(v)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Boolean(v)
    }
}

impl From<Decimal> for DataValue {
    fn from(v: Decimal) -> Self {
        DataValue::Decimal(v)
    }
}

impl From<NaiveDateTime> for DataValue {
    fn from(v: NaiveDateTime) -> Self {
        DataValue::DateTime(v)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(DataValue::Null)
    }
}
