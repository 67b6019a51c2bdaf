use oradict_core::{
    data::{chrono::NaiveDateTime, DataValue},
    err::{Context, Result},
};
use oradict_logging::warn;

use super::DataRow;

/// Null-safe accessors for dictionary rows.
///
/// Missing columns are treated as nulls. Values which fail to convert are
/// logged and treated as nulls, so a single odd column never fails the
/// whole row.
pub trait RowExt {
    fn get_value(&self, col: &str) -> &DataValue;

    fn get_string(&self, col: &str) -> Option<String> {
        self.get_value(col).to_text()
    }

    /// Trimmed string, empty strings are `None`
    fn get_string_trimmed(&self, col: &str) -> Option<String> {
        self.get_string(col)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Returns the value of a column which must be present
    fn require_string(&self, col: &str) -> Result<String> {
        self.get_string(col)
            .with_context(|| format!("Column {} is null or missing", col))
    }

    fn get_opt_i64(&self, col: &str) -> Option<i64> {
        match self.get_value(col).try_coerce_i64() {
            Ok(val) => val,
            Err(err) => {
                warn!("Failed to read column {}: {}", col, err);
                None
            }
        }
    }

    /// Integer value, 0 for nulls
    fn get_i64(&self, col: &str) -> i64 {
        self.get_opt_i64(col).unwrap_or(0)
    }

    /// Y/N and TRUE/FALSE style flag columns
    fn get_flag(&self, col: &str) -> bool {
        match self.get_value(col) {
            DataValue::Boolean(b) => *b,
            val => val
                .to_text()
                .map(|s| matches!(s.trim().to_uppercase().as_str(), "Y" | "YES" | "TRUE"))
                .unwrap_or(false),
        }
    }

    fn get_datetime(&self, col: &str) -> Option<NaiveDateTime> {
        match self.get_value(col).try_coerce_date_time() {
            Ok(val) => val,
            Err(err) => {
                warn!("Failed to read column {}: {}", col, err);
                None
            }
        }
    }
}

impl RowExt for DataRow {
    fn get_value(&self, col: &str) -> &DataValue {
        self.get(col).unwrap_or(&DataValue::Null)
    }
}
