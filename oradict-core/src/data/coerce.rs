use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;

use super::DataValue;

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

impl DataValue {
    /// Coerces the value into an integer.
    ///
    /// Dictionary views expose most counters as NUMBER columns, so decimals
    /// are accepted as long as they carry no fractional part.
    /// Nulls coerce to `None`.
    pub fn try_coerce_i64(&self) -> Result<Option<i64>> {
        Ok(Some(match self {
            DataValue::Null => return Ok(None),
            DataValue::Int32(i) => *i as i64,
            DataValue::Int64(i) => *i,
            DataValue::Boolean(b) => *b as i64,
            DataValue::Decimal(d) if d.fract().is_zero() => match d.to_i64() {
                Some(i) => i,
                None => bail!("Decimal {} is out of range of i64", d),
            },
            DataValue::Float64(f) if f.fract() == 0.0 && f.is_finite() => *f as i64,
            DataValue::Utf8String(s) => match s.trim().parse::<i64>() {
                Ok(i) => i,
                Err(_) => bail!("Failed to parse \"{}\" as an integer", s),
            },
            v => bail!("Cannot coerce {:?} into an integer", v),
        }))
    }

    /// Coerces the value into a timestamp.
    /// Dates are promoted to midnight, strings are parsed in ISO-like formats.
    pub fn try_coerce_date_time(&self) -> Result<Option<NaiveDateTime>> {
        Ok(Some(match self {
            DataValue::Null => return Ok(None),
            DataValue::DateTime(d) => *d,
            DataValue::Date(d) => match d.and_hms_opt(0, 0, 0) {
                Some(d) => d,
                None => bail!("Invalid date {}", d),
            },
            DataValue::Utf8String(s) => {
                let s = s.trim();
                if let Some(d) = DATE_TIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                {
                    d
                } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    return DataValue::Date(d).try_coerce_date_time();
                } else {
                    bail!("Failed to parse \"{}\" as a timestamp", s)
                }
            }
            v => bail!("Cannot coerce {:?} into a timestamp", v),
        }))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_coerce_i64() {
        assert_eq!(DataValue::Null.try_coerce_i64().unwrap(), None);
        assert_eq!(DataValue::Int32(3).try_coerce_i64().unwrap(), Some(3));
        assert_eq!(
            DataValue::Decimal(Decimal::new(8192, 0))
                .try_coerce_i64()
                .unwrap(),
            Some(8192)
        );
        assert_eq!(DataValue::from(" 42 ").try_coerce_i64().unwrap(), Some(42));
        assert_eq!(DataValue::Float64(7.0).try_coerce_i64().unwrap(), Some(7));
    }

    #[test]
    fn test_coerce_i64_invalid() {
        assert!(DataValue::Decimal(Decimal::new(15, 1))
            .try_coerce_i64()
            .is_err());
        assert!(DataValue::from("abc").try_coerce_i64().is_err());
        assert!(DataValue::Binary(vec![1]).try_coerce_i64().is_err());
    }

    #[test]
    fn test_coerce_date_time() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();

        assert_eq!(
            DataValue::from("2021-03-04 05:06:07")
                .try_coerce_date_time()
                .unwrap(),
            Some(expected)
        );
        assert_eq!(
            DataValue::from("2021-03-04T05:06:07")
                .try_coerce_date_time()
                .unwrap(),
            Some(expected)
        );
        assert_eq!(
            DataValue::from("2021-03-04")
                .try_coerce_date_time()
                .unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 4).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(DataValue::Null.try_coerce_date_time().unwrap(), None);
        assert!(DataValue::from("yesterday").try_coerce_date_time().is_err());
    }
}
