use std::{fmt, sync::Arc};

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use oradict_core::{data::chrono::NaiveDateTime, err::Result};
use regex::Regex;

use crate::{
    dictionary::{DataRow, Dictionary, DictionaryQuery, RowExt},
    lazy::{LazyRef, LazyValue},
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
    resolver::Fallback,
};

use super::{load_rows, OracleDataSource, OracleSchema, OracleTablespace};

/// How rows are distributed across partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionType {
    None,
    Range,
    Hash,
    System,
    List,
}

impl PartitionType {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.trim().to_uppercase().as_str() {
            "NONE" => Self::None,
            "RANGE" => Self::Range,
            "HASH" => Self::Hash,
            "SYSTEM" => Self::System,
            "LIST" => Self::List,
            _ => return None,
        })
    }
}

impl fmt::Display for PartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "NONE",
            Self::Range => "RANGE",
            Self::Hash => "HASH",
            Self::System => "SYSTEM",
            Self::List => "LIST",
        };
        write!(f, "{}", name)
    }
}

/// The unit of an interval partitioning expression such as
/// `NUMTOYMINTERVAL(1, 'MONTH')`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    None,
    /// An expression which is not a plain NUMTO*INTERVAL call
    Custom,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

lazy_static! {
    static ref INTERVAL_EXPR: Regex =
        Regex::new(r"^\s*(?P<kind>\w+)\s*\((?P<value>.+),\s*'(?P<unit>\w+)'\s*\)\s*$")
            .expect("Invalid interval expression pattern");
}

impl IntervalKind {
    /// Recognizes the unit of the expression and extracts its value.
    /// Expressions other than a NUMTO*INTERVAL call are returned whole as `Custom`.
    pub fn recognize(expr: Option<&str>) -> (Self, Option<String>) {
        let expr = match expr {
            Some(expr) if !expr.is_empty() => expr,
            _ => return (Self::None, None),
        };

        let parsed = INTERVAL_EXPR.captures(expr).and_then(|caps| {
            let kind = Self::from_literal(&caps["kind"], &caps["unit"])?;
            Some((kind, caps["value"].to_string()))
        });

        match parsed {
            Some((kind, value)) => (kind, Some(value)),
            None => (Self::Custom, Some(expr.to_string())),
        }
    }

    fn from_literal(func: &str, unit: &str) -> Option<Self> {
        Some(match (func.to_uppercase().as_str(), unit.to_uppercase().as_str()) {
            ("NUMTOYMINTERVAL", "YEAR") => Self::Year,
            ("NUMTOYMINTERVAL", "MONTH") => Self::Month,
            ("NUMTODSINTERVAL", "DAY") => Self::Day,
            ("NUMTODSINTERVAL", "HOUR") => Self::Hour,
            ("NUMTODSINTERVAL", "MINUTE") => Self::Minute,
            ("NUMTODSINTERVAL", "SECOND") => Self::Second,
            _ => return None,
        })
    }

    /// The function building an interval literal of this unit
    pub fn literal_function(&self) -> Option<&'static str> {
        match self {
            Self::None | Self::Custom => None,
            Self::Year | Self::Month => Some("NUMTOYMINTERVAL"),
            Self::Day | Self::Hour | Self::Minute | Self::Second => Some("NUMTODSINTERVAL"),
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        Some(match self {
            Self::None | Self::Custom => return None,
            Self::Year => "YEAR",
            Self::Month => "MONTH",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Second => "SECOND",
        })
    }

    /// Builds the interval expression of this kind for the supplied value,
    /// eg `NUMTOYMINTERVAL(3, 'MONTH')`
    pub fn prepare_expression(&self, value: &str) -> Option<String> {
        match (self, self.literal_function(), self.unit()) {
            (Self::Custom, _, _) => Some("<enter custom expression>".to_string()),
            (_, Some(func), Some(unit)) => Some(format!("{}({}, '{}')", func, value, unit)),
            _ => None,
        }
    }

    /// Rewrites an existing expression to this kind, keeping its value when
    /// the expression was recognized
    pub fn change_expression(&self, expr: Option<&str>) -> Option<String> {
        let value = match Self::recognize(expr) {
            (Self::None | Self::Custom, _) | (_, None) => "1".to_string(),
            (_, Some(value)) => value,
        };

        self.prepare_expression(&value)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::None => "No partition by interval",
            Self::Custom => "Use custom interval expression",
            Self::Year => "by interval of years",
            Self::Month => "by interval of months",
            Self::Day => "by interval of days",
            Self::Hour => "by interval of hours",
            Self::Minute => "by interval of minutes",
            Self::Second => "by interval of seconds",
        }
    }
}

/// Partitioning details of a partitioned table
#[derive(Debug)]
pub struct PartitionInfo {
    partition_type: PartitionType,
    subpartition_type: Option<PartitionType>,
    interval: Option<String>,
    partition_count: i64,
    default_tablespace: LazyRef<OracleTablespace>,
}

impl PartitionInfo {
    pub(crate) fn from_row(row: &DataRow) -> Self {
        Self {
            partition_type: row
                .get_string_trimmed("PARTITIONING_TYPE")
                .and_then(|t| PartitionType::from_name(&t))
                .unwrap_or(PartitionType::Range),
            subpartition_type: row
                .get_string_trimmed("SUBPARTITIONING_TYPE")
                .and_then(|t| PartitionType::from_name(&t)),
            interval: row.get_string("INTERVAL"),
            partition_count: row.get_i64("PARTITION_COUNT"),
            default_tablespace: LazyRef::from_name(row.get_string_trimmed("DEF_TABLESPACE_NAME")),
        }
    }

    pub fn partition_type(&self) -> PartitionType {
        self.partition_type
    }

    pub fn subpartition_type(&self) -> Option<PartitionType> {
        self.subpartition_type
    }

    pub fn interval(&self) -> Option<&str> {
        self.interval.as_deref()
    }

    pub fn interval_kind(&self) -> IntervalKind {
        IntervalKind::recognize(self.interval()).0
    }

    pub fn partition_count(&self) -> i64 {
        self.partition_count
    }

    /// The tablespace new partitions are created in.
    /// Without access to the admin views only its name is available.
    pub fn default_tablespace(
        &self,
        progress: Option<&Progress>,
        data_source: &OracleDataSource,
    ) -> Result<LazyValue<OracleTablespace>> {
        if !data_source.is_admin() {
            return Ok(self.default_tablespace.peek());
        }

        self.default_tablespace.resolve(
            progress,
            data_source,
            data_source.tablespace_cache(),
            Fallback::Name,
        )
    }
}

/// A partition of a table, or a sub-partition of a partition
#[derive(Debug)]
pub struct OracleTablePartition {
    dictionary: Dictionary,
    table_owner: String,
    table_name: String,
    name: String,
    parent_partition: Option<String>,
    position: i64,
    high_value: Option<String>,
    usable: bool,
    sample_size: Option<i64>,
    last_analyzed: Option<NaiveDateTime>,
    sub_partitions: OnceCell<Vec<Arc<OracleTablePartition>>>,
}

impl OracleTablePartition {
    pub(crate) fn from_row(
        dictionary: Dictionary,
        table_owner: &str,
        table_name: &str,
        parent_partition: Option<&str>,
        row: &DataRow,
    ) -> Result<Self> {
        let (name, position) = match parent_partition {
            Some(_) => (
                row.require_string("SUBPARTITION_NAME")?,
                row.get_i64("SUBPARTITION_POSITION"),
            ),
            None => (
                row.require_string("PARTITION_NAME")?,
                row.get_i64("PARTITION_POSITION"),
            ),
        };

        Ok(Self {
            dictionary,
            table_owner: table_owner.to_string(),
            table_name: table_name.to_string(),
            name,
            parent_partition: parent_partition.map(|p| p.to_string()),
            position,
            high_value: row.get_string("HIGH_VALUE"),
            usable: row.get_string("STATUS").as_deref() == Some("USABLE"),
            sample_size: row.get_opt_i64("SAMPLE_SIZE"),
            last_analyzed: row.get_datetime("LAST_ANALYZED"),
            sub_partitions: OnceCell::new(),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The partition this sub-partition belongs to
    pub fn parent_partition(&self) -> Option<&str> {
        self.parent_partition.as_deref()
    }

    pub fn is_sub_partition(&self) -> bool {
        self.parent_partition.is_some()
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn high_value(&self) -> Option<&str> {
        self.high_value.as_deref()
    }

    pub fn is_usable(&self) -> bool {
        self.usable
    }

    pub fn sample_size(&self) -> Option<i64> {
        self.sample_size
    }

    pub fn last_analyzed(&self) -> Option<NaiveDateTime> {
        self.last_analyzed
    }

    /// Sub-partitions are loaded on first access, sub-partitions have none
    pub fn get_sub_partitions(&self, progress: &Progress) -> Result<Vec<Arc<OracleTablePartition>>> {
        if self.is_sub_partition() {
            return Ok(vec![]);
        }

        self.sub_partitions
            .get_or_try_init(|| {
                load_rows(
                    progress,
                    &self.dictionary,
                    DictionaryQuery::new(self.dictionary.all_view("TAB_SUBPARTITIONS"))
                        .filter("TABLE_OWNER", self.table_owner.as_str())
                        .filter("TABLE_NAME", self.table_name.as_str())
                        .filter("PARTITION_NAME", self.name.as_str())
                        .order_by("SUBPARTITION_POSITION"),
                    |row| {
                        OracleTablePartition::from_row(
                            self.dictionary.clone(),
                            &self.table_owner,
                            &self.table_name,
                            Some(self.name.as_str()),
                            row,
                        )
                    },
                )
            })
            .map(Clone::clone)
    }

    /// Whether loaded sub-partitions exist, never queries
    pub fn has_sub_partitions(&self) -> bool {
        self.sub_partitions
            .get()
            .map(|p| !p.is_empty())
            .unwrap_or(false)
    }
}

catalog_object!(OracleTablePartition, "partition");

type P = PropertyDescriptor<OracleTablePartition, OracleSchema>;

lazy_static! {
    static ref PARTITION_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |p, _| Ok(p.name.as_str().into())),
        P::new("position", "Position", 2, |p, _| Ok(p.position.into())),
        P::new("high_value", "High Value", 3, |p, _| Ok(p.high_value().into())),
        P::new("usable", "Usable", 4, |p, _| Ok(p.usable.into())),
        P::new("sample_size", "Sample Size", 5, |p, _| Ok(p.sample_size.into())),
        P::new("last_analyzed", "Last Analyzed", 6, |p, _| Ok(p.last_analyzed.into())),
        P::new("parent_partition", "Partition", 7, |p, _| Ok(p.parent_partition().into())).hidden(),
    ];
}

impl PropertySource for OracleTablePartition {
    type Scope = OracleSchema;

    fn properties() -> &'static [P] {
        PARTITION_PROPERTIES.as_slice()
    }
}
