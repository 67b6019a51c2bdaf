use std::sync::Arc;

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use oradict_core::{
    data::chrono::NaiveDateTime,
    err::{Error, Result},
};

use crate::{
    cache::CacheLoader,
    dictionary::{DataRow, Dictionary, DictionaryQuery, DictionaryScope, RowExt},
    lazy::{LazyRef, LazyValue},
    object::CatalogObject,
    progress::Progress,
    property::{PropertyDescriptor, PropertySource, PropertyValue},
    resolver::Fallback,
};

use super::{load_rows, OracleSchema, OracleTablePartition, OracleTablespace, PartitionInfo};

#[derive(Debug)]
pub struct OracleTable {
    dictionary: Dictionary,
    owner: String,
    name: String,
    tablespace: LazyRef<OracleTablespace>,
    status: Option<String>,
    num_rows: Option<i64>,
    partitioned: bool,
    temporary: bool,
    last_analyzed: Option<NaiveDateTime>,
    partition_info: OnceCell<Option<PartitionInfo>>,
    partitions: OnceCell<Vec<Arc<OracleTablePartition>>>,
}

impl OracleTable {
    pub(crate) fn from_row(schema: &OracleSchema, row: &DataRow) -> Result<Self> {
        Ok(Self {
            dictionary: schema.dictionary().clone(),
            owner: schema.name().to_string(),
            name: row.require_string("TABLE_NAME")?,
            tablespace: LazyRef::from_name(row.get_string_trimmed("TABLESPACE_NAME")),
            status: row.get_string("STATUS"),
            num_rows: row.get_opt_i64("NUM_ROWS"),
            partitioned: row.get_flag("PARTITIONED"),
            temporary: row.get_flag("TEMPORARY"),
            last_analyzed: row.get_datetime("LAST_ANALYZED"),
            partition_info: OnceCell::new(),
            partitions: OnceCell::new(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// VALID or UNUSABLE
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn num_rows(&self) -> Option<i64> {
        self.num_rows
    }

    pub fn is_partitioned(&self) -> bool {
        self.partitioned
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn last_analyzed(&self) -> Option<NaiveDateTime> {
        self.last_analyzed
    }

    /// Partitioned and temporary tables have no tablespace of their own
    pub fn tablespace(
        &self,
        progress: Option<&Progress>,
        schema: &OracleSchema,
    ) -> Result<LazyValue<OracleTablespace>> {
        let data_source = schema.data_source()?;

        self.tablespace.resolve(
            progress,
            &*data_source,
            data_source.tablespace_cache(),
            Fallback::Name,
        )
    }

    /// Partitioning details, loaded once. `None` for tables which are not partitioned.
    pub fn partition_info(&self, progress: &Progress) -> Result<Option<&PartitionInfo>> {
        if !self.partitioned {
            return Ok(None);
        }

        let info = self.partition_info.get_or_try_init(|| {
            let rows = self.dictionary.query(
                progress,
                &DictionaryQuery::new(self.dictionary.all_view("PART_TABLES"))
                    .filter("OWNER", self.owner.as_str())
                    .filter("TABLE_NAME", self.name.as_str()),
            )?;

            Ok::<_, Error>(rows.first().map(PartitionInfo::from_row))
        })?;

        Ok(info.as_ref())
    }

    /// Returns the partition info if it was already loaded, never queries
    pub fn cached_partition_info(&self) -> Option<&PartitionInfo> {
        self.partition_info.get().and_then(Option::as_ref)
    }

    pub fn get_partitions(&self, progress: &Progress) -> Result<Vec<Arc<OracleTablePartition>>> {
        if !self.partitioned {
            return Ok(vec![]);
        }

        self.partitions
            .get_or_try_init(|| {
                load_rows(
                    progress,
                    &self.dictionary,
                    DictionaryQuery::new(self.dictionary.all_view("TAB_PARTITIONS"))
                        .filter("TABLE_OWNER", self.owner.as_str())
                        .filter("TABLE_NAME", self.name.as_str())
                        .order_by("PARTITION_POSITION"),
                    |row| {
                        OracleTablePartition::from_row(
                            self.dictionary.clone(),
                            &self.owner,
                            &self.name,
                            None,
                            row,
                        )
                    },
                )
            })
            .map(Clone::clone)
    }

    fn partition_property(
        &self,
        progress: Option<&Progress>,
        read: impl FnOnce(&PartitionInfo) -> PropertyValue,
    ) -> Result<PropertyValue> {
        let info = match progress {
            Some(progress) => self.partition_info(progress)?,
            None => self.cached_partition_info(),
        };

        Ok(info.map(read).unwrap_or(PropertyValue::Null))
    }
}

catalog_object!(OracleTable, "table");

type P = PropertyDescriptor<OracleTable, OracleSchema>;

lazy_static! {
    static ref TABLE_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |t, _| Ok(t.name.as_str().into())),
        P::new("tablespace", "Tablespace", 2, |t, ctx| {
            Ok(t.tablespace(ctx.progress, ctx.scope)?.into())
        }),
        P::new("status", "Status", 3, |t, _| Ok(t.status().into())),
        P::new("num_rows", "Row Count", 4, |t, _| Ok(t.num_rows.into())),
        P::new("partitioned", "Partitioned", 5, |t, _| Ok(t.partitioned.into())),
        P::new("temporary", "Temporary", 6, |t, _| Ok(t.temporary.into())),
        P::new("last_analyzed", "Last Analyzed", 7, |t, _| Ok(t.last_analyzed.into())),
        P::new("partition_type", "Partition Type", 20, |t, ctx| {
            t.partition_property(ctx.progress, |i| i.partition_type().to_string().into())
        }),
        P::new("subpartition_type", "Subpartition Type", 21, |t, ctx| {
            t.partition_property(ctx.progress, |i| {
                i.subpartition_type().map(|s| s.to_string()).into()
            })
        }),
        P::new("partition_interval", "Interval", 22, |t, ctx| {
            t.partition_property(ctx.progress, |i| i.interval().into())
        }),
        P::new("partition_interval_kind", "Interval Kind", 23, |t, ctx| {
            t.partition_property(ctx.progress, |i| i.interval_kind().title().into())
        }),
        P::new("partition_count", "Partition Count", 24, |t, ctx| {
            t.partition_property(ctx.progress, |i| i.partition_count().into())
        }),
        P::new("partition_tablespace", "Partition Tablespace", 25, |t, ctx| {
            let info = match ctx.progress {
                Some(progress) => t.partition_info(progress)?,
                None => t.cached_partition_info(),
            };

            match info {
                Some(info) => {
                    let data_source = ctx.scope.data_source()?;
                    Ok(info.default_tablespace(ctx.progress, &data_source)?.into())
                }
                None => Ok(PropertyValue::Null),
            }
        }),
    ];
}

impl PropertySource for OracleTable {
    type Scope = OracleSchema;

    fn properties() -> &'static [P] {
        TABLE_PROPERTIES.as_slice()
    }
}

/// Lists the tables owned by a schema
pub struct TableLoader;

impl CacheLoader for TableLoader {
    type Owner = OracleSchema;
    type Object = OracleTable;

    const DESCRIPTION: &'static str = "tables";

    fn query(&self, owner: &OracleSchema) -> DictionaryQuery {
        DictionaryQuery::new(owner.dictionary().all_view("TABLES"))
            .filter("OWNER", owner.name())
            .order_by("TABLE_NAME")
    }

    fn fetch(&self, owner: &OracleSchema, row: &DataRow) -> Result<OracleTable> {
        OracleTable::from_row(owner, row)
    }
}
