use std::{collections::HashMap, fmt, sync::Arc};

use itertools::Itertools;
use oradict_core::{data::DataValue, err::Result};
use oradict_logging::{debug, MaxLogLength};

use crate::{object::CatalogObject, progress::Progress};

mod memory;
pub use memory::*;
mod row;
pub use row::*;

/// A single row of a data dictionary view, keyed by column name
pub type DataRow = HashMap<String, DataValue>;

/// A condition on a single column of a dictionary view
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Equality, a null value matches null columns
    Eq(String, DataValue),
    /// SQL LIKE mask, comparing upper-cased text when `ignore_case` is set
    Like {
        col: String,
        mask: String,
        ignore_case: bool,
    },
    /// The column equals one of the values, an empty list matches nothing
    In(String, Vec<DataValue>),
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Eq(col, val) => match val.to_text() {
                Some(text) => write!(f, "{} = {}", col, quote(&text)),
                None => write!(f, "{} IS NULL", col),
            },
            Condition::Like {
                col,
                mask,
                ignore_case: true,
            } => write!(f, "UPPER({}) LIKE {}", col, quote(&mask.to_uppercase())),
            Condition::Like { col, mask, .. } => write!(f, "{} LIKE {}", col, quote(mask)),
            Condition::In(_, vals) if vals.is_empty() => write!(f, "1 = 0"),
            Condition::In(col, vals) => write!(
                f,
                "{} IN ({})",
                col,
                vals.iter()
                    .map(|v| v.to_text().map(|t| quote(&t)).unwrap_or_else(|| "NULL".into()))
                    .join(", ")
            ),
        }
    }
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// A query against a single data dictionary view
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryQuery {
    /// The view to select from, eg `DBA_USERS`
    pub view: String,
    /// Conditions which every returned row satisfies
    pub filters: Vec<Condition>,
    /// Columns to order by, ascending
    pub order_by: Vec<String>,
}

impl DictionaryQuery {
    pub fn new(view: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            filters: vec![],
            order_by: vec![],
        }
    }

    pub fn filter(mut self, col: impl Into<String>, val: impl Into<DataValue>) -> Self {
        self.filters.push(Condition::Eq(col.into(), val.into()));
        self
    }

    pub fn filter_like(
        mut self,
        col: impl Into<String>,
        mask: impl Into<String>,
        ignore_case: bool,
    ) -> Self {
        self.filters.push(Condition::Like {
            col: col.into(),
            mask: mask.into(),
            ignore_case,
        });
        self
    }

    pub fn filter_in<V: Into<DataValue>>(
        mut self,
        col: impl Into<String>,
        vals: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Condition::In(
            col.into(),
            vals.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn order_by(mut self, col: impl Into<String>) -> Self {
        self.order_by.push(col.into());
        self
    }
}

impl fmt::Display for DictionaryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.view)?;

        for (idx, cond) in self.filters.iter().enumerate() {
            write!(f, "{}{}", if idx == 0 { " WHERE " } else { " AND " }, cond)?;
        }

        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", self.order_by.join(", "))?;
        }

        Ok(())
    }
}

/// A source of data dictionary rows, usually backed by a database session
pub trait DictionarySource: Send + Sync {
    /// Runs the query, returning the matching rows
    fn query(&self, progress: &Progress, query: &DictionaryQuery) -> Result<Vec<DataRow>>;
}

/// Handle to the data dictionary of a data source.
///
/// Knows whether the connected user may read the DBA_* views and picks the
/// view family accordingly.
#[derive(Clone)]
pub struct Dictionary {
    source: Arc<dyn DictionarySource>,
    admin: bool,
    log_limit: Option<usize>,
}

impl Dictionary {
    pub fn new(source: Arc<dyn DictionarySource>, admin: bool) -> Self {
        Self {
            source,
            admin,
            log_limit: None,
        }
    }

    /// Limits the length of values written to the logs
    pub fn with_log_limit(mut self, limit: Option<usize>) -> Self {
        self.log_limit = limit;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// The DBA_ view if available, otherwise the USER_ view
    pub fn admin_view(&self, name: &str) -> String {
        format!("{}_{}", if self.admin { "DBA" } else { "USER" }, name)
    }

    /// The DBA_ view if available, otherwise the ALL_ view
    pub fn all_view(&self, name: &str) -> String {
        format!("{}_{}", if self.admin { "DBA" } else { "ALL" }, name)
    }

    pub fn query(&self, progress: &Progress, query: &DictionaryQuery) -> Result<Vec<DataRow>> {
        progress.check()?;
        debug!("Querying dictionary: {}", MaxLogLength::new(self.log_limit, query));

        let rows = self.source.query(progress, query)?;
        debug!("Retrieved {} rows from {}", rows.len(), query.view);

        Ok(rows)
    }
}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dictionary")
            .field("admin", &self.admin)
            .finish_non_exhaustive()
    }
}

/// A catalog object which owns caches loaded from the dictionary
pub trait DictionaryScope: CatalogObject {
    fn dictionary(&self) -> &Dictionary;
}
