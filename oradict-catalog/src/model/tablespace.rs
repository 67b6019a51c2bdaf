use lazy_static::lazy_static;
use oradict_core::err::Result;

use crate::{
    dictionary::{DataRow, RowExt},
    property::{PropertyDescriptor, PropertySource},
};

use super::OracleDataSource;

#[derive(Debug)]
pub struct OracleTablespace {
    name: String,
    block_size: Option<i64>,
    status: Option<String>,
    contents: Option<String>,
    logging: Option<String>,
    extent_management: Option<String>,
}

impl OracleTablespace {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        Ok(Self {
            name: row.require_string("TABLESPACE_NAME")?,
            block_size: row.get_opt_i64("BLOCK_SIZE"),
            status: row.get_string("STATUS"),
            contents: row.get_string("CONTENTS"),
            logging: row.get_string("LOGGING"),
            extent_management: row.get_string("EXTENT_MANAGEMENT"),
        })
    }

    pub fn block_size(&self) -> Option<i64> {
        self.block_size
    }

    /// ONLINE, OFFLINE or READ ONLY
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// PERMANENT, TEMPORARY or UNDO
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    pub fn is_online(&self) -> bool {
        self.status() == Some("ONLINE")
    }
}

catalog_object!(OracleTablespace, "tablespace");

type P = PropertyDescriptor<OracleTablespace, OracleDataSource>;

lazy_static! {
    static ref TABLESPACE_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |t, _| Ok(t.name.as_str().into())),
        P::new("block_size", "Block Size", 2, |t, _| Ok(t.block_size.into())),
        P::new("status", "Status", 3, |t, _| Ok(t.status.clone().into())),
        P::new("contents", "Contents", 4, |t, _| Ok(t.contents.clone().into())),
        P::new("logging", "Logging", 5, |t, _| Ok(t.logging.clone().into())),
        P::new("extent_management", "Extent Management", 6, |t, _| {
            Ok(t.extent_management.clone().into())
        }),
    ];
}

impl PropertySource for OracleTablespace {
    type Scope = OracleDataSource;

    fn properties() -> &'static [P] {
        TABLESPACE_PROPERTIES.as_slice()
    }
}
