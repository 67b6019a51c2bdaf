use lazy_static::lazy_static;
use oradict_core::{data::chrono::NaiveDateTime, err::Result};

use crate::{
    dictionary::{DataRow, Dictionary, RowExt},
    lazy::{LazyRef, LazyValue},
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
    resolver::Fallback,
};

use super::{GranteePrivileges, OracleDataSource, OracleGrantee, OracleTablespace};

/// A database account
#[derive(Debug)]
pub struct OracleUser {
    dictionary: Dictionary,
    name: String,
    id: i64,
    account_status: Option<String>,
    created: Option<NaiveDateTime>,
    profile: Option<String>,
    default_tablespace: LazyRef<OracleTablespace>,
    temp_tablespace: LazyRef<OracleTablespace>,
    privileges: GranteePrivileges,
}

impl OracleUser {
    pub(crate) fn from_row(dictionary: Dictionary, row: &DataRow) -> Result<Self> {
        Ok(Self {
            dictionary,
            name: row.require_string("USERNAME")?,
            id: row.get_opt_i64("USER_ID").unwrap_or(-1),
            account_status: row.get_string("ACCOUNT_STATUS"),
            created: row.get_datetime("CREATED"),
            profile: row.get_string("PROFILE"),
            default_tablespace: LazyRef::from_name(row.get_string("DEFAULT_TABLESPACE")),
            temp_tablespace: LazyRef::from_name(row.get_string("TEMPORARY_TABLESPACE")),
            privileges: GranteePrivileges::default(),
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn account_status(&self) -> Option<&str> {
        self.account_status.as_deref()
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        self.created
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn default_tablespace(
        &self,
        progress: Option<&Progress>,
        data_source: &OracleDataSource,
    ) -> Result<LazyValue<OracleTablespace>> {
        self.default_tablespace.resolve(
            progress,
            data_source,
            data_source.tablespace_cache(),
            Fallback::Name,
        )
    }

    pub fn temp_tablespace(
        &self,
        progress: Option<&Progress>,
        data_source: &OracleDataSource,
    ) -> Result<LazyValue<OracleTablespace>> {
        self.temp_tablespace.resolve(
            progress,
            data_source,
            data_source.tablespace_cache(),
            Fallback::Name,
        )
    }
}

catalog_object!(OracleUser, "user");

impl OracleGrantee for OracleUser {
    fn grantee_dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn grantee_privileges(&self) -> &GranteePrivileges {
        &self.privileges
    }
}

type P = PropertyDescriptor<OracleUser, OracleDataSource>;

lazy_static! {
    static ref USER_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |u, _| Ok(u.name.as_str().into())),
        P::new("id", "ID", 2, |u, _| Ok(u.id.into())),
        P::new("account_status", "Account Status", 3, |u, _| {
            Ok(u.account_status.clone().into())
        }),
        P::new("created", "Created", 4, |u, _| Ok(u.created.into())),
        P::new("default_tablespace", "Default Tablespace", 5, |u, ctx| {
            Ok(u.default_tablespace(ctx.progress, ctx.scope)?.into())
        }),
        P::new("temp_tablespace", "Temp Tablespace", 6, |u, ctx| {
            Ok(u.temp_tablespace(ctx.progress, ctx.scope)?.into())
        }),
        P::new("profile", "Profile", 7, |u, _| Ok(u.profile.clone().into())),
    ];
}

impl PropertySource for OracleUser {
    type Scope = OracleDataSource;

    fn properties() -> &'static [P] {
        USER_PROPERTIES.as_slice()
    }
}
