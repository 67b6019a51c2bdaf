use std::sync::Arc;

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use oradict_core::err::Result;

use crate::{
    dictionary::{DataRow, Dictionary, DictionaryQuery, RowExt},
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
};

use super::{load_rows, GranteePrivileges, OracleDataSource, OracleGrantee, OracleUserPrivilege};

#[derive(Debug)]
pub struct OracleRole {
    dictionary: Dictionary,
    name: String,
    password_required: bool,
    authentication_type: Option<String>,
    privileges: GranteePrivileges,
    user_privileges: OnceCell<Vec<Arc<OracleUserPrivilege>>>,
}

impl OracleRole {
    pub(crate) fn from_row(dictionary: Dictionary, row: &DataRow) -> Result<Self> {
        Ok(Self {
            dictionary,
            name: row.require_string("ROLE")?,
            password_required: row.get_flag("PASSWORD_REQUIRED"),
            authentication_type: row.get_string("AUTHENTICATION_TYPE"),
            privileges: GranteePrivileges::default(),
            user_privileges: OnceCell::new(),
        })
    }

    pub fn is_password_required(&self) -> bool {
        self.password_required
    }

    pub fn authentication_type(&self) -> Option<&str> {
        self.authentication_type.as_deref()
    }

    /// The users this role is granted to
    pub fn get_user_privileges(&self, progress: &Progress) -> Result<Vec<Arc<OracleUserPrivilege>>> {
        self.user_privileges
            .get_or_try_init(|| {
                load_rows(
                    progress,
                    &self.dictionary,
                    DictionaryQuery::new("DBA_ROLE_PRIVS")
                        .filter("GRANTED_ROLE", self.name.as_str())
                        .order_by("GRANTEE"),
                    OracleUserPrivilege::from_row,
                )
            })
            .map(Clone::clone)
    }
}

catalog_object!(OracleRole, "role");

impl OracleGrantee for OracleRole {
    fn grantee_dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn grantee_privileges(&self) -> &GranteePrivileges {
        &self.privileges
    }
}

type P = PropertyDescriptor<OracleRole, OracleDataSource>;

lazy_static! {
    static ref ROLE_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |r, _| Ok(r.name.as_str().into())),
        P::new("password_required", "Password Required", 2, |r, _| {
            Ok(r.password_required.into())
        }),
        P::new("authentication_type", "Authentication", 3, |r, _| {
            Ok(r.authentication_type.clone().into())
        }),
    ];
}

impl PropertySource for OracleRole {
    type Scope = OracleDataSource;

    fn properties() -> &'static [P] {
        ROLE_PROPERTIES.as_slice()
    }
}
