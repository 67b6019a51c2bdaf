use std::sync::Arc;

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use oradict_core::err::Result;
use oradict_logging::warn;

use crate::{
    dictionary::{DataRow, Dictionary, DictionaryQuery, RowExt},
    lazy::{LazyRef, LazyValue},
    object::CatalogObject,
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
    resolver::Fallback,
};

use super::{OracleDataSource, OracleRole, OracleSchema, OracleUser};

/// Reads every row of the query into objects, rows which fail to parse are skipped
pub(crate) fn load_rows<T>(
    progress: &Progress,
    dictionary: &Dictionary,
    query: DictionaryQuery,
    fetch: impl Fn(&DataRow) -> Result<T>,
) -> Result<Vec<Arc<T>>> {
    let rows = dictionary.query(progress, &query)?;

    Ok(rows
        .iter()
        .filter_map(|row| match fetch(row) {
            Ok(obj) => Some(Arc::new(obj)),
            Err(err) => {
                warn!("Failed to read row of {}: {:?}", query.view, err);
                None
            }
        })
        .collect())
}

/// A role granted to a user or another role
#[derive(Debug)]
pub struct OracleRolePrivilege {
    name: String,
    role: LazyRef<OracleRole>,
    admin_option: bool,
    default_role: bool,
}

impl OracleRolePrivilege {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        let name = row.require_string("GRANTED_ROLE")?;

        Ok(Self {
            role: LazyRef::from_name(Some(name.clone())),
            name,
            admin_option: row.get_flag("ADMIN_OPTION"),
            default_role: row.get_flag("DEFAULT_ROLE"),
        })
    }

    /// The granted role, its name if the role cannot be found or no progress is given
    pub fn role(
        &self,
        progress: Option<&Progress>,
        data_source: &OracleDataSource,
    ) -> Result<LazyValue<OracleRole>> {
        self.role.resolve(
            progress,
            data_source,
            data_source.role_cache(),
            Fallback::Name,
        )
    }

    pub fn is_admin_option(&self) -> bool {
        self.admin_option
    }

    pub fn is_default_role(&self) -> bool {
        self.default_role
    }
}

catalog_object!(OracleRolePrivilege, "role privilege");

/// A system privilege granted to a user or role, eg CREATE SESSION
#[derive(Debug)]
pub struct OracleSystemPrivilege {
    name: String,
    admin_option: bool,
}

impl OracleSystemPrivilege {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        Ok(Self {
            name: row.require_string("PRIVILEGE")?,
            admin_option: row.get_flag("ADMIN_OPTION"),
        })
    }

    pub fn is_admin_option(&self) -> bool {
        self.admin_option
    }
}

catalog_object!(OracleSystemPrivilege, "system privilege");

/// A privilege on a schema object granted to a user or role
#[derive(Debug)]
pub struct OracleObjectPrivilege {
    /// The object the privilege applies to
    name: String,
    schema: LazyRef<OracleSchema>,
    grantor: LazyRef<OracleUser>,
    privilege: String,
    grantable: bool,
    hierarchy: bool,
}

impl OracleObjectPrivilege {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        Ok(Self {
            name: row.require_string("TABLE_NAME")?,
            schema: LazyRef::from_name(row.get_string("OWNER")),
            grantor: LazyRef::from_name(row.get_string("GRANTOR")),
            privilege: row.require_string("PRIVILEGE")?,
            grantable: row.get_flag("GRANTABLE"),
            hierarchy: row.get_flag("HIERARCHY"),
        })
    }

    /// The schema owning the object
    pub fn schema(
        &self,
        progress: Option<&Progress>,
        data_source: &OracleDataSource,
    ) -> Result<LazyValue<OracleSchema>> {
        self.schema.resolve(
            progress,
            data_source,
            data_source.schema_cache(),
            Fallback::Name,
        )
    }

    /// The user who granted the privilege
    pub fn grantor(
        &self,
        progress: Option<&Progress>,
        data_source: &OracleDataSource,
    ) -> Result<LazyValue<OracleUser>> {
        self.grantor.resolve(
            progress,
            data_source,
            data_source.user_cache(),
            Fallback::Name,
        )
    }

    pub fn privilege(&self) -> &str {
        &self.privilege
    }

    pub fn is_grantable(&self) -> bool {
        self.grantable
    }

    pub fn is_hierarchy(&self) -> bool {
        self.hierarchy
    }
}

catalog_object!(OracleObjectPrivilege, "object privilege");

/// A grant of a role to a user, seen from the role
#[derive(Debug)]
pub struct OracleUserPrivilege {
    name: String,
    user: LazyRef<OracleUser>,
    admin_option: bool,
    default_role: bool,
}

impl OracleUserPrivilege {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        let name = row.require_string("GRANTEE")?;

        Ok(Self {
            user: LazyRef::from_name(Some(name.clone())),
            name,
            admin_option: row.get_flag("ADMIN_OPTION"),
            default_role: row.get_flag("DEFAULT_ROLE"),
        })
    }

    /// The user holding the role
    pub fn user(
        &self,
        progress: Option<&Progress>,
        data_source: &OracleDataSource,
    ) -> Result<LazyValue<OracleUser>> {
        self.user.resolve(
            progress,
            data_source,
            data_source.user_cache(),
            Fallback::Name,
        )
    }

    pub fn is_admin_option(&self) -> bool {
        self.admin_option
    }

    pub fn is_default_role(&self) -> bool {
        self.default_role
    }
}

catalog_object!(OracleUserPrivilege, "user privilege");

/// The privileges granted to a grantee, each kind loaded on first access
#[derive(Debug, Default)]
pub struct GranteePrivileges {
    roles: OnceCell<Vec<Arc<OracleRolePrivilege>>>,
    system: OnceCell<Vec<Arc<OracleSystemPrivilege>>>,
    objects: OnceCell<Vec<Arc<OracleObjectPrivilege>>>,
}

/// A user or role which can be granted privileges
pub trait OracleGrantee: CatalogObject {
    fn grantee_dictionary(&self) -> &Dictionary;

    fn grantee_privileges(&self) -> &GranteePrivileges;

    fn get_role_privileges(&self, progress: &Progress) -> Result<Vec<Arc<OracleRolePrivilege>>> {
        self.grantee_privileges()
            .roles
            .get_or_try_init(|| {
                load_rows(
                    progress,
                    self.grantee_dictionary(),
                    DictionaryQuery::new("DBA_ROLE_PRIVS")
                        .filter("GRANTEE", self.name())
                        .order_by("GRANTED_ROLE"),
                    OracleRolePrivilege::from_row,
                )
            })
            .map(Clone::clone)
    }

    fn get_system_privileges(
        &self,
        progress: &Progress,
    ) -> Result<Vec<Arc<OracleSystemPrivilege>>> {
        self.grantee_privileges()
            .system
            .get_or_try_init(|| {
                load_rows(
                    progress,
                    self.grantee_dictionary(),
                    DictionaryQuery::new("DBA_SYS_PRIVS")
                        .filter("GRANTEE", self.name())
                        .order_by("PRIVILEGE"),
                    OracleSystemPrivilege::from_row,
                )
            })
            .map(Clone::clone)
    }

    fn get_object_privileges(
        &self,
        progress: &Progress,
    ) -> Result<Vec<Arc<OracleObjectPrivilege>>> {
        self.grantee_privileges()
            .objects
            .get_or_try_init(|| {
                load_rows(
                    progress,
                    self.grantee_dictionary(),
                    DictionaryQuery::new("DBA_TAB_PRIVS")
                        .filter("GRANTEE", self.name())
                        .order_by("TABLE_NAME")
                        .order_by("PRIVILEGE"),
                    OracleObjectPrivilege::from_row,
                )
            })
            .map(Clone::clone)
    }
}

type RoleP = PropertyDescriptor<OracleRolePrivilege, OracleDataSource>;
type SysP = PropertyDescriptor<OracleSystemPrivilege, OracleDataSource>;
type ObjP = PropertyDescriptor<OracleObjectPrivilege, OracleDataSource>;
type UserP = PropertyDescriptor<OracleUserPrivilege, OracleDataSource>;

lazy_static! {
    static ref ROLE_PRIVILEGE_PROPERTIES: Vec<RoleP> = vec![
        RoleP::new("role", "Role", 1, |p, ctx| Ok(p.role(ctx.progress, ctx.scope)?.into())),
        RoleP::new("admin_option", "Admin Option", 2, |p, _| Ok(p.admin_option.into())),
        RoleP::new("default_role", "Default Role", 3, |p, _| Ok(p.default_role.into())),
    ];
    static ref SYSTEM_PRIVILEGE_PROPERTIES: Vec<SysP> = vec![
        SysP::new("privilege", "Privilege", 1, |p, _| Ok(p.name.as_str().into())),
        SysP::new("admin_option", "Admin Option", 2, |p, _| Ok(p.admin_option.into())),
    ];
    static ref OBJECT_PRIVILEGE_PROPERTIES: Vec<ObjP> = vec![
        ObjP::new("schema", "Owner", 1, |p, ctx| Ok(p.schema(ctx.progress, ctx.scope)?.into())),
        ObjP::new("object", "Object", 2, |p, _| Ok(p.name.as_str().into())),
        ObjP::new("privilege", "Privilege", 3, |p, _| Ok(p.privilege.as_str().into())),
        ObjP::new("grantor", "Grantor", 4, |p, ctx| Ok(p.grantor(ctx.progress, ctx.scope)?.into())),
        ObjP::new("grantable", "Grantable", 5, |p, _| Ok(p.grantable.into())),
        ObjP::new("hierarchy", "Hierarchy", 6, |p, _| Ok(p.hierarchy.into())),
    ];
    static ref USER_PRIVILEGE_PROPERTIES: Vec<UserP> = vec![
        UserP::new("user", "User", 1, |p, ctx| Ok(p.user(ctx.progress, ctx.scope)?.into())),
        UserP::new("admin_option", "Admin Option", 2, |p, _| Ok(p.admin_option.into())),
        UserP::new("default_role", "Default Role", 3, |p, _| Ok(p.default_role.into())),
    ];
}

impl PropertySource for OracleRolePrivilege {
    type Scope = OracleDataSource;

    fn properties() -> &'static [RoleP] {
        ROLE_PRIVILEGE_PROPERTIES.as_slice()
    }
}

impl PropertySource for OracleSystemPrivilege {
    type Scope = OracleDataSource;

    fn properties() -> &'static [SysP] {
        SYSTEM_PRIVILEGE_PROPERTIES.as_slice()
    }
}

impl PropertySource for OracleObjectPrivilege {
    type Scope = OracleDataSource;

    fn properties() -> &'static [ObjP] {
        OBJECT_PRIVILEGE_PROPERTIES.as_slice()
    }
}

impl PropertySource for OracleUserPrivilege {
    type Scope = OracleDataSource;

    fn properties() -> &'static [UserP] {
        USER_PRIVILEGE_PROPERTIES.as_slice()
    }
}
