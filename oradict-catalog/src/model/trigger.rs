use lazy_static::lazy_static;
use oradict_core::err::Result;

use crate::{
    cache::CacheLoader,
    dictionary::{DataRow, DictionaryQuery, DictionaryScope, RowExt},
    lazy::{LazyRef, LazyValue},
    object::CatalogObject,
    progress::Progress,
    property::{PropertyDescriptor, PropertySource},
    resolver::Fallback,
};

use super::{OracleSchema, OracleTable};

#[derive(Debug)]
pub struct OracleTrigger {
    name: String,
    trigger_type: Option<String>,
    triggering_event: Option<String>,
    base_object_type: Option<String>,
    table: LazyRef<OracleTable>,
    enabled: bool,
    description: Option<String>,
    action_type: Option<String>,
    when_clause: Option<String>,
}

impl OracleTrigger {
    pub(crate) fn from_row(row: &DataRow) -> Result<Self> {
        Ok(Self {
            name: row.require_string("TRIGGER_NAME")?,
            trigger_type: row.get_string("TRIGGER_TYPE"),
            triggering_event: row.get_string("TRIGGERING_EVENT"),
            base_object_type: row.get_string_trimmed("BASE_OBJECT_TYPE"),
            table: LazyRef::from_name(row.get_string("TABLE_NAME")),
            enabled: row.get_string("STATUS").as_deref() == Some("ENABLED"),
            description: row.get_string("DESCRIPTION"),
            action_type: row.get_string("ACTION_TYPE"),
            when_clause: row.get_string_trimmed("WHEN_CLAUSE"),
        })
    }

    /// eg BEFORE EACH ROW
    pub fn trigger_type(&self) -> Option<&str> {
        self.trigger_type.as_deref()
    }

    /// eg INSERT OR UPDATE
    pub fn triggering_event(&self) -> Option<&str> {
        self.triggering_event.as_deref()
    }

    pub fn base_object_type(&self) -> Option<&str> {
        self.base_object_type.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn action_type(&self) -> Option<&str> {
        self.action_type.as_deref()
    }

    pub fn when_clause(&self) -> Option<&str> {
        self.when_clause.as_deref()
    }

    /// The table the trigger fires on, schema and database triggers have none
    pub fn table(
        &self,
        progress: Option<&Progress>,
        schema: &OracleSchema,
    ) -> Result<LazyValue<OracleTable>> {
        self.table
            .resolve(progress, schema, schema.table_cache(), Fallback::Name)
    }
}

catalog_object!(OracleTrigger, "trigger");

type P = PropertyDescriptor<OracleTrigger, OracleSchema>;

lazy_static! {
    static ref TRIGGER_PROPERTIES: Vec<P> = vec![
        P::new("name", "Name", 1, |t, _| Ok(t.name.as_str().into())),
        P::new("table", "Table", 2, |t, ctx| Ok(t.table(ctx.progress, ctx.scope)?.into())),
        P::new("trigger_type", "Type", 3, |t, _| Ok(t.trigger_type().into())),
        P::new("triggering_event", "Event", 4, |t, _| Ok(t.triggering_event().into())),
        P::new("base_object_type", "Object Type", 5, |t, _| Ok(t.base_object_type().into())),
        P::new("enabled", "Enabled", 6, |t, _| Ok(t.enabled.into())),
        P::new("action_type", "Action Type", 7, |t, _| Ok(t.action_type().into())),
        P::new("when_clause", "When", 8, |t, _| Ok(t.when_clause().into())),
        P::new("description", "Description", 9, |t, _| Ok(t.description().into())).hidden(),
    ];
}

impl PropertySource for OracleTrigger {
    type Scope = OracleSchema;

    fn properties() -> &'static [P] {
        TRIGGER_PROPERTIES.as_slice()
    }
}

/// Lists the triggers owned by a schema
pub struct TriggerLoader;

impl CacheLoader for TriggerLoader {
    type Owner = OracleSchema;
    type Object = OracleTrigger;

    const DESCRIPTION: &'static str = "triggers";

    fn query(&self, owner: &OracleSchema) -> DictionaryQuery {
        DictionaryQuery::new(owner.dictionary().all_view("TRIGGERS"))
            .filter("OWNER", owner.name())
            .order_by("TRIGGER_NAME")
    }

    fn fetch(&self, _owner: &OracleSchema, row: &DataRow) -> Result<OracleTrigger> {
        OracleTrigger::from_row(row)
    }
}
