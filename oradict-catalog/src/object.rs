/// A named object of the catalog
pub trait CatalogObject {
    /// The name of the object as stored in the dictionary
    fn name(&self) -> &str;

    /// Short label of the object kind, eg "role"
    fn kind(&self) -> &'static str;
}

/// Health of an object which tracks a runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectState {
    Normal,
    Active,
    Invalid,
    Unknown,
}
