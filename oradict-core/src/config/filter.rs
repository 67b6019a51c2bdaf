use serde::{Deserialize, Serialize};

/// Include/exclude name masks for catalog objects.
/// Masks use SQL LIKE wildcards: `%` for any run of characters, `_` for one.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Default)]
pub struct ObjectFilterConfig {
    /// If non-empty, a name must match one of these masks
    #[serde(default)]
    pub include: Vec<String>,
    /// A name matching any of these masks is filtered out
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl ObjectFilterConfig {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    /// Whether the supplied object name passes the filter
    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|mask| matches_mask(mask, name));

        included && !self.exclude.iter().any(|mask| matches_mask(mask, name))
    }
}

/// Whether the name matches the SQL LIKE mask, case sensitive
pub fn matches_mask(mask: &str, name: &str) -> bool {
    let mask = mask.chars().collect::<Vec<_>>();
    let name = name.chars().collect::<Vec<_>>();

    fn matches(mask: &[char], name: &[char]) -> bool {
        match (mask.first(), name.first()) {
            (None, None) => true,
            (None, Some(_)) => false,
            (Some('%'), _) => {
                matches(&mask[1..], name) || (!name.is_empty() && matches(mask, &name[1..]))
            }
            (Some('_'), Some(_)) => matches(&mask[1..], &name[1..]),
            (Some(m), Some(n)) if m == n => matches(&mask[1..], &name[1..]),
            _ => false,
        }
    }

    matches(&mask, &name)
}
