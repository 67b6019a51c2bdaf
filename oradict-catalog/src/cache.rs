use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use oradict_core::err::{Error, Result};
use oradict_logging::{debug, warn};

use crate::{
    dictionary::{DataRow, DictionaryQuery, DictionaryScope},
    lookup::ObjectLookup,
    object::CatalogObject,
    progress::Progress,
};

/// Describes how the objects of a cache are read from the dictionary
pub trait CacheLoader {
    /// The scope owning the cache, eg the schema for a table cache
    type Owner: DictionaryScope + ?Sized;
    /// The cached object type
    type Object: CatalogObject;

    /// Label used in log messages, eg "tables"
    const DESCRIPTION: &'static str;

    /// The query listing every object of the owner
    fn query(&self, owner: &Self::Owner) -> DictionaryQuery;

    /// Builds an object from one row of the query
    fn fetch(&self, owner: &Self::Owner, row: &DataRow) -> Result<Self::Object>;

    /// Called after all rows were fetched, may add, remove or reorder objects
    fn complete(
        &self,
        _progress: &Progress,
        _owner: &Self::Owner,
        _objects: &mut Vec<Arc<Self::Object>>,
    ) -> Result<()> {
        Ok(())
    }
}

struct CacheState<T> {
    loaded: bool,
    objects: Vec<Arc<T>>,
    index: HashMap<String, usize>,
}

impl<T: CatalogObject> CacheState<T> {
    fn new() -> Self {
        Self {
            loaded: false,
            objects: vec![],
            index: HashMap::new(),
        }
    }

    fn get(&self, name: &str) -> Option<Arc<T>> {
        self.index.get(name).map(|idx| Arc::clone(&self.objects[*idx]))
    }

    fn insert(&mut self, obj: Arc<T>) {
        match self.index.get(obj.name()) {
            Some(idx) => self.objects[*idx] = obj,
            None => {
                self.index.insert(obj.name().to_string(), self.objects.len());
                self.objects.push(obj);
            }
        }
    }
}

/// A name-keyed cache of the catalog objects of one kind within a scope.
///
/// The objects are loaded from the dictionary in full on first access.
/// Concurrent callers block until the single load completes.
pub struct ObjectCache<L: CacheLoader> {
    loader: L,
    state: RwLock<CacheState<L::Object>>,
    load_lock: Mutex<()>,
}

impl<L: CacheLoader> ObjectCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            state: RwLock::new(CacheState::new()),
            load_lock: Mutex::new(()),
        }
    }

    fn state(&self) -> Result<RwLockReadGuard<CacheState<L::Object>>> {
        self.state
            .read()
            .map_err(|_| Error::msg("Failed to lock object cache"))
    }

    fn state_mut(&self) -> Result<RwLockWriteGuard<CacheState<L::Object>>> {
        self.state
            .write()
            .map_err(|_| Error::msg("Failed to lock object cache"))
    }

    /// Returns every object of the owner, loading them if required
    pub fn get_all_objects(
        &self,
        progress: &Progress,
        owner: &L::Owner,
    ) -> Result<Vec<Arc<L::Object>>> {
        self.load(progress, owner)?;

        Ok(self.state()?.objects.clone())
    }

    /// Returns the object with the supplied name, loading the cache if required
    pub fn get_object(
        &self,
        progress: &Progress,
        owner: &L::Owner,
        name: &str,
    ) -> Result<Option<Arc<L::Object>>> {
        if let Some(obj) = self.get_cached_object(name)? {
            return Ok(Some(obj));
        }

        self.load(progress, owner)?;

        Ok(self.state()?.get(name))
    }

    /// Returns the object if it is present in the cache, never loads
    pub fn get_cached_object(&self, name: &str) -> Result<Option<Arc<L::Object>>> {
        Ok(self.state()?.get(name))
    }

    /// Returns the objects currently in the cache, never loads
    pub fn get_cached_objects(&self) -> Result<Vec<Arc<L::Object>>> {
        Ok(self.state()?.objects.clone())
    }

    pub fn is_fully_cached(&self) -> bool {
        self.state().map(|s| s.loaded).unwrap_or(false)
    }

    /// Adds or replaces an object in the cache
    pub fn cache_object(&self, obj: Arc<L::Object>) -> Result<()> {
        self.state_mut()?.insert(obj);
        Ok(())
    }

    /// Drops every cached object, the next access reloads them
    pub fn clear_cache(&self) -> Result<()> {
        *self.state_mut()? = CacheState::new();
        Ok(())
    }

    fn load(&self, progress: &Progress, owner: &L::Owner) -> Result<()> {
        if self.is_fully_cached() {
            return Ok(());
        }

        let _guard = self
            .load_lock
            .lock()
            .map_err(|_| Error::msg("Failed to lock object cache loader"))?;

        // another caller may have finished loading while we waited
        if self.is_fully_cached() {
            return Ok(());
        }

        progress.sub_task(&format!("Load {} of {}", L::DESCRIPTION, owner.name()));

        let rows = owner
            .dictionary()
            .query(progress, &self.loader.query(owner))?;

        let mut objects = Vec::with_capacity(rows.len());

        for row in rows.iter() {
            match self.loader.fetch(owner, row) {
                Ok(obj) => objects.push(Arc::new(obj)),
                Err(err) => warn!(
                    "Failed to read {} of {} '{}': {:?}",
                    L::DESCRIPTION,
                    owner.kind(),
                    owner.name(),
                    err
                ),
            }
        }

        self.loader.complete(progress, owner, &mut objects)?;

        let mut state = self.state_mut()?;
        let mut loaded = CacheState::new();

        for obj in objects.into_iter() {
            // keep instances which were handed out before the load
            let obj = state.get(obj.name()).unwrap_or(obj);
            loaded.insert(obj);
        }

        // objects cached explicitly are kept even when the dictionary lacks them
        for obj in state.objects.iter() {
            if loaded.get(obj.name()).is_none() {
                loaded.insert(Arc::clone(obj));
            }
        }

        loaded.loaded = true;
        debug!(
            "Loaded {} {} of {} '{}'",
            loaded.objects.len(),
            L::DESCRIPTION,
            owner.kind(),
            owner.name()
        );
        *state = loaded;

        Ok(())
    }
}

impl<L: CacheLoader> ObjectLookup<L::Owner, L::Object> for ObjectCache<L> {
    fn lookup(
        &self,
        progress: &Progress,
        owner: &L::Owner,
        name: &str,
    ) -> Result<Option<Arc<L::Object>>> {
        self.get_object(progress, owner, name)
    }
}

impl<L: CacheLoader> fmt::Debug for ObjectCache<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cached = self.state().map(|s| s.objects.len()).unwrap_or(0);

        f.debug_struct("ObjectCache")
            .field("description", &L::DESCRIPTION)
            .field("loaded", &self.is_fully_cached())
            .field("cached", &cached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use oradict_core::{data::DataValue, err::bail};

    use super::*;
    use crate::{
        dictionary::{Dictionary, MemoryDictionary, RowExt},
        lazy::{LazyRef, LazyValue},
        resolver::Fallback,
    };

    struct Scope {
        dict: Dictionary,
    }

    impl CatalogObject for Scope {
        fn name(&self) -> &str {
            "SCOPE"
        }

        fn kind(&self) -> &'static str {
            "scope"
        }
    }

    impl DictionaryScope for Scope {
        fn dictionary(&self) -> &Dictionary {
            &self.dict
        }
    }

    #[derive(Debug)]
    struct Item(String);

    impl CatalogObject for Item {
        fn name(&self) -> &str {
            &self.0
        }

        fn kind(&self) -> &'static str {
            "item"
        }
    }

    struct ItemLoader;

    impl CacheLoader for ItemLoader {
        type Owner = Scope;
        type Object = Item;

        const DESCRIPTION: &'static str = "items";

        fn query(&self, _owner: &Scope) -> DictionaryQuery {
            DictionaryQuery::new("ITEMS").order_by("NAME")
        }

        fn fetch(&self, _owner: &Scope, row: &DataRow) -> Result<Item> {
            let name = row.require_string("NAME")?;
            if name == "BROKEN" {
                bail!("Broken item");
            }
            Ok(Item(name))
        }

        fn complete(
            &self,
            _progress: &Progress,
            _owner: &Scope,
            objects: &mut Vec<Arc<Item>>,
        ) -> Result<()> {
            objects.push(Arc::new(Item("EXTRA".into())));
            Ok(())
        }
    }

    fn setup(names: &[&str]) -> (Arc<MemoryDictionary>, Scope, ObjectCache<ItemLoader>) {
        let source = Arc::new(MemoryDictionary::new());
        source.set_rows(
            "ITEMS",
            names
                .iter()
                .map(|n| [("NAME".to_string(), DataValue::from(*n))].into_iter().collect())
                .collect(),
        );

        let scope = Scope {
            dict: Dictionary::new(source.clone(), false),
        };

        (source, scope, ObjectCache::new(ItemLoader))
    }

    #[test]
    fn test_object_cache_loads_once() {
        let (source, scope, cache) = setup(&["B", "A", "BROKEN"]);
        let progress = Progress::new();

        assert!(!cache.is_fully_cached());
        assert!(cache.get_cached_object("A").unwrap().is_none());

        let all = cache.get_all_objects(&progress, &scope).unwrap();

        assert_eq!(
            all.iter().map(|i| i.name()).collect::<Vec<_>>(),
            vec!["A", "B", "EXTRA"]
        );
        assert!(cache.is_fully_cached());

        let a = cache.get_object(&progress, &scope, "A").unwrap().unwrap();
        assert!(Arc::ptr_eq(&a, &all[0]));
        assert!(cache.get_object(&progress, &scope, "MISSING").unwrap().is_none());
        assert_eq!(source.query_count(), 1);
    }

    #[test]
    fn test_object_cache_get_cached_object_never_loads() {
        let (source, _scope, cache) = setup(&["A"]);

        assert!(cache.get_cached_object("A").unwrap().is_none());
        assert!(cache.get_cached_objects().unwrap().is_empty());
        assert_eq!(source.query_count(), 0);
    }

    #[test]
    fn test_object_cache_clear() {
        let (source, scope, cache) = setup(&["A"]);
        let progress = Progress::new();

        let first = cache.get_object(&progress, &scope, "A").unwrap().unwrap();
        cache.clear_cache().unwrap();

        assert!(!cache.is_fully_cached());
        assert!(cache.get_cached_object("A").unwrap().is_none());

        let second = cache.get_object(&progress, &scope, "A").unwrap().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(source.query_count(), 2);
    }

    #[test]
    fn test_object_cache_keeps_previously_cached_instances() {
        let (_source, scope, cache) = setup(&["A"]);
        let progress = Progress::new();
        let early = Arc::new(Item("A".into()));

        cache.cache_object(early.clone()).unwrap();
        assert!(Arc::ptr_eq(
            &cache.get_cached_object("A").unwrap().unwrap(),
            &early
        ));

        let all = cache.get_all_objects(&progress, &scope).unwrap();
        assert!(Arc::ptr_eq(&all[0], &early));
    }

    #[test]
    fn test_object_cache_keeps_declared_objects_missing_from_dictionary() {
        let (_source, scope, cache) = setup(&["A"]);
        let progress = Progress::new();
        let declared = Arc::new(Item("DECLARED".into()));

        cache.cache_object(declared.clone()).unwrap();

        let all = cache.get_all_objects(&progress, &scope).unwrap();
        assert_eq!(
            all.iter().map(|i| i.name()).collect::<Vec<_>>(),
            vec!["A", "EXTRA", "DECLARED"]
        );
        assert!(Arc::ptr_eq(
            &cache.get_object(&progress, &scope, "DECLARED").unwrap().unwrap(),
            &declared
        ));
    }

    #[test]
    fn test_object_cache_load_failure() {
        let (source, scope, cache) = setup(&["A"]);
        let progress = Progress::new();

        source.set_unavailable(true);
        assert!(cache.get_object(&progress, &scope, "A").is_err());
        assert!(!cache.is_fully_cached());

        source.set_unavailable(false);
        assert!(cache.get_object(&progress, &scope, "A").unwrap().is_some());
    }

    #[test]
    fn test_object_cache_concurrent_load() {
        let (source, scope, cache) = setup(&["A", "B"]);
        let scope = Arc::new(scope);
        let cache = Arc::new(cache);

        let handles = (0..8)
            .map(|_| {
                let (scope, cache) = (scope.clone(), cache.clone());
                thread::spawn(move || {
                    cache
                        .get_object(&Progress::new(), &scope, "B")
                        .unwrap()
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();

        let found = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();

        assert!(found.iter().all(|i| Arc::ptr_eq(i, &found[0])));
        assert_eq!(source.query_count(), 1);
    }

    #[test]
    fn test_object_cache_as_lookup() {
        let (_source, scope, cache) = setup(&["A"]);
        let progress = Progress::new();
        let found = LazyRef::<Item>::from_name(Some("A".into()));
        let missing = LazyRef::<Item>::from_name(Some("Z".into()));

        let res = found
            .resolve(Some(&progress), &scope, &cache, Fallback::Null)
            .unwrap();
        assert!(Arc::ptr_eq(
            res.as_resolved().unwrap(),
            &cache.get_cached_object("A").unwrap().unwrap()
        ));

        let res = missing
            .resolve(Some(&progress), &scope, &cache, Fallback::Name)
            .unwrap();
        assert_eq!(res, LazyValue::Unresolved("Z".into()));
    }
}
