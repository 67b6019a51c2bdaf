use std::sync::Arc;

use oradict_core::err::Result;
use oradict_logging::{trace, warn};

use crate::{
    lazy::{LazyRef, LazyValue},
    lookup::ObjectLookup,
    object::CatalogObject,
    progress::Progress,
};

/// What to return when a referenced name cannot be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Return `LazyValue::Null`
    Null,
    /// Return the raw name as `LazyValue::Unresolved`
    Name,
}

impl Fallback {
    fn value<T>(self, name: &str) -> LazyValue<T> {
        match self {
            Fallback::Null => LazyValue::Null,
            Fallback::Name => LazyValue::from_name(Some(name.to_string())),
        }
    }
}

/// Resolves the lazy reference held by `reference`.
///
/// - A null or empty name yields the fallback without any lookup.
/// - Without a progress context the current value is returned as is and
///   the lookup is never invoked.
/// - An already resolved reference is returned without another lookup.
/// - Otherwise the name is looked up once within the scope `owner`. A found
///   object is stored into the reference and returned. A missing object is
///   logged and the fallback returned, leaving the reference unresolved so a
///   later call may succeed.
/// - Errors from the lookup are returned unchanged.
pub fn resolve<O, T, L>(
    progress: Option<&Progress>,
    owner: &O,
    lookup: &L,
    reference: &LazyRef<T>,
    fallback: Fallback,
) -> Result<LazyValue<T>>
where
    O: CatalogObject + ?Sized,
    L: ObjectLookup<O, T> + ?Sized,
{
    let name = match reference.peek() {
        LazyValue::Null => return Ok(fallback.value("")),
        LazyValue::Unresolved(name) if name.is_empty() => return Ok(fallback.value("")),
        LazyValue::Unresolved(name) => name,
        resolved @ LazyValue::Resolved(_) => return Ok(resolved),
    };

    let progress = match progress {
        Some(progress) => progress,
        None => return Ok(LazyValue::Unresolved(name)),
    };

    match lookup.lookup(progress, owner, &name)? {
        Some(obj) => {
            trace!("Resolved reference '{}' in {} '{}'", name, owner.kind(), owner.name());
            Ok(LazyValue::Resolved(reference.store(&name, obj)))
        }
        None => {
            warn!(
                "Referenced object '{}' not found in {} '{}'",
                name,
                owner.kind(),
                owner.name()
            );
            Ok(fallback.value(&name))
        }
    }
}

/// Resolves a name into an object of the scope `owner` without a holder.
///
/// Always performs exactly one lookup for a non-empty name. When the object
/// is missing a warning is logged and the raw name returned, a missing object
/// is never an error. Lookup failures are returned unchanged.
pub fn resolve_foreign<O, T, L>(
    progress: &Progress,
    owner: &O,
    lookup: &L,
    name: Option<&str>,
) -> Result<LazyValue<T>>
where
    O: CatalogObject + ?Sized,
    L: ObjectLookup<O, T> + ?Sized,
{
    let name = match name {
        Some(name) if !name.is_empty() => name,
        _ => return Ok(LazyValue::Null),
    };

    Ok(match lookup.lookup(progress, owner, name)? {
        Some(obj) => LazyValue::Resolved(obj),
        None => {
            warn!(
                "Object '{}' not found in {} '{}'",
                name,
                owner.kind(),
                owner.name()
            );
            LazyValue::Unresolved(name.to_string())
        }
    })
}

/// Lookup over a fixed set of objects, mostly useful for tests and
/// for scopes which are already fully loaded
impl<O: ?Sized, T: CatalogObject> ObjectLookup<O, T> for [Arc<T>] {
    fn lookup(&self, _progress: &Progress, _owner: &O, name: &str) -> Result<Option<Arc<T>>> {
        Ok(self.iter().find(|o| o.name() == name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        thread,
    };

    use oradict_core::err::bail;

    use super::*;

    #[derive(Debug)]
    struct Obj(String);

    impl CatalogObject for Obj {
        fn name(&self) -> &str {
            &self.0
        }

        fn kind(&self) -> &'static str {
            "object"
        }
    }

    struct Owner;

    impl CatalogObject for Owner {
        fn name(&self) -> &str {
            "OWNER"
        }

        fn kind(&self) -> &'static str {
            "schema"
        }
    }

    #[derive(Default)]
    struct MockLookup {
        objects: Mutex<HashMap<String, Arc<Obj>>>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockLookup {
        fn with(names: &[&str]) -> Self {
            let lookup = Self::default();
            for name in names {
                lookup.add(name);
            }
            lookup
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn add(&self, name: &str) -> Arc<Obj> {
            let obj = Arc::new(Obj(name.into()));
            self.objects
                .lock()
                .unwrap()
                .insert(name.into(), obj.clone());
            obj
        }

        fn get(&self, name: &str) -> Arc<Obj> {
            self.objects.lock().unwrap().get(name).unwrap().clone()
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ObjectLookup<Owner, Obj> for MockLookup {
        fn lookup(&self, _progress: &Progress, _owner: &Owner, name: &str) -> Result<Option<Arc<Obj>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail {
                bail!("Connection reset");
            }

            Ok(self.objects.lock().unwrap().get(name).cloned())
        }
    }

    fn reference(name: &str) -> LazyRef<Obj> {
        LazyRef::from_name(Some(name.into()))
    }

    #[test]
    fn test_resolve_found_mutates_once() {
        let progress = Progress::new();
        let lookup = MockLookup::with(&["GRANTOR1"]);
        let field = reference("GRANTOR1");
        let expected = lookup.get("GRANTOR1");

        let first = resolve(Some(&progress), &Owner, &lookup, &field, Fallback::Null).unwrap();

        assert_eq!(first, LazyValue::Resolved(expected.clone()));
        assert_eq!(field.peek(), LazyValue::Resolved(expected.clone()));
        assert_eq!(lookup.calls(), 1);

        let second = resolve(Some(&progress), &Owner, &lookup, &field, Fallback::Null).unwrap();

        assert_eq!(second, LazyValue::Resolved(expected));
        assert_eq!(lookup.calls(), 1);
    }

    #[test]
    fn test_resolve_already_resolved_is_idempotent() {
        let progress = Progress::new();
        let lookup = MockLookup::with(&["A"]);
        let obj = Arc::new(Obj("A".into()));
        let field = LazyRef::resolved(obj.clone());

        for _ in 0..2 {
            let res = resolve(Some(&progress), &Owner, &lookup, &field, Fallback::Name).unwrap();
            assert!(Arc::ptr_eq(res.as_resolved().unwrap(), &obj));
        }

        assert_eq!(lookup.calls(), 0);
    }

    #[test]
    fn test_resolve_without_progress_is_noop() {
        let lookup = MockLookup::with(&["A"]);
        let field = reference("A");

        let res = resolve(None, &Owner, &lookup, &field, Fallback::Null).unwrap();

        assert_eq!(res, LazyValue::Unresolved("A".into()));
        assert_eq!(field.peek(), LazyValue::Unresolved("A".into()));
        assert_eq!(lookup.calls(), 0);

        let obj = Arc::new(Obj("B".into()));
        let field = LazyRef::resolved(obj.clone());

        let res = resolve(None, &Owner, &lookup, &field, Fallback::Null).unwrap();

        assert_eq!(res, LazyValue::Resolved(obj));
        assert_eq!(lookup.calls(), 0);
    }

    #[test]
    fn test_resolve_miss_returns_fallback_and_retries_later() {
        let progress = Progress::new();
        let lookup = MockLookup::default();
        let field = reference("GHOST");

        let res = resolve(Some(&progress), &Owner, &lookup, &field, Fallback::Null).unwrap();
        assert_eq!(res, LazyValue::Null);

        let res = resolve(Some(&progress), &Owner, &lookup, &field, Fallback::Name).unwrap();
        assert_eq!(res, LazyValue::Unresolved("GHOST".into()));

        assert_eq!(field.peek(), LazyValue::Unresolved("GHOST".into()));
        assert_eq!(lookup.calls(), 2);

        let ghost = lookup.add("GHOST");
        let res = resolve(Some(&progress), &Owner, &lookup, &field, Fallback::Null).unwrap();

        assert_eq!(res, LazyValue::Resolved(ghost.clone()));
        assert_eq!(field.peek(), LazyValue::Resolved(ghost));
        assert_eq!(lookup.calls(), 3);
    }

    #[test]
    fn test_resolve_empty_name_yields_fallback() {
        let progress = Progress::new();
        let lookup = MockLookup::with(&[""]);

        for field in [LazyRef::<Obj>::from_name(None), reference("")] {
            for progress in [None, Some(&progress)] {
                for fallback in [Fallback::Null, Fallback::Name] {
                    let res = resolve(progress, &Owner, &lookup, &field, fallback).unwrap();
                    assert_eq!(res, LazyValue::Null);
                }
            }
        }

        assert_eq!(lookup.calls(), 0);
    }

    #[test]
    fn test_resolve_propagates_lookup_failure() {
        let progress = Progress::new();
        let lookup = MockLookup::failing();
        let field = reference("A");

        let err = resolve(Some(&progress), &Owner, &lookup, &field, Fallback::Name).unwrap_err();

        assert_eq!(err.to_string(), "Connection reset");
        assert_eq!(field.peek(), LazyValue::Unresolved("A".into()));
        assert_eq!(lookup.calls(), 1);
    }

    #[test]
    fn test_resolve_concurrent_first_writer_wins() {
        let field = Arc::new(reference("A"));

        let handles = (0..8)
            .map(|_| {
                let field = field.clone();
                thread::spawn(move || {
                    // each thread finds its own instance of "A"
                    let lookup = MockLookup::with(&["A"]);
                    resolve(Some(&Progress::new()), &Owner, &lookup, &field, Fallback::Null)
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();

        let results = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();

        let stored = field.peek();
        assert!(stored.is_resolved());

        for res in results {
            assert_eq!(res, stored);
        }
    }

    #[test]
    fn test_resolve_with_slice_lookup() {
        let progress = Progress::new();
        let objects = vec![Arc::new(Obj("X".into())), Arc::new(Obj("Y".into()))];
        let field = reference("Y");

        let res = field
            .resolve(Some(&progress), &Owner, objects.as_slice(), Fallback::Null)
            .unwrap();

        assert!(Arc::ptr_eq(res.as_resolved().unwrap(), &objects[1]));
    }

    #[test]
    fn test_resolve_foreign() {
        let progress = Progress::new();
        let lookup = MockLookup::with(&["LINK1"]);

        let res = resolve_foreign(&progress, &Owner, &lookup, Some("LINK1")).unwrap();
        assert_eq!(res, LazyValue::Resolved(lookup.get("LINK1")));

        let res = resolve_foreign(&progress, &Owner, &lookup, Some("LINK1")).unwrap();
        assert!(res.is_resolved());
        assert_eq!(lookup.calls(), 2);

        let res: LazyValue<Obj> =
            resolve_foreign(&progress, &Owner, &lookup, Some("MISSING")).unwrap();
        assert_eq!(res, LazyValue::Unresolved("MISSING".into()));
        assert_eq!(lookup.calls(), 3);

        let res: LazyValue<Obj> = resolve_foreign(&progress, &Owner, &lookup, Some("")).unwrap();
        assert_eq!(res, LazyValue::Null);
        let res: LazyValue<Obj> = resolve_foreign(&progress, &Owner, &lookup, None).unwrap();
        assert_eq!(res, LazyValue::Null);
        assert_eq!(lookup.calls(), 3);
    }

    #[test]
    fn test_resolve_foreign_propagates_failure() {
        let progress = Progress::new();
        let lookup = MockLookup::failing();

        let res: Result<LazyValue<Obj>> = resolve_foreign(&progress, &Owner, &lookup, Some("L"));

        assert_eq!(res.unwrap_err().to_string(), "Connection reset");
    }
}
