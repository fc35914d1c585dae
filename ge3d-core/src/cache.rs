//! Reference-counted resource cache.
//!
//! Resources are stored densely in slots and looked up through a key index. Every
//! [`Shared`] handle counts as one outstanding reference; dropping the last handle evicts
//! the slot, drops the resource (releasing whatever it owns) and notifies the optional
//! eviction callback.
//!
//! Keys are the final component of the requested path, so `a/tree.obj` and `b/tree.obj`
//! resolve to the same entry.

use std::{
    cell::RefCell,
    fmt,
    ops::Deref,
    path::Path,
    rc::{Rc, Weak},
};

use fxhash::FxHashMap;

/// Derives the cache key for a resource path.
pub fn cache_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

type EvictCallback = Box<dyn FnMut(&str)>;

struct Slot<R> {
    key: String,
    resource: Rc<R>,
    handles: usize,
}

struct CacheInner<R> {
    name: &'static str,
    slots: Vec<Option<Slot<R>>>,
    free: Vec<usize>,
    index: FxHashMap<String, usize>,
    on_evict: Option<EvictCallback>,
}

impl<R> CacheInner<R> {
    fn insert(&mut self, key: String, resource: Rc<R>) -> usize {
        let slot = Slot {
            key: key.clone(),
            resource,
            handles: 1,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(slot);
                id
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, id);
        id
    }

    /// Removes the slot and hands back what the caller must drop outside the borrow.
    fn release(&mut self, id: usize) -> Option<(String, Rc<R>)> {
        let slot = self.slots.get_mut(id)?.as_mut()?;
        slot.handles -= 1;
        if slot.handles > 0 {
            return None;
        }
        let slot = self.slots[id].take()?;
        self.index.remove(&slot.key);
        self.free.push(id);
        Some((slot.key, slot.resource))
    }
}

/// A keyed cache handing out reference-counted [`Shared`] handles.
pub struct ResourceCache<R> {
    inner: Rc<RefCell<CacheInner<R>>>,
}

impl<R> ResourceCache<R> {
    /// Creates an empty cache. `name` only shows up in log output.
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(CacheInner {
                name,
                slots: Vec::new(),
                free: Vec::new(),
                index: FxHashMap::default(),
                on_evict: None,
            })),
        }
    }

    /// Registers a callback run with the key of every evicted entry.
    pub fn set_on_evict(&self, callback: impl FnMut(&str) + 'static) {
        self.inner.borrow_mut().on_evict = Some(Box::new(callback));
    }

    /// Returns a handle to the resource stored for `path`, calling `load` only when no
    /// live entry exists. A failed load leaves the cache untouched.
    pub fn acquire<E>(
        &self,
        path: &Path,
        load: impl FnOnce(&Path) -> Result<R, E>,
    ) -> Result<Shared<R>, E> {
        let key = cache_key(path);

        if let Some(handle) = self.lookup(&key) {
            return Ok(handle);
        }

        // The loader may acquire from other caches, so no borrow is held across it.
        let resource = Rc::new(load(path)?);
        let mut inner = self.inner.borrow_mut();
        let slot = inner.insert(key.clone(), Rc::clone(&resource));
        log::debug!("{} cache: loaded {key}", inner.name);

        Ok(Shared {
            cache: Rc::downgrade(&self.inner),
            slot,
            resource,
        })
    }

    fn lookup(&self, key: &str) -> Option<Shared<R>> {
        let mut inner = self.inner.borrow_mut();
        let id = *inner.index.get(key)?;
        let slot = inner.slots[id].as_mut()?;
        slot.handles += 1;
        let resource = Rc::clone(&slot.resource);
        log::debug!("{} cache: reusing {key}", inner.name);
        Some(Shared {
            cache: Rc::downgrade(&self.inner),
            slot: id,
            resource,
        })
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.borrow().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an entry for `path` is currently alive.
    pub fn contains(&self, path: &Path) -> bool {
        self.inner.borrow().index.contains_key(&cache_key(path))
    }

    /// Outstanding handles for `path`, or zero if there is no entry.
    pub fn handle_count(&self, path: &Path) -> usize {
        let inner = self.inner.borrow();
        inner
            .index
            .get(&cache_key(path))
            .and_then(|&id| inner.slots[id].as_ref())
            .map_or(0, |slot| slot.handles)
    }
}

impl<R> fmt::Debug for ResourceCache<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ResourceCache")
            .field("name", &inner.name)
            .field("entries", &inner.index.len())
            .finish()
    }
}

/// Counted handle to a cached resource.
pub struct Shared<R> {
    cache: Weak<RefCell<CacheInner<R>>>,
    slot: usize,
    resource: Rc<R>,
}

impl<R> Shared<R> {
    /// Whether both handles refer to the same cached resource.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.resource, &b.resource)
    }
}

impl<R> Deref for Shared<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.resource
    }
}

impl<R> Clone for Shared<R> {
    fn clone(&self) -> Self {
        if let Some(cache) = self.cache.upgrade()
            && let Some(slot) = cache.borrow_mut().slots[self.slot].as_mut()
        {
            slot.handles += 1;
        }
        Self {
            cache: Weak::clone(&self.cache),
            slot: self.slot,
            resource: Rc::clone(&self.resource),
        }
    }
}

impl<R> Drop for Shared<R> {
    fn drop(&mut self) {
        let Some(cache) = self.cache.upgrade() else {
            return;
        };
        let evicted = cache.borrow_mut().release(self.slot);
        if let Some((key, resource)) = evicted {
            log::debug!("{} cache: evicting {key}", cache.borrow().name);
            // The slot's reference goes first; ours is dropped with `self`.
            drop(resource);
            let callback = cache.borrow_mut().on_evict.take();
            if let Some(mut callback) = callback {
                callback(&key);
                let mut inner = cache.borrow_mut();
                if inner.on_evict.is_none() {
                    inner.on_evict = Some(callback);
                }
            }
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Shared<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.resource, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, path::PathBuf};

    struct Probe {
        loads: Rc<Cell<usize>>,
        drops: Rc<Cell<usize>>,
    }

    struct Resource {
        value: u32,
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Resource {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    impl Probe {
        fn new() -> Self {
            Self {
                loads: Rc::new(Cell::new(0)),
                drops: Rc::new(Cell::new(0)),
            }
        }

        fn loader(&self) -> impl FnOnce(&Path) -> Result<Resource, String> + use<> {
            let loads = Rc::clone(&self.loads);
            let drops = Rc::clone(&self.drops);
            move |_: &Path| {
                loads.set(loads.get() + 1);
                Ok(Resource { value: 7, drops })
            }
        }
    }

    #[test]
    fn acquiring_same_key_loads_once() {
        let cache = ResourceCache::new("test");
        let probe = Probe::new();
        let path = PathBuf::from("models/cube.obj");

        let handles: Vec<_> = (0..5)
            .map(|_| cache.acquire(&path, probe.loader()).unwrap())
            .collect();

        assert_eq!(probe.loads.get(), 1);
        assert_eq!(cache.handle_count(&path), 5);
        assert!(handles.iter().all(|h| Shared::ptr_eq(h, &handles[0])));
        assert_eq!(handles[3].value, 7);
    }

    #[test]
    fn releasing_all_handles_evicts_and_reloads() {
        let cache = ResourceCache::new("test");
        let probe = Probe::new();
        let path = PathBuf::from("cube.obj");

        let a = cache.acquire(&path, probe.loader()).unwrap();
        let b = a.clone();
        drop(a);
        assert!(cache.contains(&path));
        assert_eq!(probe.drops.get(), 0);

        drop(b);
        assert!(!cache.contains(&path));
        assert!(cache.is_empty());
        assert_eq!(probe.drops.get(), 1);

        let _c = cache.acquire(&path, probe.loader()).unwrap();
        assert_eq!(probe.loads.get(), 2);
    }

    #[test]
    fn key_is_the_file_name_only() {
        let cache = ResourceCache::new("test");
        let probe = Probe::new();

        let a = cache
            .acquire(Path::new("one/dir/tree.obj"), probe.loader())
            .unwrap();
        let b = cache
            .acquire(Path::new("another/tree.obj"), probe.loader())
            .unwrap();

        assert!(Shared::ptr_eq(&a, &b));
        assert_eq!(probe.loads.get(), 1);
        assert_eq!(cache_key(Path::new("x/y/z.png")), "z.png");
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let cache: ResourceCache<u32> = ResourceCache::new("test");
        let path = Path::new("missing.png");

        let result = cache.acquire(path, |_| Err::<u32, _>("no such file"));
        assert_eq!(result.err(), Some("no such file"));
        assert!(!cache.contains(path));

        let handle = cache.acquire(path, |_| Ok::<_, &str>(3)).unwrap();
        assert_eq!(*handle, 3);
    }

    #[test]
    fn eviction_callback_sees_key_and_slots_are_reused() {
        let cache: ResourceCache<u32> = ResourceCache::new("test");
        let evicted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&evicted);
        cache.set_on_evict(move |key| sink.borrow_mut().push(key.to_owned()));

        let a = cache.acquire(Path::new("a.png"), |_| Ok::<_, ()>(1)).unwrap();
        drop(a);
        let b = cache.acquire(Path::new("b.png"), |_| Ok::<_, ()>(2)).unwrap();

        assert_eq!(*evicted.borrow(), vec!["a.png".to_owned()]);
        assert_eq!(b.slot, 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_nested_load_releases_what_it_acquired() {
        let textures: ResourceCache<u32> = ResourceCache::new("texture");
        let meshes: ResourceCache<Vec<Shared<u32>>> = ResourceCache::new("mesh");
        let evicted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&evicted);
        textures.set_on_evict(move |key| sink.borrow_mut().push(key.to_owned()));

        let result = meshes.acquire(Path::new("house.obj"), |_| {
            let mut acquired = Vec::new();
            for (name, loaded) in [
                ("a.png", Ok(1)),
                ("b.png", Ok(2)),
                ("c.png", Err("corrupt image")),
            ] {
                acquired.push(textures.acquire(Path::new(name), |_| loaded)?);
            }
            Ok(acquired)
        });

        assert_eq!(result.err(), Some("corrupt image"));
        assert_eq!(meshes.len(), 0);
        assert_eq!(textures.len(), 0);
        assert_eq!(*evicted.borrow(), vec!["a.png".to_owned(), "b.png".to_owned()]);
    }

    #[test]
    fn handles_outliving_the_cache_still_deref() {
        let cache: ResourceCache<u32> = ResourceCache::new("test");
        let handle = cache.acquire(Path::new("a.png"), |_| Ok::<_, ()>(9)).unwrap();
        drop(cache);
        assert_eq!(*handle, 9);
    }
}
