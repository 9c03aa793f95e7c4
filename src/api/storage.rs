//! Storage Facade
//!
//! Asynchronous get/set/remove surface over the synchronous cache engine.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::cache::codec::{self, Decoded};
use crate::cache::{CacheState, CacheStats, CacheStore};
use crate::config::Config;
use crate::error::Result;
use crate::store::Backend;
use crate::tasks::{queue_closed, spawn_queue_worker, TaskQueue};

/// Shared handle to a bounded LRU cache.
///
/// Cheap to clone; clones share the store and the task queue.
///
/// Deferred operations (`set`, `get`, `remove` and friends) are queued when
/// the method is called, not when the returned future is first polled, and
/// complete in the order they were queued. Callers must not assume an
/// operation has happened when the call returns: await the future or use the
/// `_then` continuation.
///
/// `size`, `left`, `stats`, `contains`, `keys` and the `_sync` methods read
/// or write the store directly and do not wait for queued operations.
pub struct Storage<B: Backend + 'static> {
    /// Engine shared with the queue worker
    engine: Arc<Mutex<CacheStore<B>>>,
    queue: TaskQueue<B>,
}

impl<B: Backend + 'static> Clone for Storage<B> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<B: Backend + 'static> Storage<B> {
    /// Creates a cache over `backend` and starts its queue worker.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn new(backend: B, capacity: usize) -> Self {
        let engine = Arc::new(Mutex::new(CacheStore::new(backend, capacity)));
        let queue = spawn_queue_worker(engine.clone());
        Self { engine, queue }
    }

    /// Creates a cache sized from configuration.
    pub fn from_config(backend: B, config: &Config) -> Self {
        Self::new(backend, config.capacity)
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> CacheState {
        self.engine.lock().state()
    }

    /// Returns the soft capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.engine.lock().capacity()
    }

    fn request<R, F>(&self, op: F) -> impl Future<Output = Result<R>> + Send + 'static
    where
        R: Send + 'static,
        F: FnOnce(&mut CacheStore<B>) -> Result<R> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.queue.run(op, move |result| {
            let _ = tx.send(result);
        });
        async move { rx.await.unwrap_or_else(|_| Err(queue_closed())) }
    }

    // == Deferred Operations ==

    /// Stores `value` under `key`, evicting least recently used entries when
    /// the write would exceed capacity.
    pub fn set<T>(&self, key: impl Into<String>, value: &T) -> impl Future<Output = Result<()>>
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        let key = key.into();
        let encoded = codec::encode(value);
        self.request(move |store| store.set_encoded(&key, encoded))
    }

    /// Reads the value under `key`. Resolves to `Ok(None)` on a cache miss.
    pub fn get<T>(&self, key: impl Into<String>) -> impl Future<Output = Result<Option<Decoded<T>>>>
    where
        T: DeserializeOwned,
    {
        let key = key.into();
        let raw = self.request(move |store| store.get_raw(&key));
        async move { Ok(raw.await?.map(codec::decode)) }
    }

    /// Removes `key`. Removing an absent key succeeds.
    pub fn remove(&self, key: impl Into<String>) -> impl Future<Output = Result<()>> {
        let key = key.into();
        self.request(move |store| store.remove(&key))
    }

    /// Stores several values in order, stopping at the first failure.
    pub fn set_many<I, K, T>(&self, entries: I) -> impl Future<Output = Result<()>>
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Serialize + fmt::Debug,
    {
        let encoded: Vec<_> = entries
            .into_iter()
            .map(|(key, value)| (key.into(), codec::encode(&value)))
            .collect();
        self.request(move |store| store.set_many_encoded(encoded))
    }

    /// Reads several values; the result lines up with `keys`.
    pub fn get_many<I, K, T>(&self, keys: I) -> impl Future<Output = Result<Vec<Option<Decoded<T>>>>>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        T: DeserializeOwned,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let raw = self.request(move |store| store.get_many_raw(&keys));
        async move {
            Ok(raw
                .await?
                .into_iter()
                .map(|value| value.map(codec::decode))
                .collect())
        }
    }

    /// Removes several keys.
    pub fn remove_many<I, K>(&self, keys: I) -> impl Future<Output = Result<()>>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.request(move |store| store.remove_many(&keys))
    }

    /// Rewrites each present key with `f` applied to its current value.
    /// Resolves to the number of keys updated.
    ///
    /// `f` runs on the queue worker while the store is locked; it must not
    /// call the synchronous methods of this cache.
    pub fn update_each<I, K, T, V, F>(&self, keys: I, f: F) -> impl Future<Output = Result<usize>>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
        T: DeserializeOwned,
        V: Serialize + fmt::Debug,
        F: FnMut(&str, Decoded<T>) -> V + Send + 'static,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        self.request(move |store| store.update_each(&keys, f))
    }

    /// Removes every entry.
    pub fn clear(&self) -> impl Future<Output = Result<()>> {
        self.request(|store| store.clear())
    }

    // == Continuation Forms ==

    /// Like [`Storage::set`], invoking `on_done` once the write has finished.
    pub fn set_then<T, C>(&self, key: impl Into<String>, value: &T, on_done: C)
    where
        T: Serialize + fmt::Debug + ?Sized,
        C: FnOnce(Result<()>) + Send + 'static,
    {
        let key = key.into();
        let encoded = codec::encode(value);
        self.queue.run(move |store| store.set_encoded(&key, encoded), on_done);
    }

    /// Like [`Storage::get`], invoking `on_done` with the value or `None`.
    pub fn get_then<T, C>(&self, key: impl Into<String>, on_done: C)
    where
        T: DeserializeOwned,
        C: FnOnce(Result<Option<Decoded<T>>>) + Send + 'static,
    {
        let key = key.into();
        self.queue.run(
            move |store| store.get_raw(&key),
            move |result| on_done(result.map(|raw| raw.map(codec::decode))),
        );
    }

    /// Like [`Storage::remove`], invoking `on_done` once the key is gone.
    pub fn remove_then<C>(&self, key: impl Into<String>, on_done: C)
    where
        C: FnOnce(Result<()>) + Send + 'static,
    {
        let key = key.into();
        self.queue.run(move |store| store.remove(&key), on_done);
    }

    // == Synchronous Operations ==

    /// Bytes occupied by cached entries.
    pub fn size(&self) -> Result<usize> {
        self.engine.lock().size()
    }

    /// Bytes left under capacity.
    pub fn left(&self) -> Result<i64> {
        self.engine.lock().left()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.engine.lock().stats()
    }

    /// Checks whether `key` is cached without touching its recency.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.engine.lock().contains(key)
    }

    /// Cached keys, least recently used first.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.engine.lock().keys()
    }

    /// Stores a value immediately, bypassing the task queue.
    pub fn set_sync<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        self.engine.lock().set(key, value)
    }

    /// Reads a value immediately, bypassing the task queue.
    pub fn get_sync<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Decoded<T>>> {
        self.engine.lock().get(key)
    }

    /// Removes a key immediately, bypassing the task queue.
    pub fn remove_sync(&self, key: &str) -> Result<()> {
        self.engine.lock().remove(key)
    }
}
