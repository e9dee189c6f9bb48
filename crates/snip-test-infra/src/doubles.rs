//! Instrumented and failure-injecting stand-ins for the store, cache, and
//! generator.

use async_trait::async_trait;
use snip_core::repository::{self, ReadRepository, Repository, UrlMapping};
use snip_core::{cache, CacheError, ShortCode, StorageError, UrlCache};
use snip_generator::Generator;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct CallCounts {
    gets: AtomicUsize,
    exists: AtomicUsize,
    inserts: AtomicUsize,
}

/// Wraps a repository and counts calls per operation. Clones share counters.
#[derive(Debug, Clone)]
pub struct CountingRepository<R> {
    inner: R,
    counts: Arc<CallCounts>,
}

impl<R> CountingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            counts: Arc::default(),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn gets(&self) -> usize {
        self.counts.gets.load(Ordering::SeqCst)
    }

    pub fn exists_calls(&self) -> usize {
        self.counts.exists.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.counts.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: ReadRepository> ReadRepository for CountingRepository<R> {
    async fn get(&self, code: &ShortCode) -> repository::Result<Option<String>> {
        self.counts.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(code).await
    }

    async fn exists(&self, code: &ShortCode) -> repository::Result<bool> {
        self.counts.exists.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(code).await
    }
}

#[async_trait]
impl<R: Repository> Repository for CountingRepository<R> {
    async fn insert(&self, mapping: &UrlMapping) -> repository::Result<()> {
        self.counts.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(mapping).await
    }
}

/// Rejects the first `n` inserts with [`StorageError::Conflict`], as if a
/// concurrent writer claimed the code between the existence check and the
/// insert. Later inserts go to the inner repository.
#[derive(Debug, Clone)]
pub struct RacingRepository<R> {
    inner: R,
    conflicts_left: Arc<AtomicU32>,
}

impl<R> RacingRepository<R> {
    pub fn new(inner: R, conflicts: u32) -> Self {
        Self {
            inner,
            conflicts_left: Arc::new(AtomicU32::new(conflicts)),
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: ReadRepository> ReadRepository for RacingRepository<R> {
    async fn get(&self, code: &ShortCode) -> repository::Result<Option<String>> {
        self.inner.get(code).await
    }

    async fn exists(&self, code: &ShortCode) -> repository::Result<bool> {
        self.inner.exists(code).await
    }
}

#[async_trait]
impl<R: Repository> Repository for RacingRepository<R> {
    async fn insert(&self, mapping: &UrlMapping) -> repository::Result<()> {
        let raced = self
            .conflicts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if raced {
            return Err(StorageError::Conflict(mapping.short_code.to_string()));
        }
        self.inner.insert(mapping).await
    }
}

/// A store that is down: every call fails with [`StorageError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRepository;

fn store_down() -> StorageError {
    StorageError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl ReadRepository for UnavailableRepository {
    async fn get(&self, _code: &ShortCode) -> repository::Result<Option<String>> {
        Err(store_down())
    }

    async fn exists(&self, _code: &ShortCode) -> repository::Result<bool> {
        Err(store_down())
    }
}

#[async_trait]
impl Repository for UnavailableRepository {
    async fn insert(&self, _mapping: &UrlMapping) -> repository::Result<()> {
        Err(store_down())
    }
}

/// A cache that is down: every call fails with [`CacheError::Unavailable`].
/// Counts the calls it rejected.
#[derive(Debug, Clone, Default)]
pub struct UnavailableCache {
    calls: Arc<AtomicUsize>,
}

impl UnavailableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn reject(&self) -> CacheError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CacheError::Unavailable("connection refused".to_string())
    }
}

#[async_trait]
impl UrlCache for UnavailableCache {
    async fn get_url(&self, _code: &ShortCode) -> cache::Result<Option<String>> {
        Err(self.reject())
    }

    async fn set_url(&self, _code: &ShortCode, _long_url: &str, _ttl: Duration) -> cache::Result<()> {
        Err(self.reject())
    }
}

/// Replays a fixed list of codes, then repeats the last one forever.
#[derive(Debug)]
pub struct ScriptedGenerator {
    state: Mutex<Script>,
}

#[derive(Debug)]
struct Script {
    pending: VecDeque<String>,
    last: String,
}

impl ScriptedGenerator {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pending: VecDeque<String> = codes.into_iter().map(Into::into).collect();
        let last = pending.back().cloned().unwrap_or_default();
        Self {
            state: Mutex::new(Script { pending, last }),
        }
    }
}

impl Generator for ScriptedGenerator {
    type Output = ShortCode;

    fn generate(&self) -> Self::Output {
        let mut script = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let code = match script.pending.pop_front() {
            Some(code) => {
                script.last = code.clone();
                code
            }
            None => script.last.clone(),
        };
        ShortCode::new_unchecked(code)
    }
}
