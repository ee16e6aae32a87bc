//! Hand-written doubles for the driven ports.
//!
//! `mockall` mocks cover single-call expectations; these doubles keep state
//! across calls so scenario tests can assert on what actually reached each
//! dependency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    AuthCounter, AuthHistogram, AuthMetrics, EventBus, EventBusError, ProfileCacheKey,
    SharedCacheBackend, SharedCacheError, UserStore, UserStoreError,
};
use crate::domain::{CredentialRecord, NewUser, PasswordHash, UserId, UserIdentity};
use crate::outbound::persistence::InMemoryUserStore;

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{name} mutex poisoned"),
    }
}

/// In-memory [`SharedCacheBackend`] with switchable failures.
#[derive(Default)]
pub struct FakeSharedCache {
    entries: Mutex<HashMap<String, (Vec<u8>, Duration)>>,
    unhealthy: AtomicBool,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    ping_delay: Mutex<Duration>,
    set_calls: AtomicUsize,
}

impl FakeSharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose health check fails.
    pub fn unhealthy() -> Self {
        let cache = Self::default();
        cache.unhealthy.store(true, Ordering::SeqCst);
        cache
    }

    /// Backend whose health check answers only after `delay`.
    pub fn with_ping_delay(delay: Duration) -> Self {
        let cache = Self::default();
        *lock(&cache.ping_delay, "ping delay") = delay;
        cache
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Seed raw bytes under `key`.
    pub fn insert_raw(&self, key: &str, bytes: &[u8]) {
        lock(&self.entries, "entries").insert(key.to_owned(), (bytes.to_vec(), Duration::ZERO));
    }

    /// Bytes currently stored under `key`.
    pub fn stored(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.entries, "entries")
            .get(key)
            .map(|(bytes, _)| bytes.clone())
    }

    /// TTL passed with the last write of `key`.
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        lock(&self.entries, "entries").get(key).map(|(_, ttl)| *ttl)
    }

    /// Number of `set` calls, failed ones included.
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SharedCacheBackend for FakeSharedCache {
    async fn get(&self, key: &ProfileCacheKey) -> Result<Option<Vec<u8>>, SharedCacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SharedCacheError::command("read refused"));
        }
        Ok(self.stored(key.as_str()))
    }

    async fn set(
        &self,
        key: &ProfileCacheKey,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), SharedCacheError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SharedCacheError::command("write refused"));
        }
        lock(&self.entries, "entries").insert(key.as_str().to_owned(), (value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &ProfileCacheKey) -> Result<(), SharedCacheError> {
        lock(&self.entries, "entries").remove(key.as_str());
        Ok(())
    }

    async fn ping(&self) -> Result<(), SharedCacheError> {
        let delay = *lock(&self.ping_delay, "ping delay");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(SharedCacheError::connection("connection refused"));
        }
        Ok(())
    }
}

/// [`EventBus`] that records every publish.
#[derive(Default)]
pub struct RecordingEventBus {
    published: Mutex<Vec<(String, Vec<u8>)>>,
    unhealthy: AtomicBool,
    fail_publish: AtomicBool,
}

impl RecordingEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus whose health check fails.
    pub fn unhealthy() -> Self {
        let bus = Self::default();
        bus.unhealthy.store(true, Ordering::SeqCst);
        bus
    }

    /// Bus that is healthy but rejects every publish.
    pub fn failing() -> Self {
        let bus = Self::default();
        bus.fail_publish.store(true, Ordering::SeqCst);
        bus
    }

    /// Published events as `(topic, decoded JSON payload)`.
    pub fn published(&self) -> Vec<(String, serde_json::Value)> {
        lock(&self.published, "published")
            .iter()
            .map(|(topic, bytes)| {
                let payload = match serde_json::from_slice(bytes) {
                    Ok(value) => value,
                    Err(error) => panic!("published payload is not JSON: {error}"),
                };
                (topic.clone(), payload)
            })
            .collect()
    }
}

#[async_trait]
impl EventBus for RecordingEventBus {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), EventBusError> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(EventBusError::publish(topic, "bus rejected message"));
        }
        lock(&self.published, "published").push((topic.to_owned(), payload.to_vec()));
        Ok(())
    }

    async fn ping(&self) -> Result<(), EventBusError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(EventBusError::connection("connection refused"));
        }
        Ok(())
    }
}

/// [`InMemoryUserStore`] wrapper counting calls, with injectable latency
/// and failures.
pub struct InstrumentedUserStore {
    inner: InMemoryUserStore,
    create_calls: AtomicUsize,
    completed_creates: AtomicUsize,
    find_by_email_calls: AtomicUsize,
    find_by_id_calls: AtomicUsize,
    delay: Mutex<Duration>,
    failure: Mutex<Option<UserStoreError>>,
}

impl InstrumentedUserStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: InMemoryUserStore::new(clock),
            create_calls: AtomicUsize::new(0),
            completed_creates: AtomicUsize::new(0),
            find_by_email_calls: AtomicUsize::new(0),
            find_by_id_calls: AtomicUsize::new(0),
            delay: Mutex::new(Duration::ZERO),
            failure: Mutex::new(None),
        }
    }

    /// Delay every subsequent call by `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay, "delay") = delay;
    }

    /// Fail every subsequent call with `error`; `None` clears it.
    pub fn set_failure(&self, error: Option<UserStoreError>) {
        *lock(&self.failure, "failure") = error;
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// `create_user` calls that ran to the end, whether or not anyone awaited
    /// them.
    pub fn completed_creates(&self) -> usize {
        self.completed_creates.load(Ordering::SeqCst)
    }

    pub fn find_by_email_calls(&self) -> usize {
        self.find_by_email_calls.load(Ordering::SeqCst)
    }

    pub fn find_by_id_calls(&self) -> usize {
        self.find_by_id_calls.load(Ordering::SeqCst)
    }

    async fn before_call(&self) -> Result<(), UserStoreError> {
        let delay = *lock(&self.delay, "delay");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match lock(&self.failure, "failure").clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserStore for InstrumentedUserStore {
    async fn create_user(
        &self,
        draft: &NewUser,
        password_hash: &PasswordHash,
    ) -> Result<UserIdentity, UserStoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.before_call().await?;
        let created = self.inner.create_user(draft, password_hash).await;
        self.completed_creates.fetch_add(1, Ordering::SeqCst);
        created
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, UserStoreError> {
        self.find_by_email_calls.fetch_add(1, Ordering::SeqCst);
        self.before_call().await?;
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserIdentity>, UserStoreError> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        self.before_call().await?;
        self.inner.find_by_id(id).await
    }
}

/// [`AuthMetrics`] that remembers every counter increment.
#[derive(Default)]
pub struct RecordingMetrics {
    counters: Mutex<Vec<AuthCounter>>,
    observations: Mutex<Vec<AuthHistogram>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times `counter` was incremented.
    pub fn count(&self, counter: AuthCounter) -> usize {
        lock(&self.counters, "counters")
            .iter()
            .filter(|recorded| **recorded == counter)
            .count()
    }

    /// Histograms observed, in order.
    pub fn observations(&self) -> Vec<AuthHistogram> {
        lock(&self.observations, "observations").clone()
    }
}

impl AuthMetrics for RecordingMetrics {
    fn increment(&self, counter: AuthCounter) {
        lock(&self.counters, "counters").push(counter);
    }

    fn observe(&self, histogram: AuthHistogram, _elapsed: Duration) {
        lock(&self.observations, "observations").push(histogram);
    }
}
