//! Tests for cache mode selection and both cache implementations.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::SharedCacheBackend;
use crate::domain::{NewUser, UserId};
use crate::test_support::{FakeSharedCache, MutableClock};

const TTL: Duration = Duration::from_secs(300);

#[fixture]
fn clock() -> Arc<MutableClock> {
    let start = Utc
        .with_ymd_and_hms(2026, 5, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(MutableClock::new(start))
}

#[fixture]
fn identity() -> UserIdentity {
    UserIdentity::new(
        UserId::new(7).expect("valid id"),
        NewUser {
            username: "alice".to_owned(),
            email: "alice@x.com".to_owned(),
            role: "user".to_owned(),
        },
        Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp"),
    )
}

fn key(identity: &UserIdentity) -> ProfileCacheKey {
    ProfileCacheKey::for_user(identity.id())
}

fn local(clock: &Arc<MutableClock>) -> LocalProfileCache {
    LocalProfileCache::new(TTL, Arc::clone(clock) as Arc<dyn Clock>)
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn degraded_get_after_put_hits(clock: Arc<MutableClock>, identity: UserIdentity) {
    let cache = local(&clock);
    cache.put(&key(&identity), &identity).await.expect("put");

    let cached = cache.get(&key(&identity)).await.expect("get");
    assert_eq!(cached, Some(identity));
}

#[rstest]
#[case(TTL - Duration::from_secs(1), true)]
#[case(TTL, false)]
#[case(TTL + Duration::from_secs(60), false)]
#[tokio::test(start_paused = true)]
async fn degraded_get_respects_clock_age(
    clock: Arc<MutableClock>,
    identity: UserIdentity,
    #[case] age: Duration,
    #[case] expect_hit: bool,
) {
    let cache = local(&clock);
    cache.put(&key(&identity), &identity).await.expect("put");

    clock.advance(age);

    let cached = cache.get(&key(&identity)).await.expect("get");
    assert_eq!(cached.is_some(), expect_hit);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn degraded_expiry_timer_removes_entry(clock: Arc<MutableClock>, identity: UserIdentity) {
    let cache = local(&clock);
    cache.put(&key(&identity), &identity).await.expect("put");
    assert_eq!(cache.len(), 1);

    tokio::time::sleep(TTL + Duration::from_millis(1)).await;

    assert!(cache.is_empty(), "timer should evict the entry");
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stale_timer_does_not_evict_newer_put(clock: Arc<MutableClock>, identity: UserIdentity) {
    let cache = local(&clock);
    cache.put(&key(&identity), &identity).await.expect("first put");

    tokio::time::sleep(TTL / 2).await;
    clock.advance(TTL / 2);
    cache.put(&key(&identity), &identity).await.expect("second put");

    tokio::time::sleep(TTL / 2 + Duration::from_millis(1)).await;
    clock.advance(TTL / 2);

    assert_eq!(cache.len(), 1, "first timer must leave the newer entry");
    assert_eq!(
        cache.get(&key(&identity)).await.expect("get"),
        Some(identity)
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn degraded_invalidate_drops_entry(clock: Arc<MutableClock>, identity: UserIdentity) {
    let cache = local(&clock);
    cache.put(&key(&identity), &identity).await.expect("put");

    cache.invalidate(&key(&identity)).await.expect("invalidate");

    assert_eq!(cache.get(&key(&identity)).await.expect("get"), None);
}

#[rstest]
#[tokio::test]
async fn shared_put_then_get_round_trips(identity: UserIdentity) {
    let backend = Arc::new(FakeSharedCache::new());
    let cache = SharedProfileCache::new(backend.clone() as Arc<dyn SharedCacheBackend>, TTL);

    cache.put(&key(&identity), &identity).await.expect("put");

    assert_eq!(backend.ttl_of("user:7"), Some(TTL));
    assert_eq!(
        cache.get(&key(&identity)).await.expect("get"),
        Some(identity)
    );
}

#[rstest]
#[tokio::test]
async fn shared_stores_camel_case_json(identity: UserIdentity) {
    let backend = Arc::new(FakeSharedCache::new());
    let cache = SharedProfileCache::new(backend.clone() as Arc<dyn SharedCacheBackend>, TTL);

    cache.put(&key(&identity), &identity).await.expect("put");

    let stored = backend.stored("user:7").expect("entry written");
    let value: serde_json::Value = serde_json::from_slice(&stored).expect("JSON entry");
    assert_eq!(value["username"], "alice");
    assert!(value.get("createdAt").is_some());
    assert!(value.get("passwordHash").is_none());
}

#[rstest]
#[tokio::test]
async fn shared_undecodable_entry_is_serialization_error(identity: UserIdentity) {
    let backend = Arc::new(FakeSharedCache::new());
    backend.insert_raw("user:7", b"not json");
    let cache = SharedProfileCache::new(backend as Arc<dyn SharedCacheBackend>, TTL);

    let err = cache.get(&key(&identity)).await.expect_err("corrupt entry");
    assert!(matches!(err, ProfileCacheError::Serialization { .. }));
}

#[rstest]
#[tokio::test]
async fn shared_backend_failures_surface_as_backend_errors(identity: UserIdentity) {
    let backend = Arc::new(FakeSharedCache::new());
    backend.fail_reads(true);
    backend.fail_writes(true);
    let cache = SharedProfileCache::new(backend as Arc<dyn SharedCacheBackend>, TTL);

    let read = cache.get(&key(&identity)).await.expect_err("read fails");
    let write = cache
        .put(&key(&identity), &identity)
        .await
        .expect_err("write fails");

    assert!(matches!(read, ProfileCacheError::Backend { .. }));
    assert!(matches!(write, ProfileCacheError::Backend { .. }));
}

fn settings() -> ProfileCacheSettings {
    ProfileCacheSettings {
        ttl: TTL,
        probe_timeout: Duration::from_millis(50),
    }
}

#[rstest]
#[tokio::test]
async fn selection_without_backend_is_degraded(clock: Arc<MutableClock>) {
    let cache = select_profile_cache(None, settings(), clock as Arc<dyn Clock>).await;
    assert_eq!(cache.mode(), CacheMode::Degraded);
}

#[rstest]
#[tokio::test]
async fn selection_with_healthy_backend_is_shared(clock: Arc<MutableClock>) {
    let backend: Arc<dyn SharedCacheBackend> = Arc::new(FakeSharedCache::new());
    let cache = select_profile_cache(Some(backend), settings(), clock as Arc<dyn Clock>).await;
    assert_eq!(cache.mode(), CacheMode::Shared);
}

#[rstest]
#[tokio::test]
async fn selection_with_unhealthy_backend_is_degraded(clock: Arc<MutableClock>) {
    let backend: Arc<dyn SharedCacheBackend> = Arc::new(FakeSharedCache::unhealthy());
    let cache = select_profile_cache(Some(backend), settings(), clock as Arc<dyn Clock>).await;
    assert_eq!(cache.mode(), CacheMode::Degraded);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn selection_with_slow_backend_is_degraded(clock: Arc<MutableClock>) {
    let backend: Arc<dyn SharedCacheBackend> =
        Arc::new(FakeSharedCache::with_ping_delay(Duration::from_secs(5)));
    let cache = select_profile_cache(Some(backend), settings(), clock as Arc<dyn Clock>).await;
    assert_eq!(cache.mode(), CacheMode::Degraded);
}
