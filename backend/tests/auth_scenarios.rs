//! End-to-end scenarios for the auth core wired from public building blocks.

use std::sync::Arc;
use std::time::Duration;

use auth_service::domain::ports::{AuthCounter, EventBus, SharedCacheBackend};
use auth_service::domain::{
    Argon2CredentialHasher, AuthError, AuthService, AuthServicePorts, CacheMode, Deadline,
    EventNotifier, HashingCost, LoginCredentials, ProfileCacheSettings, Registration,
    TokenIssuer, USER_REGISTERED_TOPIC, select_profile_cache,
};
use auth_service::test_support::{
    FakeSharedCache, InstrumentedUserStore, MutableClock, RecordingEventBus, RecordingMetrics,
};
use chrono::{TimeZone, Utc};
use mockable::Clock;
use rstest::rstest;
use serde_json::json;

const CHEAP_COST: HashingCost = HashingCost {
    memory_kib: 8,
    iterations: 1,
    parallelism: 1,
};

struct World {
    service: AuthService,
    store: Arc<InstrumentedUserStore>,
    metrics: Arc<RecordingMetrics>,
}

async fn world(
    backend: Option<Arc<FakeSharedCache>>,
    bus: Option<Arc<RecordingEventBus>>,
) -> World {
    let start = Utc
        .with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp");
    let clock: Arc<dyn Clock> = Arc::new(MutableClock::new(start));
    let store = Arc::new(InstrumentedUserStore::new(Arc::clone(&clock)));
    let metrics = Arc::new(RecordingMetrics::new());
    let settings = ProfileCacheSettings {
        ttl: Duration::from_secs(300),
        probe_timeout: Duration::from_millis(100),
    };
    let cache = select_profile_cache(
        backend.map(|b| b as Arc<dyn SharedCacheBackend>),
        settings,
        Arc::clone(&clock),
    )
    .await;
    let notifier = EventNotifier::connect(
        bus.map(|b| b as Arc<dyn EventBus>),
        settings.probe_timeout,
    )
    .await;
    let service = AuthService::new(
        AuthServicePorts {
            store: store.clone(),
            hasher: Arc::new(Argon2CredentialHasher::new(CHEAP_COST).expect("cheap cost")),
            tokens: Arc::new(
                TokenIssuer::new(b"scenario-secret", Arc::clone(&clock)).expect("secret"),
            ),
            cache,
            notifier: Arc::new(notifier),
            metrics: metrics.clone(),
        },
        Duration::from_secs(3600),
    );
    World {
        service,
        store,
        metrics,
    }
}

fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(10))
}

fn alice() -> Registration {
    Registration::try_from_parts("alice", "alice@example.com", "Secret123", "")
        .expect("valid registration")
}

#[rstest]
#[tokio::test]
async fn alice_registers_logs_in_and_reads_her_profile_through_the_shared_cache() {
    let backend = Arc::new(FakeSharedCache::new());
    let bus = Arc::new(RecordingEventBus::new());
    let world = world(Some(backend.clone()), Some(bus.clone())).await;
    assert_eq!(world.service.cache_mode(), CacheMode::Shared);
    assert!(world.service.notifier_enabled());

    let created = world
        .service
        .register(&alice(), deadline())
        .await
        .expect("registration succeeds");
    assert_eq!(created.role(), "user");

    let credentials =
        LoginCredentials::try_from_parts("alice@example.com", "Secret123").expect("credentials");
    let token = world
        .service
        .login(&credentials, deadline())
        .await
        .expect("login succeeds");
    let claims = world.service.verify_token(&token).expect("token verifies");
    assert_eq!(claims.subject, created.id());
    assert_eq!(claims.role, "user");

    let first = world
        .service
        .get_profile(created.id(), deadline())
        .await
        .expect("profile from store");
    let second = world
        .service
        .get_profile(created.id(), deadline())
        .await
        .expect("profile from cache");

    assert_eq!(first, created);
    assert_eq!(second, created);
    assert_eq!(world.store.find_by_id_calls(), 1);
    assert!(backend.stored(&format!("user:{}", created.id())).is_some());
    assert_eq!(
        backend.ttl_of(&format!("user:{}", created.id())),
        Some(Duration::from_secs(300))
    );
    assert_eq!(
        bus.published(),
        vec![(
            USER_REGISTERED_TOPIC.to_owned(),
            json!({"userId": created.id().get(), "email": "alice@example.com"})
        )]
    );
    assert_eq!(world.metrics.count(AuthCounter::Registration), 1);
    assert_eq!(world.metrics.count(AuthCounter::LoginSuccess), 1);
}

#[rstest]
#[tokio::test]
async fn degraded_startup_still_serves_every_operation() {
    let world = world(
        Some(Arc::new(FakeSharedCache::unhealthy())),
        Some(Arc::new(RecordingEventBus::unhealthy())),
    )
    .await;
    assert_eq!(world.service.cache_mode(), CacheMode::Degraded);
    assert!(!world.service.notifier_enabled());

    let created = world
        .service
        .register(&alice(), deadline())
        .await
        .expect("registration succeeds");
    world
        .service
        .get_profile(created.id(), deadline())
        .await
        .expect("profile from store");
    world
        .service
        .get_profile(created.id(), deadline())
        .await
        .expect("profile from local cache");

    assert_eq!(world.store.find_by_id_calls(), 1);
}

#[rstest]
#[tokio::test]
async fn slow_cache_probe_selects_degraded_mode() {
    let backend = Arc::new(FakeSharedCache::with_ping_delay(Duration::from_secs(2)));
    let world = world(Some(backend), None).await;

    assert_eq!(world.service.cache_mode(), CacheMode::Degraded);
}

#[rstest]
#[tokio::test]
async fn duplicate_email_and_bad_password_are_rejected() {
    let world = world(None, None).await;
    world
        .service
        .register(&alice(), deadline())
        .await
        .expect("first registration succeeds");

    let again = Registration::try_from_parts("alice2", "alice@example.com", "Secret123", "user")
        .expect("valid registration");
    let duplicate = world.service.register(&again, deadline()).await;
    assert!(matches!(duplicate, Err(AuthError::DuplicateEmail)));

    let wrong =
        LoginCredentials::try_from_parts("alice@example.com", "Wrong1234").expect("credentials");
    let login = world.service.login(&wrong, deadline()).await;
    assert!(matches!(login, Err(AuthError::InvalidCredential)));
    assert_eq!(world.metrics.count(AuthCounter::LoginRejected), 1);
}
