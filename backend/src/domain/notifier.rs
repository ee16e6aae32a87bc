//! Best-effort publication of domain events.
//!
//! The notifier probes its bus once at construction. If the bus is absent or
//! unhealthy it stays disabled for the rest of the process: publishes become
//! no-ops and the first one logs a warning. There is no reconnection loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::DomainEvent;
use super::ports::{EventBus, EventBusError};

/// Publication failure reported to the orchestrator, which only logs it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishFailure {
    /// Payload could not be encoded.
    #[error("failed to encode {topic} payload: {message}")]
    Encoding {
        /// Event topic.
        topic: String,
        /// Encoder message.
        message: String,
    },
    /// Bus rejected the publish.
    #[error(transparent)]
    Transport(#[from] EventBusError),
}

enum NotifierState {
    Enabled(Arc<dyn EventBus>),
    Disabled { warned: AtomicBool },
}

/// Publishes [`DomainEvent`]s when a bus was reachable at startup.
pub struct EventNotifier {
    state: NotifierState,
}

impl EventNotifier {
    /// Probe `bus` once, bounded by `probe_timeout`.
    pub async fn connect(bus: Option<Arc<dyn EventBus>>, probe_timeout: Duration) -> Self {
        let Some(bus) = bus else {
            info!("no event bus configured; event publication disabled");
            return Self::disabled();
        };
        match tokio::time::timeout(probe_timeout, bus.ping()).await {
            Ok(Ok(())) => {
                info!("event bus reachable; event publication enabled");
                Self::enabled(bus)
            }
            Ok(Err(error)) => {
                warn!(%error, "event bus unavailable; event publication disabled");
                Self::disabled()
            }
            Err(_) => {
                warn!(
                    timeout_ms = u64::try_from(probe_timeout.as_millis()).unwrap_or(u64::MAX),
                    "event bus health check timed out; event publication disabled"
                );
                Self::disabled()
            }
        }
    }

    /// Notifier bound to a bus without probing it.
    pub fn enabled(bus: Arc<dyn EventBus>) -> Self {
        Self {
            state: NotifierState::Enabled(bus),
        }
    }

    /// Notifier that drops every event.
    pub fn disabled() -> Self {
        Self {
            state: NotifierState::Disabled {
                warned: AtomicBool::new(false),
            },
        }
    }

    /// Whether publishes reach a bus.
    pub fn is_enabled(&self) -> bool {
        matches!(self.state, NotifierState::Enabled(_))
    }

    /// Publish `event`.
    ///
    /// Disabled notifiers return `Ok(())`. Callers must treat errors as
    /// advisory.
    pub async fn publish(&self, event: &DomainEvent) -> Result<(), PublishFailure> {
        match &self.state {
            NotifierState::Disabled { warned } => {
                if !warned.swap(true, Ordering::Relaxed) {
                    warn!(
                        topic = event.topic(),
                        "event bus disabled; dropping domain events"
                    );
                }
                Ok(())
            }
            NotifierState::Enabled(bus) => {
                let bytes =
                    serde_json::to_vec(event.payload()).map_err(|err| PublishFailure::Encoding {
                        topic: event.topic().to_owned(),
                        message: err.to_string(),
                    })?;
                bus.publish(event.topic(), &bytes).await?;
                debug!(topic = event.topic(), "domain event published");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventNotifier")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::MockEventBus;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    fn event() -> DomainEvent {
        DomainEvent::new("user.registered", json!({ "userId": 1, "email": "a@b.co" }))
    }

    #[rstest]
    #[tokio::test]
    async fn connect_without_bus_is_disabled() {
        let notifier = EventNotifier::connect(None, Duration::from_millis(10)).await;
        assert!(!notifier.is_enabled());
        assert_eq!(notifier.publish(&event()).await, Ok(()));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_probe_disables_for_good() {
        let mut bus = MockEventBus::new();
        bus.expect_ping()
            .times(1)
            .returning(|| Err(EventBusError::connection("refused")));
        bus.expect_publish().never();

        let notifier =
            EventNotifier::connect(Some(Arc::new(bus)), Duration::from_millis(10)).await;

        assert!(!notifier.is_enabled());
        assert_eq!(notifier.publish(&event()).await, Ok(()));
        assert_eq!(notifier.publish(&event()).await, Ok(()));
    }

    #[rstest]
    #[tokio::test]
    async fn enabled_notifier_publishes_json_payload() {
        let mut bus = MockEventBus::new();
        bus.expect_ping().times(1).returning(|| Ok(()));
        bus.expect_publish()
            .with(
                eq("user.registered"),
                eq(br#"{"email":"a@b.co","userId":1}"#.to_vec()),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let notifier =
            EventNotifier::connect(Some(Arc::new(bus)), Duration::from_millis(10)).await;

        assert!(notifier.is_enabled());
        notifier.publish(&event()).await.expect("publish succeeds");
    }

    #[rstest]
    #[tokio::test]
    async fn transport_errors_surface_as_publish_failures() {
        let mut bus = MockEventBus::new();
        bus.expect_publish()
            .returning(|topic, _| Err(EventBusError::publish(topic, "broken pipe")));

        let notifier = EventNotifier::enabled(Arc::new(bus));
        let err = notifier.publish(&event()).await.expect_err("publish fails");

        assert!(matches!(err, PublishFailure::Transport(_)));
    }
}
