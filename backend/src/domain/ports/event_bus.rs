//! Port for publishing domain events to an external bus.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by event bus adapters.
    pub enum EventBusError {
        /// Bus connection could not be established.
        Connection { message: String } => "event bus connection failed: {message}",
        /// Bus accepted the connection but failed the publish.
        Publish { topic: String, message: String } =>
            "event bus publish to {topic} failed: {message}",
    }
}

/// Fire-and-forget publication transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an encoded payload on `topic`.
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), EventBusError>;

    /// Health check used once when the notifier is constructed.
    async fn ping(&self) -> Result<(), EventBusError>;
}
