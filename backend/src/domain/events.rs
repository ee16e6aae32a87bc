//! Transient domain events handed to the notifier.

use serde_json::{Value, json};

use super::UserIdentity;

/// Topic announced after a successful registration.
pub const USER_REGISTERED_TOPIC: &str = "user.registered";

/// Fire-and-forget event: a topic and a structured payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainEvent {
    topic: String,
    payload: Value,
}

impl DomainEvent {
    /// Build an event for an arbitrary topic.
    pub fn new(topic: impl Into<String>, payload: Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }

    /// `user.registered` event carrying the new id and email.
    pub fn user_registered(identity: &UserIdentity) -> Self {
        Self::new(
            USER_REGISTERED_TOPIC,
            json!({ "userId": identity.id().get(), "email": identity.email() }),
        )
    }

    /// Destination topic.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Structured payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{NewUser, UserId};
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    fn user_registered_payload_names_id_and_email() {
        let identity = UserIdentity::new(
            UserId::new(5).expect("valid id"),
            NewUser {
                username: "alice".to_owned(),
                email: "alice@x.com".to_owned(),
                role: "user".to_owned(),
            },
            Utc::now(),
        );

        let event = DomainEvent::user_registered(&identity);

        assert_eq!(event.topic(), "user.registered");
        assert_eq!(
            event.payload(),
            &json!({ "userId": 5, "email": "alice@x.com" })
        );
    }
}
