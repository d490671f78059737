// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Palanque dispatch service.
//!
//! Palanque is the outbound WhatsApp dispatch subsystem of a campaign
//! management application: it authenticates gateway sessions and delivers
//! scheduled messages with human-like typing cadence. This crate provides
//! the error type, domain types, and the collaborator traits the rest of
//! the workspace implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PalanqueError;
pub use traits::{DispatchStore, GatewayFactory, WhatsAppGateway};
pub use types::{ProviderInstance, ScheduledMessage, SessionInfo, SessionStatus, timestamp_now};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        // The worker holds both collaborators as trait objects; this
        // doesn't compile if either trait loses object safety.
        fn _store(_: &dyn DispatchStore) {}
        fn _gateway(_: &dyn WhatsAppGateway) {}
        fn _factory(_: &dyn GatewayFactory) {}
    }

    #[test]
    fn provider_instance_round_trips_through_json() {
        let instance = ProviderInstance {
            id: 7,
            base_url: "http://localhost:3000".into(),
            api_key: "secret".into(),
            session_name: "campaign-01".into(),
            active: true,
        };
        let json = serde_json::to_string(&instance).unwrap();
        let parsed: ProviderInstance = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, instance);
    }
}
