// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for dispatch tests.

use palanque_core::{ProviderInstance, ScheduledMessage};

/// An active provider instance with plausible credentials.
pub fn instance(id: i64) -> ProviderInstance {
    ProviderInstance {
        id,
        base_url: "http://localhost:3000".into(),
        api_key: "test-key".into(),
        session_name: format!("campaign-{id:02}"),
        active: true,
    }
}

/// An unsent message whose scheduled time is long past.
pub fn due_message(id: i64, instance_id: i64, phone: &str, text: &str) -> ScheduledMessage {
    ScheduledMessage {
        id,
        instance_id,
        phone_number: phone.into(),
        response_text: Some(text.into()),
        scheduled_at: "2020-01-01T00:00:00.000Z".into(),
        sent: false,
        sent_at: None,
    }
}
