// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the WAHA-style gateway HTTP API.

use serde::{Deserialize, Serialize};

use palanque_core::SessionStatus;

/// One entry of `GET /api/sessions`.
///
/// The gateway returns more fields (engine, config, me); only the ones the
/// dispatch service reads are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDto {
    pub name: String,
    pub status: SessionStatus,
}

/// Response of `GET /api/{session}/auth/qr?format=raw`.
#[derive(Debug, Clone, Deserialize)]
pub struct QrDto {
    pub value: String,
}

/// Body of `POST /api/sendText`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTextRequest<'a> {
    pub session: &'a str,
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Body of `POST /api/startTyping`, `/api/stopTyping` and `/api/sendSeen`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub session: &'a str,
    pub chat_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_text_request_uses_camel_case_keys() {
        let body = SendTextRequest {
            session: "campaign-01",
            chat_id: "5511999990000@c.us",
            text: "Olá",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["session"], "campaign-01");
        assert_eq!(json["chatId"], "5511999990000@c.us");
        assert_eq!(json["text"], "Olá");
    }

    #[test]
    fn session_dto_parses_gateway_listing() {
        let json = r#"{"name":"campaign-01","status":"SCAN_QR_CODE","engine":"WEBJS"}"#;
        let dto: SessionDto = serde_json::from_str(json).unwrap();
        assert_eq!(dto.name, "campaign-01");
        assert_eq!(dto.status, SessionStatus::ScanQrCode);
    }
}
