// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits the dispatch core is written against.
//!
//! The core has exactly two external collaborators: the WhatsApp HTTP
//! gateway and the persistence layer. Both are abstracted behind async
//! traits so tests can substitute recording mocks.

pub mod gateway;
pub mod store;

pub use gateway::{GatewayFactory, WhatsAppGateway};
pub use store::DispatchStore;
