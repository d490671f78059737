// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Palanque workspace.
//!
//! Provides mock implementations of the gateway and store collaborator
//! traits with call recording and injectable failures, plus fixtures.

pub mod fixtures;
pub mod mock_gateway;
pub mod mock_store;

pub use mock_gateway::{GatewayCall, MockGateway, MockGatewayFactory};
pub use mock_store::MockStore;
