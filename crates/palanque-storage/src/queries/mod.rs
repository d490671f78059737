// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations, grouped by table.

pub mod hashes;
pub mod instances;
pub mod messages;
