// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dedup hash reservations.
//!
//! A row here means "an attempt to send this message is in progress or has
//! succeeded". The unique index on the hash value is the atomicity the
//! reserve step relies on: two workers racing on the same content+minute
//! cannot both insert.

use rusqlite::params;

use palanque_core::PalanqueError;

use crate::database::Database;

/// Whether a hash value is already reserved.
pub async fn hash_exists(db: &Database, hash: &str) -> Result<bool, PalanqueError> {
    let hash = hash.to_string();
    db.connection()
        .call(move |conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM message_hashes WHERE hash = ?1)",
                params![hash],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reserve a hash for a message.
///
/// Fails when the hash value (or a reservation for the same message) already
/// exists; callers treat that as "someone else got there first".
pub async fn save_hash(db: &Database, message_id: i64, hash: &str) -> Result<(), PalanqueError> {
    let hash = hash.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO message_hashes (message_id, hash) VALUES (?1, ?2)",
                params![message_id, hash],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Release the reservation held for a message, if any.
pub async fn remove_hash(db: &Database, message_id: i64) -> Result<(), PalanqueError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM message_hashes WHERE message_id = ?1",
                params![message_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
