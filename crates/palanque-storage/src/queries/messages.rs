// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduled message operations.

use rusqlite::params;

use palanque_core::PalanqueError;

use crate::database::Database;
use crate::models::ScheduledMessage;

fn row_to_message(row: &rusqlite::Row<'_>) -> Result<ScheduledMessage, rusqlite::Error> {
    Ok(ScheduledMessage {
        id: row.get(0)?,
        instance_id: row.get(1)?,
        phone_number: row.get(2)?,
        response_text: row.get(3)?,
        scheduled_at: row.get(4)?,
        sent: row.get(5)?,
        sent_at: row.get(6)?,
    })
}

const MESSAGE_COLUMNS: &str =
    "id, instance_id, phone_number, response_text, scheduled_at, sent, sent_at";

/// Schedule a message for delivery. Returns the auto-generated id.
pub async fn schedule_message(
    db: &Database,
    instance_id: i64,
    phone_number: &str,
    response_text: Option<&str>,
    scheduled_at: &str,
) -> Result<i64, PalanqueError> {
    let phone_number = phone_number.to_string();
    let response_text = response_text.map(str::to_string);
    let scheduled_at = scheduled_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO scheduled_messages
                 (instance_id, phone_number, response_text, scheduled_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![instance_id, phone_number, response_text, scheduled_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messages whose scheduled time has elapsed and which are not yet sent,
/// oldest first.
pub async fn due_messages(db: &Database) -> Result<Vec<ScheduledMessage>, PalanqueError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM scheduled_messages
                 WHERE sent = 0
                   AND scheduled_at <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 ORDER BY scheduled_at ASC, id ASC"
            ))?;
            let messages = stmt
                .query_map([], row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a message by id.
pub async fn get_message(
    db: &Database,
    id: i64,
) -> Result<Option<ScheduledMessage>, PalanqueError> {
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    &format!("SELECT {MESSAGE_COLUMNS} FROM scheduled_messages WHERE id = ?1"),
                    params![id],
                    row_to_message,
                )
                .map(Some);
            match result {
                Ok(message) => Ok(message),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a message as sent.
///
/// Monotonic by construction: the `sent = 0` predicate means a message that
/// is already sent is left untouched, including its original `sent_at`.
pub async fn mark_sent(db: &Database, id: i64) -> Result<(), PalanqueError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE scheduled_messages
                 SET sent = 1, sent_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND sent = 0",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
