// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider instance operations.
//!
//! Instances are created and edited by configuration tooling; the dispatch
//! core only ever reads them.

use rusqlite::params;

use palanque_core::PalanqueError;

use crate::database::Database;
use crate::models::ProviderInstance;

fn row_to_instance(row: &rusqlite::Row<'_>) -> Result<ProviderInstance, rusqlite::Error> {
    Ok(ProviderInstance {
        id: row.get(0)?,
        base_url: row.get(1)?,
        api_key: row.get(2)?,
        session_name: row.get(3)?,
        active: row.get(4)?,
    })
}

/// Create a new provider instance. Returns the auto-generated id.
pub async fn create_instance(
    db: &Database,
    base_url: &str,
    api_key: &str,
    session_name: &str,
) -> Result<i64, PalanqueError> {
    let base_url = base_url.to_string();
    let api_key = api_key.to_string();
    let session_name = session_name.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO provider_instances (base_url, api_key, session_name)
                 VALUES (?1, ?2, ?3)",
                params![base_url, api_key, session_name],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up an instance by id.
pub async fn get_instance(
    db: &Database,
    id: i64,
) -> Result<Option<ProviderInstance>, PalanqueError> {
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    "SELECT id, base_url, api_key, session_name, active
                     FROM provider_instances WHERE id = ?1",
                    params![id],
                    row_to_instance,
                )
                .map(Some);
            match result {
                Ok(instance) => Ok(instance),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List all instances, active and inactive.
pub async fn list_instances(db: &Database) -> Result<Vec<ProviderInstance>, PalanqueError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, base_url, api_key, session_name, active
                 FROM provider_instances ORDER BY id ASC",
            )?;
            let instances = stmt
                .query_map([], row_to_instance)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(instances)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flip an instance's active flag.
///
/// Deactivating an instance suppresses dispatch of its messages without
/// touching the messages themselves.
pub async fn set_instance_active(
    db: &Database,
    id: i64,
    active: bool,
) -> Result<(), PalanqueError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE provider_instances SET active = ?1,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![active, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
