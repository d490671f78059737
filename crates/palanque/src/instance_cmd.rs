// SPDX-FileCopyrightText: 2026 Palanque Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider instance administration: `instance add|list|enable|disable`.
//!
//! The dispatch core treats instances as read-only configuration; these
//! commands are the surface that creates and maintains them.

use clap::Subcommand;

use palanque_config::model::PalanqueConfig;
use palanque_core::PalanqueError;
use palanque_storage::SqliteStore;

#[derive(Subcommand, Debug)]
pub enum InstanceCommands {
    /// Register a gateway instance.
    Add {
        /// Gateway base URL, e.g. http://localhost:3000.
        #[arg(long)]
        base_url: String,
        /// Gateway API key.
        #[arg(long)]
        api_key: String,
        /// Gateway-side session name.
        #[arg(long)]
        session: String,
    },
    /// List all registered instances.
    List,
    /// Re-enable dispatch for an instance.
    Enable {
        #[arg(long)]
        id: i64,
    },
    /// Suppress dispatch for an instance without deleting it.
    Disable {
        #[arg(long)]
        id: i64,
    },
}

pub async fn run(config: PalanqueConfig, command: InstanceCommands) -> Result<(), PalanqueError> {
    let store = SqliteStore::new(config.storage.clone());
    store.initialize().await?;

    match command {
        InstanceCommands::Add {
            base_url,
            api_key,
            session,
        } => {
            let id = store.create_instance(&base_url, &api_key, &session).await?;
            println!("instance {id} registered for session '{session}'");
        }
        InstanceCommands::List => {
            for instance in store.list_instances().await? {
                let active = if instance.active { "active" } else { "inactive" };
                println!(
                    "{:>4}  {:<24} {:<10} {}  api-key {}",
                    instance.id,
                    instance.session_name,
                    active,
                    instance.base_url,
                    mask_key(&instance.api_key),
                );
            }
        }
        InstanceCommands::Enable { id } => {
            store.set_instance_active(id, true).await?;
            println!("instance {id} enabled");
        }
        InstanceCommands::Disable { id } => {
            store.set_instance_active(id, false).await?;
            println!("instance {id} disabled");
        }
    }

    store.close().await?;
    Ok(())
}

/// Keeps only the first characters of a key for display.
fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_key_hides_the_tail() {
        assert_eq!(mask_key("secret-api-key"), "secr…");
        assert_eq!(mask_key("ab"), "ab…");
    }
}
