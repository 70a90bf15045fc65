//! Broker API account settings.
//!
//! Every save appends a record; loading picks the latest active one, or the
//! latest of all when none is active.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::events::ACCOUNT_SAVED;
use crate::constants::store::ACCOUNTS_FILE;
use crate::error::StoreError;

use super::jsonl::{append_jsonl, read_jsonl};
use super::traits::StoreResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAccount {
    pub name: String,
    pub base_url: String,
    pub password: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl ApiAccount {
    /// Copy safe to show back to the operator.
    pub fn masked(&self) -> Self {
        Self {
            password: "*".repeat(self.password.chars().count().min(8)),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(ACCOUNTS_FILE),
        }
    }

    pub fn save(&self, mut account: ApiAccount) -> StoreResult<ApiAccount> {
        account.name = account.name.trim().to_string();
        account.base_url = account.base_url.trim().to_string();
        if account.name.is_empty() {
            return Err(StoreError::InvalidAccount("name is required".to_string()));
        }
        if account.base_url.is_empty() {
            return Err(StoreError::InvalidAccount("base URL is required".to_string()));
        }

        account.saved_at = Some(Utc::now());
        append_jsonl(&self.path, std::slice::from_ref(&account))?;
        info!(event = ACCOUNT_SAVED, "🔑 [STORE] Saved API account '{}' (active: {})", account.name, account.active);
        Ok(account)
    }

    pub fn load(&self) -> StoreResult<Option<ApiAccount>> {
        let accounts: Vec<ApiAccount> = read_jsonl(&self.path)?;
        let latest_active = accounts.iter().rev().find(|a| a.active).cloned();
        Ok(latest_active.or_else(|| accounts.last().cloned()))
    }
}
