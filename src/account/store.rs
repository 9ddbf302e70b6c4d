//! Credential storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::types::{Identity, IdentityId};
use crate::error::{StoreError, WriteGate};

/// Repository of identities keyed by username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an identity by exact (case-sensitive) username.
    async fn get(&self, username: &str) -> Result<Option<Identity>, StoreError>;

    /// Insert a new identity, assigning its `id`.
    ///
    /// Fails with `StoreError::Conflict` if the username is taken; nothing is
    /// written in that case. Nothing is written either once `gate` has been
    /// abandoned.
    async fn put_gated(&self, identity: Identity, gate: WriteGate) -> Result<Identity, StoreError>;

    async fn put(&self, identity: Identity) -> Result<Identity, StoreError> {
        self.put_gated(identity, WriteGate::new()).await
    }

    /// All identities ordered by id.
    async fn list(&self) -> Result<Vec<Identity>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list().await?.len())
    }
}

/// In-process credential store used for ephemeral runs and tests.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<MemoryIdentities>,
}

#[derive(Default)]
struct MemoryIdentities {
    by_username: HashMap<String, Identity>,
    last_id: IdentityId,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    tracing::error!("Credential store lock poisoned: {}", e);
    StoreError::Backend("credential store lock poisoned".to_string())
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.by_username.get(username).cloned())
    }

    async fn put_gated(
        &self,
        mut identity: Identity,
        gate: WriteGate,
    ) -> Result<Identity, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.by_username.contains_key(&identity.username) {
            return Err(StoreError::Conflict(identity.username));
        }
        if !gate.begin_commit() {
            return Err(StoreError::Abandoned);
        }
        inner.last_id += 1;
        identity.id = inner.last_id;
        inner
            .by_username
            .insert(identity.username.clone(), identity.clone());
        Ok(identity)
    }

    async fn list(&self) -> Result<Vec<Identity>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut all: Vec<Identity> = inner.by_username.values().cloned().collect();
        all.sort_by_key(|i| i.id);
        Ok(all)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().map_err(poisoned)?.by_username.len())
    }
}
