//! Card storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::types::Card;
use crate::error::{StoreError, WriteGate};

/// Repository of cards keyed by external identifier.
#[async_trait]
pub trait CardStore: Send + Sync {
    async fn get(&self, identifier: &str) -> Result<Option<Card>, StoreError>;

    /// Atomically insert a card, assigning its `id`.
    ///
    /// A duplicate identifier fails with `StoreError::Conflict` and leaves the
    /// store unchanged. The write only becomes visible after `gate` is claimed;
    /// an abandoned gate fails with `StoreError::Abandoned`.
    async fn put_gated(&self, card: Card, gate: WriteGate) -> Result<Card, StoreError>;

    async fn put(&self, card: Card) -> Result<Card, StoreError> {
        self.put_gated(card, WriteGate::new()).await
    }

    /// All cards, in no particular order.
    async fn list(&self) -> Result<Vec<Card>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.list().await?.len())
    }

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCardStore {
    inner: RwLock<MemoryCards>,
}

#[derive(Default)]
struct MemoryCards {
    by_identifier: HashMap<String, Card>,
    last_id: u64,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    tracing::error!("Card store lock poisoned: {}", e);
    StoreError::Backend("card store lock poisoned".to_string())
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn get(&self, identifier: &str) -> Result<Option<Card>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.by_identifier.get(identifier).cloned())
    }

    async fn put_gated(&self, mut card: Card, gate: WriteGate) -> Result<Card, StoreError> {
        // Check and insert under the same write guard
        let mut inner = self.inner.write().map_err(poisoned)?;
        if inner.by_identifier.contains_key(&card.identifier) {
            return Err(StoreError::Conflict(card.identifier));
        }
        if !gate.begin_commit() {
            return Err(StoreError::Abandoned);
        }
        inner.last_id += 1;
        card.id = inner.last_id;
        inner
            .by_identifier
            .insert(card.identifier.clone(), card.clone());
        Ok(card)
    }

    async fn list(&self) -> Result<Vec<Card>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.by_identifier.values().cloned().collect())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.inner.read().map_err(poisoned)?.by_identifier.len())
    }
}
