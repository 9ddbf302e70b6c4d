use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sled::{Db, Tree};

use crate::account::{CredentialStore, Identity};
use crate::card::{Card, CardStore};
use crate::error::{StoreError, WriteGate};

const IDENTITIES_TREE: &str = "identities";
const CARDS_TREE: &str = "cards";

/// sled-backed persistence: one tree per record set, bincode values.
#[derive(Clone)]
pub struct Storage {
    db: Db,
    identities: Tree,
    cards: Tree,
}

impl Storage {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("cannot create {}: {}", parent.display(), e)))?;
        }
        Self::from_db(sled::open(path)?)
    }

    /// Throwaway database removed on drop.
    pub fn temporary() -> Result<Self, StoreError> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        let identities = db.open_tree(IDENTITIES_TREE)?;
        let cards = db.open_tree(CARDS_TREE)?;
        Ok(Storage {
            db,
            identities,
            cards,
        })
    }

    // Generic Helper: insert only if the key is absent and the caller still waits
    fn insert_new<T: Serialize>(
        tree: &Tree,
        key: &str,
        value: &T,
        gate: &WriteGate,
    ) -> Result<(), StoreError> {
        let serialized = bincode::serialize(value)?;
        if tree.contains_key(key.as_bytes())? {
            return Err(StoreError::Conflict(key.to_string()));
        }
        if !gate.begin_commit() {
            return Err(StoreError::Abandoned);
        }
        match tree.compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(serialized))? {
            Ok(()) => {
                tree.flush()?;
                Ok(())
            }
            Err(_) => Err(StoreError::Conflict(key.to_string())),
        }
    }

    // Generic Helper: Get
    fn get_value<T: DeserializeOwned>(tree: &Tree, key: &str) -> Result<Option<T>, StoreError> {
        match tree.get(key.as_bytes())? {
            Some(data) => Ok(Some(bincode::deserialize(&data)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(tree: &Tree) -> Result<Vec<T>, StoreError> {
        tree.iter()
            .values()
            .map(|value| Ok(bincode::deserialize(&value?)?))
            .collect()
    }

    fn next_id(&self) -> Result<u64, StoreError> {
        Ok(self.db.generate_id()? + 1)
    }
}

async fn blocking<T, F>(op: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| StoreError::Backend(format!("storage task failed: {}", e)))?
}

#[async_trait]
impl CredentialStore for Storage {
    async fn get(&self, username: &str) -> Result<Option<Identity>, StoreError> {
        let tree = self.identities.clone();
        let key = username.to_string();
        blocking(move || Storage::get_value(&tree, &key)).await
    }

    async fn put_gated(
        &self,
        mut identity: Identity,
        gate: WriteGate,
    ) -> Result<Identity, StoreError> {
        let this = self.clone();
        blocking(move || {
            identity.id = this.next_id()?;
            Storage::insert_new(&this.identities, &identity.username, &identity, &gate)?;
            Ok(identity)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Identity>, StoreError> {
        let tree = self.identities.clone();
        let mut all: Vec<Identity> = blocking(move || Storage::scan(&tree)).await?;
        all.sort_by_key(|i| i.id);
        Ok(all)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.identities.len())
    }
}

#[async_trait]
impl CardStore for Storage {
    async fn get(&self, identifier: &str) -> Result<Option<Card>, StoreError> {
        let tree = self.cards.clone();
        let key = identifier.to_string();
        blocking(move || Storage::get_value(&tree, &key)).await
    }

    async fn put_gated(&self, mut card: Card, gate: WriteGate) -> Result<Card, StoreError> {
        let this = self.clone();
        blocking(move || {
            card.id = this.next_id()?;
            Storage::insert_new(&this.cards, &card.identifier, &card, &gate)?;
            Ok(card)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Card>, StoreError> {
        let tree = self.cards.clone();
        blocking(move || Storage::scan(&tree)).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.cards.len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db.size_on_disk()?;
        Ok(())
    }
}
