//! First-run data: default staff identities and sample purchase requests.

use rust_decimal::Decimal;
use std::time::Duration;

use crate::account::auth::hash_password;
use crate::account::{CredentialStore, Identity, Role};
use crate::card::{CardService, CardStatus, CardStore, NewCard};
use crate::error::{bounded, bounded_write, OrbitError};

pub const DEFAULT_PASSWORD: &str = "password";

const DEFAULT_IDENTITIES: [(&str, Role); 3] = [
    ("admin", Role::Administrator),
    ("manager", Role::Manager),
    ("user", Role::Analyst),
];

// (identifier suffix, creator, estimate, status, category, unit, supplier)
const SAMPLE_CARDS: [(u32, &str, i64, CardStatus, &str, &str, &str); 20] = [
    (1, "admin", 1500, CardStatus::Requested, "Standard", "Maracanau", "Supplier X"),
    (2, "admin", 300, CardStatus::Approved, "Standard", "Fortaleza", "Supplier Y"),
    (3, "manager", 1200, CardStatus::UnderReview, "Contract", "Maracanau", "Supplier Z"),
    (4, "user", 950, CardStatus::Received, "Contract", "Fortaleza", "Supplier W"),
    (5, "manager", 500, CardStatus::Rejected, "Internal", "Maracanau", "Supplier Q"),
    (6, "user", 2000, CardStatus::Requested, "Delegated", "Fortaleza", "Supplier A"),
    (7, "manager", 750, CardStatus::Approved, "Contract", "Maracanau", "Supplier B"),
    (8, "admin", 1800, CardStatus::UnderReview, "Standard", "Fortaleza", "Supplier C"),
    (9, "user", 400, CardStatus::Received, "Internal", "Maracanau", "Supplier D"),
    (10, "manager", 600, CardStatus::Rejected, "Delegated", "Fortaleza", "Supplier E"),
    (11, "admin", 1100, CardStatus::Requested, "Contract", "Maracanau", "Supplier F"),
    (12, "manager", 2500, CardStatus::Approved, "Delegated", "Fortaleza", "Supplier G"),
    (13, "user", 700, CardStatus::UnderReview, "Internal", "Maracanau", "Supplier H"),
    (14, "admin", 180, CardStatus::Received, "Standard", "Fortaleza", "Supplier I"),
    (15, "manager", 3200, CardStatus::Rejected, "Contract", "Maracanau", "Supplier J"),
    (16, "user", 450, CardStatus::Requested, "Internal", "Fortaleza", "Supplier K"),
    (17, "admin", 980, CardStatus::Approved, "Delegated", "Maracanau", "Supplier L"),
    (18, "manager", 2100, CardStatus::UnderReview, "Standard", "Fortaleza", "Supplier M"),
    (19, "user", 350, CardStatus::Received, "Contract", "Maracanau", "Supplier N"),
    (20, "admin", 1600, CardStatus::Rejected, "Delegated", "Fortaleza", "Supplier O"),
];

/// Create the default identities if the credential store is empty.
///
/// Returns how many identities were written.
pub async fn seed_identities(
    store: &dyn CredentialStore,
    timeout: Duration,
) -> Result<usize, OrbitError> {
    if bounded(timeout, "identity count", store.count()).await? > 0 {
        return Ok(0);
    }

    let mut created = 0;
    for (username, role) in DEFAULT_IDENTITIES {
        let hash =
            hash_password(DEFAULT_PASSWORD).map_err(|e| OrbitError::Internal(e.to_string()))?;
        let identity = Identity::new(username, hash, role);
        let inserted = bounded_write(timeout, "identity insert", |gate| {
            store.put_gated(identity, gate)
        })
        .await;
        match inserted {
            Ok(_) => created += 1,
            Err(OrbitError::Conflict(_)) => {
                tracing::debug!("Identity {} already present, skipping", username)
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!("Seeded {} default identities", created);
    Ok(created)
}

/// Create the sample cards if the card store is empty.
pub async fn seed_sample_cards(
    store: &dyn CardStore,
    service: &CardService,
) -> Result<usize, OrbitError> {
    if bounded(service.store_timeout(), "card count", store.count()).await? > 0 {
        return Ok(0);
    }

    let mut created = 0;
    for (n, creator, estimate, status, category, unit, supplier) in SAMPLE_CARDS {
        let input = NewCard {
            identifier: Some(format!("RC-2025-{:03}", n)),
            estimate: Some(Decimal::from(estimate)),
            status: Some(status),
            category: Some(category.to_string()),
            unit: Some(unit.to_string()),
            supplier: Some(supplier.to_string()),
            created_by: Some(creator.to_string()),
            ..NewCard::default()
        };
        match service.create(input).await {
            Ok(_) => created += 1,
            Err(OrbitError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
    }

    tracing::info!("Seeded {} sample cards", created);
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::MemoryCredentialStore;
    use crate::card::MemoryCardStore;
    use crate::error::StoreError;
    use async_trait::async_trait;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seed_identities_once() {
        let store = MemoryCredentialStore::new();
        let timeout = Duration::from_secs(5);
        assert_eq!(seed_identities(&store, timeout).await.unwrap(), 3);
        assert_eq!(seed_identities(&store, timeout).await.unwrap(), 0);

        let admin = store.get("admin").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Administrator);
        assert_ne!(admin.password_hash, DEFAULT_PASSWORD);
        assert_eq!(store.get("user").await.unwrap().unwrap().role, Role::Analyst);
    }

    /// Never answers `count`.
    struct HangingCredentialStore;

    #[async_trait]
    impl CredentialStore for HangingCredentialStore {
        async fn get(&self, _username: &str) -> Result<Option<Identity>, StoreError> {
            Ok(None)
        }

        async fn put_gated(
            &self,
            identity: Identity,
            _gate: crate::error::WriteGate,
        ) -> Result<Identity, StoreError> {
            Ok(identity)
        }

        async fn list(&self) -> Result<Vec<Identity>, StoreError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_seed_identities_times_out_on_stuck_store() {
        let err = seed_identities(&HangingCredentialStore, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, OrbitError::Internal(_)));
    }

    #[tokio::test]
    async fn test_seed_sample_cards_cover_every_status() {
        let store = Arc::new(MemoryCardStore::new());
        let service = CardService::new(store.clone(), Duration::from_secs(5));

        assert_eq!(seed_sample_cards(store.as_ref(), &service).await.unwrap(), 20);
        assert_eq!(seed_sample_cards(store.as_ref(), &service).await.unwrap(), 0);

        let stats = service.aggregate().await.unwrap();
        assert_eq!(stats.total_count, 20);
        assert_eq!(stats.total_value, Decimal::from(23_160));
        assert!(stats.status_distribution.values().all(|n| *n == 4));
    }
}
