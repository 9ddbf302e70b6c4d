//! Card lifecycle and dashboard aggregation

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::store::CardStore;
use super::types::{
    sort_by_creation, Card, CardStatus, NewCard, DEFAULT_CATEGORY, DEFAULT_CREATOR,
    DEFAULT_SUPPLIER, DEFAULT_UNIT,
};
use crate::error::{bounded, bounded_write, OrbitError};

/// Dashboard summary over every stored card.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CardStats {
    pub total_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_value: Decimal,
    /// Always holds all five statuses, zero-filled.
    pub status_distribution: BTreeMap<CardStatus, u64>,
}

impl CardStats {
    /// Fails with `Internal` when the estimates add up past what a `Decimal`
    /// can hold.
    pub fn from_cards(cards: &[Card]) -> Result<Self, OrbitError> {
        let mut status_distribution: BTreeMap<CardStatus, u64> =
            CardStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut total_value = Decimal::ZERO;

        for card in cards {
            total_value = total_value.checked_add(card.estimate).ok_or_else(|| {
                tracing::error!("Estimate total overflowed at card {}", card.identifier);
                OrbitError::Internal("estimate total overflowed".to_string())
            })?;
            *status_distribution.entry(card.status).or_insert(0) += 1;
        }

        Ok(Self {
            total_count: cards.len() as u64,
            total_value,
            status_distribution,
        })
    }
}

pub struct CardService {
    store: Arc<dyn CardStore>,
    store_timeout: Duration,
}

impl CardService {
    pub fn new(store: Arc<dyn CardStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Validate, apply defaults and persist a new card.
    pub async fn create(&self, input: NewCard) -> Result<Card, OrbitError> {
        let identifier = input
            .identifier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| OrbitError::Validation("Identifier is required".to_string()))?
            .to_string();

        let estimate = input.estimate.unwrap_or(Decimal::ZERO);
        if estimate < Decimal::ZERO {
            return Err(OrbitError::Validation(
                "Estimate must not be negative".to_string(),
            ));
        }

        let card = Card {
            id: 0,
            identifier,
            created_by: non_empty_or(input.created_by, DEFAULT_CREATOR),
            estimate,
            status: input.status.unwrap_or_default(),
            category: non_empty_or(input.category, DEFAULT_CATEGORY),
            unit: non_empty_or(input.unit, DEFAULT_UNIT),
            supplier: non_empty_or(input.supplier, DEFAULT_SUPPLIER),
            created_at: Utc::now(),
        };

        let card = bounded_write(self.store_timeout, "card insert", |gate| {
            self.store.put_gated(card, gate)
        })
        .await?;
        tracing::info!(
            "Card {} created by {} ({} / {})",
            card.identifier,
            card.created_by,
            card.status,
            card.estimate
        );
        Ok(card)
    }

    /// Every card ordered by creation time, oldest first.
    pub async fn list(&self) -> Result<Vec<Card>, OrbitError> {
        let mut cards = bounded(self.store_timeout, "card list", self.store.list()).await?;
        sort_by_creation(&mut cards);
        Ok(cards)
    }

    pub async fn get(&self, identifier: &str) -> Result<Card, OrbitError> {
        bounded(self.store_timeout, "card lookup", self.store.get(identifier))
            .await?
            .ok_or_else(|| OrbitError::NotFound(format!("Card '{}' not found", identifier)))
    }

    pub async fn aggregate(&self) -> Result<CardStats, OrbitError> {
        let cards = bounded(self.store_timeout, "card aggregate", self.store.list()).await?;
        CardStats::from_cards(&cards)
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    pub async fn ping(&self) -> bool {
        bounded(self.store_timeout, "card store ping", self.store.ping())
            .await
            .is_ok()
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
