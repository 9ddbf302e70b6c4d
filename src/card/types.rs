//! Purchase-request card definitions

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "Standard";
pub const DEFAULT_UNIT: &str = "Maracanau";
pub const DEFAULT_SUPPLIER: &str = "N/A";
pub const DEFAULT_CREATOR: &str = "system";

/// Lifecycle of a purchase request. Declaration order is the reporting order.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum CardStatus {
    #[default]
    Requested,
    UnderReview,
    Approved,
    Received,
    Rejected,
}

impl CardStatus {
    pub const ALL: [CardStatus; 5] = [
        CardStatus::Requested,
        CardStatus::UnderReview,
        CardStatus::Approved,
        CardStatus::Received,
        CardStatus::Rejected,
    ];
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardStatus::Requested => "Requested",
            CardStatus::UnderReview => "UnderReview",
            CardStatus::Approved => "Approved",
            CardStatus::Received => "Received",
            CardStatus::Rejected => "Rejected",
        };
        f.write_str(name)
    }
}

/// Stored card. `id` is a store-assigned sequence used to break timestamp ties.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Card {
    pub id: u64,
    pub identifier: String,
    pub created_by: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub estimate: Decimal,
    pub status: CardStatus,
    pub category: String,
    pub unit: String,
    pub supplier: String,
    pub created_at: DateTime<Utc>,
}

impl Card {
    pub fn view(&self) -> CardView {
        CardView {
            identifier: self.identifier.clone(),
            created_by: self.created_by.clone(),
            estimate: self.estimate,
            status: self.status,
            category: self.category.clone(),
            unit: self.unit.clone(),
            supplier: self.supplier.clone(),
            created_at: self.created_at,
        }
    }
}

/// Listing order: creation time, then store-assigned id.
pub fn sort_by_creation(cards: &mut [Card]) {
    cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

/// Wire shape of a card.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CardView {
    pub identifier: String,
    pub created_by: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimate: Decimal,
    pub status: CardStatus,
    pub category: String,
    pub unit: String,
    pub supplier: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a card.
///
/// `title` is accepted as an alias of `identifier`; `description` and
/// `priority` are tolerated for older clients and ignored.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct NewCard {
    #[serde(default, alias = "title", alias = "ID_RC")]
    pub identifier: Option<String>,
    #[serde(
        default,
        alias = "Valor_Estimado",
        with = "rust_decimal::serde::float_option"
    )]
    pub estimate: Option<Decimal>,
    #[serde(default)]
    pub status: Option<CardStatus>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl NewCard {
    pub fn new(identifier: &str, estimate: Decimal) -> Self {
        Self {
            identifier: Some(identifier.to_string()),
            estimate: Some(estimate),
            ..Self::default()
        }
    }
}
