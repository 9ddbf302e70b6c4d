//! Purchase-request cards: creation, listing and dashboard statistics

pub mod service;
pub mod sla;
pub mod store;
pub mod types;

pub use service::{CardService, CardStats};
pub use sla::SlaMetrics;
pub use store::{CardStore, MemoryCardStore};
pub use types::{sort_by_creation, Card, CardStatus, CardView, NewCard};
