//! Request and response envelopes for the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::IdentityView;
use crate::card::{CardStats, CardView, SlaMetrics};

#[derive(Deserialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: IdentityView,
}

#[derive(Serialize, Debug)]
pub struct CardsResponse {
    pub success: bool,
    pub cards: Vec<CardView>,
}

#[derive(Serialize, Debug)]
pub struct CardResponse {
    pub success: bool,
    pub card: CardView,
}

#[derive(Serialize, Debug)]
pub struct StatsResponse {
    pub success: bool,
    pub data: CardStats,
}

#[derive(Serialize, Debug)]
pub struct SlaResponse {
    pub success: bool,
    pub metrics: SlaMetrics,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub store: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}
