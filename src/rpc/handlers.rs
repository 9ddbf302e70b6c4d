use super::types::*;
use super::AppState;
use crate::account::Claims;
use crate::card::{NewCard, SlaMetrics};
use crate::error::OrbitError;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{debug, error};

impl IntoResponse for OrbitError {
    fn into_response(self) -> Response {
        let status = match &self {
            OrbitError::Validation(_) => StatusCode::BAD_REQUEST,
            OrbitError::InvalidCredentials | OrbitError::TokenInvalid => StatusCode::UNAUTHORIZED,
            OrbitError::Conflict(_) => StatusCode::CONFLICT,
            OrbitError::NotFound(_) => StatusCode::NOT_FOUND,
            OrbitError::Internal(detail) => {
                error!("Request failed: {}", detail);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorResponse {
            success: false,
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Unwrap a JSON body, turning extractor rejections into validation failures.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, OrbitError> {
    payload.map(|Json(body)| body).map_err(|e| {
        debug!("Rejected request body: {}", e);
        OrbitError::Validation("Request body must be valid JSON".to_string())
    })
}

/// Claims from an optional `Authorization: Bearer` header.
///
/// Absent header means anonymous; a header that does not verify is rejected.
pub struct MaybeClaims(pub Option<Claims>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeClaims {
    type Rejection = OrbitError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(MaybeClaims(None));
        };
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(OrbitError::TokenInvalid)?;
        state.issuer.verify(token.trim()).map(|c| MaybeClaims(Some(c)))
    }
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = if state.cards.ping().await {
        "reachable"
    } else {
        "unreachable"
    };
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: state.version.clone(),
        store: store.to_string(),
    })
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, OrbitError> {
    let req = json_body(payload)?;
    let username = req.username.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let session = state.authenticator.authenticate(&username, &password).await?;
    Ok(Json(LoginResponse {
        success: true,
        token: session.token,
        user: session.identity.view(),
    }))
}

/// GET /api/cards
pub async fn list_cards(State(state): State<AppState>) -> Result<Json<CardsResponse>, OrbitError> {
    let cards = state.cards.list().await?;
    Ok(Json(CardsResponse {
        success: true,
        cards: cards.iter().map(|c| c.view()).collect(),
    }))
}

/// POST /api/cards
pub async fn create_card(
    State(state): State<AppState>,
    MaybeClaims(claims): MaybeClaims,
    payload: Result<Json<NewCard>, JsonRejection>,
) -> Result<(StatusCode, Json<CardResponse>), OrbitError> {
    let mut input = json_body(payload)?;
    if let Some(claims) = claims {
        input.created_by = Some(claims.username);
    }

    let card = state.cards.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CardResponse {
            success: true,
            card: card.view(),
        }),
    ))
}

/// GET /api/cards/:identifier
pub async fn get_card(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<CardResponse>, OrbitError> {
    let card = state.cards.get(&identifier).await?;
    Ok(Json(CardResponse {
        success: true,
        card: card.view(),
    }))
}

/// GET /api/dashboard-stats
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, OrbitError> {
    let data = state.cards.aggregate().await?;
    Ok(Json(StatsResponse { success: true, data }))
}

/// GET /api/sla
pub async fn sla_metrics() -> Json<SlaResponse> {
    Json(SlaResponse {
        success: true,
        metrics: SlaMetrics::current(),
    })
}
