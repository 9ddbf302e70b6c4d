use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Failure kinds surfaced at the operation boundary.
///
/// `InvalidCredentials` and `TokenInvalid` carry no detail on purpose: an
/// unknown user, a wrong password, an expired token and a forged token must
/// all look the same to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired token")]
    TokenInvalid,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrbitError {
    /// Text that is safe to hand back to a client.
    pub fn public_message(&self) -> String {
        match self {
            OrbitError::Validation(msg) => msg.clone(),
            OrbitError::InvalidCredentials => "Invalid credentials".to_string(),
            OrbitError::TokenInvalid => "Invalid or expired token".to_string(),
            OrbitError::Conflict(msg) => msg.clone(),
            OrbitError::NotFound(msg) => msg.clone(),
            OrbitError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

/// Errors raised by repository implementations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Key already exists: {0}")]
    Conflict(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Write abandoned after its deadline")]
    Abandoned,
}

impl From<StoreError> for OrbitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(key) => OrbitError::Conflict(format!("'{}' already exists", key)),
            StoreError::Backend(msg) => OrbitError::Internal(msg),
            StoreError::Abandoned => OrbitError::Internal("write abandoned after its deadline".to_string()),
        }
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(err: bincode::Error) -> Self {
        StoreError::Backend(format!("Serialization error: {}", err))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error parsing config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Run a store call with an upper bound on how long it may take.
///
/// Elapsed timeouts and store failures both come back as `Internal`, with the
/// detail logged here rather than returned.
pub async fn bounded<T, F>(limit: Duration, op: &str, fut: F) -> Result<T, OrbitError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => settle(op, result),
        Err(_) => Err(timed_out(op, limit)),
    }
}

const PENDING: u8 = 0;
const COMMITTING: u8 = 1;
const ABANDONED: u8 = 2;

/// Decides, exactly once, whether a write commits or is given up.
///
/// A store claims the gate right before it makes a write visible. Once the
/// caller has abandoned the gate no store may claim it, and once a store has
/// claimed it the caller waits for the outcome instead of reporting a timeout.
#[derive(Clone, Debug, Default)]
pub struct WriteGate(Arc<AtomicU8>);

impl WriteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to commit. False if the caller already gave up.
    pub fn begin_commit(&self) -> bool {
        self.0
            .compare_exchange(PENDING, COMMITTING, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn abandon(&self) -> bool {
        self.0
            .compare_exchange(PENDING, ABANDONED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Bounded variant for writes: a timeout is only reported when nothing can
/// commit anymore.
///
/// If the deadline passes after the store has claimed the gate, the write is
/// awaited to completion and its real outcome is returned.
pub async fn bounded_write<T, F, Fut>(limit: Duration, op: &str, write: F) -> Result<T, OrbitError>
where
    F: FnOnce(WriteGate) -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let gate = WriteGate::new();
    let fut = write(gate.clone());
    tokio::pin!(fut);

    match tokio::time::timeout(limit, &mut fut).await {
        Ok(result) => settle(op, result),
        Err(_) if gate.abandon() => Err(timed_out(op, limit)),
        Err(_) => {
            tracing::warn!("{} passed its deadline while committing, waiting for it", op);
            settle(op, fut.await)
        }
    }
}

fn settle<T>(op: &str, result: Result<T, StoreError>) -> Result<T, OrbitError> {
    match result {
        Ok(value) => Ok(value),
        Err(StoreError::Backend(msg)) => {
            tracing::error!("{} failed: {}", op, msg);
            Err(OrbitError::Internal(msg))
        }
        Err(err) => Err(err.into()),
    }
}

fn timed_out(op: &str, limit: Duration) -> OrbitError {
    tracing::error!("{} timed out after {:?}", op, limit);
    OrbitError::Internal(format!("{} timed out", op))
}
