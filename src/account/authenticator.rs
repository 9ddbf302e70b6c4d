//! Login orchestration: credential lookup, password check, token issuance.

use std::sync::Arc;
use std::time::Duration;

use super::auth::{hash_password, verify_password, AuthError};
use super::store::CredentialStore;
use super::token::{Claims, TokenIssuer};
use super::types::Identity;
use crate::error::{bounded, OrbitError};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub identity: Identity,
    pub token: String,
    pub claims: Claims,
}

pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    issuer: Arc<TokenIssuer>,
    store_timeout: Duration,
    // Verified against when the username is unknown so both paths pay for one argon2 run.
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        issuer: Arc<TokenIssuer>,
        store_timeout: Duration,
    ) -> Result<Self, OrbitError> {
        let dummy_hash = hash_password("orbit-dummy-password")
            .map_err(|e| OrbitError::Internal(e.to_string()))?;
        Ok(Self {
            store,
            issuer,
            store_timeout,
            dummy_hash,
        })
    }

    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, OrbitError> {
        if username.is_empty() || password.is_empty() {
            return Err(OrbitError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        tracing::info!("Login attempt for user: {}", username);

        let found = bounded(
            self.store_timeout,
            "credential lookup",
            self.store.get(username),
        )
        .await?;

        let identity = match found {
            Some(identity) => match verify_password(password, &identity.password_hash) {
                Ok(()) => identity,
                Err(AuthError::InvalidPassword) => return Err(self.reject(username)),
                Err(e) => {
                    tracing::error!("Stored hash for {} unusable: {}", username, e);
                    return Err(self.reject(username));
                }
            },
            None => {
                let _ = verify_password(password, &self.dummy_hash);
                return Err(self.reject(username));
            }
        };

        let (token, claims) = self.issuer.issue(&identity)?;
        tracing::info!("Login succeeded for user: {}", username);

        Ok(AuthSession {
            identity,
            token,
            claims,
        })
    }

    fn reject(&self, username: &str) -> OrbitError {
        tracing::warn!("Login failed for user: {}", username);
        OrbitError::InvalidCredentials
    }
}
