//! Session token issuance and verification (HS256 JWT)

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use super::types::{Identity, IdentityId, Role};
use crate::config::AuthConfig;
use crate::error::OrbitError;

/// Payload carried inside a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub user_id: IdentityId,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.secret_key.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl(),
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Mint a token for `identity` valid from now until now + ttl.
    pub fn issue(&self, identity: &Identity) -> Result<(String, Claims), OrbitError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), OrbitError> {
        let claims = Claims {
            sub: identity.id.to_string(),
            user_id: identity.id,
            username: identity.username.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("Token encoding failed: {}", e);
                OrbitError::Internal("token encoding failed".to_string())
            })?;

        Ok((token, claims))
    }

    /// Check signature and expiry. Every failure is reported as `TokenInvalid`.
    pub fn verify(&self, token: &str) -> Result<Claims, OrbitError> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("Rejected expired token"),
                    other => tracing::debug!("Rejected invalid token: {:?}", other),
                }
                Err(OrbitError::TokenInvalid)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&AuthConfig {
            secret_key: secret.to_string(),
            token_ttl_hours: 24,
        })
    }

    fn identity() -> Identity {
        let mut identity = Identity::new("admin", "hash".to_string(), Role::Administrator);
        identity.id = 1;
        identity
    }

    #[test]
    fn test_issue_and_verify() {
        let issuer = issuer("test-secret");
        let (token, claims) = issuer.issue(&identity()).unwrap();

        let decoded = issuer.verify(&token).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.username, "admin");
        assert_eq!(decoded.role, Role::Administrator);
        assert_eq!(decoded.sub, "1");
    }

    #[test]
    fn test_expiry_is_exactly_ttl() {
        let issuer = issuer("test-secret");
        let (_, claims) = issuer.issue(&identity()).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let issuer = issuer("test-secret");
        let long_ago = Utc::now() - chrono::Duration::hours(25);
        let (token, _) = issuer.issue_at(&identity(), long_ago).unwrap();
        assert_eq!(issuer.verify(&token), Err(OrbitError::TokenInvalid));
    }

    #[test]
    fn test_foreign_signature_is_invalid() {
        let (token, _) = issuer("other-secret").issue(&identity()).unwrap();
        assert_eq!(
            issuer("test-secret").verify(&token),
            Err(OrbitError::TokenInvalid)
        );
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let trusted = issuer("test-secret");
        let (token, _) = trusted.issue(&identity()).unwrap();

        let (forged, _) = issuer("x")
            .issue(&Identity {
                role: Role::Analyst,
                ..identity()
            })
            .unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged.split('.').nth(1).unwrap();

        assert_eq!(trusted.verify(&parts.join(".")), Err(OrbitError::TokenInvalid));
        assert_eq!(trusted.verify("garbage"), Err(OrbitError::TokenInvalid));
    }
}
