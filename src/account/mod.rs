//! Staff identities and session issuance
//!
//! - Argon2id password hashing with per-record salts
//! - HS256 session tokens with a fixed lifetime
//! - Login orchestration that never reveals whether a username exists

pub mod auth;
pub mod authenticator;
pub mod store;
pub mod token;
pub mod types;

pub use authenticator::{AuthSession, Authenticator};
pub use store::{CredentialStore, MemoryCredentialStore};
pub use token::{Claims, TokenIssuer};
pub use types::{Identity, IdentityId, IdentityView, Role};
