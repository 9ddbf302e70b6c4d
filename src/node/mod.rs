use std::sync::Arc;
use tracing::info;

use crate::account::{Authenticator, CredentialStore, MemoryCredentialStore, TokenIssuer};
use crate::card::{CardService, CardStore, MemoryCardStore};
use crate::config::OrbitConfig;
use crate::error::OrbitError;
use crate::rpc::{AppState, RpcServer};
use crate::seed;
use crate::storage::Storage;

/// A wired-up service: stores, core services and the config they were built from.
pub struct OrbitNode {
    pub config: OrbitConfig,
    pub credentials: Arc<dyn CredentialStore>,
    pub card_store: Arc<dyn CardStore>,
    pub authenticator: Arc<Authenticator>,
    pub cards: Arc<CardService>,
}

impl OrbitNode {
    pub fn new(
        config: OrbitConfig,
        credentials: Arc<dyn CredentialStore>,
        card_store: Arc<dyn CardStore>,
    ) -> Result<Self, OrbitError> {
        let timeout = config.storage.timeout();
        let issuer = Arc::new(TokenIssuer::new(&config.auth));
        let authenticator = Arc::new(Authenticator::new(credentials.clone(), issuer, timeout)?);
        let cards = Arc::new(CardService::new(card_store.clone(), timeout));

        Ok(Self {
            config,
            credentials,
            card_store,
            authenticator,
            cards,
        })
    }

    /// Node backed by the sled database at `config.storage.db_path`.
    pub fn persistent(config: OrbitConfig) -> Result<Self, OrbitError> {
        info!("Using sled database at {}", config.storage.db_path);
        let storage = Arc::new(Storage::open(&config.storage.db_path)?);
        Self::new(config, storage.clone(), storage)
    }

    /// Node backed by in-memory stores; everything is lost on exit.
    pub fn ephemeral(config: OrbitConfig) -> Result<Self, OrbitError> {
        info!("Using in-memory stores (ephemeral)");
        Self::new(
            config,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryCardStore::new()),
        )
    }

    /// Seed default identities and, if enabled, sample cards.
    pub async fn bootstrap(&self) -> Result<(), OrbitError> {
        seed::seed_identities(self.credentials.as_ref(), self.config.storage.timeout()).await?;
        if self.config.storage.seed_samples {
            seed::seed_sample_cards(self.card_store.as_ref(), &self.cards).await?;
        }
        Ok(())
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            self.authenticator.clone(),
            self.cards.clone(),
            &self.config.server.version,
        )
    }

    pub async fn run(self) -> Result<(), OrbitError> {
        self.bootstrap().await?;
        RpcServer::new(self.state(), self.config.bind_addr()).start().await
    }
}
