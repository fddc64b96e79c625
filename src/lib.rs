// src/lib.rs
pub mod bootstrap;
pub mod clients;
pub mod config;
pub mod error;
pub mod network;
pub mod quest;
pub mod retry;
pub mod scheduler;
pub mod security;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod testkit;

use crate::bootstrap::{BootstrapOutcome, Bootstrapper};
use crate::clients::{ResourceRecovery, SessionFactory};
use crate::config::Settings;
use crate::error::{QuestError, QuestResult};
use crate::quest::QuestEngine;
use crate::scheduler::{select_wallets, Scheduler};
use crate::store::WalletStore;
use crate::types::Wallet;
use std::sync::Arc;
use tracing::{error, info};

/// Install a fmt subscriber honoring `RUST_LOG`, defaulting to info.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Wires the collaborators into the per-wallet workflow (bootstrap, then
/// quests) and hands it to the scheduler. One instance drives the whole run.
pub struct QuestRunner {
    settings: Arc<Settings>,
    store: Arc<dyn WalletStore>,
    resources: Arc<dyn ResourceRecovery>,
    sessions: Arc<dyn SessionFactory>,
    passphrase: Option<String>,
}

impl QuestRunner {
    pub fn new(
        settings: Settings,
        store: Arc<dyn WalletStore>,
        resources: Arc<dyn ResourceRecovery>,
        sessions: Arc<dyn SessionFactory>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            store,
            resources,
            sessions,
            passphrase: None,
        }
    }

    /// Operator passphrase for the startup unlock check.
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Run the configured wallet selection through the scheduler. With a
    /// non-zero pass cooldown this never returns on its own.
    pub async fn run(&self) -> QuestResult<()> {
        if let Some(token) = &self.settings.check_token {
            let passphrase = self.passphrase.as_deref().unwrap_or_default();
            if !security::verify_check_token(passphrase, token) {
                error!("decryption failed, wrong passphrase");
                return Err(QuestError::Startup("wrong passphrase".to_string()));
            }
        }

        let wallets = select_wallets(self.store.get_all().await?, &self.settings);
        info!("found {} wallets for action", wallets.len());
        if wallets.is_empty() {
            return Ok(());
        }

        let scheduler = Scheduler::new(Arc::clone(&self.settings));
        let settings = Arc::clone(&self.settings);
        let store = Arc::clone(&self.store);
        let resources = Arc::clone(&self.resources);
        let sessions = Arc::clone(&self.sessions);
        scheduler
            .execute(wallets, move |wallet| {
                run_wallet(
                    Arc::clone(&settings),
                    Arc::clone(&store),
                    Arc::clone(&resources),
                    Arc::clone(&sessions),
                    wallet,
                )
            })
            .await;
        Ok(())
    }
}

/// One wallet's full pass: bootstrap the session, then run the quest
/// workflow. A bootstrap abort ends the pass quietly; it was already logged
/// as a wallet-level failure.
async fn run_wallet(
    settings: Arc<Settings>,
    store: Arc<dyn WalletStore>,
    resources: Arc<dyn ResourceRecovery>,
    sessions: Arc<dyn SessionFactory>,
    wallet: Wallet,
) -> QuestResult<()> {
    let bootstrapper = Bootstrapper::new(
        Arc::clone(&settings),
        Arc::clone(&store),
        Arc::clone(&resources),
        Arc::clone(&sessions),
    );
    match bootstrapper.establish(wallet).await? {
        BootstrapOutcome::Aborted => Ok(()),
        BootstrapOutcome::Ready { session, wallet } => {
            let mut engine = QuestEngine::new(settings, store, resources, sessions, session, wallet);
            engine.run().await
        }
    }
}
