// src/bootstrap/mod.rs
use crate::clients::{ResourceRecovery, SessionFactory, WalletSession};
use crate::config::Settings;
use crate::error::QuestResult;
use crate::store::WalletStore;
use crate::types::Wallet;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

/// Terminal bootstrap states. `Aborted` ends the wallet's pass without any
/// quest work; the scheduler sees it as a completed no-op while the log
/// carries the wallet-level failure.
pub enum BootstrapOutcome {
    Ready {
        session: WalletSession,
        wallet: Wallet,
    },
    Aborted,
}

/// Turns a wallet row into a working network session, self-healing proxy
/// failures. Probes consume the full retry ceiling before the
/// replace-or-abort decision, whatever the auto-replace flag says.
pub struct Bootstrapper {
    settings: Arc<Settings>,
    store: Arc<dyn WalletStore>,
    resources: Arc<dyn ResourceRecovery>,
    sessions: Arc<dyn SessionFactory>,
}

impl Bootstrapper {
    pub fn new(
        settings: Arc<Settings>,
        store: Arc<dyn WalletStore>,
        resources: Arc<dyn ResourceRecovery>,
        sessions: Arc<dyn SessionFactory>,
    ) -> Self {
        Self {
            settings,
            store,
            resources,
            sessions,
        }
    }

    pub async fn establish(&self, mut wallet: Wallet) -> QuestResult<BootstrapOutcome> {
        self.startup_delay(&wallet).await;

        let mut session = self.sessions.connect(&wallet).await?;
        let mut failures = 0u32;

        loop {
            match session.probe.check().await {
                Ok(()) => {
                    debug!("{wallet} proxy probe ok");
                    return Ok(BootstrapOutcome::Ready { session, wallet });
                }
                Err(e) => {
                    failures += 1;
                    warn!(
                        "{wallet} proxy probe failed ({failures}/{}): {e}",
                        self.settings.retry
                    );

                    if failures < self.settings.retry {
                        sleep(Duration::from_secs(self.settings.probe_backoff_secs)).await;
                        continue;
                    }

                    if !self.settings.auto_replace_proxy {
                        error!("{wallet} proxy issue and auto replace disabled");
                        return Ok(BootstrapOutcome::Aborted);
                    }

                    self.resources.mark_proxy_bad(wallet.id).await?;
                    let swap = self.resources.replace_proxy(wallet.id).await?;
                    if !swap.ok {
                        error!("{wallet} failed to replace proxy: {}", swap.detail);
                        return Ok(BootstrapOutcome::Aborted);
                    }
                    info!("{wallet} proxy automatically replaced: {}", swap.detail);

                    // Pick up the new proxy value before rebuilding the session.
                    if let Some(updated) = self.store.get_by_address(&wallet.address).await? {
                        wallet = updated;
                    }
                    session = self.sessions.connect(&wallet).await?;
                    failures = 0;
                }
            }
        }
    }

    /// Desynchronize wallet starts with a randomized delay sampled from the
    /// configured window.
    async fn startup_delay(&self, wallet: &Wallet) {
        let delay = self.settings.startup_delay.sample();
        if delay == 0 {
            return;
        }
        let resume_at = Utc::now() + chrono::Duration::seconds(delay as i64);
        info!(
            "{wallet} start at {}, sleeping {delay}s before first probe",
            resume_at.format("%Y-%m-%d %H:%M:%S")
        );
        sleep(Duration::from_secs(delay)).await;
    }
}
