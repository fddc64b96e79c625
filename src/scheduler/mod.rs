// src/scheduler/mod.rs
use crate::config::Settings;
use crate::error::QuestResult;
use crate::types::Wallet;
use chrono::Utc;
use rand::seq::SliceRandom;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

/// Apply the configured wallet selection: a 1-based inclusive index range
/// takes priority over the explicit-index set; with both disabled the full
/// store contents run.
pub fn select_wallets(all: Vec<Wallet>, settings: &Settings) -> Vec<Wallet> {
    let (start, end) = settings.range_wallets_to_run;
    if (start, end) != (0, 0) {
        all.into_iter()
            .enumerate()
            .filter(|(i, _)| start <= i + 1 && i + 1 <= end)
            .map(|(_, wallet)| wallet)
            .collect()
    } else if !settings.exact_wallets_to_run.is_empty() {
        all.into_iter()
            .enumerate()
            .filter(|(i, _)| settings.exact_wallets_to_run.contains(&(i + 1)))
            .map(|(_, wallet)| wallet)
            .collect()
    } else {
        all
    }
}

/// Runs a per-wallet workflow over the wallet set with bounded admission.
/// One wallet's failure (error or panic) is logged and never touches the
/// other in-flight workflows or the pass itself.
pub struct Scheduler {
    settings: Arc<Settings>,
}

impl Scheduler {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Sweep the wallet set once, or forever with a re-sampled cooldown
    /// between passes when the pause window is non-zero.
    pub async fn execute<F, Fut>(&self, mut wallets: Vec<Wallet>, workflow: F)
    where
        F: Fn(Wallet) -> Fut,
        Fut: Future<Output = QuestResult<()>> + Send + 'static,
    {
        if wallets.is_empty() {
            return;
        }

        loop {
            if self.settings.shuffle_wallets {
                wallets.shuffle(&mut rand::thread_rng());
            }

            self.run_pass(&wallets, &workflow).await;

            if self.settings.pause_between_passes.is_zero() {
                break;
            }
            let pause = self.settings.pause_between_passes.sample();
            let next_run = Utc::now() + chrono::Duration::seconds(pause as i64);
            info!(
                "pass complete; sleeping {pause}s, next run at {}",
                next_run.format("%Y-%m-%d %H:%M:%S")
            );
            sleep(Duration::from_secs(pause)).await;
        }
    }

    async fn run_pass<F, Fut>(&self, wallets: &[Wallet], workflow: &F)
    where
        F: Fn(Wallet) -> Fut,
        Fut: Future<Output = QuestResult<()>> + Send + 'static,
    {
        let limit = wallets.len().min(self.settings.threads.max(1));
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut tasks = JoinSet::new();

        for wallet in wallets.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let label = wallet.to_string();
            let fut = workflow(wallet);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                if let Err(e) = fut.await {
                    error!("{label} failed: {e}");
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("wallet task crashed: {e}");
            }
        }
    }
}
