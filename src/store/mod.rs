// src/store/mod.rs
use crate::config::Settings;
use crate::error::QuestResult;
use crate::types::{HealthStatus, Wallet};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Wallet record store. Single-row updates are atomic at the store layer and
/// reads observe the calling process's own writes.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn get_all(&self) -> QuestResult<Vec<Wallet>>;

    async fn get_by_address(&self, address: &str) -> QuestResult<Option<Wallet>>;

    async fn update_points(&self, address: &str, points: i64) -> QuestResult<bool>;

    async fn update_rank(&self, address: &str, rank: i64) -> QuestResult<bool>;

    async fn update_twitter_followers(&self, address: &str, followers: u32) -> QuestResult<bool>;

    async fn update_twitter_created_at(
        &self,
        address: &str,
        created_at: DateTime<Utc>,
    ) -> QuestResult<bool>;

    async fn mark_pioneer_complete(&self, address: &str) -> QuestResult<bool>;

    /// Record the platform-issued referral code for one campaign slot.
    async fn set_invite_code(
        &self,
        wallet_id: i64,
        campaign_id: &str,
        code: &str,
    ) -> QuestResult<bool>;

    /// Referral codes other wallets recorded for a campaign.
    async fn invite_codes_except(
        &self,
        campaign_id: &str,
        wallet_id: i64,
    ) -> QuestResult<Vec<String>>;
}

/// Pick a referral code to present at claim time: the operator-seeded codes,
/// widened with other wallets' recorded codes unless own-settings-only mode
/// is set. Never returns the calling wallet's own code.
pub async fn random_invite_code(
    store: &dyn WalletStore,
    settings: &Settings,
    wallet_id: i64,
    campaign_id: &str,
) -> QuestResult<Option<String>> {
    let mut codes: Vec<String> = settings.invite_codes_for(campaign_id).to_vec();
    if !settings.only_settings_invite_codes {
        codes.extend(store.invite_codes_except(campaign_id, wallet_id).await?);
    }
    Ok(codes.choose(&mut rand::thread_rng()).cloned())
}

/// In-memory reference store, keyed by wallet id (iteration stays in id
/// order, which the 1-based index selection relies on).
#[derive(Default)]
pub struct MemoryStore {
    wallets: RwLock<BTreeMap<i64, Wallet>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, wallet: Wallet) {
        self.wallets.write().await.insert(wallet.id, wallet);
    }

    pub async fn wallet_count(&self) -> usize {
        self.wallets.read().await.len()
    }

    /// Install a replacement proxy and reset its health flag.
    pub async fn set_proxy(&self, wallet_id: i64, proxy: &str) -> bool {
        let mut wallets = self.wallets.write().await;
        match wallets.get_mut(&wallet_id) {
            Some(wallet) => {
                wallet.proxy = Some(proxy.to_string());
                wallet.proxy_status = HealthStatus::Ok;
                true
            }
            None => false,
        }
    }

    pub async fn set_proxy_status(&self, wallet_id: i64, status: HealthStatus) -> bool {
        let mut wallets = self.wallets.write().await;
        match wallets.get_mut(&wallet_id) {
            Some(wallet) => {
                wallet.proxy_status = status;
                true
            }
            None => false,
        }
    }

    /// Install a replacement twitter token and reset its health flag.
    pub async fn set_twitter_token(&self, wallet_id: i64, token: &str) -> bool {
        let mut wallets = self.wallets.write().await;
        match wallets.get_mut(&wallet_id) {
            Some(wallet) => {
                wallet.twitter_token = Some(token.to_string());
                wallet.twitter_status = HealthStatus::Ok;
                true
            }
            None => false,
        }
    }

    async fn update_by_address<F>(&self, address: &str, apply: F) -> QuestResult<bool>
    where
        F: FnOnce(&mut Wallet),
    {
        let mut wallets = self.wallets.write().await;
        match wallets.values_mut().find(|w| w.address == address) {
            Some(wallet) => {
                apply(wallet);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl WalletStore for MemoryStore {
    async fn get_all(&self) -> QuestResult<Vec<Wallet>> {
        Ok(self.wallets.read().await.values().cloned().collect())
    }

    async fn get_by_address(&self, address: &str) -> QuestResult<Option<Wallet>> {
        Ok(self
            .wallets
            .read()
            .await
            .values()
            .find(|w| w.address == address)
            .cloned())
    }

    async fn update_points(&self, address: &str, points: i64) -> QuestResult<bool> {
        self.update_by_address(address, |w| w.points = Some(points))
            .await
    }

    async fn update_rank(&self, address: &str, rank: i64) -> QuestResult<bool> {
        self.update_by_address(address, |w| w.rank = Some(rank)).await
    }

    async fn update_twitter_followers(&self, address: &str, followers: u32) -> QuestResult<bool> {
        self.update_by_address(address, |w| w.twitter_followers = followers)
            .await
    }

    async fn update_twitter_created_at(
        &self,
        address: &str,
        created_at: DateTime<Utc>,
    ) -> QuestResult<bool> {
        self.update_by_address(address, |w| w.twitter_created_at = Some(created_at))
            .await
    }

    async fn mark_pioneer_complete(&self, address: &str) -> QuestResult<bool> {
        self.update_by_address(address, |w| w.pioneer_completed = true)
            .await
    }

    async fn set_invite_code(
        &self,
        wallet_id: i64,
        campaign_id: &str,
        code: &str,
    ) -> QuestResult<bool> {
        let mut wallets = self.wallets.write().await;
        match wallets.get_mut(&wallet_id) {
            Some(wallet) => {
                wallet
                    .invite_codes
                    .insert(campaign_id.to_string(), code.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn invite_codes_except(
        &self,
        campaign_id: &str,
        wallet_id: i64,
    ) -> QuestResult<Vec<String>> {
        Ok(self
            .wallets
            .read()
            .await
            .values()
            .filter(|w| w.id != wallet_id)
            .filter_map(|w| w.invite_code(campaign_id))
            .map(str::to_string)
            .collect())
    }
}
