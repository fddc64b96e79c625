// src/clients/mod.rs
//
// Narrow contracts for the external collaborators the execution core drives.
// Implementations live outside this crate (or in the test kit); the core only
// ever sees these seams.
pub mod chain;
pub mod platform;
pub mod resources;
pub mod twitter;

pub use chain::ChainClient;
pub use platform::{
    CampaignData, ConditionGroup, Cred, LinkResult, QuestPlatform, RawCondition, RewardConfig,
    RewardRule, SessionInfo, TaskConfig,
};
pub use resources::{ProxySwap, ResourceRecovery};
pub use twitter::{Tweet, TwitterAccount, TwitterClient};

use crate::error::QuestResult;
use crate::types::Wallet;
use async_trait::async_trait;
use std::sync::Arc;

/// Lightweight outbound reachability check through a wallet's proxy.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> QuestResult<()>;
}

/// Everything a wallet workflow needs once its network session is up.
/// Rebuilt from scratch whenever the proxy is replaced.
pub struct WalletSession {
    /// Proxy endpoint the session was built with.
    pub proxy: Option<String>,
    pub probe: Box<dyn Probe>,
    pub platform: Arc<dyn QuestPlatform>,
    pub chain: Arc<dyn ChainClient>,
}

/// Builds per-wallet sessions and twitter clients from the current wallet
/// row. The bootstrapper goes back through this seam after a proxy swap, and
/// the link flow after a twitter credential swap.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn connect(&self, wallet: &Wallet) -> QuestResult<WalletSession>;

    fn twitter_client(&self, wallet: &Wallet) -> Box<dyn TwitterClient>;
}
