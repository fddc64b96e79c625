// src/clients/chain.rs
use crate::error::QuestResult;
use async_trait::async_trait;

/// Blockchain account client for the wallet a session was built around.
/// Balances come back in native-token units.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn native_balance(&self, network: &str) -> QuestResult<f64>;
}
