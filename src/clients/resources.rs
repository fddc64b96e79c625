// src/clients/resources.rs
use crate::error::QuestResult;
use async_trait::async_trait;

/// Outcome of a proxy replacement request.
#[derive(Debug, Clone)]
pub struct ProxySwap {
    pub ok: bool,
    pub detail: String,
}

/// Resource-recovery service: swaps out dead proxies and twitter
/// credentials, writing the replacement into the wallet store so a fresh
/// read picks it up.
#[async_trait]
pub trait ResourceRecovery: Send + Sync {
    async fn mark_proxy_bad(&self, wallet_id: i64) -> QuestResult<()>;

    async fn replace_proxy(&self, wallet_id: i64) -> QuestResult<ProxySwap>;

    async fn replace_twitter(&self, wallet_id: i64) -> QuestResult<bool>;
}
