// src/clients/platform.rs
use crate::error::QuestResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Campaign payload as the platform's GraphQL API returns it: the
/// wallet-specific referral code plus the task configuration holding the
/// three tier groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignData {
    pub referral_code: String,
    pub task_config: TaskConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    pub participate_condition: ConditionGroup,
    pub reward_configs: Vec<RewardConfig>,
    pub referral_config: ConditionGroup,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub conditions: Vec<RawCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCondition {
    pub cred: Cred,
    pub eligible: bool,
    /// Opaque attribute payload forwarded verbatim on generic credential syncs.
    #[serde(default)]
    pub attrs: serde_json::Value,
}

/// Credential ids arrive as decimal strings on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cred {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardConfig {
    pub eligible: bool,
    pub conditions: Vec<RawCondition>,
    pub rewards: Vec<RewardRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardRule {
    pub arithmetic_formula: String,
    pub reward_count: i64,
}

/// Address-level session facts: the platform-assigned account id (used in
/// the verification tweet) and the currently linked twitter user, if any.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub address_id: String,
    pub twitter_user_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct LinkResult {
    pub twitter_user_id: Option<u64>,
}

/// Quest-platform API client.
#[async_trait]
pub trait QuestPlatform: Send + Sync {
    async fn fetch_campaign(&self, campaign_id: &str) -> QuestResult<CampaignData>;

    async fn follow_space(&self, space_id: u64) -> QuestResult<()>;

    /// Ask the platform to re-verify a single credential.
    async fn sync_quest(&self, cred_id: u64) -> QuestResult<bool>;

    /// Twitter-quest variant of the credential sync.
    async fn sync_twitter_quest(&self, cred_id: u64, campaign_id: &str) -> QuestResult<bool>;

    /// Quiz credential sync with the submitted answer key.
    async fn sync_quiz(&self, cred_id: u64, answers: &[&str]) -> QuestResult<bool>;

    /// Generic credential sync carrying the tier's opaque attribute payload.
    async fn sync_credential(&self, cred_id: u64, attrs: &serde_json::Value) -> QuestResult<bool>;

    async fn claim_points(&self, campaign_id: &str, ref_code: Option<&str>) -> QuestResult<bool>;

    /// Current points and rank on the space leaderboard.
    async fn points_and_rank(&self, space_id: u64) -> QuestResult<(i64, i64)>;

    async fn is_account_banned(&self) -> QuestResult<bool>;

    async fn has_active_subscription(&self) -> QuestResult<bool>;

    async fn session_info(&self) -> QuestResult<SessionInfo>;

    async fn connect_twitter(&self, tweet_url: &str) -> QuestResult<LinkResult>;

    async fn disconnect_twitter(&self) -> QuestResult<()>;
}
