// src/clients/twitter.rs
use crate::error::QuestResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct TwitterAccount {
    pub id: u64,
    pub username: String,
    pub followers_count: u32,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Tweet {
    pub id: u64,
}

/// Social-media client bound to one wallet's auth token.
#[async_trait]
pub trait TwitterClient: Send + Sync {
    /// Log the session in and return the account metadata.
    async fn initialize(&mut self) -> QuestResult<TwitterAccount>;

    async fn post_tweet(&self, text: &str) -> QuestResult<Tweet>;

    async fn delete_tweet(&self, tweet_id: u64) -> QuestResult<()>;
}
