// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Health of a per-wallet resource (proxy, twitter token). The two status
/// fields on a wallet are independent and drive separate recovery branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HealthStatus {
    #[default]
    Ok,
    Bad,
}

/// One wallet identity under automation. Created by the import step outside
/// this crate; mutated in place through the store as campaign progress and
/// resource-health facts become known; never deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub private_key: String,
    pub address: String,
    pub proxy: Option<String>,
    pub proxy_status: HealthStatus,
    pub twitter_token: Option<String>,
    pub twitter_status: HealthStatus,
    pub twitter_followers: u32,
    pub twitter_created_at: Option<DateTime<Utc>>,
    pub points: Option<i64>,
    pub rank: Option<i64>,
    /// Campaign id -> referral code issued to this wallet, one slot per campaign.
    pub invite_codes: HashMap<String, String>,
    pub pioneer_completed: bool,
    pub completed: bool,
}

impl Wallet {
    pub fn new(id: i64, private_key: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            private_key: private_key.into(),
            address: address.into(),
            proxy: None,
            proxy_status: HealthStatus::Ok,
            twitter_token: None,
            twitter_status: HealthStatus::Ok,
            twitter_followers: 0,
            twitter_created_at: None,
            points: None,
            rank: None,
            invite_codes: HashMap::new(),
            pioneer_completed: false,
            completed: false,
        }
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_twitter_token(mut self, token: impl Into<String>) -> Self {
        self.twitter_token = Some(token.into());
        self
    }

    /// Referral code this wallet recorded for a campaign, if any.
    pub fn invite_code(&self, campaign_id: &str) -> Option<&str> {
        self.invite_codes.get(campaign_id).map(String::as_str)
    }
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} | {}]", self.id, self.address)
    }
}
