// src/config.rs
use crate::error::{QuestError, QuestResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Inclusive seconds window a delay is sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn zero() -> Self {
        Self { min: 0, max: 0 }
    }

    pub fn sample(&self) -> u64 {
        if self.max <= self.min {
            self.min
        } else {
            rand::thread_rng().gen_range(self.min..=self.max)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.min == 0 && self.max == 0
    }
}

/// Immutable run configuration. Built once (defaults or a TOML file) and
/// passed explicitly into every component constructor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Scheduling
    pub threads: usize,
    pub shuffle_wallets: bool,
    /// 1-based inclusive wallet index range; [0, 0] disables it.
    pub range_wallets_to_run: (usize, usize),
    /// Explicit 1-based wallet indices; ignored while the range is active.
    pub exact_wallets_to_run: Vec<usize>,
    /// Pause window between full passes; zero window means a single pass.
    pub pause_between_passes: DelayRange,
    /// Per-wallet randomized delay before the first probe.
    pub startup_delay: DelayRange,

    // Retry & recovery
    pub retry: u32,
    pub retry_delay_secs: u64,
    pub probe_backoff_secs: u64,
    pub auto_replace_proxy: bool,
    pub auto_replace_twitter: bool,
    pub process_banned_accounts: bool,

    // Claim eligibility
    pub primary_network: String,
    pub bridge_networks: Vec<String>,
    pub claim_balance_threshold: f64,
    pub bridge_balance_min: f64,

    // Referral codes
    pub only_settings_invite_codes: bool,
    /// Campaign id -> seed referral codes from the operator.
    pub invite_codes: HashMap<String, Vec<String>>,

    // Quest cooldowns
    pub reward_success_cooldown_secs: u64,
    pub reward_retry_cooldown_secs: u64,
    pub participation_retry_delay: DelayRange,
    pub follow_settle_delay: DelayRange,
    pub tweet_settle_secs: u64,
    pub unlink_settle_secs: u64,
    pub claim_cooldown_secs: u64,
    pub final_claim_cooldown_secs: u64,

    /// Sealed check token; when present the run is gated on the operator
    /// passphrase decrypting it.
    pub check_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threads: 5,
            shuffle_wallets: true,
            range_wallets_to_run: (0, 0),
            exact_wallets_to_run: Vec::new(),
            pause_between_passes: DelayRange::zero(),
            startup_delay: DelayRange::new(5, 30),
            retry: 3,
            retry_delay_secs: 5,
            probe_backoff_secs: 5,
            auto_replace_proxy: true,
            auto_replace_twitter: true,
            process_banned_accounts: false,
            primary_network: "Gravity".to_string(),
            bridge_networks: vec![
                "Arbitrum One".to_string(),
                "Optimism".to_string(),
                "Base".to_string(),
            ],
            claim_balance_threshold: 2.5,
            bridge_balance_min: 0.005,
            only_settings_invite_codes: false,
            invite_codes: HashMap::new(),
            reward_success_cooldown_secs: 60,
            reward_retry_cooldown_secs: 30,
            participation_retry_delay: DelayRange::new(80, 100),
            follow_settle_delay: DelayRange::new(3, 5),
            tweet_settle_secs: 30,
            unlink_settle_secs: 5,
            claim_cooldown_secs: 15,
            final_claim_cooldown_secs: 120,
            check_token: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file; missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> QuestResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| QuestError::InvalidConfiguration(e.to_string()))
    }

    /// Operator-seeded referral codes for a campaign.
    pub fn invite_codes_for(&self, campaign_id: &str) -> &[String] {
        self.invite_codes
            .get(campaign_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
