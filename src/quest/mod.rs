// src/quest/mod.rs
pub mod link;
pub mod tiers;

use crate::clients::{
    ChainClient, QuestPlatform, ResourceRecovery, SessionFactory, TwitterClient, WalletSession,
};
use crate::config::Settings;
use crate::error::QuestResult;
use crate::retry::RetryPolicy;
use crate::store::{random_invite_code, WalletStore};
use crate::types::Wallet;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tiers::{RewardTier, Tier, TierAction, TierSet};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

/// Campaigns are processed strictly in this order; the last one is the
/// pioneer campaign whose claim completes the wallet.
pub const CAMPAIGN_SEQUENCE: [&str; 3] = ["GCpict6X7N", "GC5mTt8px6", "GCoUVt8dHz"];

/// Project space on the platform (follow target and leaderboard).
pub const SPACE_ID: u64 = 81173;

/// Below this point tally the wallet still needs its twitter link verified.
const POINTS_LINK_GATE: i64 = 65;

const QUIZ_ANSWERS: [&str; 4] = ["1", "0", "2", "3"];

const TWEET_WORDS: &[&str] = &[
    "fortified", "bullish", "onchain", "gravity", "stones", "builders", "momentum", "signal",
    "vault", "rising", "early", "conviction", "stacking", "secured", "foundation",
];

/// Filler tweet body plus the required mention and hashtag.
pub(crate) fn compose_tweet_text() -> String {
    let mut rng = rand::thread_rng();
    let target = rng.gen_range(20..=40);
    let mut text = String::new();
    while text.len() < target {
        if !text.is_empty() {
            text.push(' ');
        }
        if let Some(word) = TWEET_WORDS.choose(&mut rng) {
            text.push_str(word);
        }
    }
    text.push_str(" @ForteProtocol #ProofOfFortification");
    text
}

/// Drives one wallet through every configured campaign, tier by tier,
/// claiming whatever reward it can. Owns its session exclusively; the only
/// state shared with other wallets is the store.
pub struct QuestEngine {
    settings: Arc<Settings>,
    store: Arc<dyn WalletStore>,
    resources: Arc<dyn ResourceRecovery>,
    sessions: Arc<dyn SessionFactory>,
    platform: Arc<dyn QuestPlatform>,
    chain: Arc<dyn ChainClient>,
    twitter: Box<dyn TwitterClient>,
    retry: RetryPolicy,
    wallet: Wallet,
}

impl QuestEngine {
    pub fn new(
        settings: Arc<Settings>,
        store: Arc<dyn WalletStore>,
        resources: Arc<dyn ResourceRecovery>,
        sessions: Arc<dyn SessionFactory>,
        session: WalletSession,
        wallet: Wallet,
    ) -> Self {
        let twitter = sessions.twitter_client(&wallet);
        let retry = RetryPolicy::from_settings(&settings);
        Self {
            settings,
            store,
            resources,
            sessions,
            platform: session.platform,
            chain: session.chain,
            twitter,
            retry,
            wallet,
        }
    }

    /// Run the full quest workflow for this wallet: banned gate, twitter
    /// link gate, the campaign sequence, then the progress refresh.
    pub async fn run(&mut self) -> QuestResult<()> {
        if !self.settings.process_banned_accounts && self.platform.is_account_banned().await? {
            warn!("{} account is banned on the platform, skipping", self.wallet);
            return Ok(());
        }

        if self.wallet.points.unwrap_or(0) < POINTS_LINK_GATE
            && !self.ensure_twitter_link().await?
        {
            return Ok(());
        }

        if let Err(e) = self.complete_campaigns().await {
            error!("{} campaign processing failed: {e}", self.wallet);
        }

        self.refresh_progress().await
    }

    async fn complete_campaigns(&self) -> QuestResult<()> {
        for campaign_id in CAMPAIGN_SEQUENCE {
            let data = self
                .retry
                .run(|| self.platform.fetch_campaign(campaign_id))
                .await?;
            self.save_ref_code(campaign_id, &data.referral_code).await?;

            let tiers = TierSet::parse(&data.task_config)?;
            let reward_claimed = tiers.reward_claimed()?;
            debug!(
                "{} rewards claimed for campaign ({campaign_id}): {reward_claimed}",
                self.wallet
            );

            self.process_rewards(campaign_id, &tiers.rewards).await;
            self.ensure_participation(&tiers.participate).await;
            self.referral_sync(&tiers.referral).await;

            self.retry
                .run(|| self.try_claim(campaign_id, reward_claimed))
                .await?;
        }
        Ok(())
    }

    /// Record the platform-issued referral code the first time it is seen.
    async fn save_ref_code(&self, campaign_id: &str, ref_code: &str) -> QuestResult<()> {
        if self.wallet.invite_code(campaign_id).is_some() {
            return Ok(());
        }
        self.store
            .set_invite_code(self.wallet.id, campaign_id, ref_code)
            .await?;
        Ok(())
    }

    /// Work every not-yet-eligible reward tier, up to the retry ceiling
    /// each. Exhausting a tier leaves it unclaimed and moves on.
    async fn process_rewards(&self, campaign_id: &str, rewards: &[RewardTier]) {
        for tier in rewards {
            if tier.eligible {
                continue;
            }
            if tier.action == TierAction::Unknown {
                debug!("{} quest not recognized: {}", self.wallet, tier.name);
                continue;
            }

            for attempt in 0..self.settings.retry {
                let synced = match self.retry.run(|| self.handle_tier(campaign_id, tier)).await {
                    Ok(synced) => synced,
                    Err(e) => {
                        warn!("{} tier handler failed for {}: {e}", self.wallet, tier.name);
                        false
                    }
                };

                if synced {
                    info!(
                        "{} success sync quest for {}; cooling down {}s",
                        self.wallet, tier.name, self.settings.reward_success_cooldown_secs
                    );
                    sleep(Duration::from_secs(self.settings.reward_success_cooldown_secs)).await;
                    break;
                }
                warn!(
                    "{} can't sync quest for {}, attempt {}",
                    self.wallet,
                    tier.name,
                    attempt + 1
                );
                sleep(Duration::from_secs(self.settings.reward_retry_cooldown_secs)).await;
            }
        }
    }

    async fn handle_tier(&self, campaign_id: &str, tier: &RewardTier) -> QuestResult<bool> {
        match tier.action {
            TierAction::FollowSpace => {
                self.platform.follow_space(SPACE_ID).await?;
                sleep(Duration::from_secs(self.settings.follow_settle_delay.sample())).await;
                self.platform.sync_quest(tier.cred_id).await
            }
            TierAction::TweetAndSync => self.tweet_and_sync(tier).await,
            TierAction::TwitterSync => {
                self.platform
                    .sync_twitter_quest(tier.cred_id, campaign_id)
                    .await
            }
            TierAction::Quiz => self.platform.sync_quiz(tier.cred_id, &QUIZ_ANSWERS).await,
            TierAction::Unknown => Ok(false),
        }
    }

    /// Post the templated tweet, sync the credential, then clean the tweet
    /// up. A failed post fails the tier without consuming a sync attempt.
    async fn tweet_and_sync(&self, tier: &RewardTier) -> QuestResult<bool> {
        let text = compose_tweet_text();
        let tweet = match self.twitter.post_tweet(&text).await {
            Ok(tweet) => tweet,
            Err(e) => {
                error!("{} can't tweet for quest: {e}", self.wallet);
                return Ok(false);
            }
        };

        info!(
            "{} sleeping {}s after tweet post",
            self.wallet, self.settings.tweet_settle_secs
        );
        sleep(Duration::from_secs(self.settings.tweet_settle_secs)).await;

        for attempt in 0..self.settings.retry {
            match self.platform.sync_quest(tier.cred_id).await {
                Ok(true) => {
                    // cleanup is best-effort
                    if let Err(e) = self.twitter.delete_tweet(tweet.id).await {
                        warn!("{} can't delete quest tweet: {e}", self.wallet);
                    }
                    return Ok(true);
                }
                Ok(false) => {
                    warn!("{} tweet sync failed, retry {}", self.wallet, attempt + 1)
                }
                Err(e) => {
                    warn!("{} tweet sync failed, retry {}: {e}", self.wallet, attempt + 1)
                }
            }
            sleep(Duration::from_secs(self.settings.tweet_settle_secs)).await;
        }
        Ok(false)
    }

    /// Gate credential deciding whether the wallet qualifies for the
    /// campaign at all. Exhaustion is logged only; the campaign moves on.
    async fn ensure_participation(&self, participate: &[Tier]) {
        let Some(tier) = participate.first() else {
            return;
        };
        if tier.eligible {
            return;
        }

        for attempt in 0..self.settings.retry {
            match self.platform.sync_credential(tier.cred_id, &tier.attrs).await {
                Ok(true) => {
                    info!(
                        "{} success sync requirements criteria; cooling down {}s",
                        self.wallet, self.settings.reward_success_cooldown_secs
                    );
                    sleep(Duration::from_secs(self.settings.reward_success_cooldown_secs)).await;
                    return;
                }
                Ok(false) => {}
                Err(e) => warn!("{} participation sync error: {e}", self.wallet),
            }
            let wait = self.settings.participation_retry_delay.sample();
            info!(
                "{} participation sync delayed, auto retry in {wait}s ({}/{}), no action needed",
                self.wallet,
                attempt + 1,
                self.settings.retry
            );
            sleep(Duration::from_secs(wait)).await;
        }
    }

    /// One-shot referral credential sync, issued regardless of eligibility.
    async fn referral_sync(&self, referral: &[Tier]) {
        let Some(tier) = referral.first() else {
            return;
        };
        match self.platform.sync_credential(tier.cred_id, &tier.attrs).await {
            Ok(true) => {
                info!(
                    "{} success sync referral quest; cooling down {}s",
                    self.wallet, self.settings.reward_success_cooldown_secs
                );
                sleep(Duration::from_secs(self.settings.reward_success_cooldown_secs)).await;
            }
            Ok(false) => debug!("{} can't sync referral quest", self.wallet),
            Err(e) => debug!("{} can't sync referral quest: {e}", self.wallet),
        }
    }

    async fn try_claim(&self, campaign_id: &str, reward_claimed: i64) -> QuestResult<()> {
        let eligible =
            self.platform.has_active_subscription().await? || self.claim_balance_ok().await?;
        if !eligible {
            return Ok(());
        }

        let ref_code = if reward_claimed == 0 {
            random_invite_code(
                self.store.as_ref(),
                &self.settings,
                self.wallet.id,
                campaign_id,
            )
            .await?
        } else {
            None
        };
        debug!(
            "{} chose ref code {ref_code:?} to complete quest {campaign_id}",
            self.wallet
        );

        if self
            .platform
            .claim_points(campaign_id, ref_code.as_deref())
            .await?
        {
            if CAMPAIGN_SEQUENCE.last() == Some(&campaign_id) {
                info!(
                    "{} success complete the pioneer campaign; cooling down {}s",
                    self.wallet, self.settings.final_claim_cooldown_secs
                );
                self.store.mark_pioneer_complete(&self.wallet.address).await?;
                sleep(Duration::from_secs(self.settings.final_claim_cooldown_secs)).await;
            }
            sleep(Duration::from_secs(self.settings.claim_cooldown_secs)).await;
        }
        Ok(())
    }

    /// Claim eligibility by balance: the primary network clears the high
    /// threshold outright, otherwise any bridge candidate above the
    /// configured minimum qualifies. Per-network failures are skipped.
    async fn claim_balance_ok(&self) -> QuestResult<bool> {
        let balance = self
            .chain
            .native_balance(&self.settings.primary_network)
            .await?;
        if balance > self.settings.claim_balance_threshold {
            return Ok(true);
        }

        let mut networks = self.settings.bridge_networks.clone();
        networks.shuffle(&mut rand::thread_rng());
        for network in networks {
            match self.chain.native_balance(&network).await {
                Ok(balance) if balance > self.settings.bridge_balance_min => return Ok(true),
                Ok(_) => {}
                Err(e) => warn!("{} can't check network {network}: {e}", self.wallet),
            }
        }
        Ok(false)
    }

    /// Persist the wallet's current points and rank from the space
    /// leaderboard.
    async fn refresh_progress(&self) -> QuestResult<()> {
        let (points, rank) = self.platform.points_and_rank(SPACE_ID).await?;
        self.store.update_points(&self.wallet.address, points).await?;
        self.store.update_rank(&self.wallet.address, rank).await?;
        info!(
            "{} has {points} points and rank {rank} on the platform",
            self.wallet
        );
        Ok(())
    }
}
