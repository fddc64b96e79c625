// src/quest/link.rs
use super::QuestEngine;
use crate::clients::TwitterAccount;
use crate::error::QuestResult;
use crate::types::HealthStatus;
use chrono::Utc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

const MIN_FOLLOWERS: u32 = 28;
const MIN_ACCOUNT_AGE_DAYS: i64 = 91;

impl QuestEngine {
    /// Get the wallet's twitter account usable and linked on the platform.
    /// Returns false when the wallet cannot run twitter quests this pass.
    /// A dead credential is replaced through resource recovery at most once.
    pub(crate) async fn ensure_twitter_link(&mut self) -> QuestResult<bool> {
        let mut replaced = false;
        let account = loop {
            self.twitter = self.sessions.twitter_client(&self.wallet);

            if self.wallet.twitter_status != HealthStatus::Ok
                && !self.settings.auto_replace_twitter
            {
                warn!(
                    "{} twitter status is {:?}, skipping twitter quests",
                    self.wallet, self.wallet.twitter_status
                );
                return Ok(false);
            }
            if self.wallet.twitter_token.is_none() {
                warn!("{} has no twitter token for twitter actions", self.wallet);
                return Ok(false);
            }

            match self.twitter.initialize().await {
                Ok(account) => break account,
                Err(e) => {
                    warn!("{} can't initialize twitter: {e}", self.wallet);
                    if !self.settings.auto_replace_twitter || replaced {
                        error!("{} can't initialize and connect twitter", self.wallet);
                        return Ok(false);
                    }
                    if !self.resources.replace_twitter(self.wallet.id).await? {
                        error!("{} failed to replace twitter credential", self.wallet);
                        return Ok(false);
                    }
                    // pick up the replacement token, then retry once
                    if let Some(updated) = self.store.get_by_address(&self.wallet.address).await? {
                        self.wallet = updated;
                    }
                    replaced = true;
                }
            }
        };

        self.link_account(account).await
    }

    async fn link_account(&self, account: TwitterAccount) -> QuestResult<bool> {
        debug!("{} follower count: {}", self.wallet, account.followers_count);
        self.store
            .update_twitter_followers(&self.wallet.address, account.followers_count)
            .await?;
        if let Some(created_at) = account.created_at {
            debug!("{} twitter created at: {created_at}", self.wallet);
            self.store
                .update_twitter_created_at(&self.wallet.address, created_at)
                .await?;
        }

        let too_young = account
            .created_at
            .is_some_and(|created_at| Utc::now() - created_at < chrono::Duration::days(MIN_ACCOUNT_AGE_DAYS));
        if account.followers_count < MIN_FOLLOWERS || too_young {
            warn!(
                "{} twitter account not eligible: {} followers (minimum {MIN_FOLLOWERS}), created at {:?} (minimum age {MIN_ACCOUNT_AGE_DAYS} days); replace or upgrade this twitter token",
                self.wallet, account.followers_count, account.created_at
            );
            return Ok(false);
        }

        let session = self.platform.session_info().await?;
        let mut linked = session.twitter_user_id;
        if let Some(linked_id) = linked {
            if linked_id != account.id {
                warn!(
                    "{} linked twitter account does not match the local one, relinking",
                    self.wallet
                );
                self.platform.disconnect_twitter().await?;
                info!("{} old twitter account unlinked", self.wallet);
                sleep(Duration::from_secs(self.settings.unlink_settle_secs)).await;
                linked = None;
            }
        }

        if linked.is_none() {
            let text = format!(
                "Verifying my Twitter account for my #GalxeID gid:{} @Galxe ",
                session.address_id
            );
            let tweet = match self.twitter.post_tweet(&text).await {
                Ok(tweet) => tweet,
                Err(e) => {
                    error!("{} can't post tweets: {e}", self.wallet);
                    return Ok(false);
                }
            };
            let tweet_url = format!("https://x.com/{}/status/{}", account.username, tweet.id);
            let link = self.platform.connect_twitter(&tweet_url).await?;
            if link.twitter_user_id.is_some() {
                info!("{} success twitter connect", self.wallet);
            }
        }
        Ok(true)
    }
}
