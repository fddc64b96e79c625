// src/testkit.rs
//
// Scripted collaborator mocks shared by the module test suites.
use crate::clients::{
    CampaignData, ChainClient, ConditionGroup, Cred, LinkResult, Probe, ProxySwap, QuestPlatform,
    RawCondition, ResourceRecovery, RewardConfig, RewardRule, SessionFactory, SessionInfo,
    TaskConfig, Tweet, TwitterAccount, TwitterClient, WalletSession,
};
use crate::config::{DelayRange, Settings};
use crate::error::{QuestError, QuestResult};
use crate::quest::{QuestEngine, CAMPAIGN_SEQUENCE};
use crate::store::MemoryStore;
use crate::types::Wallet;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) fn test_settings() -> Settings {
    Settings {
        shuffle_wallets: false,
        startup_delay: DelayRange::zero(),
        pause_between_passes: DelayRange::zero(),
        retry: 3,
        retry_delay_secs: 0,
        probe_backoff_secs: 0,
        reward_success_cooldown_secs: 0,
        reward_retry_cooldown_secs: 0,
        participation_retry_delay: DelayRange::zero(),
        follow_settle_delay: DelayRange::zero(),
        tweet_settle_secs: 0,
        unlink_settle_secs: 0,
        claim_cooldown_secs: 0,
        final_claim_cooldown_secs: 0,
        ..Settings::default()
    }
}

pub(crate) fn test_wallet(id: i64) -> Wallet {
    Wallet::new(id, format!("0xkey{id}"), format!("0xaddr{id}"))
        .with_proxy("http://proxy-one:8080")
        .with_twitter_token("token-one")
}

// ---- payload builders -------------------------------------------------

pub(crate) fn condition(cred_id: u64, name: &str, eligible: bool) -> RawCondition {
    RawCondition {
        cred: Cred {
            id: cred_id.to_string(),
            name: name.to_string(),
        },
        eligible,
        attrs: serde_json::json!({}),
    }
}

pub(crate) fn reward_config(
    conditions: Vec<RawCondition>,
    eligible: bool,
    formula: &str,
    reward_count: i64,
) -> RewardConfig {
    RewardConfig {
        eligible,
        conditions,
        rewards: vec![RewardRule {
            arithmetic_formula: formula.to_string(),
            reward_count,
        }],
    }
}

pub(crate) fn task_config(
    participate: Vec<RawCondition>,
    rewards: Vec<RewardConfig>,
    referral: Vec<RawCondition>,
) -> TaskConfig {
    TaskConfig {
        participate_condition: ConditionGroup {
            conditions: participate,
        },
        reward_configs: rewards,
        referral_config: ConditionGroup {
            conditions: referral,
        },
    }
}

/// One campaign shape mounted for every id in the sequence.
#[derive(Clone)]
pub(crate) struct CampaignSpec {
    pub participate: Vec<RawCondition>,
    pub rewards: Vec<RewardConfig>,
    pub referral: Vec<RawCondition>,
}

impl Default for CampaignSpec {
    fn default() -> Self {
        Self {
            participate: vec![condition(11, "Hold the stone", true)],
            rewards: vec![reward_config(
                vec![condition(21, "Fortification Quiz", false)],
                false,
                "40",
                1,
            )],
            referral: vec![condition(31, "Invite a friend", true)],
        }
    }
}

pub(crate) fn simple_campaign_for_all(platform: &MockPlatform) {
    platform.set_campaigns(CampaignSpec::default());
}

// ---- platform ---------------------------------------------------------

pub(crate) struct MockPlatform {
    pub banned: AtomicBool,
    pub subscription: AtomicBool,
    pub campaigns: Mutex<HashMap<String, CampaignData>>,
    pub fetch_failures: AtomicU32,
    pub sync_quest_ok: AtomicBool,
    pub sync_twitter_ok: AtomicBool,
    pub quiz_ok: AtomicBool,
    pub credential_ok: AtomicBool,
    pub claim_ok: AtomicBool,
    pub session: Mutex<SessionInfo>,
    pub link_result: Mutex<Option<u64>>,
    pub points: Mutex<(i64, i64)>,

    pub fetch_calls: AtomicUsize,
    pub follow_calls: AtomicUsize,
    pub sync_quest_calls: Mutex<Vec<u64>>,
    pub sync_twitter_calls: Mutex<Vec<u64>>,
    pub quiz_calls: Mutex<Vec<u64>>,
    pub credential_calls: Mutex<Vec<u64>>,
    pub claims: Mutex<Vec<(String, Option<String>)>>,
    pub disconnects: AtomicUsize,
    pub link_requests: Mutex<Vec<String>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            banned: AtomicBool::new(false),
            subscription: AtomicBool::new(true),
            campaigns: Mutex::new(HashMap::new()),
            fetch_failures: AtomicU32::new(0),
            sync_quest_ok: AtomicBool::new(true),
            sync_twitter_ok: AtomicBool::new(true),
            quiz_ok: AtomicBool::new(true),
            credential_ok: AtomicBool::new(true),
            claim_ok: AtomicBool::new(true),
            session: Mutex::new(SessionInfo {
                address_id: "555".to_string(),
                twitter_user_id: None,
            }),
            link_result: Mutex::new(Some(9001)),
            points: Mutex::new((100, 5)),
            fetch_calls: AtomicUsize::new(0),
            follow_calls: AtomicUsize::new(0),
            sync_quest_calls: Mutex::new(Vec::new()),
            sync_twitter_calls: Mutex::new(Vec::new()),
            quiz_calls: Mutex::new(Vec::new()),
            credential_calls: Mutex::new(Vec::new()),
            claims: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
            link_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockPlatform {
    /// Mount the same campaign shape for every id in the fixed sequence,
    /// each with its own referral code.
    pub fn set_campaigns(&self, spec: CampaignSpec) {
        let mut campaigns = self.campaigns.lock().unwrap();
        for campaign_id in CAMPAIGN_SEQUENCE {
            campaigns.insert(
                campaign_id.to_string(),
                CampaignData {
                    referral_code: format!("REF-{campaign_id}"),
                    task_config: task_config(
                        spec.participate.clone(),
                        spec.rewards.clone(),
                        spec.referral.clone(),
                    ),
                },
            );
        }
    }
}

#[async_trait]
impl QuestPlatform for MockPlatform {
    async fn fetch_campaign(&self, campaign_id: &str) -> QuestResult<CampaignData> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fetch_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fetch_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(QuestError::Platform("scripted fetch failure".to_string()));
        }
        self.campaigns
            .lock()
            .unwrap()
            .get(campaign_id)
            .cloned()
            .ok_or_else(|| QuestError::Platform(format!("no campaign {campaign_id}")))
    }

    async fn follow_space(&self, _space_id: u64) -> QuestResult<()> {
        self.follow_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sync_quest(&self, cred_id: u64) -> QuestResult<bool> {
        self.sync_quest_calls.lock().unwrap().push(cred_id);
        Ok(self.sync_quest_ok.load(Ordering::SeqCst))
    }

    async fn sync_twitter_quest(&self, cred_id: u64, _campaign_id: &str) -> QuestResult<bool> {
        self.sync_twitter_calls.lock().unwrap().push(cred_id);
        Ok(self.sync_twitter_ok.load(Ordering::SeqCst))
    }

    async fn sync_quiz(&self, cred_id: u64, _answers: &[&str]) -> QuestResult<bool> {
        self.quiz_calls.lock().unwrap().push(cred_id);
        Ok(self.quiz_ok.load(Ordering::SeqCst))
    }

    async fn sync_credential(&self, cred_id: u64, _attrs: &serde_json::Value) -> QuestResult<bool> {
        self.credential_calls.lock().unwrap().push(cred_id);
        Ok(self.credential_ok.load(Ordering::SeqCst))
    }

    async fn claim_points(&self, campaign_id: &str, ref_code: Option<&str>) -> QuestResult<bool> {
        self.claims
            .lock()
            .unwrap()
            .push((campaign_id.to_string(), ref_code.map(str::to_string)));
        Ok(self.claim_ok.load(Ordering::SeqCst))
    }

    async fn points_and_rank(&self, _space_id: u64) -> QuestResult<(i64, i64)> {
        Ok(*self.points.lock().unwrap())
    }

    async fn is_account_banned(&self) -> QuestResult<bool> {
        Ok(self.banned.load(Ordering::SeqCst))
    }

    async fn has_active_subscription(&self) -> QuestResult<bool> {
        Ok(self.subscription.load(Ordering::SeqCst))
    }

    async fn session_info(&self) -> QuestResult<SessionInfo> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn connect_twitter(&self, tweet_url: &str) -> QuestResult<LinkResult> {
        self.link_requests.lock().unwrap().push(tweet_url.to_string());
        Ok(LinkResult {
            twitter_user_id: *self.link_result.lock().unwrap(),
        })
    }

    async fn disconnect_twitter(&self) -> QuestResult<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ---- twitter ----------------------------------------------------------

#[derive(Clone)]
pub(crate) struct TwitterShared {
    pub account: Arc<Mutex<TwitterAccount>>,
    pub init_failures: Arc<AtomicU32>,
    pub init_calls: Arc<AtomicUsize>,
    pub post_ok: Arc<AtomicBool>,
    pub posts: Arc<Mutex<Vec<String>>>,
    pub deleted: Arc<Mutex<Vec<u64>>>,
}

impl Default for TwitterShared {
    fn default() -> Self {
        Self {
            account: Arc::new(Mutex::new(TwitterAccount {
                id: 9001,
                username: "questooor".to_string(),
                followers_count: 100,
                created_at: Some(Utc::now() - chrono::Duration::days(400)),
            })),
            init_failures: Arc::new(AtomicU32::new(0)),
            init_calls: Arc::new(AtomicUsize::new(0)),
            post_ok: Arc::new(AtomicBool::new(true)),
            posts: Arc::new(Mutex::new(Vec::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

pub(crate) struct MockTwitter {
    shared: TwitterShared,
}

#[async_trait]
impl TwitterClient for MockTwitter {
    async fn initialize(&mut self) -> QuestResult<TwitterAccount> {
        self.shared.init_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.shared.init_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.shared.init_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(QuestError::Twitter("login failed".to_string()));
        }
        Ok(self.shared.account.lock().unwrap().clone())
    }

    async fn post_tweet(&self, text: &str) -> QuestResult<Tweet> {
        if !self.shared.post_ok.load(Ordering::SeqCst) {
            return Err(QuestError::Twitter("post failed".to_string()));
        }
        let mut posts = self.shared.posts.lock().unwrap();
        posts.push(text.to_string());
        Ok(Tweet {
            id: posts.len() as u64,
        })
    }

    async fn delete_tweet(&self, tweet_id: u64) -> QuestResult<()> {
        self.shared.deleted.lock().unwrap().push(tweet_id);
        Ok(())
    }
}

// ---- chain ------------------------------------------------------------

#[derive(Default)]
pub(crate) struct MockChain {
    pub balances: Mutex<HashMap<String, f64>>,
    pub failing: Mutex<HashSet<String>>,
    pub queried: Mutex<Vec<String>>,
}

impl MockChain {
    pub fn set_balance(&self, network: &str, balance: f64) {
        self.balances.lock().unwrap().insert(network.to_string(), balance);
    }

    pub fn fail_network(&self, network: &str) {
        self.failing.lock().unwrap().insert(network.to_string());
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn native_balance(&self, network: &str) -> QuestResult<f64> {
        self.queried.lock().unwrap().push(network.to_string());
        if self.failing.lock().unwrap().contains(network) {
            return Err(QuestError::Chain(format!("rpc down on {network}")));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(network)
            .copied()
            .unwrap_or(0.0))
    }
}

// ---- resource recovery ------------------------------------------------

pub(crate) struct MockResources {
    store: Arc<MemoryStore>,
    replacement_proxy: Mutex<Option<String>>,
    replacement_token: Mutex<Option<String>>,
    pub marked_bad: AtomicUsize,
    pub proxy_swaps: AtomicUsize,
    pub twitter_swaps: AtomicUsize,
}

impl MockResources {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            replacement_proxy: Mutex::new(None),
            replacement_token: Mutex::new(Some("token-two".to_string())),
            marked_bad: AtomicUsize::new(0),
            proxy_swaps: AtomicUsize::new(0),
            twitter_swaps: AtomicUsize::new(0),
        }
    }

    pub fn set_replacement_proxy(&self, proxy: &str) {
        *self.replacement_proxy.lock().unwrap() = Some(proxy.to_string());
    }

    pub fn set_replacement_token(&self, token: Option<&str>) {
        *self.replacement_token.lock().unwrap() = token.map(str::to_string);
    }
}

#[async_trait]
impl ResourceRecovery for MockResources {
    async fn mark_proxy_bad(&self, wallet_id: i64) -> QuestResult<()> {
        self.marked_bad.fetch_add(1, Ordering::SeqCst);
        self.store
            .set_proxy_status(wallet_id, crate::types::HealthStatus::Bad)
            .await;
        Ok(())
    }

    async fn replace_proxy(&self, wallet_id: i64) -> QuestResult<ProxySwap> {
        let replacement = self.replacement_proxy.lock().unwrap().clone();
        match replacement {
            Some(proxy) => {
                self.proxy_swaps.fetch_add(1, Ordering::SeqCst);
                self.store.set_proxy(wallet_id, &proxy).await;
                Ok(ProxySwap {
                    ok: true,
                    detail: proxy,
                })
            }
            None => Ok(ProxySwap {
                ok: false,
                detail: "proxy pool empty".to_string(),
            }),
        }
    }

    async fn replace_twitter(&self, wallet_id: i64) -> QuestResult<bool> {
        let replacement = self.replacement_token.lock().unwrap().clone();
        match replacement {
            Some(token) => {
                self.twitter_swaps.fetch_add(1, Ordering::SeqCst);
                self.store.set_twitter_token(wallet_id, &token).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ---- session factory --------------------------------------------------

struct MockProbe {
    failures: Arc<AtomicU32>,
}

#[async_trait]
impl Probe for MockProbe {
    async fn check(&self) -> QuestResult<()> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(QuestError::Proxy("probe timed out".to_string()));
        }
        Ok(())
    }
}

pub(crate) struct MockFactory {
    pub platform: Arc<MockPlatform>,
    pub chain: Arc<MockChain>,
    pub probe_failures: Arc<AtomicU32>,
    pub built_proxies: Mutex<Vec<Option<String>>>,
    pub twitter: TwitterShared,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::with(Arc::new(MockPlatform::default()), Arc::new(MockChain::default()))
    }

    pub fn with(platform: Arc<MockPlatform>, chain: Arc<MockChain>) -> Self {
        Self {
            platform,
            chain,
            probe_failures: Arc::new(AtomicU32::new(0)),
            built_proxies: Mutex::new(Vec::new()),
            twitter: TwitterShared::default(),
        }
    }
}

#[async_trait]
impl SessionFactory for MockFactory {
    async fn connect(&self, wallet: &Wallet) -> QuestResult<WalletSession> {
        self.built_proxies.lock().unwrap().push(wallet.proxy.clone());
        Ok(WalletSession {
            proxy: wallet.proxy.clone(),
            probe: Box::new(MockProbe {
                failures: Arc::clone(&self.probe_failures),
            }),
            platform: Arc::clone(&self.platform) as Arc<dyn QuestPlatform>,
            chain: Arc::clone(&self.chain) as Arc<dyn ChainClient>,
        })
    }

    fn twitter_client(&self, _wallet: &Wallet) -> Box<dyn TwitterClient> {
        Box::new(MockTwitter {
            shared: self.twitter.clone(),
        })
    }
}

// ---- fixture ----------------------------------------------------------

/// Full collaborator set wired around one shared in-memory store.
pub(crate) struct Fixture {
    pub store: Arc<MemoryStore>,
    pub resources: Arc<MockResources>,
    pub platform: Arc<MockPlatform>,
    pub chain: Arc<MockChain>,
    pub factory: Arc<MockFactory>,
    pub twitter_post_ok: Arc<AtomicBool>,
}

impl Fixture {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let platform = Arc::new(MockPlatform::default());
        let chain = Arc::new(MockChain::default());
        let factory = Arc::new(MockFactory::with(Arc::clone(&platform), Arc::clone(&chain)));
        let resources = Arc::new(MockResources::new(Arc::clone(&store)));
        let twitter_post_ok = Arc::clone(&factory.twitter.post_ok);
        Self {
            store,
            resources,
            platform,
            chain,
            factory,
            twitter_post_ok,
        }
    }

    pub fn twitter_posts(&self) -> Vec<String> {
        self.factory.twitter.posts.lock().unwrap().clone()
    }

    pub fn twitter_deleted(&self) -> Vec<u64> {
        self.factory.twitter.deleted.lock().unwrap().clone()
    }

    pub fn twitter_init_calls(&self) -> usize {
        self.factory.twitter.init_calls.load(Ordering::SeqCst)
    }

    pub fn set_twitter_account(&self, followers: u32, created_days_ago: Option<i64>) {
        let mut account = self.factory.twitter.account.lock().unwrap();
        account.followers_count = followers;
        account.created_at = created_days_ago.map(|days| Utc::now() - chrono::Duration::days(days));
    }

    pub fn fail_twitter_init(&self, times: u32) {
        self.factory.twitter.init_failures.store(times, Ordering::SeqCst);
    }
}

/// Engine wired to the fixture's collaborators, with a fresh session.
pub(crate) async fn build_engine(fx: &Fixture, settings: Settings, wallet: Wallet) -> QuestEngine {
    let session = fx.factory.connect(&wallet).await.unwrap();
    QuestEngine::new(
        Arc::new(settings),
        Arc::clone(&fx.store) as _,
        Arc::clone(&fx.resources) as _,
        Arc::clone(&fx.factory) as _,
        session,
        wallet,
    )
}
