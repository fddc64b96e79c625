use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuestError {
    // Startup errors
    #[error("startup check failed: {0}")]
    Startup(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    // Network errors
    #[error("network error: {0}")]
    Network(String),

    #[error("proxy error: {0}")]
    Proxy(String),

    #[error("connection timeout")]
    ConnectionTimeout,

    // Collaborator errors
    #[error("platform error: {0}")]
    Platform(String),

    #[error("malformed campaign data: {0}")]
    MalformedCampaign(String),

    #[error("twitter error: {0}")]
    Twitter(String),

    #[error("chain error: {0}")]
    Chain(String),

    #[error("resource recovery error: {0}")]
    ResourceRecovery(String),

    // Store errors
    #[error("store error: {0}")]
    Store(String),

    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    // Security errors
    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    // System errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuestError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            QuestError::Network(_)
            | QuestError::Proxy(_)
            | QuestError::ConnectionTimeout
            | QuestError::Platform(_)
            | QuestError::Twitter(_)
            | QuestError::Chain(_) => true,
            _ => false,
        }
    }

    /// Check if error is fatal for the whole run (stops before any wallet work)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            QuestError::Startup(_) | QuestError::InvalidConfiguration(_)
        )
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            QuestError::Startup(_) | QuestError::InvalidConfiguration(_) => "startup",

            QuestError::Network(_) | QuestError::Proxy(_) | QuestError::ConnectionTimeout => {
                "network"
            }

            QuestError::Platform(_) | QuestError::MalformedCampaign(_) => "platform",

            QuestError::Twitter(_) => "twitter",

            QuestError::Chain(_) => "chain",

            QuestError::ResourceRecovery(_) => "resources",

            QuestError::Store(_) | QuestError::WalletNotFound(_) => "store",

            QuestError::Encryption(_) | QuestError::Decryption(_) => "security",

            _ => "system",
        }
    }
}

impl From<reqwest::Error> for QuestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            QuestError::ConnectionTimeout
        } else {
            QuestError::Network(err.to_string())
        }
    }
}

// Result type alias for convenience
pub type QuestResult<T> = Result<T, QuestError>;
