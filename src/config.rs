pub(crate) mod config_holder;
pub(crate) mod toml;

use chrono::FixedOffset;
use concepts::{InstanceId, TopicAddress};
use provider_aws::AwsSettings;
use verifier::InvocationConfig;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigurationError {
    #[error("missing required configuration parameter `{0}`")]
    MissingParameter(&'static str),
    #[error("invalid UTC offset `{0}`, expected e.g. `+09:00`, `UTC` or `local`")]
    InvalidUtcOffset(String),
    #[error("cannot find configuration file {0:?}")]
    FileNotFound(std::path::PathBuf),
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

/// Everything one invocation needs, constructed once at the entry point.
#[derive(Debug, Clone)]
pub(crate) struct CheckConfig {
    pub(crate) instance_id: InstanceId,
    pub(crate) topic: TopicAddress,
    pub(crate) aws: AwsSettings,
    pub(crate) utc_offset: FixedOffset,
    pub(crate) invocation: InvocationConfig,
}
