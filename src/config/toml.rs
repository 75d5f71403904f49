use super::{CheckConfig, ConfigurationError};
use chrono::{FixedOffset, Offset as _, Utc};
use concepts::{InstanceId, TopicAddress};
use log::LoggingConfig;
use provider_aws::AwsSettings;
use schemars::JsonSchema;
use serde::Deserialize;
use verifier::{FailurePolicy, InvocationConfig};

#[derive(Debug, Deserialize, JsonSchema, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConfigToml {
    #[serde(default)]
    pub(crate) target: TargetConfig,
    #[serde(default)]
    pub(crate) notification: NotificationConfig,
    #[serde(default)]
    pub(crate) aws: AwsConfigToml,
    #[serde(default)]
    pub(crate) verification: VerificationConfig,
    #[serde(default)]
    pub(crate) log: LoggingConfig,
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct TargetConfig {
    /// EC2 instance whose attached volumes are checked.
    pub(crate) instance_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct NotificationConfig {
    /// SNS topic receiving one message per volume.
    pub(crate) topic_arn: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema, Default)]
#[serde(deny_unknown_fields)]
pub(crate) struct AwsConfigToml {
    pub(crate) region: Option<String>,
    /// Shared-credentials profile, ignored inside Lambda.
    pub(crate) profile: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct VerificationConfig {
    /// Offset used to decide what "today" is, e.g. `+09:00`. Defaults to the
    /// host's local offset.
    #[serde(default)]
    pub(crate) utc_offset: Option<String>,
    #[serde(default)]
    pub(crate) failure_policy: FailurePolicyToml,
    #[serde(default = "default_deduplicate_volumes")]
    pub(crate) deduplicate_volumes: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            utc_offset: None,
            failure_policy: FailurePolicyToml::default(),
            deduplicate_volumes: default_deduplicate_volumes(),
        }
    }
}

fn default_deduplicate_volumes() -> bool {
    InvocationConfig::default().deduplicate_volumes
}

#[derive(Debug, Deserialize, JsonSchema, Default, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FailurePolicyToml {
    /// Keep going after a failed volume, fail the invocation at the end.
    #[default]
    Isolate,
    /// Stop at the first failed volume.
    FailFast,
}

impl From<FailurePolicyToml> for FailurePolicy {
    fn from(value: FailurePolicyToml) -> Self {
        match value {
            FailurePolicyToml::Isolate => Self::Isolate,
            FailurePolicyToml::FailFast => Self::FailFast,
        }
    }
}

fn required(value: Option<&str>, key: &'static str) -> Result<String, ConfigurationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ConfigurationError::MissingParameter(key)),
    }
}

fn parse_utc_offset(input: Option<&str>) -> Result<FixedOffset, ConfigurationError> {
    match input.map(str::trim) {
        None | Some("" | "local") => Ok(concepts::time::local_offset()),
        Some("Z" | "utc" | "UTC") => Ok(Utc.fix()),
        Some(input) => input
            .parse()
            .map_err(|_| ConfigurationError::InvalidUtcOffset(input.to_string())),
    }
}

impl ConfigToml {
    /// Check required parameters and convert into the values the core consumes.
    pub(crate) fn verify(&self) -> Result<CheckConfig, ConfigurationError> {
        let instance_id = required(self.target.instance_id.as_deref(), "target.instance_id")?;
        let topic_arn = required(self.notification.topic_arn.as_deref(), "notification.topic_arn")?;
        let region = required(self.aws.region.as_deref(), "aws.region")?;
        Ok(CheckConfig {
            instance_id: InstanceId::new(instance_id),
            topic: TopicAddress::new(topic_arn),
            aws: AwsSettings {
                region,
                profile: self.aws.profile.clone().filter(|profile| !profile.is_empty()),
            },
            utc_offset: parse_utc_offset(self.verification.utc_offset.as_deref())?,
            invocation: InvocationConfig {
                failure_policy: self.verification.failure_policy.into(),
                deduplicate_volumes: self.verification.deduplicate_volumes,
            },
        })
    }
}

pub(crate) mod log {
    use schemars::JsonSchema;
    use serde::Deserialize;
    use std::str::FromStr;

    #[derive(Debug, Deserialize, JsonSchema, Default)]
    #[serde(deny_unknown_fields)]
    pub(crate) struct LoggingConfig {
        #[serde(default)]
        pub(crate) file: Option<AppenderRollingFile>,
        #[serde(default)]
        pub(crate) stdout: AppenderOut,
    }

    #[derive(Debug, Deserialize, JsonSchema, Default, Copy, Clone)]
    #[serde(rename_all = "snake_case")]
    pub(crate) enum SpanConfig {
        /// spans are ignored (this is the default)
        #[default]
        None,
        /// one event when span is created
        New,
        /// one event when the span is dropped
        Close,
        /// events at all points (new, enter, exit, drop)
        Full,
    }

    impl From<SpanConfig> for tracing_subscriber::fmt::format::FmtSpan {
        fn from(value: SpanConfig) -> Self {
            match value {
                SpanConfig::None => Self::NONE,
                SpanConfig::New => Self::NEW,
                SpanConfig::Close => Self::CLOSE,
                SpanConfig::Full => Self::FULL,
            }
        }
    }

    #[derive(Debug, Deserialize, JsonSchema, Default, Clone, Copy, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub(crate) enum LoggingStyle {
        Plain,
        #[default]
        PlainCompact,
        Json,
    }

    #[derive(Debug, Deserialize, JsonSchema, Default)]
    pub(crate) struct AppenderCommon {
        #[serde(default)]
        #[schemars(with = "String")]
        pub(crate) level: EnvFilter,
        #[serde(default)]
        pub(crate) span: SpanConfig,
        #[serde(default)]
        pub(crate) target: bool,
    }

    #[derive(Debug, serde_with::DeserializeFromStr)]
    pub(crate) struct EnvFilter(pub(crate) tracing_subscriber::EnvFilter);
    impl FromStr for EnvFilter {
        type Err = tracing_subscriber::filter::ParseError;

        fn from_str(directives: &str) -> Result<Self, Self::Err> {
            tracing_subscriber::EnvFilter::builder()
                .parse(directives)
                .map(Self)
        }
    }
    impl Default for EnvFilter {
        fn default() -> Self {
            Self::from_str("info").expect("default directive must parse")
        }
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    pub(crate) struct AppenderOut {
        #[serde(default = "default_enabled")]
        pub(crate) enabled: bool,
        #[serde(flatten, default)]
        pub(crate) common: AppenderCommon,
        #[serde(default)]
        pub(crate) style: LoggingStyle,
    }

    impl Default for AppenderOut {
        fn default() -> Self {
            Self {
                enabled: default_enabled(),
                common: AppenderCommon::default(),
                style: LoggingStyle::default(),
            }
        }
    }

    fn default_enabled() -> bool {
        true
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    pub(crate) struct AppenderRollingFile {
        #[serde(flatten, default)]
        pub(crate) common: AppenderCommon,
        pub(crate) directory: String,
        pub(crate) prefix: String,
        pub(crate) rotation: Rotation,
        #[serde(default)]
        pub(crate) style: LoggingStyle,
    }

    #[derive(Debug, Deserialize, JsonSchema, Clone, Copy)]
    #[serde(rename_all = "snake_case")]
    pub(crate) enum Rotation {
        Minutely,
        Hourly,
        Daily,
        Never,
    }
    impl From<Rotation> for tracing_appender::rolling::Rotation {
        fn from(value: Rotation) -> Self {
            match value {
                Rotation::Minutely => Self::MINUTELY,
                Rotation::Hourly => Self::HOURLY,
                Rotation::Daily => Self::DAILY,
                Rotation::Never => Self::NEVER,
            }
        }
    }
}
