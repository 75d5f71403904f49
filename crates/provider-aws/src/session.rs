use aws_config::environment::credentials::EnvironmentVariableCredentialsProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,
    /// Shared-credentials profile, used only outside of Lambda.
    pub profile: Option<String>,
}

/// Where the current invocation comes from. Passed explicitly to everything
/// that behaves differently inside the Lambda runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationContext {
    Lambda { request_id: String },
    Cli,
}

/// Inside Lambda the execution role's credentials are exposed as environment
/// variables; elsewhere the configured shared-credentials profile is used.
#[instrument(skip_all, fields(region = settings.region))]
pub async fn load_sdk_config(settings: &AwsSettings, context: &InvocationContext) -> SdkConfig {
    let loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(settings.region.clone()));
    let loader = match (context, &settings.profile) {
        (InvocationContext::Lambda { request_id }, _) => {
            debug!(request_id, "Using credentials from environment variables");
            loader.credentials_provider(EnvironmentVariableCredentialsProvider::new())
        }
        (InvocationContext::Cli, Some(profile)) => {
            debug!(profile, "Using shared credentials profile");
            loader.profile_name(profile)
        }
        (InvocationContext::Cli, None) => loader,
    };
    loader.load().await
}
