use super::{Providers, check};
use crate::config::CheckConfig;
use concepts::time::Now;
use lambda_runtime::{LambdaEvent, service_fn};
use provider_aws::InvocationContext;
use serde_json::Value;
use std::sync::Arc;
use tracing::{Instrument as _, info, info_span};

/// Serve invocations until the runtime shuts the process down. The event
/// payload is ignored, every invocation checks the configured instance.
pub(crate) async fn serve(config: CheckConfig) -> Result<(), anyhow::Error> {
    let config = Arc::new(config);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let config = config.clone();
        let request_id = event.context.request_id;
        let span = info_span!("invocation", request_id);
        async move { handle(&config, request_id).await }.instrument(span)
    }))
    .await
    .map_err(|err| anyhow::anyhow!(err))
}

async fn handle(config: &CheckConfig, request_id: String) -> Result<Value, lambda_runtime::Error> {
    let context = InvocationContext::Lambda { request_id };
    let providers = Providers::aws(config, &context, false).await;
    let report = check(config, providers, Now).await?;
    info!("{report}");
    Ok(Value::Null)
}
