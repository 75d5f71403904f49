use super::{Providers, check};
use crate::config::CheckConfig;
use concepts::time::Now;
use provider_aws::InvocationContext;
use tracing::{info, warn};

/// Single invocation from the command line. Any failed volume turns into a
/// non-zero exit code.
pub(crate) async fn run(config: &CheckConfig, dry_run: bool) -> Result<(), anyhow::Error> {
    if dry_run {
        warn!("Dry run, notifications will only be logged");
    }
    let providers = Providers::aws(config, &InvocationContext::Cli, dry_run).await;
    match check(config, providers, Now).await {
        Ok(report) => {
            info!("{report}");
            println!("{report}");
            Ok(())
        }
        Err(err) => {
            if let Some(report) = err.report() {
                println!("{report}");
            }
            Err(err.into())
        }
    }
}
