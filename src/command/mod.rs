pub(crate) mod generate;
pub(crate) mod lambda;
pub(crate) mod run;

use crate::config::CheckConfig;
use concepts::time::ClockFn;
use concepts::{ComputeDescription, NotificationSink, SnapshotDirectory};
use provider_aws::{Ec2Provider, InvocationContext, SnsSink, load_sdk_config};
use provider_mem::LoggingSink;
use std::sync::Arc;
use verifier::{Invocation, InvocationError, InvocationReport, SnapshotVerifier};

/// The three collaborators of one invocation.
pub(crate) struct Providers {
    compute: Arc<dyn ComputeDescription>,
    snapshots: Arc<dyn SnapshotDirectory>,
    sink: Arc<dyn NotificationSink>,
}

impl Providers {
    /// EC2 and SNS clients for `context`. A dry run replaces SNS with a sink
    /// that only logs.
    pub(crate) async fn aws(
        config: &CheckConfig,
        context: &InvocationContext,
        dry_run: bool,
    ) -> Self {
        let sdk_config = load_sdk_config(&config.aws, context).await;
        let ec2 = Arc::new(Ec2Provider::new(&sdk_config));
        let sink: Arc<dyn NotificationSink> = if dry_run {
            Arc::new(LoggingSink)
        } else {
            Arc::new(SnsSink::new(&sdk_config))
        };
        Self {
            compute: ec2.clone(),
            snapshots: ec2,
            sink,
        }
    }
}

pub(crate) async fn check<C: ClockFn>(
    config: &CheckConfig,
    providers: Providers,
    clock_fn: C,
) -> Result<InvocationReport, InvocationError> {
    let verifier = SnapshotVerifier::new(
        providers.snapshots,
        providers.sink,
        config.topic.clone(),
        clock_fn,
        config.utc_offset,
    );
    Invocation::new(providers.compute, verifier, config.invocation)
        .run(&config.instance_id)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Offset as _, TimeZone as _, Utc};
    use concepts::{
        InstanceId, Notification, SnapshotId, SnapshotRecord, SnapshotState, TopicAddress,
        VolumeId,
    };
    use provider_aws::AwsSettings;
    use provider_mem::{InMemoryCompute, InMemorySnapshots, RecordingSink};
    use test_utils::set_up;
    use test_utils::sim_clock::ConstClock;
    use verifier::{FailurePolicy, InvocationConfig};

    const INSTANCE: &str = "i-abc123";
    const TOPIC: &str = "arn:aws:sns:ap-northeast-1:123456789012:backup";

    fn check_config(failure_policy: FailurePolicy) -> CheckConfig {
        CheckConfig {
            instance_id: InstanceId::new(INSTANCE),
            topic: TopicAddress::new(TOPIC),
            aws: AwsSettings {
                region: "ap-northeast-1".to_string(),
                profile: None,
            },
            utc_offset: Utc.fix(),
            invocation: InvocationConfig {
                failure_policy,
                deduplicate_volumes: true,
            },
        }
    }

    fn completed_today(volume_id: &str) -> SnapshotRecord {
        SnapshotRecord {
            snapshot_id: SnapshotId::new(format!("snap-{volume_id}")),
            volume_id: VolumeId::new(volume_id),
            started_at: Utc.with_ymd_and_hms(2024, 5, 20, 3, 0, 0).unwrap(),
            state: SnapshotState::Completed,
        }
    }

    fn clock() -> ConstClock {
        ConstClock(Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn one_message_per_volume_in_attachment_order() {
        set_up();
        let sink = Arc::new(RecordingSink::default());
        let providers = Providers {
            compute: Arc::new(InMemoryCompute::default().with_instance(INSTANCE, ["vol-1", "vol-2"])),
            snapshots: Arc::new(InMemorySnapshots::default().with_snapshot(completed_today("vol-1"))),
            sink: sink.clone(),
        };
        let report = check(&check_config(FailurePolicy::Isolate), providers, clock())
            .await
            .unwrap();
        assert_eq!(2, report.notified().count());
        let instance_id = InstanceId::new(INSTANCE);
        assert_eq!(
            vec![
                Notification::backup_succeeded(&instance_id),
                Notification::backup_failed(&instance_id),
            ],
            sink.published()
        );
        assert_eq!(vec![TopicAddress::new(TOPIC); 2], sink.topics());
    }

    #[tokio::test]
    async fn fail_fast_stops_after_first_failure() {
        set_up();
        let sink = Arc::new(RecordingSink::default());
        let providers = Providers {
            compute: Arc::new(
                InMemoryCompute::default().with_instance(INSTANCE, ["vol-1", "vol-2", "vol-3"]),
            ),
            snapshots: Arc::new(InMemorySnapshots::default().unavailable_for("vol-2")),
            sink: sink.clone(),
        };
        let err = check(&check_config(FailurePolicy::FailFast), providers, clock())
            .await
            .unwrap_err();
        let report = assert_matches!(&err, InvocationError::Aborted { report, .. } => report);
        assert_eq!(vec![VolumeId::new("vol-3")], report.skipped);
        assert_eq!(1, sink.published().len());
    }
}
