use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::types::{Filter, InstanceAttributeName, InstanceBlockDeviceMapping, Snapshot};
use chrono::{DateTime, Utc};
use concepts::{
    ComputeDescription, InstanceId, ProviderError, SnapshotDirectory, SnapshotId, SnapshotRecord,
    SnapshotState, VolumeId,
};
use tracing::{debug, instrument, warn};

/// EC2 backed volume discovery and snapshot listing.
#[derive(Clone)]
pub struct Ec2Provider {
    client: aws_sdk_ec2::Client,
}

impl Ec2Provider {
    #[must_use]
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(sdk_config),
        }
    }
}

fn volume_id_of(mapping: &InstanceBlockDeviceMapping) -> Option<VolumeId> {
    let volume_id = mapping.ebs().and_then(|ebs| ebs.volume_id());
    if volume_id.is_none() {
        debug!(
            device_name = mapping.device_name(),
            "Skipping block device mapping without an EBS volume"
        );
    }
    volume_id.map(VolumeId::new)
}

fn to_record(volume_id: &VolumeId, snapshot: &Snapshot) -> Option<SnapshotRecord> {
    let snapshot_id = snapshot.snapshot_id().unwrap_or_default();
    let Some(started_at) = snapshot
        .start_time()
        .and_then(|start| DateTime::<Utc>::from_timestamp(start.secs(), start.subsec_nanos()))
    else {
        warn!(snapshot_id, "Skipping snapshot without a start time");
        return None;
    };
    let state = snapshot
        .state()
        .map_or(SnapshotState::Unknown(String::new()), |state| {
            SnapshotState::parse(state.as_str())
        });
    Some(SnapshotRecord {
        snapshot_id: SnapshotId::new(snapshot_id),
        volume_id: volume_id.clone(),
        started_at,
        state,
    })
}

#[async_trait]
impl ComputeDescription for Ec2Provider {
    #[instrument(skip_all, fields(%instance_id))]
    async fn attached_volumes(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Vec<VolumeId>, ProviderError> {
        let output = self
            .client
            .describe_instance_attribute()
            .instance_id(instance_id.to_string())
            .attribute(InstanceAttributeName::BlockDeviceMapping)
            .send()
            .await
            .map_err(|err| ProviderError::new("DescribeInstanceAttribute", err))?;
        Ok(output
            .block_device_mappings()
            .iter()
            .filter_map(volume_id_of)
            .collect())
    }
}

#[async_trait]
impl SnapshotDirectory for Ec2Provider {
    #[instrument(skip_all, fields(%volume_id))]
    async fn snapshots_of(
        &self,
        volume_id: &VolumeId,
    ) -> Result<Vec<SnapshotRecord>, ProviderError> {
        let snapshots = self
            .client
            .describe_snapshots()
            .filters(
                Filter::builder()
                    .name("volume-id")
                    .values(volume_id.to_string())
                    .build(),
            )
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(|err| ProviderError::new("DescribeSnapshots", err))?;
        Ok(snapshots
            .iter()
            .filter_map(|snapshot| to_record(volume_id, snapshot))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use aws_sdk_ec2::primitives::DateTime as AwsDateTime;
    use aws_sdk_ec2::types::{EbsInstanceBlockDevice, SnapshotState as AwsSnapshotState};

    #[test]
    fn mappings_without_ebs_are_skipped() {
        let ebs = InstanceBlockDeviceMapping::builder()
            .device_name("/dev/xvda")
            .ebs(EbsInstanceBlockDevice::builder().volume_id("vol-1").build())
            .build();
        let ephemeral = InstanceBlockDeviceMapping::builder()
            .device_name("/dev/sdb")
            .build();
        assert_eq!(Some(VolumeId::new("vol-1")), volume_id_of(&ebs));
        assert_eq!(None, volume_id_of(&ephemeral));
    }

    #[test]
    fn snapshot_is_converted() {
        let snapshot = Snapshot::builder()
            .snapshot_id("snap-1")
            .volume_id("vol-1")
            .start_time(AwsDateTime::from_secs(1_716_174_000))
            .state(AwsSnapshotState::Completed)
            .build();
        let record = to_record(&VolumeId::new("vol-1"), &snapshot).unwrap();
        assert_eq!(SnapshotId::new("snap-1"), record.snapshot_id);
        assert_eq!(
            DateTime::<Utc>::from_timestamp(1_716_174_000, 0).unwrap(),
            record.started_at
        );
        assert!(record.is_completed());
    }

    #[test]
    fn pending_snapshot_keeps_state() {
        let snapshot = Snapshot::builder()
            .snapshot_id("snap-2")
            .start_time(AwsDateTime::from_secs(1_716_174_000))
            .state(AwsSnapshotState::Pending)
            .build();
        let record = to_record(&VolumeId::new("vol-1"), &snapshot).unwrap();
        assert_eq!(SnapshotState::Pending, record.state);
    }

    #[test]
    fn snapshot_without_start_time_is_skipped() {
        let snapshot = Snapshot::builder().snapshot_id("snap-3").build();
        assert_matches!(to_record(&VolumeId::new("vol-1"), &snapshot), None);
    }
}
