//! In-memory implementations of the provider traits.
//!
//! Used by tests and by `snapcheck run --dry-run`, where snapshots are still
//! read from AWS but notifications only go to the log.

use async_trait::async_trait;
use concepts::{
    ComputeDescription, InstanceId, Notification, NotificationSink, ProviderError,
    SnapshotDirectory, SnapshotRecord, TopicAddress, VolumeId,
};
use hashbrown::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

#[derive(Default)]
pub struct InMemoryCompute {
    instances: HashMap<InstanceId, Vec<VolumeId>>,
    calls: AtomicUsize,
}

impl InMemoryCompute {
    #[must_use]
    pub fn with_instance(
        mut self,
        instance_id: impl Into<InstanceId>,
        volumes: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        self.instances.insert(
            instance_id.into(),
            volumes.into_iter().map(VolumeId::new).collect(),
        );
        self
    }

    /// Number of queries received, including failed ones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ComputeDescription for InMemoryCompute {
    async fn attached_volumes(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Vec<VolumeId>, ProviderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.instances.get(instance_id).cloned().ok_or_else(|| {
            ProviderError::new(
                "describe instance attribute",
                format!("instance `{instance_id}` not found"),
            )
        })
    }
}

#[derive(Default)]
pub struct InMemorySnapshots {
    snapshots: HashMap<VolumeId, Vec<SnapshotRecord>>,
    unavailable: HashSet<VolumeId>,
}

impl InMemorySnapshots {
    #[must_use]
    pub fn with_snapshot(mut self, record: SnapshotRecord) -> Self {
        self.snapshots
            .entry(record.volume_id.clone())
            .or_default()
            .push(record);
        self
    }

    /// Make every query for `volume_id` fail.
    #[must_use]
    pub fn unavailable_for(mut self, volume_id: impl Into<VolumeId>) -> Self {
        self.unavailable.insert(volume_id.into());
        self
    }
}

#[async_trait]
impl SnapshotDirectory for InMemorySnapshots {
    async fn snapshots_of(
        &self,
        volume_id: &VolumeId,
    ) -> Result<Vec<SnapshotRecord>, ProviderError> {
        if self.unavailable.contains(volume_id) {
            return Err(ProviderError::new(
                "describe snapshots",
                format!("snapshot directory unavailable for `{volume_id}`"),
            ));
        }
        Ok(self.snapshots.get(volume_id).cloned().unwrap_or_default())
    }
}

/// Keeps every successfully published notification in order.
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<(TopicAddress, Notification)>>,
    attempts: AtomicUsize,
    failing_attempts: HashSet<usize>,
}

impl RecordingSink {
    /// Make the `attempt`-th publish call (1-based) fail.
    #[must_use]
    pub fn failing_on_attempt(mut self, attempt: usize) -> Self {
        self.failing_attempts.insert(attempt);
        self
    }

    pub fn published(&self) -> Vec<Notification> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, notification)| notification.clone())
            .collect()
    }

    pub fn topics(&self) -> Vec<TopicAddress> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(
        &self,
        topic: &TopicAddress,
        notification: &Notification,
    ) -> Result<(), ProviderError> {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        if self.failing_attempts.contains(&attempt) {
            debug!(attempt, "Simulating publish failure");
            return Err(ProviderError::new(
                "publish",
                format!("topic `{topic}` rejected attempt {attempt}"),
            ));
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.clone(), notification.clone()));
        Ok(())
    }
}

/// Sink for dry runs: logs the notification instead of publishing it.
pub struct LoggingSink;

#[async_trait]
impl NotificationSink for LoggingSink {
    async fn publish(
        &self,
        topic: &TopicAddress,
        notification: &Notification,
    ) -> Result<(), ProviderError> {
        info!(
            %topic,
            subject = notification.subject,
            body = notification.body,
            "Dry run, not publishing"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use concepts::{SnapshotId, SnapshotState};

    #[tokio::test]
    async fn unknown_instance_is_an_error() {
        let compute = InMemoryCompute::default().with_instance("i-1", ["vol-1"]);
        assert_eq!(
            vec![VolumeId::new("vol-1")],
            compute.attached_volumes(&InstanceId::new("i-1")).await.unwrap()
        );
        assert_matches!(compute.attached_volumes(&InstanceId::new("i-2")).await, Err(_));
        assert_eq!(2, compute.calls());
    }

    #[tokio::test]
    async fn snapshots_are_grouped_by_volume() {
        let record = SnapshotRecord {
            snapshot_id: SnapshotId::new("snap-1"),
            volume_id: VolumeId::new("vol-1"),
            started_at: Utc::now(),
            state: SnapshotState::Pending,
        };
        let snapshots = InMemorySnapshots::default()
            .with_snapshot(record.clone())
            .unavailable_for("vol-3");
        assert_eq!(
            vec![record],
            snapshots.snapshots_of(&VolumeId::new("vol-1")).await.unwrap()
        );
        assert!(snapshots.snapshots_of(&VolumeId::new("vol-2")).await.unwrap().is_empty());
        assert_matches!(snapshots.snapshots_of(&VolumeId::new("vol-3")).await, Err(_));
    }

    #[tokio::test]
    async fn recording_sink_skips_failed_attempts() {
        let sink = RecordingSink::default().failing_on_attempt(2);
        let topic = TopicAddress::new("arn:aws:sns:us-east-1:1:topic");
        let instance_id = InstanceId::new("i-1");
        sink.publish(&topic, &Notification::backup_succeeded(&instance_id))
            .await
            .unwrap();
        assert_matches!(
            sink.publish(&topic, &Notification::backup_failed(&instance_id)).await,
            Err(_)
        );
        assert_eq!(2, sink.attempts());
        assert_eq!(vec![Notification::backup_succeeded(&instance_id)], sink.published());
        assert_eq!(vec![topic], sink.topics());
    }
}
