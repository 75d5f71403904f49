use crate::VerificationError;
use chrono::{FixedOffset, NaiveDate};
use concepts::time::ClockFn;
use concepts::{
    InstanceId, Notification, NotificationSink, SnapshotDirectory, SnapshotId, SnapshotRecord,
    TopicAddress, VolumeId,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// A snapshot started today and reached `completed`.
    Verified { snapshot_id: SnapshotId },
    Unverified,
}

impl VerificationOutcome {
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified { .. })
    }
}

/// Decide whether any of `snapshots` was started on `today` and is completed.
/// Start times are projected into `offset` before taking their date.
#[must_use]
pub fn evaluate(
    snapshots: &[SnapshotRecord],
    today: NaiveDate,
    offset: FixedOffset,
) -> VerificationOutcome {
    snapshots
        .iter()
        .find(|snapshot| snapshot.is_completed() && snapshot.started_on(offset) == today)
        .map_or(VerificationOutcome::Unverified, |snapshot| {
            VerificationOutcome::Verified {
                snapshot_id: snapshot.snapshot_id.clone(),
            }
        })
}

/// Checks one volume at a time and publishes the result to the topic.
pub struct SnapshotVerifier<C: ClockFn> {
    snapshots: Arc<dyn SnapshotDirectory>,
    sink: Arc<dyn NotificationSink>,
    topic: TopicAddress,
    clock_fn: C,
    utc_offset: FixedOffset,
}

impl<C: ClockFn> SnapshotVerifier<C> {
    #[must_use]
    pub fn new(
        snapshots: Arc<dyn SnapshotDirectory>,
        sink: Arc<dyn NotificationSink>,
        topic: TopicAddress,
        clock_fn: C,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            snapshots,
            sink,
            topic,
            clock_fn,
            utc_offset,
        }
    }

    /// Query the snapshot history of `volume_id` and evaluate it against today.
    #[instrument(skip_all, fields(%volume_id))]
    pub async fn verify(
        &self,
        volume_id: &VolumeId,
    ) -> Result<VerificationOutcome, VerificationError> {
        let snapshots = self.snapshots.snapshots_of(volume_id).await.map_err(|source| {
            VerificationError::Query {
                volume_id: volume_id.clone(),
                source,
            }
        })?;
        let today = self.clock_fn.today(self.utc_offset);
        debug!(%today, "Queried {} snapshots", snapshots.len());
        let outcome = evaluate(&snapshots, today, self.utc_offset);
        match &outcome {
            VerificationOutcome::Verified { snapshot_id } => {
                info!(%snapshot_id, "Found a completed snapshot from today");
            }
            VerificationOutcome::Unverified => {
                warn!("No completed snapshot from {today}");
            }
        }
        Ok(outcome)
    }

    /// Verify `volume_id` and publish exactly one notification naming
    /// `instance_id`.
    #[instrument(skip_all, fields(%volume_id, %instance_id))]
    pub async fn verify_and_notify(
        &self,
        volume_id: &VolumeId,
        instance_id: &InstanceId,
    ) -> Result<VerificationOutcome, VerificationError> {
        let outcome = self.verify(volume_id).await?;
        let notification = Notification::for_outcome(outcome.is_verified(), instance_id);
        self.sink
            .publish(&self.topic, &notification)
            .await
            .map_err(|source| VerificationError::Notification {
                volume_id: volume_id.clone(),
                source,
            })?;
        debug!(subject = notification.subject, "Notified");
        Ok(outcome)
    }
}
