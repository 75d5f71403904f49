//! Narrow interfaces to the external services the verifier talks to.
//!
//! Every call is a single read-only query or a single publish. Implementations
//! must not retry; failures are reported as an opaque [`ProviderError`].

use crate::{InstanceId, Notification, SnapshotRecord, TopicAddress, VolumeId};
use async_trait::async_trait;
use std::{borrow::Cow, error::Error, sync::Arc};

#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} failed")]
pub struct ProviderError {
    pub operation: Cow<'static, str>,
    #[source]
    pub source: Arc<dyn Error + Send + Sync>,
}

impl ProviderError {
    #[must_use]
    pub fn new(
        operation: impl Into<Cow<'static, str>>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            operation: operation.into(),
            source: Arc::from(source.into()),
        }
    }
}

/// Describes which volumes are attached to an instance.
#[async_trait]
pub trait ComputeDescription: Send + Sync {
    /// Volume identifiers in the order the provider lists the block device
    /// mappings. Non-volume mappings are not returned.
    async fn attached_volumes(&self, instance_id: &InstanceId)
    -> Result<Vec<VolumeId>, ProviderError>;
}

/// Lists the snapshots taken from a volume.
#[async_trait]
pub trait SnapshotDirectory: Send + Sync {
    async fn snapshots_of(&self, volume_id: &VolumeId)
    -> Result<Vec<SnapshotRecord>, ProviderError>;
}

/// Publishes a notification to a topic. Fire and forget, no acknowledgment
/// payload is returned.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(
        &self,
        topic: &TopicAddress,
        notification: &Notification,
    ) -> Result<(), ProviderError>;
}
