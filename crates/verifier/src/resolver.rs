use crate::VerificationError;
use concepts::{ComputeDescription, InstanceId, VolumeId};
use indexmap::IndexSet;
use tracing::{debug, instrument, warn};

/// Volumes currently attached to `instance_id`, in discovery order.
///
/// An empty identifier is rejected before the provider is contacted. An
/// instance without volumes yields an empty list.
#[instrument(skip_all, fields(%instance_id))]
pub async fn resolve_attached_volumes(
    compute: &dyn ComputeDescription,
    instance_id: &InstanceId,
) -> Result<Vec<VolumeId>, VerificationError> {
    if instance_id.trim().is_empty() {
        return Err(VerificationError::EmptyInstanceId);
    }
    let volumes = compute
        .attached_volumes(instance_id)
        .await
        .map_err(|source| VerificationError::Resolution {
            instance_id: instance_id.clone(),
            source,
        })?;
    debug!("Resolved {} attached volumes: {volumes:?}", volumes.len());
    Ok(volumes)
}

/// Collapse repeated identifiers, keeping the first occurrence.
#[must_use]
pub fn deduplicate(volumes: Vec<VolumeId>) -> Vec<VolumeId> {
    let total = volumes.len();
    let unique: IndexSet<VolumeId> = volumes.into_iter().collect();
    if unique.len() != total {
        warn!(
            "Ignoring {} repeated volume identifiers",
            total - unique.len()
        );
    }
    unique.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use provider_mem::InMemoryCompute;
    use test_utils::set_up;

    #[tokio::test]
    async fn empty_instance_id_fails_before_provider_call() {
        set_up();
        let compute = InMemoryCompute::default().with_instance("", ["vol-1"]);
        let err = resolve_attached_volumes(&compute, &InstanceId::new(""))
            .await
            .unwrap_err();
        assert_matches!(err, VerificationError::EmptyInstanceId);
        assert_eq!(0, compute.calls());
    }

    #[tokio::test]
    async fn instance_without_volumes_resolves_to_empty_list() {
        set_up();
        let compute = InMemoryCompute::default().with_instance("i-abc123", []);
        let volumes = resolve_attached_volumes(&compute, &InstanceId::new("i-abc123"))
            .await
            .unwrap();
        assert!(volumes.is_empty());
        assert_eq!(1, compute.calls());
    }

    #[tokio::test]
    async fn provider_failure_is_a_resolution_error() {
        set_up();
        let compute = InMemoryCompute::default();
        let err = resolve_attached_volumes(&compute, &InstanceId::new("i-missing"))
            .await
            .unwrap_err();
        assert_matches!(err, VerificationError::Resolution { instance_id, .. } if &*instance_id == "i-missing");
    }

    #[tokio::test]
    async fn discovery_order_is_kept() {
        set_up();
        let compute =
            InMemoryCompute::default().with_instance("i-abc123", ["vol-2", "vol-1", "vol-2"]);
        let volumes = resolve_attached_volumes(&compute, &InstanceId::new("i-abc123"))
            .await
            .unwrap();
        assert_eq!(3, volumes.len());
        assert_eq!(
            vec![VolumeId::new("vol-2"), VolumeId::new("vol-1")],
            deduplicate(volumes)
        );
    }
}
