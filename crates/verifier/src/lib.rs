use concepts::{InstanceId, ProviderError, VolumeId};

pub mod invocation;
pub mod resolver;
pub mod verifier;

pub use invocation::{FailurePolicy, Invocation, InvocationConfig, InvocationError, InvocationReport};
pub use verifier::{SnapshotVerifier, VerificationOutcome};

#[derive(Debug, Clone, thiserror::Error)]
pub enum VerificationError {
    #[error("instance identifier must not be empty")]
    EmptyInstanceId,
    #[error("cannot resolve volumes attached to `{instance_id}`")]
    Resolution {
        instance_id: InstanceId,
        #[source]
        source: ProviderError,
    },
    #[error("cannot list snapshots of `{volume_id}`")]
    Query {
        volume_id: VolumeId,
        #[source]
        source: ProviderError,
    },
    #[error("cannot send notification for `{volume_id}`")]
    Notification {
        volume_id: VolumeId,
        #[source]
        source: ProviderError,
    },
}
