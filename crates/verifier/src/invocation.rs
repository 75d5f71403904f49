use crate::resolver::{deduplicate, resolve_attached_volumes};
use crate::verifier::{SnapshotVerifier, VerificationOutcome};
use crate::VerificationError;
use concepts::time::ClockFn;
use concepts::{ComputeDescription, InstanceId, VolumeId};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// What to do when checking or notifying one volume fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure, continue with the remaining volumes and fail the
    /// invocation at the end.
    #[default]
    Isolate,
    /// Stop at the first failure. Remaining volumes receive no notification.
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationConfig {
    pub failure_policy: FailurePolicy,
    /// Check a volume listed more than once only at its first position.
    pub deduplicate_volumes: bool,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            deduplicate_volumes: true,
        }
    }
}

#[derive(Debug)]
pub struct VolumeReport {
    pub volume_id: VolumeId,
    pub result: Result<VerificationOutcome, VerificationError>,
}

/// Per-volume results of one invocation, in processing order.
#[derive(Debug)]
pub struct InvocationReport {
    pub instance_id: InstanceId,
    pub volumes: Vec<VolumeReport>,
    /// Volumes never attempted because the invocation was aborted.
    pub skipped: Vec<VolumeId>,
}

impl InvocationReport {
    fn new(instance_id: InstanceId) -> Self {
        Self {
            instance_id,
            volumes: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Volumes whose notification was published.
    pub fn notified(&self) -> impl Iterator<Item = &VolumeId> {
        self.volumes
            .iter()
            .filter(|report| report.result.is_ok())
            .map(|report| &report.volume_id)
    }

    pub fn verified(&self) -> impl Iterator<Item = &VolumeId> {
        self.volumes
            .iter()
            .filter(|report| matches!(&report.result, Ok(outcome) if outcome.is_verified()))
            .map(|report| &report.volume_id)
    }

    pub fn unverified(&self) -> impl Iterator<Item = &VolumeId> {
        self.volumes
            .iter()
            .filter(|report| matches!(&report.result, Ok(VerificationOutcome::Unverified)))
            .map(|report| &report.volume_id)
    }

    pub fn failed(&self) -> impl Iterator<Item = (&VolumeId, &VerificationError)> {
        self.volumes.iter().filter_map(|report| {
            report
                .result
                .as_ref()
                .err()
                .map(|err| (&report.volume_id, err))
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.volumes.len() + self.skipped.len()
    }
}

impl Display for InvocationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "instance `{}`: {} volumes, {} verified, {} unverified, {} failed, {} skipped",
            self.instance_id,
            self.total(),
            self.verified().count(),
            self.unverified().count(),
            self.failed().count(),
            self.skipped.len()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error(transparent)]
    Resolution(VerificationError),
    /// The failed volume is the last entry of `report.volumes`.
    #[error("invocation aborted, {report}")]
    Aborted {
        report: Box<InvocationReport>,
        #[source]
        source: VerificationError,
    },
    #[error("some volumes could not be verified, {report}")]
    VolumesFailed { report: Box<InvocationReport> },
}

impl InvocationError {
    /// Per-volume results gathered before the failure, if any volume was
    /// attempted.
    #[must_use]
    pub fn report(&self) -> Option<&InvocationReport> {
        match self {
            InvocationError::Resolution(_) => None,
            InvocationError::Aborted { report, .. } | InvocationError::VolumesFailed { report } => {
                Some(report.as_ref())
            }
        }
    }
}

/// Resolve the instance's volumes, then verify and notify each of them in
/// order.
pub struct Invocation<C: ClockFn> {
    compute: Arc<dyn ComputeDescription>,
    verifier: SnapshotVerifier<C>,
    config: InvocationConfig,
}

impl<C: ClockFn> Invocation<C> {
    #[must_use]
    pub fn new(
        compute: Arc<dyn ComputeDescription>,
        verifier: SnapshotVerifier<C>,
        config: InvocationConfig,
    ) -> Self {
        Self {
            compute,
            verifier,
            config,
        }
    }

    #[instrument(skip_all, fields(%instance_id, policy = %self.config.failure_policy))]
    pub async fn run(&self, instance_id: &InstanceId) -> Result<InvocationReport, InvocationError> {
        let mut volumes = resolve_attached_volumes(self.compute.as_ref(), instance_id)
            .await
            .map_err(InvocationError::Resolution)?;
        if self.config.deduplicate_volumes {
            volumes = deduplicate(volumes);
        }
        info!("Checking {} volumes", volumes.len());

        let mut report = InvocationReport::new(instance_id.clone());
        let mut remaining = volumes.into_iter();
        while let Some(volume_id) = remaining.next() {
            match self.verifier.verify_and_notify(&volume_id, instance_id).await {
                Ok(outcome) => report.volumes.push(VolumeReport {
                    volume_id,
                    result: Ok(outcome),
                }),
                Err(err) if self.config.failure_policy == FailurePolicy::FailFast => {
                    error!(
                        %volume_id,
                        "Aborting: {}",
                        utils::error_chain(&err)
                    );
                    report.volumes.push(VolumeReport {
                        volume_id,
                        result: Err(err.clone()),
                    });
                    report.skipped = remaining.collect();
                    return Err(InvocationError::Aborted {
                        report: Box::new(report),
                        source: err,
                    });
                }
                Err(err) => {
                    error!(%volume_id, "{}", utils::error_chain(&err));
                    report.volumes.push(VolumeReport {
                        volume_id,
                        result: Err(err),
                    });
                }
            }
        }

        if report.failed().next().is_some() {
            return Err(InvocationError::VolumesFailed {
                report: Box::new(report),
            });
        }
        info!("Finished: {report}");
        Ok(report)
    }
}
