use crate::{SnapshotId, VolumeId};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::fmt::Display;

/// Lifecycle state of a snapshot as reported by the snapshot directory.
#[derive(Debug, Clone, PartialEq, Eq, strum::EnumString, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SnapshotState {
    Pending,
    Completed,
    Error,
    Recoverable,
    Recovering,
    /// A state this build does not know about. Never counts as completed.
    #[strum(default)]
    Unknown(String),
}

impl Display for SnapshotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotState::Unknown(state) => f.write_str(state),
            known => f.write_str(known.into()),
        }
    }
}

impl SnapshotState {
    /// Parse the provider's textual state. Unrecognized values are kept verbatim.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        // `Unknown` is the strum default, parsing cannot fail.
        input
            .parse()
            .unwrap_or_else(|_| SnapshotState::Unknown(input.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub snapshot_id: SnapshotId,
    pub volume_id: VolumeId,
    pub started_at: DateTime<Utc>,
    pub state: SnapshotState,
}

impl SnapshotRecord {
    /// Calendar date on which the snapshot was started, as seen in `offset`.
    #[must_use]
    pub fn started_on(&self, offset: FixedOffset) -> NaiveDate {
        self.started_at.with_timezone(&offset).date_naive()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == SnapshotState::Completed
    }
}
