use crate::InstanceId;
use std::fmt::Display;

pub const SUCCESS_SUBJECT: &str = "【SUCCESS】aws snapshot backup";
pub const FAILURE_SUBJECT: &str = "【ERROR】aws snapshot backup";

/// Address of the messaging topic, an SNS topic ARN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub struct TopicAddress(String);

impl TopicAddress {
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Subject and body of one outbound alert. Has no identity beyond its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Both templates name the instance, not the volume that was checked.
    #[must_use]
    pub fn backup_succeeded(instance_id: &InstanceId) -> Self {
        Self {
            subject: SUCCESS_SUBJECT.to_string(),
            body: format!("Creating the snapshot of {instance_id} was successed."),
        }
    }

    #[must_use]
    pub fn backup_failed(instance_id: &InstanceId) -> Self {
        Self {
            subject: FAILURE_SUBJECT.to_string(),
            body: format!("Creating the snapshot of {instance_id} was failed."),
        }
    }

    #[must_use]
    pub fn for_outcome(verified: bool, instance_id: &InstanceId) -> Self {
        if verified {
            Self::backup_succeeded(instance_id)
        } else {
            Self::backup_failed(instance_id)
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.subject == SUCCESS_SUBJECT
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.subject, self.body)
    }
}
