pub mod notification;
pub mod provider;
pub mod snapshot;
pub mod time;

use std::{
    borrow::Borrow,
    fmt::{Debug, Display},
    hash::Hash,
    marker::PhantomData,
    ops::Deref,
    sync::Arc,
};

pub use notification::{Notification, TopicAddress};
pub use provider::{ComputeDescription, NotificationSink, ProviderError, SnapshotDirectory};
pub use snapshot::{SnapshotRecord, SnapshotState};

/// Opaque identifier, cheap to clone. The marker type keeps instance, volume
/// and snapshot identifiers from being mixed up.
pub struct Name<T> {
    value: Arc<str>,
    phantom_data: PhantomData<fn(T) -> T>,
}

impl<T> Name<T> {
    #[must_use]
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Self {
            value: value.into(),
            phantom_data: PhantomData,
        }
    }
}

// Manual impls: deriving would require the marker to implement the traits.
impl<T> Clone for Name<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            phantom_data: PhantomData,
        }
    }
}

impl<T> PartialEq for Name<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Name<T> {}

impl<T> Hash for Name<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Display for Name<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> Debug for Name<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self, f)
    }
}

impl<T> Deref for Name<T> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T> Borrow<str> for Name<T> {
    fn borrow(&self) -> &str {
        self.deref()
    }
}

impl<T> From<&str> for Name<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T> From<String> for Name<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

pub struct InstanceMarker;

/// EC2 instance under inspection, e.g. `i-0123456789abcdef0`.
pub type InstanceId = Name<InstanceMarker>;

pub struct VolumeMarker;

/// EBS volume attached to the instance, e.g. `vol-0123456789abcdef0`.
pub type VolumeId = Name<VolumeMarker>;

pub struct SnapshotMarker;

pub type SnapshotId = Name<SnapshotMarker>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_compare_by_value() {
        let a = VolumeId::new("vol-1");
        let b = VolumeId::from("vol-1".to_string());
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b, VolumeId::new("vol-2")].into_iter().collect();
        assert_eq!(2, set.len());
    }

    #[test]
    fn debug_is_plain_value() {
        let instance_id = InstanceId::new("i-abc123");
        assert_eq!("i-abc123", format!("{instance_id:?}"));
        assert!(InstanceId::new("").is_empty());
    }
}
