mod ec2;
mod session;
mod sns;

pub use ec2::Ec2Provider;
pub use session::{AwsSettings, InvocationContext, load_sdk_config};
pub use sns::SnsSink;
