use async_trait::async_trait;
use aws_config::SdkConfig;
use concepts::{Notification, NotificationSink, ProviderError, TopicAddress};
use tracing::{debug, instrument};

/// Publishes notifications to an SNS topic.
#[derive(Clone)]
pub struct SnsSink {
    client: aws_sdk_sns::Client,
}

impl SnsSink {
    #[must_use]
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sns::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl NotificationSink for SnsSink {
    #[instrument(skip_all, fields(%topic, subject = notification.subject))]
    async fn publish(
        &self,
        topic: &TopicAddress,
        notification: &Notification,
    ) -> Result<(), ProviderError> {
        let output = self
            .client
            .publish()
            .topic_arn(topic.as_str())
            .subject(&notification.subject)
            .message(&notification.body)
            .send()
            .await
            .map_err(|err| ProviderError::new("Publish", err))?;
        debug!(message_id = output.message_id(), "Published");
        Ok(())
    }
}
