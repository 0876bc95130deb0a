//! Team notification delivery.

use async_trait::async_trait;
use parking_lot::Mutex;

use mlgate_core::Notification;

use super::CollaboratorError;

/// Publishes notifications to a topic.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(
        &self,
        topic_arn: &str,
        notification: &Notification,
    ) -> Result<(), CollaboratorError>;

    /// Notifier name for diagnostics.
    fn name(&self) -> &str;
}

/// Keeps every published notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    published: Mutex<Vec<(String, Notification)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications published so far, with their topic.
    pub fn published(&self) -> Vec<(String, Notification)> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(
        &self,
        topic_arn: &str,
        notification: &Notification,
    ) -> Result<(), CollaboratorError> {
        self.published
            .lock()
            .push((topic_arn.to_string(), notification.clone()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Emits notifications as log records instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(
        &self,
        topic_arn: &str,
        notification: &Notification,
    ) -> Result<(), CollaboratorError> {
        tracing::info!(
            topic_arn,
            subject = %notification.subject,
            message = %notification.message,
            "Notification"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// POSTs notifications as JSON to a webhook.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl WebhookNotifier {
    pub fn new(
        url: impl Into<String>,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self, CollaboratorError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CollaboratorError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Notifier for WebhookNotifier {
    async fn publish(
        &self,
        topic_arn: &str,
        notification: &Notification,
    ) -> Result<(), CollaboratorError> {
        let body = serde_json::json!({
            "TopicArn": topic_arn,
            "Subject": notification.subject,
            "Message": notification.message,
            "MessageStructure": notification.message_structure,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::ApiError {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_notifier_keeps_topic() {
        let notifier = RecordingNotifier::new();
        let notification =
            Notification::process_completed(&serde_json::json!({ "step": "deploy" })).unwrap();

        notifier
            .publish("arn:aws:sns:eu-west-1:123456789012:ml-team", &notification)
            .await
            .unwrap();

        let published = notifier.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "arn:aws:sns:eu-west-1:123456789012:ml-team");
        assert_eq!(published[0].1, notification);
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_webhook_posts_notification() {
        let server = crate::testing::StubServer::start(vec![(200, "{}")]).await;
        let notifier = WebhookNotifier::new(server.url.clone(), None).unwrap();
        let notification =
            Notification::process_completed(&serde_json::json!({ "validated": "true" })).unwrap();

        notifier
            .publish("arn:aws:sns:eu-west-1:123456789012:ml-team", &notification)
            .await
            .unwrap();

        let body = server.requests()[0].json();
        assert_eq!(body["TopicArn"], "arn:aws:sns:eu-west-1:123456789012:ml-team");
        assert_eq!(body["Subject"], "ML process completed");
        assert_eq!(body["MessageStructure"], "json");
        assert_eq!(body["Message"], notification.message);
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_webhook_rejection_is_api_error() {
        let server = crate::testing::StubServer::start(vec![(500, "topic unavailable")]).await;
        let notifier = WebhookNotifier::new(server.url.clone(), None).unwrap();
        let notification = Notification::process_completed(&serde_json::json!({})).unwrap();

        let err = notifier.publish("topic", &notification).await.unwrap_err();
        assert!(matches!(
            err,
            CollaboratorError::ApiError { status: 500, ref message } if message == "topic unavailable"
        ));
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        let notification = Notification::process_completed(&serde_json::json!({})).unwrap();
        assert!(LogNotifier.publish("topic", &notification).await.is_ok());
        assert_eq!(LogNotifier.name(), "log");
    }
}
