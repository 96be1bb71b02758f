use std::time::Duration;

use jobwatch_core::{JobRecord, Notification};
use jobwatch_logging::{watch_error, watch_info};
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use url::Url;

pub const NTFY_BASE_URL: &str = "https://ntfy.sh";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid notification endpoint: {0}")]
    Endpoint(String),
    #[error("notification request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notification service returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            base_url: NTFY_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(20),
        }
    }
}

/// Push delivery. Failures are logged by implementations and never surface.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_job(&self, record: &JobRecord);
    async fn notify_status(&self, dashboard_link: &str);
}

/// Publishes to one ntfy topic: `POST {base_url}/{topic}` with `Title`, `Click` and `Tags` headers.
pub struct NtfyNotifier {
    topic_url: Url,
    client: reqwest::Client,
}

impl NtfyNotifier {
    pub fn new(settings: NotifySettings, topic: &str) -> Result<Self, NotifyError> {
        let mut topic_url =
            Url::parse(&settings.base_url).map_err(|err| NotifyError::Endpoint(err.to_string()))?;
        topic_url
            .path_segments_mut()
            .map_err(|_| NotifyError::Endpoint(format!("{} cannot take a path", settings.base_url)))?
            .pop_if_empty()
            .push(topic);

        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self { topic_url, client })
    }

    pub async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.topic_url.clone())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .header("Title", notification.title.as_str())
            .header("Click", notification.click.as_str())
            .header("Tags", notification.tags.as_str())
            .body(notification.body.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn deliver(&self, notification: Notification) {
        match self.send(&notification).await {
            Ok(()) => watch_info!("Successfully sent notification: {}", notification.title),
            Err(err) => watch_error!(
                "Error sending notification '{}': {}",
                notification.title,
                err
            ),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for NtfyNotifier {
    async fn notify_job(&self, record: &JobRecord) {
        self.deliver(Notification::job_found(record)).await;
    }

    async fn notify_status(&self, dashboard_link: &str) {
        self.deliver(Notification::nothing_found(dashboard_link)).await;
    }
}
