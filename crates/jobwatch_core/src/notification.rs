use crate::JobRecord;

pub const JOB_FOUND_TITLE: &str = "New Fresher Job Found!";
pub const JOB_FOUND_TAGS: &str = "briefcase";
pub const STATUS_TITLE: &str = "Job Search Complete";
pub const STATUS_BODY: &str = "No new relevant fresher jobs found in the last run.";
pub const STATUS_TAGS: &str = "search,x";

/// Push message content, independent of the delivery transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Opened when the notification is tapped.
    pub click: String,
    pub tags: String,
}

impl Notification {
    pub fn job_found(record: &JobRecord) -> Self {
        Self {
            title: JOB_FOUND_TITLE.to_string(),
            body: record.title.clone(),
            click: record.link.clone(),
            tags: JOB_FOUND_TAGS.to_string(),
        }
    }

    pub fn nothing_found(dashboard_link: &str) -> Self {
        Self {
            title: STATUS_TITLE.to_string(),
            body: STATUS_BODY.to_string(),
            click: dashboard_link.to_string(),
            tags: STATUS_TAGS.to_string(),
        }
    }
}
