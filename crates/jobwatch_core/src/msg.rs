use crate::{JobRecord, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Begin the run.
    Start,
    /// Search returned these links, in document order.
    SearchCompleted { links: Vec<String> },
    /// The current candidate was fetched and extracted.
    PageFetched { record: JobRecord },
    /// The current candidate could not be fetched.
    PageFailed { link: String, reason: String },
    /// The classifier decided on the current candidate.
    Classified { link: String, verdict: Verdict },
    /// The job notification attempt finished, delivered or not.
    NotificationSent,
    /// Persisting or the status notification finished.
    Finalized,
}
