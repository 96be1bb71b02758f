use crate::JobRecord;

/// Side effects requested by [`crate::update`]; each one is answered with a [`crate::Msg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Answered with `SearchCompleted`. A failed search ends the run.
    Search,
    /// Answered with `PageFetched` or `PageFailed`.
    FetchPage { link: String },
    /// Answered with `Classified`.
    Classify { record: JobRecord },
    /// Answered with `NotificationSent`.
    NotifyJob { record: JobRecord },
    /// Replace the persisted link list. Answered with `Finalized`.
    PersistLinks { links: Vec<String> },
    /// Send the nothing-found status. Answered with `Finalized`.
    NotifyStatus,
}
