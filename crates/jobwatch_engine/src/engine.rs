use std::collections::VecDeque;
use std::time::Duration;

use jobwatch_core::{update, Effect, Msg, ProcessedLinkSet, RunState, SkippedLink};
use jobwatch_logging::{watch_error, watch_info, watch_warn};
use thiserror::Error;

use crate::classify::Classifier;
use crate::fetch::PageFetcher;
use crate::notify::Notifier;
use crate::persist::LinkStore;
use crate::search::{SearchError, SearchProvider, TimeWindow};

pub const DEFAULT_QUERY: &str =
    r#""walk-in interview" AND ("fresher" OR "2025 batch") AND "developer" in Bangalore"#;

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub query: String,
    pub window: TimeWindow,
    /// Pause before every page fetch.
    pub fetch_delay: Duration,
    /// Click target of the nothing-found notification.
    pub dashboard_link: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            window: TimeWindow::PastWeek,
            fetch_delay: Duration::from_secs(1),
            dashboard_link: String::new(),
        }
    }
}

/// The collaborators a run talks to.
pub struct RunServices {
    pub search: Box<dyn SearchProvider>,
    pub fetcher: Box<dyn PageFetcher>,
    pub classifier: Box<dyn Classifier>,
    pub notifier: Box<dyn Notifier>,
    pub store: Box<dyn LinkStore>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// Nothing was accepted, the state file was left alone.
    Unchanged,
    Saved { added: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub candidates: Vec<String>,
    pub accepted: Vec<String>,
    pub skipped: Vec<SkippedLink>,
    pub persistence: Persistence,
}

/// Executes one run: drives [`jobwatch_core::update`] and performs each
/// requested effect in order, one at a time.
pub struct RunEngine {
    settings: RunSettings,
    services: RunServices,
}

impl RunEngine {
    pub fn new(settings: RunSettings, services: RunServices) -> Self {
        Self { settings, services }
    }

    pub async fn run(&self) -> Result<RunReport, RunError> {
        let processed = ProcessedLinkSet::from_links(self.services.store.load());
        watch_info!("Loaded {} previously processed jobs.", processed.len());

        let mut persistence = Persistence::Unchanged;
        let mut pending = VecDeque::new();
        let (mut state, effects) = update(RunState::new(processed), Msg::Start);
        pending.extend(effects);

        while let Some(effect) = pending.pop_front() {
            let msg = self.execute(effect, &state, &mut persistence).await?;
            let (next, effects) = update(state, msg);
            state = next;
            pending.extend(effects);
        }

        Ok(RunReport {
            candidates: state.candidates().to_vec(),
            accepted: state.accepted().to_vec(),
            skipped: state.skipped().to_vec(),
            persistence,
        })
    }

    async fn execute(
        &self,
        effect: Effect,
        state: &RunState,
        persistence: &mut Persistence,
    ) -> Result<Msg, RunError> {
        let msg = match effect {
            Effect::Search => {
                let links = self
                    .services
                    .search
                    .search(&self.settings.query, self.settings.window, state.processed())
                    .await?;
                if links.is_empty() {
                    watch_info!("No new job links found in search results.");
                } else {
                    watch_info!("Found {} new, unprocessed links to check.", links.len());
                }
                Msg::SearchCompleted { links }
            }
            Effect::FetchPage { link } => {
                watch_info!("Processing link: {}", link);
                if !self.settings.fetch_delay.is_zero() {
                    tokio::time::sleep(self.settings.fetch_delay).await;
                }
                match self.services.fetcher.fetch(&link).await {
                    Ok(record) => Msg::PageFetched { record },
                    Err(err) => {
                        watch_warn!("Could not process link {}. Error: {}", link, err);
                        Msg::PageFailed {
                            link,
                            reason: err.to_string(),
                        }
                    }
                }
            }
            Effect::Classify { record } => {
                let verdict = self.services.classifier.classify(&record).await;
                Msg::Classified {
                    link: record.link,
                    verdict,
                }
            }
            Effect::NotifyJob { record } => {
                self.services.notifier.notify_job(&record).await;
                Msg::NotificationSent
            }
            Effect::PersistLinks { links } => {
                let added = state.accepted().len();
                *persistence = match self.services.store.save(&links) {
                    Ok(()) => {
                        watch_info!("Finished. Added {} new jobs to processed list.", added);
                        Persistence::Saved { added }
                    }
                    Err(err) => {
                        watch_error!("Failed to save processed links: {}", err);
                        Persistence::Failed {
                            reason: err.to_string(),
                        }
                    }
                };
                Msg::Finalized
            }
            Effect::NotifyStatus => {
                watch_info!(
                    "No new relevant jobs were found in this run. Sending a status notification."
                );
                self.services
                    .notifier
                    .notify_status(&self.settings.dashboard_link)
                    .await;
                Msg::Finalized
            }
        };
        Ok(msg)
    }
}
