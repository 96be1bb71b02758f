//! Jobwatch core: domain types and the pure run state machine.
mod effect;
mod links;
mod msg;
mod notification;
mod prompt;
mod record;
mod state;
mod update;
mod verdict;

pub use effect::Effect;
pub use links::{host_in_domain, select_candidates, ProcessedLinkSet};
pub use msg::Msg;
pub use notification::{
    Notification, JOB_FOUND_TAGS, JOB_FOUND_TITLE, STATUS_BODY, STATUS_TAGS, STATUS_TITLE,
};
pub use prompt::{build_screening_prompt, DETAILS_EXCERPT_CHARS};
pub use record::{collapse_whitespace, hostname_of, JobRecord, NO_TITLE_PLACEHOLDER};
pub use state::{RunState, SkippedLink, Stage};
pub use update::update;
pub use verdict::{KeywordVerdictParser, Verdict, VerdictParser};
