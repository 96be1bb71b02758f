use std::collections::VecDeque;

use crate::{JobRecord, ProcessedLinkSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Init,
    Searching,
    Fetching,
    Classifying,
    Notifying,
    Finalizing,
    Done,
}

/// A candidate that was dropped because fetching it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLink {
    pub link: String,
    pub reason: String,
}

/// State of one run, advanced only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    stage: Stage,
    processed: ProcessedLinkSet,
    candidates: Vec<String>,
    pending: VecDeque<String>,
    current_link: Option<String>,
    current_record: Option<JobRecord>,
    accepted: Vec<String>,
    skipped: Vec<SkippedLink>,
}

impl RunState {
    pub fn new(processed: ProcessedLinkSet) -> Self {
        Self {
            processed,
            ..Self::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Links known to be processed. After finalizing this includes the accepted links.
    pub fn processed(&self) -> &ProcessedLinkSet {
        &self.processed
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn accepted(&self) -> &[String] {
        &self.accepted
    }

    pub fn skipped(&self) -> &[SkippedLink] {
        &self.skipped
    }

    pub fn current_link(&self) -> Option<&str> {
        self.current_link.as_deref()
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub(crate) fn set_candidates(&mut self, links: Vec<String>) {
        self.pending = links.iter().cloned().collect();
        self.candidates = links;
    }

    pub(crate) fn next_pending(&mut self) -> Option<String> {
        self.current_record = None;
        self.current_link = self.pending.pop_front();
        self.current_link.clone()
    }

    pub(crate) fn is_current(&self, link: &str) -> bool {
        self.current_link.as_deref() == Some(link)
    }

    pub(crate) fn set_current_record(&mut self, record: JobRecord) {
        self.current_record = Some(record);
    }

    pub(crate) fn current_record(&self) -> Option<&JobRecord> {
        self.current_record.as_ref()
    }

    pub(crate) fn accept(&mut self, link: String) {
        if !self.accepted.contains(&link) {
            self.accepted.push(link);
        }
    }

    pub(crate) fn skip(&mut self, link: String, reason: String) {
        self.skipped.push(SkippedLink { link, reason });
    }

    /// Merges accepted links into the processed set; returns the full list to persist.
    pub(crate) fn commit_accepted(&mut self) -> Vec<String> {
        self.processed.extend_unique(self.accepted.iter().cloned());
        self.processed.as_slice().to_vec()
    }
}
