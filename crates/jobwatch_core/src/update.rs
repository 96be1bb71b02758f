use crate::{Effect, Msg, RunState, Stage, Verdict};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not fit the current stage are ignored.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match msg {
        Msg::Start => {
            if state.stage() != Stage::Init {
                return (state, Vec::new());
            }
            state.set_stage(Stage::Searching);
            vec![Effect::Search]
        }
        Msg::SearchCompleted { links } => {
            if state.stage() != Stage::Searching {
                return (state, Vec::new());
            }
            let candidates = state.processed().retain_unseen(links);
            state.set_candidates(candidates);
            advance(&mut state)
        }
        Msg::PageFetched { record } => {
            if state.stage() != Stage::Fetching || !state.is_current(&record.link) {
                return (state, Vec::new());
            }
            state.set_stage(Stage::Classifying);
            state.set_current_record(record.clone());
            vec![Effect::Classify { record }]
        }
        Msg::PageFailed { link, reason } => {
            if state.stage() != Stage::Fetching || !state.is_current(&link) {
                return (state, Vec::new());
            }
            state.skip(link, reason);
            advance(&mut state)
        }
        Msg::Classified { link, verdict } => {
            if state.stage() != Stage::Classifying || !state.is_current(&link) {
                return (state, Vec::new());
            }
            let record = state.current_record().cloned();
            match (verdict, record) {
                (Verdict::Accepted, Some(record)) => {
                    state.accept(link);
                    state.set_stage(Stage::Notifying);
                    vec![Effect::NotifyJob { record }]
                }
                _ => advance(&mut state),
            }
        }
        Msg::NotificationSent => {
            if state.stage() != Stage::Notifying {
                return (state, Vec::new());
            }
            advance(&mut state)
        }
        Msg::Finalized => {
            if state.stage() != Stage::Finalizing {
                return (state, Vec::new());
            }
            state.set_stage(Stage::Done);
            Vec::new()
        }
    };

    (state, effects)
}

/// Moves to the next candidate, or to finalizing once none are left.
fn advance(state: &mut RunState) -> Vec<Effect> {
    if let Some(link) = state.next_pending() {
        state.set_stage(Stage::Fetching);
        return vec![Effect::FetchPage { link }];
    }

    state.set_stage(Stage::Finalizing);
    if state.accepted().is_empty() {
        vec![Effect::NotifyStatus]
    } else {
        let links = state.commit_accepted();
        vec![Effect::PersistLinks { links }]
    }
}
