/// Eligibility decision for one job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Turns a free-text model reply into a verdict.
pub trait VerdictParser: Send + Sync {
    fn parse(&self, reply: &str) -> Verdict;
}

/// Accepts any reply whose uppercased text contains `YES`.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordVerdictParser;

impl VerdictParser for KeywordVerdictParser {
    fn parse(&self, reply: &str) -> Verdict {
        if reply.to_uppercase().contains("YES") {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }
}
