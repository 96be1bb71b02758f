use crate::JobRecord;

/// How much of the page text the screening prompt carries.
pub const DETAILS_EXCERPT_CHARS: usize = 2000;

/// Screening prompt asking whether `record` is a fresher software role in Bengaluru.
///
/// The reply is expected to be a single `YES` or `NO`.
pub fn build_screening_prompt(record: &JobRecord) -> String {
    let source = if record.source.is_empty() {
        "N/A"
    } else {
        record.source.as_str()
    };
    format!(
        r#"
Please act as an expert HR screener. Analyze the following job posting.
My conditions are:
1. The job MUST be for a "fresher", "new graduate", "2025 batch", or 0 years experience.
2. The role MUST be for a "software developer", "software engineer", "programmer", "web developer", or similar coding role.
3. The location MUST be "Bengaluru" (Bangalore).

Job Details:
- Title: {title}
- Source: {source}
- Page Content (first {limit} chars): {details}

Based ONLY on this text, does this job meet ALL my conditions (1, 2, and 3)?
Respond with a single word: YES or NO.
"#,
        title = record.title,
        limit = DETAILS_EXCERPT_CHARS,
        details = record.details_excerpt(DETAILS_EXCERPT_CHARS),
    )
}
