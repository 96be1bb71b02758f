use url::Url;

/// Title used when a page has no usable `<title>`.
pub const NO_TITLE_PLACEHOLDER: &str = "No Title Found";

/// Normalized view of one fetched job page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub title: String,
    /// Hostname of `link`, empty when the link has none.
    pub source: String,
    /// Visible body text collapsed to single spaces.
    pub details: String,
    pub link: String,
}

impl JobRecord {
    /// Builds a record from the pieces a page extractor produces.
    pub fn from_page(link: impl Into<String>, title: Option<&str>, visible_text: &str) -> Self {
        let link = link.into();
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(NO_TITLE_PLACEHOLDER)
            .to_string();
        Self {
            title,
            source: hostname_of(&link).unwrap_or_default(),
            details: collapse_whitespace(visible_text),
            link,
        }
    }

    /// First `max_chars` characters of `details`, never splitting a character.
    pub fn details_excerpt(&self, max_chars: usize) -> &str {
        match self.details.char_indices().nth(max_chars) {
            Some((end, _)) => &self.details[..end],
            None => &self.details,
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn hostname_of(link: &str) -> Option<String> {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}
