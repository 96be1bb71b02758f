use std::collections::HashSet;

use url::Url;

/// Links handled by earlier runs, in discovery order and without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessedLinkSet {
    links: Vec<String>,
    index: HashSet<String>,
}

impl ProcessedLinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from persisted links; later duplicates are dropped.
    pub fn from_links<I>(links: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut set = Self::new();
        set.extend_unique(links);
        set
    }

    pub fn contains(&self, link: &str) -> bool {
        self.index.contains(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.links
    }

    /// Appends `link` unless already present. Returns whether it was added.
    pub fn insert(&mut self, link: String) -> bool {
        if self.index.contains(&link) {
            return false;
        }
        self.index.insert(link.clone());
        self.links.push(link);
        true
    }

    /// Appends every link not yet present and returns how many were added.
    pub fn extend_unique<I>(&mut self, links: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        links
            .into_iter()
            .map(|link| self.insert(link))
            .filter(|added| *added)
            .count()
    }

    /// Keeps links that are neither processed nor repeated earlier in `links`.
    pub fn retain_unseen<I>(&self, links: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        links
            .into_iter()
            .filter(|link| !self.contains(link) && seen.insert(link.clone()))
            .collect()
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }
}

/// Reduces decoded search hits to candidate links, preserving document order.
///
/// Drops hits that are not absolute http(s) URLs, hits hosted on
/// `provider_domain` or one of its subdomains, processed links and repeats.
pub fn select_candidates<I>(hits: I, provider_domain: &str, processed: &ProcessedLinkSet) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let external = hits.into_iter().filter(|hit| {
        let Ok(url) = Url::parse(hit) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        match url.host_str() {
            Some(host) => !host_in_domain(host, provider_domain),
            None => false,
        }
    });
    processed.retain_unseen(external)
}

pub fn host_in_domain(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.');
    host.eq_ignore_ascii_case(domain)
        || host
            .to_ascii_lowercase()
            .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
}
