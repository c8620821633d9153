//! Chain-scoped record of attempted URLs.

use std::collections::BTreeSet;

/// Every URL attempted so far in one redirect chain.
///
/// Deliberately not `Clone`: the set is moved from hop to hop so exactly one
/// hop owns it at a time. Its length is the number of hops taken.
#[derive(Debug, PartialEq, Eq)]
pub struct VisitedUrls {
    urls: BTreeSet<String>,
}

impl VisitedUrls {
    /// Starts a chain at `initial` (already in canonical form).
    pub fn new(initial: impl Into<String>) -> Self {
        let mut urls = BTreeSet::new();
        urls.insert(initial.into());
        Self { urls }
    }

    /// Records `url`. Returns false if it was already visited.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Never true: a chain always holds its initial URL.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}
