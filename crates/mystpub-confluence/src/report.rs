//! Publish run results.

use crate::error::PublishError;
use crate::sink::PublishedPage;

/// Outcome of publishing one page.
#[derive(Debug)]
pub enum PageOutcome {
    /// Page was accepted by the sink.
    Published {
        /// Sink result.
        page: PublishedPage,
        /// Reference tokens that did not resolve.
        unresolved: Vec<String>,
    },
    /// Page failed; later pages were still processed.
    Failed(PublishError),
}

impl PageOutcome {
    /// True for [`PageOutcome::Published`].
    #[must_use]
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Per-page outcomes in traversal order.
#[derive(Debug, Default)]
pub struct PublishReport {
    outcomes: Vec<(String, PageOutcome)>,
}

impl PublishReport {
    /// Record the outcome for `slug`.
    pub fn record(&mut self, slug: impl Into<String>, outcome: PageOutcome) {
        self.outcomes.push((slug.into(), outcome));
    }

    /// Outcomes in traversal order.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &PageOutcome)> {
        self.outcomes.iter().map(|(slug, outcome)| (slug.as_str(), outcome))
    }

    /// Outcome for a slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&PageOutcome> {
        self.outcomes()
            .find(|(s, _)| *s == slug)
            .map(|(_, outcome)| outcome)
    }

    /// Number of pages recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of published pages.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_published()).count()
    }

    /// Failed pages with their errors, in traversal order.
    #[must_use]
    pub fn failed(&self) -> Vec<(&str, &PublishError)> {
        self.outcomes()
            .filter_map(|(slug, outcome)| match outcome {
                PageOutcome::Failed(error) => Some((slug, error)),
                PageOutcome::Published { .. } => None,
            })
            .collect()
    }

    /// Total number of unresolved references across published pages.
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                PageOutcome::Published { unresolved, .. } => unresolved.len(),
                PageOutcome::Failed(_) => 0,
            })
            .sum()
    }

    /// True if no page failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| o.is_published())
    }
}
