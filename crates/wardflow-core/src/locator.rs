//! Locator data model.
//!
//! A `Locator` is an ordered list of candidate ways to find one logical UI
//! element. The same logical target (a submit button, a menu entry) is often
//! reachable through different selectors depending on application state, so
//! callers list every known strategy in preference order and let the resolver
//! walk the list.

use std::fmt;

/// How a single candidate pattern is evaluated against the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// CSS selector, e.g. `button[type='submit']`.
    Css,
    /// XPath expression, e.g. `//button[contains(., "Sign in")]`.
    XPath,
    /// Element whose trimmed text equals the pattern exactly.
    TextExact,
    /// Element whose text contains the pattern.
    TextContains,
    /// Element whose `aria-label` equals the pattern.
    AriaLabel,
}

/// One (strategy, pattern) pair inside a [`Locator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub strategy: Strategy,
    pub pattern: String,
}

impl Candidate {
    pub fn new(strategy: Strategy, pattern: impl Into<String>) -> Self {
        Self {
            strategy,
            pattern: pattern.into(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.strategy {
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::TextExact => "text",
            Strategy::TextContains => "text*",
            Strategy::AriaLabel => "aria",
        };
        write!(f, "{}={}", tag, self.pattern)
    }
}

/// Ordered list of candidates for one logical element.
///
/// Earlier entries are tried first. The list is evaluated once per resolution
/// attempt and never cached. An empty locator is constructible but always
/// fails resolution without issuing a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locator {
    candidates: Vec<Candidate>,
}

impl Locator {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn css(pattern: impl Into<String>) -> Self {
        Self::new(vec![Candidate::new(Strategy::Css, pattern)])
    }

    pub fn xpath(pattern: impl Into<String>) -> Self {
        Self::new(vec![Candidate::new(Strategy::XPath, pattern)])
    }

    pub fn text(pattern: impl Into<String>) -> Self {
        Self::new(vec![Candidate::new(Strategy::TextExact, pattern)])
    }

    pub fn text_contains(pattern: impl Into<String>) -> Self {
        Self::new(vec![Candidate::new(Strategy::TextContains, pattern)])
    }

    pub fn aria_label(pattern: impl Into<String>) -> Self {
        Self::new(vec![Candidate::new(Strategy::AriaLabel, pattern)])
    }

    pub fn or_css(mut self, pattern: impl Into<String>) -> Self {
        self.candidates.push(Candidate::new(Strategy::Css, pattern));
        self
    }

    pub fn or_xpath(mut self, pattern: impl Into<String>) -> Self {
        self.candidates
            .push(Candidate::new(Strategy::XPath, pattern));
        self
    }

    pub fn or_text(mut self, pattern: impl Into<String>) -> Self {
        self.candidates
            .push(Candidate::new(Strategy::TextExact, pattern));
        self
    }

    pub fn or_text_contains(mut self, pattern: impl Into<String>) -> Self {
        self.candidates
            .push(Candidate::new(Strategy::TextContains, pattern));
        self
    }

    pub fn or_aria_label(mut self, pattern: impl Into<String>) -> Self {
        self.candidates
            .push(Candidate::new(Strategy::AriaLabel, pattern));
        self
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.candidates.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
