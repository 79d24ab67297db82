//! Content-domain classification from source URLs.
//!
//! A [`Domain`] is the coarse topical category of a page (academic, legal,
//! medical, ...), derived purely from the hostname and path. It biases both
//! complexity scoring and rewrite instructions, and stays stable for the
//! lifetime of a page view.
//!
//! Rule order is part of the contract: specific hostname rules run before
//! generic path-keyword rules, so a government legal page classifies as
//! `Government` rather than the less informative `Legal`.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Coarse topical category of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Academic,
    Medical,
    Legal,
    Technical,
    Government,
    Finance,
    Wikipedia,
    News,
    General,
}

impl Domain {
    /// Lowercase identifier, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Academic => "academic",
            Domain::Medical => "medical",
            Domain::Legal => "legal",
            Domain::Technical => "technical",
            Domain::Government => "government",
            Domain::Finance => "finance",
            Domain::Wikipedia => "wikipedia",
            Domain::News => "news",
            Domain::General => "general",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a URL into a content [`Domain`].
///
/// Pure total function: the same URL always yields the same domain, and
/// anything unrecognized (including unparseable input) falls back to
/// [`Domain::General`]. Rules are evaluated top to bottom, first match wins.
///
/// # Example
///
/// ```rust
/// use claritas_core::domain::{Domain, classify_domain};
///
/// assert_eq!(classify_domain("https://en.wikipedia.org/wiki/Rust"), Domain::Wikipedia);
/// assert_eq!(classify_domain("https://example.com/blog"), Domain::General);
/// // .gov outranks the legal path keyword
/// assert_eq!(classify_domain("https://www.sec.gov/legal"), Domain::Government);
/// ```
pub fn classify_domain(url: &str) -> Domain {
    let (hostname, full) = match Url::parse(url) {
        Ok(parsed) => (
            parsed.host_str().unwrap_or_default().to_lowercase(),
            url.to_lowercase(),
        ),
        // Bare hostnames and fragments still classify on substring rules.
        Err(_) => (url.to_lowercase(), url.to_lowercase()),
    };

    // Academic / research hosts.
    if hostname.contains("wikipedia.org") {
        return Domain::Wikipedia;
    }
    if hostname.contains("arxiv.org") {
        return Domain::Academic;
    }
    if hostname.contains("pubmed.ncbi.nlm.nih.gov") {
        return Domain::Medical;
    }
    if hostname.contains("scholar.google") {
        return Domain::Academic;
    }
    if hostname.contains(".edu") {
        return Domain::Academic;
    }

    // Government before the legal path keywords: hostname evidence is the
    // stronger signal.
    if hostname.contains(".gov") {
        return Domain::Government;
    }
    if full.contains("terms") || full.contains("privacy") || full.contains("policy") {
        return Domain::Legal;
    }

    // Technical hosts and doc paths.
    if hostname.contains("github.com") || hostname.contains("stackoverflow.com") {
        return Domain::Technical;
    }
    if hostname.contains("docs.") || full.contains("/docs/") || hostname.contains("developer.") {
        return Domain::Technical;
    }

    // News and media.
    if hostname.contains("cnn.com")
        || hostname.contains("bbc.com")
        || hostname.contains("nytimes.com")
        || hostname.contains("reuters.com")
    {
        return Domain::News;
    }

    // Finance.
    if hostname.contains("bloomberg.com") || hostname.contains("wsj.com") {
        return Domain::Finance;
    }

    Domain::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_rules() {
        assert_eq!(classify_domain("https://en.wikipedia.org/wiki/Entropy"), Domain::Wikipedia);
        assert_eq!(classify_domain("https://arxiv.org/abs/2301.00001"), Domain::Academic);
        assert_eq!(
            classify_domain("https://pubmed.ncbi.nlm.nih.gov/12345678/"),
            Domain::Medical
        );
        assert_eq!(classify_domain("https://scholar.google.com/citations"), Domain::Academic);
        assert_eq!(classify_domain("https://www.mit.edu/research"), Domain::Academic);
        assert_eq!(classify_domain("https://www.usa.gov/benefits"), Domain::Government);
        assert_eq!(classify_domain("https://github.com/rust-lang/rust"), Domain::Technical);
        assert_eq!(
            classify_domain("https://stackoverflow.com/questions/1"),
            Domain::Technical
        );
        assert_eq!(classify_domain("https://docs.rs/scraper"), Domain::Technical);
        assert_eq!(classify_domain("https://www.bbc.com/news/world"), Domain::News);
        assert_eq!(classify_domain("https://www.bloomberg.com/markets"), Domain::Finance);
    }

    #[test]
    fn test_path_keyword_rules() {
        assert_eq!(classify_domain("https://example.com/terms"), Domain::Legal);
        assert_eq!(classify_domain("https://example.com/privacy"), Domain::Legal);
        assert_eq!(classify_domain("https://example.com/cookie-policy"), Domain::Legal);
        assert_eq!(classify_domain("https://example.com/docs/api"), Domain::Technical);
    }

    #[test]
    fn test_gov_outranks_legal_path() {
        // Rule precedence is observable behavior: the .gov hostname rule
        // fires before the legal path keyword and before any finance rule.
        assert_eq!(classify_domain("https://www.sec.gov/legal"), Domain::Government);
        assert_eq!(classify_domain("https://www.irs.gov/privacy"), Domain::Government);
    }

    #[test]
    fn test_default_and_stability() {
        assert_eq!(classify_domain("https://example.com/post/42"), Domain::General);
        assert_eq!(classify_domain("not a url at all"), Domain::General);
        // same input, same answer
        for _ in 0..3 {
            assert_eq!(classify_domain("https://www.wsj.com/articles/x"), Domain::Finance);
        }
    }

    #[test]
    fn test_display_roundtrip() {
        assert_eq!(Domain::Medical.to_string(), "medical");
        assert_eq!(Domain::General.as_str(), "general");
    }
}
