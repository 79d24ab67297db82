//! Main simplification API.
//!
//! This module wires the pipeline together: locate the content region,
//! snapshot it, classify the domain, score complexity, adapt the target
//! level to the user's familiarity profile, rewrite, analyze confidence,
//! and rebuild the region. The main entry point is the [`Simplifier`]
//! struct, along with the [`simplify`] convenience function.
//!
//! # Example
//!
//! ```rust,no_run
//! use claritas_core::simplifier::{ClaritasConfig, Simplifier};
//! use claritas_core::store::StoredState;
//!
//! # async fn example(html: &str) -> claritas_core::Result<()> {
//! let simplifier = Simplifier::new();
//! let mut state = StoredState::default();
//! let page = simplifier
//!     .simplify_page(html, Some("https://example.com/article"), &mut state, 0)
//!     .await?;
//! println!("complexity {} via {}", page.complexity, page.result.backend.as_str());
//! # Ok(())
//! # }
//! ```

use tracing::debug;

use crate::complexity::score_complexity;
use crate::confidence::{AnalysisContext, ConfidenceReport, analyze_confidence};
use crate::context::{ContextDecision, adapt_context, update_profile};
use crate::domain::{Domain, classify_domain};
use crate::locate::{LocateConfig, locate_content};
use crate::parse::Document;
use crate::reconstruct::{
    ReconstructedRegion, RegionSnapshot, collect_preserved, reconstruct,
};
use crate::rewrite::{
    EngineConfig, Level, RewriteEngine, SimplificationRequest, SimplificationResult,
};
use crate::store::StoredState;
use crate::Result;

/// Reading-time estimate at 200 words per minute, rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTime {
    pub before_min: u64,
    pub after_min: u64,
    pub saved_min: u64,
    pub original_words: usize,
    pub simplified_words: usize,
}

/// Computes before/after reading time for a simplification.
pub fn reading_time(original: &str, simplified: &str) -> ReadingTime {
    let minutes = |words: usize| (words as u64).div_ceil(200);
    let original_words = original.split_whitespace().count();
    let simplified_words = simplified.split_whitespace().count();
    let before_min = minutes(original_words);
    let after_min = minutes(simplified_words);

    ReadingTime {
        before_min,
        after_min,
        saved_min: before_min.saturating_sub(after_min),
        original_words,
        simplified_words,
    }
}

/// Everything one simplification pass produced.
#[derive(Debug)]
pub struct PageSimplification {
    pub domain: Domain,
    pub complexity: u8,
    pub decision: ContextDecision,
    pub result: SimplificationResult,
    pub confidence: ConfidenceReport,
    pub region: ReconstructedRegion,
    /// Byte-exact original region; applying it back is the restore path.
    pub snapshot: RegionSnapshot,
    pub reading_time: ReadingTime,
}

/// Configuration for the full pipeline.
///
/// # Example
///
/// ```rust
/// use claritas_core::simplifier::ClaritasConfig;
/// use claritas_core::rewrite::Level;
///
/// let config = ClaritasConfig::builder()
///     .min_text_len(300)
///     .level_override(Level::Deep)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClaritasConfig {
    /// Content-location tuning.
    pub locate: LocateConfig,
    /// Rewrite-engine tuning.
    pub engine: EngineConfig,
    /// Fixed target level; `None` lets the context adapter decide.
    pub level_override: Option<Level>,
}

impl ClaritasConfig {
    /// Creates a new builder for ClaritasConfig.
    pub fn builder() -> ClaritasConfigBuilder {
        ClaritasConfigBuilder::new()
    }
}

/// Builder for [`ClaritasConfig`].
pub struct ClaritasConfigBuilder {
    config: ClaritasConfig,
}

impl ClaritasConfigBuilder {
    pub fn new() -> Self {
        Self { config: ClaritasConfig::default() }
    }

    /// Sets the minimum readable-text length for location candidates.
    pub fn min_text_len(mut self, value: usize) -> Self {
        self.config.locate.min_text_len = value;
        self
    }

    /// Sets the per-chunk backend timeout.
    pub fn chunk_timeout(mut self, value: std::time::Duration) -> Self {
        self.config.engine.chunk_timeout = Some(value);
        self
    }

    /// Pins the simplification level instead of adapting it.
    pub fn level_override(mut self, level: Level) -> Self {
        self.config.level_override = Some(level);
        self
    }

    pub fn build(self) -> ClaritasConfig {
        self.config
    }
}

impl Default for ClaritasConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the complete scoring and simplification pipeline.
pub struct Simplifier {
    config: ClaritasConfig,
    engine: RewriteEngine,
}

impl Simplifier {
    /// Creates a simplifier with default configuration and no rewrite
    /// backends (every request takes the deterministic heuristic path).
    pub fn new() -> Self {
        Self::with_config(ClaritasConfig::default())
    }

    /// Creates a simplifier with custom configuration.
    pub fn with_config(config: ClaritasConfig) -> Self {
        let engine = RewriteEngine::heuristic_only().with_config(config.engine.clone());
        Self { config, engine }
    }

    /// Replaces the rewrite engine, e.g. to register AI backends.
    pub fn with_engine(mut self, engine: RewriteEngine) -> Self {
        self.engine = engine.with_config(self.config.engine.clone());
        self
    }

    /// Simplifies one page.
    ///
    /// `state` is the caller's persisted snapshot: the profile and
    /// aggregate counters are updated in place and the caller persists
    /// them afterwards. `now_ms` stamps the profile visit; the core never
    /// reads the clock itself.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClaritasError::NoContent`] when no content region
    /// can be located; every later stage degrades instead of failing.
    pub async fn simplify_page(
        &self,
        html: &str,
        url: Option<&str>,
        state: &mut StoredState,
        now_ms: u64,
    ) -> Result<PageSimplification> {
        let doc = Document::parse(html)?;
        let located = locate_content(&doc, &self.config.locate)?;
        debug!(score = located.score, tag = %located.element.tag_name(), "located content region");

        // Snapshot before anything can mutate; restore depends on these bytes.
        let snapshot = RegionSnapshot::capture(&located.element);
        let preserved = collect_preserved(&located.element);
        let text = located.element.visible_text();

        let domain = url.map(classify_domain).unwrap_or(Domain::General);
        let complexity = score_complexity(&text, domain);
        let decision = adapt_context(domain, &text, &state.user_profile);
        let level = self.config.level_override.unwrap_or(decision.level);
        debug!(%domain, complexity, level = level.as_u8(), "scored page");

        let request = SimplificationRequest::new(text.clone(), level, domain)
            .with_adaptive_prompt(decision.adaptive_prompt.clone());
        let result = self.engine.simplify(&request).await;

        let context = AnalysisContext {
            domain: Some(domain),
            user_level: Some(state.user_profile.experience_level),
        };
        let confidence =
            analyze_confidence(&text, &result.simplified_text, &context, &state.confidence_feedback);

        let region = reconstruct(&result.simplified_text, &preserved);
        let reading_time = reading_time(&text, &result.simplified_text);

        state.record_simplification(reading_time.original_words, reading_time.simplified_words);
        update_profile(
            &mut state.user_profile,
            domain,
            complexity,
            result.elapsed.as_millis() as u64,
            now_ms,
        );

        Ok(PageSimplification {
            domain,
            complexity,
            decision,
            result,
            confidence,
            region,
            snapshot,
            reading_time,
        })
    }
}

impl Default for Simplifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Simplifies a page with default settings and a throwaway state snapshot.
pub async fn simplify(html: &str) -> Result<PageSimplification> {
    simplify_with_url(html, None).await
}

/// Simplifies a page, classifying the domain from its source URL.
pub async fn simplify_with_url(html: &str, url: Option<&str>) -> Result<PageSimplification> {
    let mut state = StoredState::default();
    Simplifier::new().simplify_page(html, url, &mut state, 0).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::BackendKind;

    fn article_html() -> String {
        let para = "The implementation of the methodology requires numerous considerations, although the approximately standard framework demonstrates sufficient flexibility for most organizations. ";
        format!(
            r#"<html><body>
                <nav>Home | About</nav>
                <article class="post-content">
                    <p>{0}</p>
                    <p>{0}</p>
                    <p>Read <a href="/background">the background piece</a> for history.</p>
                    <p>{0}</p>
                </article>
            </body></html>"#,
            para.repeat(3)
        )
    }

    #[tokio::test]
    async fn test_full_pipeline_heuristic_path() {
        let mut state = StoredState::default();
        let page = Simplifier::new()
            .simplify_page(&article_html(), Some("https://docs.example.com/docs/x"), &mut state, 42)
            .await
            .unwrap();

        assert_eq!(page.domain, Domain::Technical);
        assert!((1..=10).contains(&page.complexity));
        assert_eq!(page.result.backend, BackendKind::Heuristic);
        assert!(!page.result.simplified_text.is_empty());
        assert!(!page.region.html.is_empty());
        assert!((0.0..=1.0).contains(&page.confidence.confidence));

        // dictionary words got simplified
        assert!(!page.result.simplified_text.contains("utilize"));
        assert!(page.result.simplified_text.contains("method"));
    }

    #[tokio::test]
    async fn test_state_updated_after_pass() {
        let mut state = StoredState::default();
        let page = Simplifier::new()
            .simplify_page(&article_html(), Some("https://www.sec.gov/legal"), &mut state, 99)
            .await
            .unwrap();

        assert_eq!(page.domain, Domain::Government);
        assert_eq!(state.pages_simplified, 1);

        let profile = state.user_profile.domains.get(&Domain::Government).unwrap();
        assert_eq!(profile.visit_count, 1);
        assert_eq!(profile.max_complexity_handled, page.complexity);
        assert_eq!(profile.last_visit_ms, Some(99));
    }

    #[tokio::test]
    async fn test_no_content_is_hard_failure() {
        let mut state = StoredState::default();
        let result = Simplifier::new()
            .simplify_page("<html><body><nav>only nav</nav></body></html>", None, &mut state, 0)
            .await;

        assert!(matches!(result, Err(crate::ClaritasError::NoContent)));
        // a failed pass must not touch the counters
        assert_eq!(state.pages_simplified, 0);
    }

    #[tokio::test]
    async fn test_level_override() {
        let config = ClaritasConfig::builder().level_override(Level::Deep).build();
        let mut state = StoredState::default();
        let page = Simplifier::with_config(config)
            .simplify_page(&article_html(), None, &mut state, 0)
            .await
            .unwrap();

        assert_eq!(page.result.level, Level::Deep);
    }

    #[tokio::test]
    async fn test_snapshot_restores_original_bytes() {
        let html = article_html();
        let doc = Document::parse(&html).unwrap();
        let original = doc.select("article").unwrap()[0].outer_html();

        let page = simplify(&html).await.unwrap();
        assert_eq!(page.snapshot.html(), original);
        // the rewritten region is a different serialization
        assert_ne!(page.region.html, original);
    }

    #[test]
    fn test_reading_time_saved() {
        let original = "word ".repeat(600);
        let simplified = "word ".repeat(250);
        let rt = reading_time(&original, &simplified);

        assert_eq!(rt.before_min, 3);
        assert_eq!(rt.after_min, 2);
        assert_eq!(rt.saved_min, 1);
    }
}
