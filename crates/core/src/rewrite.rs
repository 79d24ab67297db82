//! Rewrite engine with capability-gated backends and graceful degradation.
//!
//! The engine walks an ordered list of pluggable [`RewriteBackend`]s.
//! Each attempt checks the backend's availability snapshot, chunks the
//! input at sentence boundaries to respect the backend's size limit, and
//! awaits the chunks strictly in order (backend sessions may carry
//! conversational state). Any backend problem is a soft failure: it is
//! logged and the engine falls through to the next backend, ending at the
//! deterministic heuristic which always succeeds. `simplify` therefore
//! never fails outward.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::Domain;
use crate::heuristic;

/// Target simplification strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Word-level substitutions only.
    Light,
    /// Also restructures sentences.
    Moderate,
    /// Also reorganizes paragraphs into lists and headed sections.
    Deep,
}

impl Level {
    /// Numeric form used in persisted settings and CLI flags.
    pub fn as_u8(&self) -> u8 {
        match self {
            Level::Light => 1,
            Level::Moderate => 2,
            Level::Deep => 3,
        }
    }

    /// Builds a level from its numeric form, clamping out-of-range input.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 | 1 => Level::Light,
            2 => Level::Moderate,
            _ => Level::Deep,
        }
    }

    /// Shifts the level by a signed amount, saturating at the bounds.
    pub fn shifted(&self, delta: i8) -> Self {
        let value = (self.as_u8() as i8 + delta).clamp(1, 3);
        Level::from_u8(value as u8)
    }

    /// Requested rewrite tone for this level.
    pub fn tone(&self) -> Tone {
        match self {
            Level::Light => Tone::Casual,
            Level::Moderate => Tone::Neutral,
            Level::Deep => Tone::Formal,
        }
    }

    /// Requested output length for this level.
    pub fn length_hint(&self) -> LengthHint {
        match self {
            Level::Deep => LengthHint::Shorter,
            _ => LengthHint::AsIs,
        }
    }
}

/// Tone hint passed to backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Casual,
    Neutral,
    Formal,
}

/// Length hint passed to backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthHint {
    AsIs,
    Shorter,
}

/// Which rewriting path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Primary rewrite-style backend.
    Rewriter,
    /// Generative write-style backend.
    Writer,
    /// Prompted language-model backend.
    Prompt,
    /// Deterministic fallback.
    Heuristic,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Rewriter => "rewriter",
            BackendKind::Writer => "writer",
            BackendKind::Prompt => "prompt",
            BackendKind::Heuristic => "heuristic",
        }
    }
}

/// Availability snapshot for one backend, decided once per request.
#[derive(Debug, Clone)]
pub struct BackendCapability {
    pub available: bool,
    pub reason: Option<String>,
}

impl BackendCapability {
    pub fn ready() -> Self {
        Self { available: true, reason: None }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self { available: false, reason: Some(reason.into()) }
    }
}

/// Invocation parameters derived from a request, shared by every chunk.
#[derive(Debug, Clone)]
pub struct BackendParams {
    pub tone: Tone,
    pub length: LengthHint,
    pub level: Level,
    pub domain: Domain,
    /// Context instruction: the adaptive prompt when one was computed,
    /// otherwise a generic domain framing.
    pub context: String,
}

impl BackendParams {
    fn from_request(request: &SimplificationRequest) -> Self {
        let context = request.adaptive_prompt.clone().unwrap_or_else(|| {
            format!("This is {} content. Make it easier to understand.", request.domain)
        });
        Self {
            tone: request.level.tone(),
            length: request.level.length_hint(),
            level: request.level,
            domain: request.domain,
            context,
        }
    }
}

/// Error type for backend invocations. Always treated as soft.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// A pluggable text-rewriting capability.
///
/// Implementations may suspend for platform-determined time; the engine
/// optionally bounds each chunk call via [`EngineConfig::chunk_timeout`].
#[async_trait]
pub trait RewriteBackend: Send + Sync {
    /// Which slot in the result this backend reports as.
    fn kind(&self) -> BackendKind;

    /// Availability check. Must be fast and must not block on the rewrite
    /// machinery itself.
    fn capability(&self) -> BackendCapability;

    /// Largest chunk this backend accepts, in characters.
    fn max_chunk_len(&self) -> usize {
        1000
    }

    /// Rewrites a single chunk. Chunks of one request arrive strictly in
    /// order; the previous chunk's call completes before the next starts.
    async fn rewrite_chunk(&self, chunk: &str, params: &BackendParams) -> Result<String, BackendError>;
}

/// An immutable simplification request.
#[derive(Debug, Clone)]
pub struct SimplificationRequest {
    pub source_text: String,
    pub level: Level,
    pub domain: Domain,
    pub adaptive_prompt: Option<String>,
}

impl SimplificationRequest {
    pub fn new(source_text: impl Into<String>, level: Level, domain: Domain) -> Self {
        Self { source_text: source_text.into(), level, domain, adaptive_prompt: None }
    }

    pub fn with_adaptive_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.adaptive_prompt = Some(prompt.into());
        self
    }
}

/// The outcome of a simplification pass.
#[derive(Debug, Clone)]
pub struct SimplificationResult {
    pub simplified_text: String,
    pub level: Level,
    pub backend: BackendKind,
    pub elapsed: Duration,
}

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Optional bound on each chunk call. `None` preserves the historical
    /// unbounded-await behavior; `Some` treats expiry as a soft backend
    /// failure and falls through.
    pub chunk_timeout: Option<Duration>,
}

/// Orchestrates simplification across backends with heuristic fallback.
pub struct RewriteEngine {
    backends: Vec<Box<dyn RewriteBackend>>,
    config: EngineConfig,
}

impl RewriteEngine {
    /// Creates an engine over an ordered backend list. Order is preference
    /// order; the heuristic fallback is implicit and always last.
    pub fn new(backends: Vec<Box<dyn RewriteBackend>>) -> Self {
        Self { backends, config: EngineConfig::default() }
    }

    /// Creates an engine with no backends: every request takes the
    /// deterministic heuristic path.
    pub fn heuristic_only() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Splits text into chunks at sentence boundaries, each at most
    /// `max_len` characters (single oversized sentences pass through
    /// whole rather than being cut mid-word).
    pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
        let sentences = text
            .split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in sentences {
            if !current.is_empty() && current.chars().count() + sentence.chars().count() > max_len {
                chunks.push(current.trim().to_string());
                current = String::new();
            }
            current.push_str(sentence);
            current.push_str(". ");
        }

        if !current.trim().is_empty() {
            chunks.push(current.trim().to_string());
        }

        chunks
    }

    /// Simplifies the request, degrading through backends to the heuristic.
    ///
    /// Never fails: for any input and any combination of backend
    /// availability (including none), the result carries non-empty text
    /// whenever the input has any.
    pub async fn simplify(&self, request: &SimplificationRequest) -> SimplificationResult {
        let started = Instant::now();

        // Capability snapshot for the whole request; not re-queried mid-flow.
        let capabilities: Vec<BackendCapability> =
            self.backends.iter().map(|b| b.capability()).collect();

        for (backend, capability) in self.backends.iter().zip(capabilities) {
            if !capability.available {
                debug!(
                    backend = backend.kind().as_str(),
                    reason = capability.reason.as_deref().unwrap_or("not ready"),
                    "skipping unavailable backend"
                );
                continue;
            }

            if let Some(text) = self.run_backend(backend.as_ref(), request).await {
                return SimplificationResult {
                    simplified_text: text,
                    level: request.level,
                    backend: backend.kind(),
                    elapsed: started.elapsed(),
                };
            }
        }

        let simplified_text = heuristic::simplify(&request.source_text, request.level);
        SimplificationResult {
            simplified_text,
            level: request.level,
            backend: BackendKind::Heuristic,
            elapsed: started.elapsed(),
        }
    }

    /// Runs one backend over all chunks sequentially. Any error, timeout,
    /// or blank output is a soft failure reported as `None`.
    async fn run_backend(
        &self,
        backend: &dyn RewriteBackend,
        request: &SimplificationRequest,
    ) -> Option<String> {
        let params = BackendParams::from_request(request);
        let chunks = Self::chunk_text(&request.source_text, backend.max_chunk_len());
        let mut rewritten = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            let call = backend.rewrite_chunk(chunk, &params);
            let outcome = match self.config.chunk_timeout {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            backend = backend.kind().as_str(),
                            timeout_ms = limit.as_millis() as u64,
                            "backend chunk timed out, falling through"
                        );
                        return None;
                    }
                },
                None => call.await,
            };

            match outcome {
                Ok(text) => rewritten.push(text),
                Err(error) => {
                    warn!(
                        backend = backend.kind().as_str(),
                        %error,
                        "backend failed, falling through"
                    );
                    return None;
                }
            }
        }

        let joined = rewritten.join("\n\n");
        if joined.trim().is_empty() { None } else { Some(joined) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubBackend {
        kind: BackendKind,
        capability: BackendCapability,
        response: Option<&'static str>,
    }

    #[async_trait]
    impl RewriteBackend for StubBackend {
        fn kind(&self) -> BackendKind {
            self.kind
        }

        fn capability(&self) -> BackendCapability {
            self.capability.clone()
        }

        async fn rewrite_chunk(&self, _chunk: &str, _params: &BackendParams) -> Result<String, BackendError> {
            match self.response {
                Some(text) => Ok(text.to_string()),
                None => Err("backend exploded".into()),
            }
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl RewriteBackend for SlowBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Rewriter
        }

        fn capability(&self) -> BackendCapability {
            BackendCapability::ready()
        }

        async fn rewrite_chunk(&self, chunk: &str, _params: &BackendParams) -> Result<String, BackendError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(chunk.to_string())
        }
    }

    #[test]
    fn test_level_numeric_roundtrip() {
        assert_eq!(Level::from_u8(1), Level::Light);
        assert_eq!(Level::from_u8(2), Level::Moderate);
        assert_eq!(Level::from_u8(3), Level::Deep);
        assert_eq!(Level::from_u8(0), Level::Light);
        assert_eq!(Level::from_u8(9), Level::Deep);
        assert_eq!(Level::Deep.as_u8(), 3);
    }

    #[test]
    fn test_level_shift_saturates() {
        assert_eq!(Level::Light.shifted(-1), Level::Light);
        assert_eq!(Level::Light.shifted(1), Level::Moderate);
        assert_eq!(Level::Deep.shifted(1), Level::Deep);
        assert_eq!(Level::Deep.shifted(-2), Level::Light);
    }

    #[test]
    fn test_chunking_respects_limit() {
        let text = "First sentence here. Second sentence here. Third sentence here. Fourth one closes.";
        let chunks = RewriteEngine::chunk_text(text, 45);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            // an oversized single sentence may pass through whole, but these fit
            assert!(chunk.chars().count() <= 50, "chunk too large: {}", chunk);
        }
        assert!(chunks[0].starts_with("First sentence"));
    }

    #[test]
    fn test_chunking_keeps_all_sentences() {
        let text = "Alpha one. Beta two. Gamma three.";
        let chunks = RewriteEngine::chunk_text(text, 15);
        let joined = chunks.join(" ");
        for word in ["Alpha", "Beta", "Gamma"] {
            assert!(joined.contains(word));
        }
    }

    #[tokio::test]
    async fn test_all_backends_unavailable_uses_heuristic() {
        let engine = RewriteEngine::new(vec![
            Box::new(StubBackend {
                kind: BackendKind::Rewriter,
                capability: BackendCapability::unavailable("model not downloaded"),
                response: Some("should not appear"),
            }),
            Box::new(StubBackend {
                kind: BackendKind::Writer,
                capability: BackendCapability::unavailable("disabled"),
                response: Some("should not appear"),
            }),
        ]);

        let request =
            SimplificationRequest::new("We utilize numerous tools.", Level::Light, Domain::General);
        let result = engine.simplify(&request).await;

        assert_eq!(result.backend, BackendKind::Heuristic);
        assert_eq!(result.simplified_text, "We use many tools.");
        assert!(!result.simplified_text.is_empty());
    }

    #[tokio::test]
    async fn test_failing_backend_falls_through() {
        let engine = RewriteEngine::new(vec![
            Box::new(StubBackend {
                kind: BackendKind::Rewriter,
                capability: BackendCapability::ready(),
                response: None, // errors at runtime
            }),
            Box::new(StubBackend {
                kind: BackendKind::Prompt,
                capability: BackendCapability::ready(),
                response: Some("Rewritten plainly."),
            }),
        ]);

        let request = SimplificationRequest::new("Anything at all.", Level::Moderate, Domain::News);
        let result = engine.simplify(&request).await;

        assert_eq!(result.backend, BackendKind::Prompt);
        assert_eq!(result.simplified_text, "Rewritten plainly.");
    }

    #[tokio::test]
    async fn test_blank_backend_output_counts_as_failure() {
        let engine = RewriteEngine::new(vec![Box::new(StubBackend {
            kind: BackendKind::Writer,
            capability: BackendCapability::ready(),
            response: Some("   "),
        })]);

        let request = SimplificationRequest::new("We utilize tools.", Level::Light, Domain::General);
        let result = engine.simplify(&request).await;

        assert_eq!(result.backend, BackendKind::Heuristic);
        assert_eq!(result.simplified_text, "We use tools.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_chunk_timeout_is_soft_failure() {
        let engine = RewriteEngine::new(vec![Box::new(SlowBackend)])
            .with_config(EngineConfig { chunk_timeout: Some(Duration::from_millis(100)) });

        let request = SimplificationRequest::new("We utilize tools.", Level::Light, Domain::General);
        let result = engine.simplify(&request).await;

        assert_eq!(result.backend, BackendKind::Heuristic);
    }

    #[tokio::test]
    async fn test_heuristic_guarantee_over_availability_grid() {
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let flag = |on: bool| {
                if on { BackendCapability::ready() } else { BackendCapability::unavailable("off") }
            };
            let engine = RewriteEngine::new(vec![
                Box::new(StubBackend { kind: BackendKind::Rewriter, capability: flag(a), response: Some("A out") }),
                Box::new(StubBackend { kind: BackendKind::Writer, capability: flag(b), response: Some("B out") }),
            ]);

            let request =
                SimplificationRequest::new("Some sufficient input.", Level::Light, Domain::General);
            let result = engine.simplify(&request).await;
            assert!(!result.simplified_text.trim().is_empty());

            let expected = if a {
                BackendKind::Rewriter
            } else if b {
                BackendKind::Writer
            } else {
                BackendKind::Heuristic
            };
            assert_eq!(result.backend, expected);
        }
    }

    #[test]
    fn test_adaptive_prompt_flows_into_params() {
        let request = SimplificationRequest::new("Text.", Level::Moderate, Domain::Legal)
            .with_adaptive_prompt("Translate this legal text into plain English.");
        let params = BackendParams::from_request(&request);
        assert_eq!(params.context, "Translate this legal text into plain English.");
        assert_eq!(params.tone, Tone::Neutral);

        let plain = SimplificationRequest::new("Text.", Level::Deep, Domain::Medical);
        let params = BackendParams::from_request(&plain);
        assert!(params.context.contains("medical content"));
        assert_eq!(params.length, LengthHint::Shorter);
    }
}
