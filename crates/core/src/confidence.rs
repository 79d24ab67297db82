//! Post-hoc confidence analysis over (original, simplified) pairs.
//!
//! Produces a [`ConfidenceReport`] independent of which backend did the
//! rewriting: six weighted factors, threshold-derived flags, and
//! recommendations. Analysis never fails outward — degenerate input yields
//! a fixed default report instead of an error, because a broken confidence
//! estimate must not take down a successful simplification.
//!
//! The only persisted input is the user-feedback store, passed in as a
//! snapshot and keyed by a content fingerprint.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::context::ExperienceLevel;
use crate::domain::Domain;

const HIGH_THRESHOLD: f64 = 0.8;
const MEDIUM_THRESHOLD: f64 = 0.6;
const LOW_THRESHOLD: f64 = 0.4;

/// Uncertainty-indicating patterns scanned over the *original* text, each
/// with its contribution weight.
static UNCERTAINTY_PATTERNS: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"(?i)\b(might|could|perhaps|possibly|maybe|likely|probably)\b").unwrap(), 0.3),
        (Regex::new(r"(?i)\b(unclear|ambiguous|uncertain|vague)\b").unwrap(), 0.5),
        (Regex::new(r"\b[A-Z]{3,}\b").unwrap(), 0.2),
        (Regex::new(r"\b\w{15,}\b").unwrap(), 0.3),
        (Regex::new(r"[()\[\]{}]").unwrap(), 0.1),
        (Regex::new(r"[,;:]{2,}").unwrap(), 0.4),
        (Regex::new(r"(?i)\b(however|nevertheless|furthermore|moreover|consequently)\b").unwrap(), 0.2),
        (Regex::new(r"(?i)\b(approximately|roughly|about|around|estimated)\b").unwrap(), 0.3),
        (Regex::new(r"(?i)\b(according to|allegedly|reportedly|supposedly)\b").unwrap(), 0.4),
    ]
});

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());
static GRAMMAR_ISSUES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\ba\s+[aeiou]").unwrap(),
        Regex::new(r"\s{2,}").unwrap(),
        Regex::new(r"[.!?]{2,}").unwrap(),
    ]
});

/// Confidence band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Flag severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// What a flag is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    Warning,
    Uncertainty,
    Complexity,
    Similarity,
    AiUncertainty,
    Error,
}

/// A threshold-derived warning about the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFlag {
    pub kind: FlagKind,
    pub message: String,
    pub severity: Severity,
}

/// Suggested follow-up action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    Review,
    IncreaseSimplification,
    ClarifySource,
    CheckFeedback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendedAction,
    pub message: String,
    pub priority: Severity,
}

/// The six factor scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceFactors {
    pub text_similarity: f64,
    pub complexity_reduction: f64,
    pub uncertainty: f64,
    pub contextual_fit: f64,
    pub model_confidence: f64,
    pub user_feedback: f64,
}

impl ConfidenceFactors {
    /// Weighted combination; weights sum to 1.0.
    fn weighted_sum(&self) -> f64 {
        self.text_similarity * 0.20
            + self.complexity_reduction * 0.25
            + self.uncertainty * 0.15
            + self.contextual_fit * 0.15
            + self.model_confidence * 0.15
            + self.user_feedback * 0.10
    }
}

/// Situational inputs for contextual-fit scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisContext {
    pub domain: Option<Domain>,
    pub user_level: Option<ExperienceLevel>,
}

/// The analyzer's output. Recomputed per simplification pass, never
/// persisted as a source of truth.
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceReport {
    pub confidence: f64,
    pub level: ConfidenceLevel,
    pub factors: Option<ConfidenceFactors>,
    pub flags: Vec<ConfidenceFlag>,
    pub recommendations: Vec<Recommendation>,
    pub needs_review: bool,
}

/// One piece of user feedback on a specific (original, simplified) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackComment {
    pub text: String,
    pub is_positive: bool,
    pub timestamp_ms: u64,
}

/// Accumulated feedback for one content fingerprint. Append-only per key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackRecord {
    pub positive: u32,
    pub negative: u32,
    pub total: u32,
    pub comments: Vec<FeedbackComment>,
}

/// Persisted feedback snapshot, keyed by content fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackStore {
    pub entries: HashMap<String, FeedbackRecord>,
}

impl FeedbackStore {
    pub fn get(&self, fingerprint: &str) -> Option<&FeedbackRecord> {
        self.entries.get(fingerprint)
    }
}

/// Derives the stable fingerprint that keys feedback for a content pair.
///
/// Hashes the first 100 characters of each side, so small tail edits do
/// not orphan accumulated feedback.
pub fn content_fingerprint(original: &str, simplified: &str) -> String {
    let prefix = |s: &str| s.chars().take(100).collect::<String>();
    let mut hasher = Sha256::new();
    hasher.update(prefix(original).as_bytes());
    hasher.update(prefix(simplified).as_bytes());
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex[..20].to_string()
}

/// Records one piece of feedback into the store and returns the updated
/// aggregate. The caller persists the store.
pub fn record_feedback(
    store: &mut FeedbackStore,
    original: &str,
    simplified: &str,
    is_positive: bool,
    comment: Option<&str>,
    now_ms: u64,
) -> FeedbackRecord {
    let key = content_fingerprint(original, simplified);
    let record = store.entries.entry(key).or_default();

    if is_positive {
        record.positive += 1;
    } else {
        record.negative += 1;
    }
    record.total += 1;

    if let Some(text) = comment.filter(|c| !c.trim().is_empty()) {
        record.comments.push(FeedbackComment {
            text: text.to_string(),
            is_positive,
            timestamp_ms: now_ms,
        });
    }

    record.clone()
}

fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Word-overlap similarity blended with a length ratio.
fn text_similarity(original: &str, simplified: &str) -> f64 {
    let original_words = tokenize(original);
    let simplified_words = tokenize(simplified);
    let denominator = original_words.len().max(simplified_words.len());
    if denominator == 0 {
        return 0.0;
    }

    let common = original_words
        .iter()
        .filter(|w| simplified_words.contains(*w))
        .count();
    let overlap = common as f64 / denominator as f64;

    let (orig_len, simp_len) = (original.chars().count(), simplified.chars().count());
    let length_ratio = orig_len.min(simp_len) as f64 / orig_len.max(simp_len).max(1) as f64;

    overlap * 0.7 + length_ratio * 0.3
}

/// Internal complexity proxy, distinct from the user-facing 1-10 scorer.
fn complexity_proxy(text: &str) -> f64 {
    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let words = tokenize(text);
    if words.is_empty() {
        return 0.0;
    }

    let avg_sentence_len = words.len() as f64 / sentences as f64;
    let long = words.iter().filter(|w| w.chars().count() > 6).count();
    let long_ratio = long as f64 / words.len() as f64;

    avg_sentence_len / 20.0 + long_ratio * 2.0
}

/// Rewards the 30-70% reduction sweet spot; too little change means the
/// rewrite did not help, too much means it probably lost meaning.
fn complexity_reduction_score(original: &str, simplified: &str) -> f64 {
    let original_complexity = complexity_proxy(original);
    if original_complexity == 0.0 {
        return 0.4;
    }
    let reduction = (original_complexity - complexity_proxy(simplified)) / original_complexity;

    if (0.3..=0.7).contains(&reduction) {
        0.9
    } else if (0.2..=0.8).contains(&reduction) {
        0.7
    } else {
        0.4
    }
}

/// Confidence that the *original* text is unambiguous: inverse of the
/// weighted uncertainty-pattern density per 1000 characters.
fn uncertainty_confidence(original: &str) -> f64 {
    let len = original.chars().count();
    if len == 0 {
        return 0.0;
    }

    let weighted: f64 = UNCERTAINTY_PATTERNS
        .iter()
        .map(|(pattern, weight)| pattern.find_iter(original).count() as f64 * weight)
        .sum();

    let normalized = weighted / (len as f64 / 1000.0);
    (1.0 - normalized.min(1.0)).max(0.0)
}

fn domain_terms(domain: Domain) -> &'static [&'static str] {
    match domain {
        Domain::Academic => &["research", "study", "analysis", "theory", "methodology"],
        Domain::Legal => &["law", "legal", "court", "rights", "contract"],
        Domain::Technical => &["system", "process", "method", "technology", "implementation"],
        Domain::Medical => &["health", "medical", "treatment", "patient", "diagnosis"],
        Domain::Finance => &["money", "cost", "investment", "financial", "economic"],
        _ => &[],
    }
}

fn expected_complexity(level: ExperienceLevel) -> f64 {
    match level {
        ExperienceLevel::Beginner => 0.3,
        ExperienceLevel::Intermediate => 0.5,
        ExperienceLevel::Expert => 0.7,
    }
}

fn contextual_fit(simplified: &str, context: &AnalysisContext) -> f64 {
    let mut fit = 0.7;
    let lower = simplified.to_lowercase();

    if let Some(domain) = context.domain {
        let has_terms = domain_terms(domain).iter().any(|term| lower.contains(term));
        fit += if has_terms { 0.1 } else { -0.1 };
    }

    if let Some(level) = context.user_level {
        let diff = (complexity_proxy(simplified) - expected_complexity(level)).abs();
        fit += (0.2 - diff).max(0.0);
    }

    fit.clamp(0.0, 1.0)
}

fn structure_preservation(original: &str, simplified: &str) -> f64 {
    let count = |t: &str| {
        t.split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count()
            .max(1)
    };
    let (a, b) = (count(original), count(simplified));
    a.min(b) as f64 / a.max(b) as f64
}

fn grammar_score(text: &str) -> f64 {
    let len = text.chars().count();
    if len == 0 {
        return 0.0;
    }
    let issues: usize = GRAMMAR_ISSUES.iter().map(|p| p.find_iter(text).count()).sum();
    (1.0 - issues as f64 / (len as f64 / 100.0)).max(0.0)
}

fn coherence(text: &str) -> f64 {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.len() < 2 {
        return 1.0;
    }

    let total: f64 = sentences
        .windows(2)
        .map(|pair| text_similarity(pair[0], pair[1]))
        .sum();
    total / (sentences.len() - 1) as f64
}

/// Proxy for how sure the rewriting model itself was, reconstructed from
/// surface signals since backends report no native confidence.
fn model_confidence(original: &str, simplified: &str) -> f64 {
    let orig_len = original.chars().count().max(1);
    let length_ratio = simplified.chars().count() as f64 / orig_len as f64;

    let mut confidence = 0.7;
    if (0.6..=0.8).contains(&length_ratio) {
        confidence += 0.1;
    } else {
        confidence -= 0.1;
    }

    confidence += structure_preservation(original, simplified) * 0.1;
    confidence += grammar_score(simplified) * 0.1;
    confidence += coherence(simplified) * 0.1;

    confidence.clamp(0.0, 1.0)
}

fn user_feedback_score(store: &FeedbackStore, original: &str, simplified: &str) -> f64 {
    match store.get(&content_fingerprint(original, simplified)) {
        Some(record) if record.total > 0 => record.positive as f64 / record.total as f64,
        _ => 0.7,
    }
}

fn confidence_level(confidence: f64) -> ConfidenceLevel {
    if confidence >= HIGH_THRESHOLD {
        ConfidenceLevel::High
    } else if confidence >= MEDIUM_THRESHOLD {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

fn generate_flags(factors: &ConfidenceFactors, confidence: f64) -> Vec<ConfidenceFlag> {
    let mut flags = Vec::new();
    let mut push = |kind, message: &str, severity| {
        flags.push(ConfidenceFlag { kind, message: message.to_string(), severity });
    };

    if confidence < LOW_THRESHOLD {
        push(FlagKind::Warning, "Low confidence simplification - review recommended", Severity::High);
    }
    if factors.uncertainty < 0.5 {
        push(FlagKind::Uncertainty, "Original text contains ambiguous language", Severity::Medium);
    }
    if factors.complexity_reduction < 0.5 {
        push(FlagKind::Complexity, "Limited complexity reduction achieved", Severity::Medium);
    }
    if factors.text_similarity < 0.3 {
        push(FlagKind::Similarity, "Significant changes from original - verify accuracy", Severity::High);
    }
    if factors.model_confidence < 0.6 {
        push(FlagKind::AiUncertainty, "AI model reports low confidence", Severity::Medium);
    }

    flags
}

fn generate_recommendations(factors: &ConfidenceFactors, confidence: f64) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let mut push = |action, message: &str, priority| {
        recommendations.push(Recommendation { action, message: message.to_string(), priority });
    };

    if confidence < MEDIUM_THRESHOLD {
        push(
            RecommendedAction::Review,
            "Manual review recommended before using this simplification",
            Severity::High,
        );
    }
    if factors.complexity_reduction < 0.4 {
        push(
            RecommendedAction::IncreaseSimplification,
            "Consider using a higher simplification level",
            Severity::Medium,
        );
    }
    if factors.uncertainty < 0.6 {
        push(
            RecommendedAction::ClarifySource,
            "Original content may need clarification before simplification",
            Severity::Medium,
        );
    }
    if factors.user_feedback < 0.5 {
        push(
            RecommendedAction::CheckFeedback,
            "Similar content has received negative feedback",
            Severity::High,
        );
    }

    recommendations
}

/// The fixed report returned when analysis cannot run.
fn default_report() -> ConfidenceReport {
    ConfidenceReport {
        confidence: 0.5,
        level: ConfidenceLevel::Medium,
        factors: None,
        flags: vec![ConfidenceFlag {
            kind: FlagKind::Error,
            message: "Unable to analyze confidence".to_string(),
            severity: Severity::Low,
        }],
        recommendations: Vec::new(),
        needs_review: true,
    }
}

fn analyze_inner(
    original: &str,
    simplified: &str,
    context: &AnalysisContext,
    feedback: &FeedbackStore,
) -> Option<ConfidenceReport> {
    if original.trim().is_empty() || simplified.trim().is_empty() {
        return None;
    }

    let factors = ConfidenceFactors {
        text_similarity: text_similarity(original, simplified),
        complexity_reduction: complexity_reduction_score(original, simplified),
        uncertainty: uncertainty_confidence(original),
        contextual_fit: contextual_fit(simplified, context),
        model_confidence: model_confidence(original, simplified),
        user_feedback: user_feedback_score(feedback, original, simplified),
    };

    let confidence = (factors.weighted_sum().clamp(0.0, 1.0) * 100.0).round() / 100.0;
    if !confidence.is_finite() {
        return None;
    }

    Some(ConfidenceReport {
        confidence,
        level: confidence_level(confidence),
        flags: generate_flags(&factors, confidence),
        recommendations: generate_recommendations(&factors, confidence),
        needs_review: confidence < MEDIUM_THRESHOLD,
        factors: Some(factors),
    })
}

/// Analyzes confidence in a simplification.
///
/// Pure given the feedback-store snapshot; never fails. Degenerate input
/// (either side blank) yields the fixed default report: confidence 0.5,
/// medium level, one error flag, review required.
///
/// # Example
///
/// ```rust
/// use claritas_core::confidence::{AnalysisContext, FeedbackStore, analyze_confidence};
///
/// let report = analyze_confidence(
///     "The implementation demonstrates considerable complexity.",
///     "The work shows a lot of complexity.",
///     &AnalysisContext::default(),
///     &FeedbackStore::default(),
/// );
/// assert!((0.0..=1.0).contains(&report.confidence));
/// ```
pub fn analyze_confidence(
    original: &str,
    simplified: &str,
    context: &AnalysisContext,
    feedback: &FeedbackStore,
) -> ConfidenceReport {
    match analyze_inner(original, simplified, context, feedback) {
        Some(report) => report,
        None => {
            debug!("confidence analysis fell back to the default report");
            default_report()
        }
    }
}
