//! Reading-complexity scoring.
//!
//! This module computes the 1-10 complexity score used for whole-page
//! badges and the lighter per-element variant used when many small nodes
//! are scored at once (heatmaps). The full score combines sentence length,
//! vocabulary, technical-term density, a Flesch-style readability proxy,
//! passive voice, and a domain-specific adjustment; the element score keeps
//! only the three cheapest factors.
//!
//! Both scores are pure and deterministic, clamped to `[1, 10]`, and
//! monotone non-decreasing in average sentence length, long-word ratio,
//! and technical-term density.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::Domain;

/// Fixed technical-vocabulary classes scanned by the full scorer.
///
/// Each class contributes at most 2 points, at one point per ten matches.
static TECHNICAL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\b(algorithm|implementation|methodology|infrastructure|optimization|paradigm)\b").unwrap(),
        Regex::new(r"(?i)\b(quantum|molecular|biochemical|neurological|pharmaceutical)\b").unwrap(),
        Regex::new(r"(?i)\b(constitutional|jurisprudence|litigation|statutory|regulatory)\b").unwrap(),
        Regex::new(r"(?i)\b(derivative|integral|polynomial|logarithmic|exponential)\b").unwrap(),
    ]
});

static PASSIVE_VOICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(was|were|been|being)\s+\w+ed\b").unwrap());

static CITATIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[\d+\]|\(\d{4}\)|et al\.").unwrap());
static FORMULAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z][a-z]*\d+|[α-ωΑ-Ω]").unwrap());
static LEGAL_TERMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(whereas|heretofore|pursuant|notwithstanding|aforementioned)\b").unwrap()
});
static SECTION_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)section \d+|§\d+|\(\w\)").unwrap());
static CODE_BLOCKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```|`[^`]+`").unwrap());
static API_TERMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(API|HTTP|JSON|XML|REST|GraphQL)\b").unwrap());
static FINANCE_TERMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(EBITDA|P/E|ROI|basis points|derivatives)\b").unwrap());

/// Quick technical-term scan used by the per-element score.
static ELEMENT_TERMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(algorithm|implementation|methodology|infrastructure|optimization|quantum|molecular|constitutional|derivative)\b").unwrap()
});

fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

fn avg_words_per_sentence(text: &str) -> f64 {
    let word_count = words(text).len();
    word_count as f64 / sentence_count(text).max(1) as f64
}

fn long_word_ratio(word_list: &[&str], min_len: usize) -> f64 {
    if word_list.is_empty() {
        return 0.0;
    }
    let long = word_list.iter().filter(|w| w.chars().count() > min_len).count();
    long as f64 / word_list.len() as f64
}

/// Estimates syllable count with the vowel-group heuristic: contiguous
/// vowel groups per word, minus one for a trailing silent e, floored at
/// one syllable per word.
fn estimate_syllables(text: &str) -> usize {
    text.to_lowercase()
        .split_whitespace()
        .map(|raw| {
            let word: String = raw.chars().filter(|c| c.is_ascii_lowercase()).collect();
            if word.is_empty() {
                return 0;
            }
            let mut groups = 0usize;
            let mut in_group = false;
            for c in word.chars() {
                let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
                if vowel && !in_group {
                    groups += 1;
                }
                in_group = vowel;
            }
            if word.ends_with('e') {
                groups = groups.saturating_sub(1);
            }
            groups.max(1)
        })
        .sum()
}

fn domain_pattern_score(text: &str, domain: Domain) -> f64 {
    match domain {
        Domain::Academic | Domain::Medical => {
            let citations = CITATIONS.find_iter(text).count() as f64;
            let formulas = FORMULAS.find_iter(text).count() as f64;
            (citations / 10.0 + formulas / 20.0).min(2.0)
        }
        Domain::Legal => {
            let jargon = LEGAL_TERMS.find_iter(text).count() as f64;
            let sections = SECTION_MARKERS.find_iter(text).count() as f64;
            (jargon / 5.0 + sections / 10.0).min(2.0)
        }
        Domain::Technical => {
            let code = CODE_BLOCKS.find_iter(text).count() as f64;
            let api = API_TERMS.find_iter(text).count() as f64;
            (code / 5.0 + api / 10.0).min(1.5)
        }
        Domain::Finance => {
            let terms = FINANCE_TERMS.find_iter(text).count() as f64;
            (terms / 5.0).min(1.0)
        }
        _ => 0.0,
    }
}

/// Bonus applied when a page already scores above the mid band; domains
/// whose prose is reliably denser earn a larger nudge.
fn domain_bonus(domain: Domain) -> f64 {
    match domain {
        Domain::Wikipedia => 0.5,
        Domain::News => 0.3,
        Domain::Government => 0.8,
        Domain::Academic | Domain::Technical | Domain::Finance => 1.0,
        Domain::Legal => 1.2,
        Domain::Medical => 1.5,
        Domain::General => 0.0,
    }
}

/// Scores the reading complexity of a text on a 1-10 scale.
///
/// # Example
///
/// ```rust
/// use claritas_core::complexity::score_complexity;
/// use claritas_core::domain::Domain;
///
/// let simple = "The cat sat. The dog ran. They played all day.";
/// assert!(score_complexity(simple, Domain::General) <= 3);
/// ```
pub fn score_complexity(text: &str, domain: Domain) -> u8 {
    let word_list = words(text);
    if word_list.is_empty() {
        return 1;
    }

    let mut complexity = 1.0_f64;

    let awps = avg_words_per_sentence(text);
    complexity += match awps {
        x if x > 25.0 => 4.0,
        x if x > 20.0 => 3.0,
        x if x > 15.0 => 2.0,
        x if x > 10.0 => 1.0,
        _ => 0.0,
    };

    complexity += long_word_ratio(&word_list, 7) * 3.0;

    for pattern in TECHNICAL_PATTERNS.iter() {
        let matches = pattern.find_iter(text).count() as f64;
        complexity += (matches / 10.0).min(2.0);
    }

    let passive = PASSIVE_VOICE.find_iter(text).count() as f64;
    complexity += (passive / 20.0).min(1.0);

    let syllables = estimate_syllables(text) as f64;
    let flesch = 206.835 - 1.015 * awps - 84.6 * (syllables / word_list.len() as f64);
    complexity += match flesch {
        x if x < 30.0 => 3.0,
        x if x < 50.0 => 2.0,
        x if x < 60.0 => 1.0,
        _ => 0.0,
    };

    complexity += domain_pattern_score(text, domain);
    if complexity > 6.0 {
        complexity += domain_bonus(domain);
    }

    complexity.round().clamp(1.0, 10.0) as u8
}

/// Scores a single small node with the three cheapest factors only
/// (sentence length, long-word ratio, technical-term count).
///
/// Used where many nodes are scored in one pass and the Flesch and domain
/// terms would dominate the cost. Texts under 20 characters score 1.
pub fn score_element(text: &str) -> u8 {
    let trimmed = text.trim();
    if trimmed.chars().count() < 20 {
        return 1;
    }

    let word_list = words(trimmed);
    let mut complexity = 1.0_f64;

    let awps = avg_words_per_sentence(trimmed);
    complexity += match awps {
        x if x > 20.0 => 3.0,
        x if x > 15.0 => 2.0,
        x if x > 10.0 => 1.0,
        _ => 0.0,
    };

    complexity += long_word_ratio(&word_list, 7) * 2.0;

    let terms = ELEMENT_TERMS.find_iter(trimmed).count() as f64;
    complexity += (terms / 3.0).min(2.0);

    complexity.round().clamp(1.0, 10.0) as u8
}
