//! Adaptive simplification context.
//!
//! Adjusts the target simplification level and the rewrite instruction
//! based on a persisted per-domain familiarity profile: users who have
//! handled a domain's complexity before get a lighter touch. The module is
//! pure over profile snapshots; the caller owns persistence and supplies
//! the current time for bookkeeping.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::rewrite::Level;

/// Self-reported global experience level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Expert,
}

/// Derived per-domain familiarity band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamiliarityLevel {
    Novice,
    Familiar,
    Expert,
}

/// Per-domain usage accumulator, persisted across sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainProfile {
    pub visit_count: u32,
    pub time_spent_ms: u64,
    pub max_complexity_handled: u8,
    pub last_visit_ms: Option<u64>,
}

/// Rendering preferences carried in the persisted profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub technical_terms: String,
    pub sentence_length: String,
    pub explanation_depth: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            technical_terms: "simplify".to_string(),
            sentence_length: "medium".to_string(),
            explanation_depth: "moderate".to_string(),
        }
    }
}

/// The persisted user profile the adapter reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub experience_level: ExperienceLevel,
    pub domains: HashMap<Domain, DomainProfile>,
    pub preferences: Preferences,
}

/// Familiarity score and band for one domain.
#[derive(Debug, Clone, Copy)]
pub struct DomainFamiliarity {
    /// Mean of the three normalized sub-scores, in `[0, 1]`.
    pub score: f64,
    pub level: FamiliarityLevel,
}

/// The adapter's output: what level to target and how to instruct the
/// rewrite backend.
#[derive(Debug, Clone)]
pub struct ContextDecision {
    pub level: Level,
    pub adaptive_prompt: String,
    pub familiarity: DomainFamiliarity,
    pub relative_complexity: f64,
}

static SUFFIX_TERMS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b\w+tion\b").unwrap(),
        Regex::new(r"\b\w+ment\b").unwrap(),
        Regex::new(r"\b\w+ness\b").unwrap(),
        Regex::new(r"\b\w{12,}\b").unwrap(),
        Regex::new(r"\b[A-Z]{2,}\b").unwrap(),
    ]
});

static PASSIVE_FORMS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\b(was|were|is|are|been|being)\s+\w+ed\b").unwrap(),
        Regex::new(r"\b(was|were|is|are|been|being)\s+\w+en\b").unwrap(),
    ]
});

static NESTED_CLAUSES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r",\s*which").unwrap(),
        Regex::new(r",\s*that").unwrap(),
        Regex::new(r",\s*who").unwrap(),
        Regex::new(r"\([^)]+\)").unwrap(),
    ]
});

fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}

/// Content-complexity estimate used only for level selection.
///
/// Four capped factors (sentence length, derivational vocabulary, passive
/// voice, nested clauses), total capped at 10. Deliberately coarser than
/// the full complexity scorer: it feeds a three-way level decision, not a
/// user-facing score.
pub fn base_content_complexity(text: &str) -> f64 {
    let words = text.split_whitespace().count();
    let sentences = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let avg_sentence_len = words as f64 / sentences as f64;

    let technical = count_matches(&SUFFIX_TERMS, text) as f64;
    let passive = count_matches(&PASSIVE_FORMS, text) as f64;
    let nested = count_matches(&NESTED_CLAUSES, text) as f64;

    let mut complexity = 0.0;
    complexity += (avg_sentence_len / 5.0).min(3.0);
    complexity += (technical / 10.0).min(2.0);
    complexity += (passive / 5.0).min(2.0);
    complexity += (nested / 3.0).min(3.0);

    complexity.min(10.0)
}

/// Derives the familiarity score for a domain from the profile.
///
/// Three normalized sub-scores, each capped at 1: twenty visits, one hour
/// of time spent, and a handled complexity of 10 all count as full
/// familiarity on their axis.
pub fn domain_familiarity(profile: &UserProfile, domain: Domain) -> DomainFamiliarity {
    static EMPTY: DomainProfile =
        DomainProfile { visit_count: 0, time_spent_ms: 0, max_complexity_handled: 0, last_visit_ms: None };
    let data = profile.domains.get(&domain).unwrap_or(&EMPTY);

    let visit_score = (data.visit_count as f64 / 20.0).min(1.0);
    let time_score = (data.time_spent_ms as f64 / 3_600_000.0).min(1.0);
    let complexity_score = (data.max_complexity_handled as f64 / 10.0).min(1.0);

    let score = (visit_score + time_score + complexity_score) / 3.0;
    let level = if score < 0.3 {
        FamiliarityLevel::Novice
    } else if score < 0.7 {
        FamiliarityLevel::Familiar
    } else {
        FamiliarityLevel::Expert
    };

    DomainFamiliarity { score, level }
}

/// Picks the simplification level and rewrite instruction for a page.
///
/// Familiar users see a reduced effective complexity (up to 40% off), so
/// the system simplifies less for them; the base level is then shifted by
/// global experience and again by domain familiarity, clamped to 1..=3.
pub fn adapt_context(domain: Domain, content_text: &str, profile: &UserProfile) -> ContextDecision {
    let familiarity = domain_familiarity(profile, domain);

    let relative_complexity =
        (base_content_complexity(content_text) * (1.0 - familiarity.score * 0.4)).min(10.0);

    let mut level = if relative_complexity > 6.0 {
        Level::Deep
    } else if relative_complexity > 3.0 {
        Level::Moderate
    } else {
        Level::Light
    };

    level = match profile.experience_level {
        ExperienceLevel::Beginner => level.shifted(1),
        ExperienceLevel::Expert => level.shifted(-1),
        ExperienceLevel::Intermediate => level,
    };

    level = match familiarity.level {
        FamiliarityLevel::Novice => level.shifted(1),
        FamiliarityLevel::Expert => level.shifted(-1),
        FamiliarityLevel::Familiar => level,
    };

    ContextDecision {
        level,
        adaptive_prompt: adaptive_prompt(domain, level),
        familiarity,
        relative_complexity,
    }
}

/// Instruction string for a domain and level, from a fixed lookup table.
pub fn adaptive_prompt(domain: Domain, level: Level) -> String {
    let table: Option<[&str; 3]> = match domain {
        Domain::Academic => Some([
            "Explain this academic content in simple terms, like explaining to a high school student.",
            "Simplify this academic content while keeping key concepts clear.",
            "Make this academic content more accessible while preserving technical accuracy.",
        ]),
        Domain::Legal => Some([
            "Translate this legal text into plain English that anyone can understand.",
            "Simplify this legal content while keeping important legal concepts.",
            "Make this legal text clearer while maintaining legal precision.",
        ]),
        Domain::Technical => Some([
            "Explain this technical content in everyday language with simple analogies.",
            "Simplify this technical content for someone learning the field.",
            "Make this technical content clearer while keeping necessary technical terms.",
        ]),
        Domain::Medical => Some([
            "Explain this medical information in simple terms for patients.",
            "Simplify this medical content while keeping important health information.",
            "Make this medical text more accessible while maintaining medical accuracy.",
        ]),
        Domain::Finance => Some([
            "Explain this financial information in simple, everyday terms.",
            "Simplify this financial content for general understanding.",
            "Make this financial text clearer while keeping key financial concepts.",
        ]),
        _ => None,
    };

    match table {
        Some(prompts) => prompts[(level.as_u8() - 1) as usize].to_string(),
        None => format!(
            "Simplify this content to level {} complexity while preserving meaning.",
            level.as_u8()
        ),
    }
}

/// Records a completed simplification into the profile.
///
/// Increments the visit count, accumulates session time, raises the
/// handled-complexity high-water mark, and stamps the visit time supplied
/// by the caller.
pub fn update_profile(
    profile: &mut UserProfile,
    domain: Domain,
    complexity: u8,
    time_spent_ms: u64,
    now_ms: u64,
) -> DomainProfile {
    let data = profile.domains.entry(domain).or_default();
    data.visit_count += 1;
    data.time_spent_ms += time_spent_ms;
    data.max_complexity_handled = data.max_complexity_handled.max(complexity);
    data.last_visit_ms = Some(now_ms);
    data.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with(domain: Domain, data: DomainProfile) -> UserProfile {
        let mut profile = UserProfile::default();
        profile.domains.insert(domain, data);
        profile
    }

    const DENSE_TEXT: &str = "The comprehensive implementation of the organizational management framework, which was developed by the administration, requires careful consideration of the documentation requirements and the certification obligations that were established by the regulatory commission (including the international harmonization provisions), notwithstanding the operational complications.";

    #[test]
    fn test_familiarity_empty_profile_is_novice() {
        let profile = UserProfile::default();
        let familiarity = domain_familiarity(&profile, Domain::Legal);
        assert_eq!(familiarity.level, FamiliarityLevel::Novice);
        assert_eq!(familiarity.score, 0.0);
    }

    #[test]
    fn test_familiarity_saturates() {
        let profile = profile_with(
            Domain::Technical,
            DomainProfile {
                visit_count: 100,
                time_spent_ms: 10 * 3_600_000,
                max_complexity_handled: 10,
                last_visit_ms: Some(1),
            },
        );
        let familiarity = domain_familiarity(&profile, Domain::Technical);
        assert!((familiarity.score - 1.0).abs() < f64::EPSILON);
        assert_eq!(familiarity.level, FamiliarityLevel::Expert);
    }

    #[test]
    fn test_familiar_users_get_lighter_levels() {
        let novice = UserProfile::default();
        let expert = profile_with(
            Domain::Technical,
            DomainProfile {
                visit_count: 40,
                time_spent_ms: 2 * 3_600_000,
                max_complexity_handled: 10,
                last_visit_ms: Some(1),
            },
        );

        let for_novice = adapt_context(Domain::Technical, DENSE_TEXT, &novice);
        let for_expert = adapt_context(Domain::Technical, DENSE_TEXT, &expert);
        assert!(for_expert.level <= for_novice.level);
        assert!(for_expert.relative_complexity < for_novice.relative_complexity);
    }

    #[test]
    fn test_experience_shift() {
        // a familiar-band domain profile neutralizes the novice-domain shift
        let mut beginner = profile_with(
            Domain::General,
            DomainProfile { visit_count: 10, time_spent_ms: 3_600_000, max_complexity_handled: 3, last_visit_ms: None },
        );
        beginner.experience_level = ExperienceLevel::Beginner;
        let mut expert = beginner.clone();
        expert.experience_level = ExperienceLevel::Expert;

        let b = adapt_context(Domain::General, DENSE_TEXT, &beginner);
        let e = adapt_context(Domain::General, DENSE_TEXT, &expert);
        assert!(b.level > e.level);
    }

    #[test]
    fn test_simple_text_targets_light_level() {
        let profile = profile_with(
            Domain::General,
            DomainProfile { visit_count: 10, time_spent_ms: 3_600_000, max_complexity_handled: 3, last_visit_ms: None },
        );
        let decision = adapt_context(Domain::General, "Short text. Easy words. Done now.", &profile);
        assert_eq!(decision.level, Level::Light);
    }

    #[test]
    fn test_prompt_table_lookup() {
        assert!(adaptive_prompt(Domain::Legal, Level::Light).contains("plain English"));
        assert!(adaptive_prompt(Domain::Medical, Level::Deep).contains("medical accuracy"));
        assert!(adaptive_prompt(Domain::Wikipedia, Level::Moderate).contains("level 2"));
    }

    #[test]
    fn test_update_profile_accumulates() {
        let mut profile = UserProfile::default();
        update_profile(&mut profile, Domain::News, 7, 60_000, 1_000);
        let updated = update_profile(&mut profile, Domain::News, 4, 30_000, 2_000);

        assert_eq!(updated.visit_count, 2);
        assert_eq!(updated.time_spent_ms, 90_000);
        // high-water mark keeps the larger complexity
        assert_eq!(updated.max_complexity_handled, 7);
        assert_eq!(updated.last_visit_ms, Some(2_000));
    }

    #[test]
    fn test_profile_serde_roundtrip() {
        let profile = profile_with(
            Domain::Finance,
            DomainProfile { visit_count: 3, time_spent_ms: 5_000, max_complexity_handled: 6, last_visit_ms: Some(42) },
        );
        let json = serde_json::to_string(&profile).unwrap();
        let back: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, back);
    }
}
