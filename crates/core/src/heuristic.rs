//! Deterministic text simplification.
//!
//! These passes are the correctness backstop of the rewrite engine: when no
//! backend is available (or every one fails) the engine falls through to
//! this module, which is pure, synchronous, and produces stable output for
//! stable input.
//!
//! The passes stack by level:
//!
//! - level 1: whole-word dictionary substitution of complex words
//! - level 2: + long-sentence splitting and a narrow passive-to-active pass
//! - level 3: + numbered lists to bullets and heading promotion

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rewrite::Level;

/// Complex-to-simple replacement table applied at every level.
///
/// Longer forms precede their prefixes so whole-word matching stays exact.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("utilization", "use"),
    ("utilize", "use"),
    ("demonstrate", "show"),
    ("implementation", "doing"),
    ("implement", "do"),
    ("methodology", "method"),
    ("facilitate", "help"),
    ("approximately", "about"),
    ("subsequently", "then"),
    ("consequently", "so"),
    ("furthermore", "also"),
    ("nevertheless", "but"),
    ("therefore", "so"),
    ("however", "but"),
    ("although", "even though"),
    ("acquire", "get"),
    ("commence", "start"),
    ("terminate", "end"),
    ("sufficient", "enough"),
    ("additional", "more"),
    ("numerous", "many"),
];

static SUBSTITUTION_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = SUBSTITUTIONS
        .iter()
        .map(|(complex, _)| *complex)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b({})\b", alternation)).unwrap()
});

static LONG_CLAUSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^.!?]{60,}?),\s+").unwrap());
static PASSIVE_IS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bis\s+(\w+ed)\s+by\s+(\w+)").unwrap());
static PASSIVE_WAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bwas\s+(\w+ed)\s+by\s+(\w+)").unwrap());
static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.\s").unwrap());

/// Replaces complex words with their everyday equivalents.
///
/// Case-insensitive, whole-word only; replacements are emitted lowercase.
/// Running this on text with no remaining dictionary words is a no-op.
pub fn replace_complex_words(text: &str) -> String {
    SUBSTITUTION_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let matched = caps[1].to_lowercase();
            SUBSTITUTIONS
                .iter()
                .find(|(complex, _)| *complex == matched)
                .map(|(_, simple)| (*simple).to_string())
                .unwrap_or_else(|| caps[1].to_string())
        })
        .to_string()
}

/// Splits run-on clauses: the first comma past 60 characters of a sentence
/// becomes a sentence break.
pub fn break_long_sentences(text: &str) -> String {
    LONG_CLAUSE.replace_all(text, "${1}. ").to_string()
}

/// Converts the narrow `is/was X-ed by Y` passive pattern to `Y X-ed`.
pub fn passive_to_active(text: &str) -> String {
    let text = PASSIVE_IS.replace_all(text, "${2} ${1}");
    PASSIVE_WAS.replace_all(&text, "${2} ${1}").to_string()
}

/// Rewrites numbered-list markers (`1. `) as bullet markers.
pub fn numbered_to_bullets(text: &str) -> String {
    NUMBERED_ITEM.replace_all(text, "• ").to_string()
}

/// Promotes short lead sentences of long paragraphs into heading lines.
///
/// A paragraph over 300 characters whose first sentence is under 50
/// characters gets that sentence lifted onto its own `## ` line, which the
/// section parser later turns into a heading.
pub fn promote_headings(text: &str) -> String {
    text.split("\n\n")
        .map(|para| {
            if para.chars().count() <= 300 {
                return para.to_string();
            }
            let first = para.split('.').next().unwrap_or("");
            if first.is_empty() || first.chars().count() >= 50 {
                return para.to_string();
            }
            match para.get(first.len() + 1..) {
                Some(rest) => format!("## {}\n\n{}", first.trim(), rest.trim_start()),
                None => para.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Runs the heuristic passes for the given level.
///
/// Deterministic and dependency-free; the rewrite engine's guarantee that
/// every request yields some simplified text rests on this function.
pub fn simplify(text: &str, level: Level) -> String {
    let mut simplified = replace_complex_words(text);

    if level >= Level::Moderate {
        simplified = break_long_sentences(&simplified);
        simplified = passive_to_active(&simplified);
    }

    if level >= Level::Deep {
        simplified = numbered_to_bullets(&simplified);
        simplified = promote_headings(&simplified);
    }

    simplified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_substitution() {
        let out = replace_complex_words("We utilize numerous tools to facilitate work.");
        assert_eq!(out, "We use many tools to help work.");
    }

    #[test]
    fn test_substitution_is_whole_word() {
        // "utilizes" and "demonstrated" are not dictionary entries
        let out = replace_complex_words("She utilizes what was demonstrated.");
        assert_eq!(out, "She utilizes what was demonstrated.");
    }

    #[test]
    fn test_substitution_case_insensitive() {
        let out = replace_complex_words("However, we Commence now.");
        assert_eq!(out, "but, we start now.");
    }

    #[test]
    fn test_idempotent_when_nothing_left() {
        let original = "We utilize numerous tools.";
        let once = simplify(original, Level::Light);
        let twice = simplify(&once, Level::Light);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_break_long_sentences() {
        let text = "This opening clause keeps going and going well past the sixty character mark, and then continues.";
        let out = break_long_sentences(text);
        assert!(out.contains("mark. and then continues."));
    }

    #[test]
    fn test_short_sentences_untouched() {
        let text = "Short clause, short tail.";
        assert_eq!(break_long_sentences(text), text);
    }

    #[test]
    fn test_passive_to_active() {
        let out = passive_to_active("The ball was kicked by Maria.");
        assert_eq!(out, "The ball Maria kicked.");
    }

    #[test]
    fn test_numbered_to_bullets() {
        let out = numbered_to_bullets("1. First step\n2. Second step");
        assert_eq!(out, "• First step\n• Second step");
    }

    #[test]
    fn test_heading_promotion() {
        let body = "word ".repeat(70);
        let para = format!("Summary. {}", body.trim());
        let out = promote_headings(&para);
        assert!(out.starts_with("## Summary\n\n"));
        assert!(out.contains("word word"));
    }

    #[test]
    fn test_no_heading_for_long_lead_sentence() {
        let lead = "This lead sentence is far too long to ever work as a heading for anything";
        let para = format!("{}. {}", lead, "tail ".repeat(70).trim());
        let out = promote_headings(&para);
        assert!(!out.contains("## "));
    }

    #[test]
    fn test_levels_stack() {
        let text = "1. We utilize the system was tested by engineers.";
        let light = simplify(text, Level::Light);
        assert!(light.starts_with("1. "));
        assert!(light.contains("use"));

        let deep = simplify(text, Level::Deep);
        assert!(deep.starts_with("• "));
    }
}
