//! Persisted state schema and snapshot I/O.
//!
//! The core never owns a storage backend: it computes over a
//! [`StoredState`] snapshot the caller supplies and hands back updated
//! values for the caller to persist (read-after-write consistency within
//! one process is all it assumes). This module defines that key-value
//! document plus JSON helpers the CLI uses to keep it on disk.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::confidence::FeedbackStore;
use crate::context::UserProfile;
use crate::{ClaritasError, Result};

/// The whole persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredState {
    /// Preferred simplification level (1-3).
    pub simplification_level: u8,
    /// Lifetime count of completed simplifications.
    pub pages_simplified: u64,
    /// Estimated reading minutes saved across all simplifications.
    pub total_time_saved: u64,
    /// Free-form per-site preferences owned by the caller.
    pub domain_preferences: HashMap<String, Value>,
    /// Familiarity profile consumed by the context adapter.
    pub user_profile: UserProfile,
    /// Feedback aggregates consumed by the confidence analyzer.
    pub confidence_feedback: FeedbackStore,
}

impl Default for StoredState {
    fn default() -> Self {
        Self {
            simplification_level: 2,
            pages_simplified: 0,
            total_time_saved: 0,
            domain_preferences: HashMap::new(),
            user_profile: UserProfile::default(),
            confidence_feedback: FeedbackStore::default(),
        }
    }
}

impl StoredState {
    /// Folds one completed simplification into the aggregate counters.
    ///
    /// Time saved is estimated at one minute per 200 words removed.
    pub fn record_simplification(&mut self, original_words: usize, simplified_words: usize) {
        self.pages_simplified += 1;
        let reduction = original_words.saturating_sub(simplified_words);
        self.total_time_saved += (reduction / 200) as u64;
    }
}

/// Default on-disk location for the persisted state document.
pub fn default_state_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("claritas").join("state.json"))
}

/// Loads a state snapshot from disk, or the defaults when the file does
/// not exist yet.
pub fn load_state(path: &Path) -> Result<StoredState> {
    if !path.exists() {
        return Ok(StoredState::default());
    }
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| ClaritasError::StateError(format!("Invalid state file: {}", e)))
}

/// Persists a state snapshot to disk, creating parent directories.
pub fn save_state(path: &Path, state: &StoredState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string_pretty(state)
        .map_err(|e| ClaritasError::StateError(format!("Unserializable state: {}", e)))?;
    fs::write(path, raw)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DomainProfile, ExperienceLevel};
    use crate::domain::Domain;

    #[test]
    fn test_defaults() {
        let state = StoredState::default();
        assert_eq!(state.simplification_level, 2);
        assert_eq!(state.pages_simplified, 0);
        assert_eq!(state.user_profile.experience_level, ExperienceLevel::Intermediate);
    }

    #[test]
    fn test_record_simplification() {
        let mut state = StoredState::default();
        state.record_simplification(1000, 500);
        state.record_simplification(300, 350); // growth saves nothing

        assert_eq!(state.pages_simplified, 2);
        assert_eq!(state.total_time_saved, 2); // 500 words removed -> 2 minutes
    }

    #[test]
    fn test_json_round_trip() {
        let mut state = StoredState::default();
        state.simplification_level = 3;
        state.user_profile.domains.insert(
            Domain::Legal,
            DomainProfile { visit_count: 4, time_spent_ms: 9_000, max_complexity_handled: 8, last_visit_ms: Some(7) },
        );
        state
            .domain_preferences
            .insert("example.com".to_string(), serde_json::json!({"pinned": true}));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        save_state(&path, &state).unwrap();
        let loaded = load_state(&path).unwrap();
        assert_eq!(state, loaded);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_state(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, StoredState::default());
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"simplification_level": 1}"#).unwrap();

        let loaded = load_state(&path).unwrap();
        assert_eq!(loaded.simplification_level, 1);
        assert_eq!(loaded.pages_simplified, 0);
    }
}
