pub mod complexity;
pub mod confidence;
pub mod context;
pub mod domain;
pub mod error;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod heuristic;
pub mod locate;
pub mod parse;
pub mod reconstruct;
pub mod rewrite;
pub mod simplifier;
pub mod store;

pub use complexity::{score_complexity, score_element};
pub use confidence::{
    AnalysisContext, ConfidenceLevel, ConfidenceReport, FeedbackRecord, FeedbackStore,
    analyze_confidence, content_fingerprint, record_feedback,
};
pub use context::{
    ContextDecision, DomainProfile, ExperienceLevel, FamiliarityLevel, UserProfile, adapt_context,
    update_profile,
};
pub use domain::{Domain, classify_domain};
pub use error::{ClaritasError, Result};
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, fetch_file, fetch_stdin, fetch_url};
pub use locate::{LocateConfig, Located, locate_content};
pub use parse::Document;
pub use reconstruct::{
    PreservedElement, PreservedKind, ReconstructedRegion, RegionSnapshot, Section,
    collect_preserved, parse_sections, reconstruct,
};
pub use rewrite::{
    BackendCapability, BackendKind, BackendParams, EngineConfig, Level, RewriteBackend,
    RewriteEngine, SimplificationRequest, SimplificationResult,
};
pub use simplifier::{
    ClaritasConfig, ClaritasConfigBuilder, PageSimplification, ReadingTime, Simplifier, simplify,
    simplify_with_url,
};
pub use store::{StoredState, default_state_path, load_state, save_state};
