pub mod config;
pub mod error;
pub mod eval;
pub mod matcher;
pub mod model;
pub mod responder;
pub mod storage;
pub mod text;
pub mod vectorize;

pub use config::{
    CategoryWeight, DEFAULT_FAQ_PATH, DEFAULT_THRESHOLD, MatcherConfig, ResponderConfig, Settings,
    Weighting, checked_threshold,
};
pub use error::{ConfigError, Result};
pub use eval::{
    DEFAULT_REQUIRED_PASS_RATE, EvalCase, EvalOutcome, EvalSummary, evaluate_cases, load_cases,
};
pub use matcher::{Matcher, MatcherStats};
pub use model::{
    Category, Corpus, CorpusMetadata, FaqEntry, QueryResult, RawFaqRecord, ScoredMatch,
};
pub use responder::{ConfidenceLevel, Responder, Response};
pub use storage::{load_corpus, save_entries_jsonl};
