//! Conversational core for the unicorn catalog.
//!
//! Sanitizes user text, classifies it into a retrieval tier, executes it
//! against the shared catalog or the session's previous results, and decides
//! between answering and asking a clarifying question.

pub mod catalog;
pub mod clarification;
pub mod classifier;
pub mod context;
pub mod entity_index;
pub mod error;
pub mod orchestrator;
pub mod response;
pub mod retrieval;
pub mod sanitizer;
pub mod sector_map;
pub mod types;

pub use catalog::Catalog;
pub use clarification::ClarificationPolicy;
pub use classifier::QueryClassifier;
pub use context::ConversationState;
pub use entity_index::{EntityIndex, EntityMention};
pub use error::{ChatError, InvalidInputError};
pub use orchestrator::ChatEngine;
pub use response::ResponseFormatter;
pub use retrieval::RetrievalEngine;
pub use sanitizer::Sanitizer;
pub use sector_map::SectorMap;
pub use types::{
    Answer, Clarification, ClarifyReason, HistoryEntry, Matcher, Predicate, Resolution, ResultSet,
    ResultSummary, Scope, TurnOutcome, TurnResult, UnresolvedReason,
};
