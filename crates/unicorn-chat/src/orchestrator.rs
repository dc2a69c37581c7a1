//! Turn orchestration.
//!
//! `ChatEngine::handle_turn` is the single entry point of the core:
//! sanitize, classify, retrieve, clarify or answer, commit state, and emit
//! exactly one metric event.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use unicorn_core::config::ChatConfig;
use unicorn_core::{MetricEvent, MetricsSink, TurnKind};

use crate::catalog::Catalog;
use crate::clarification::ClarificationPolicy;
use crate::classifier::QueryClassifier;
use crate::context::ConversationState;
use crate::error::ChatError;
use crate::response::ResponseFormatter;
use crate::retrieval::RetrievalEngine;
use crate::sanitizer::Sanitizer;
use crate::types::{Clarification, Resolution, TurnOutcome, TurnResult, UnresolvedReason};

/// Stateless turn handler shared by all sessions of one catalog.
#[derive(Debug, Clone)]
pub struct ChatEngine {
    catalog: Arc<Catalog>,
    sanitizer: Sanitizer,
    classifier: QueryClassifier,
    retrieval: RetrievalEngine,
    policy: ClarificationPolicy,
    formatter: ResponseFormatter,
}

impl ChatEngine {
    pub fn new(catalog: Arc<Catalog>, config: &ChatConfig) -> Self {
        Self {
            catalog,
            sanitizer: Sanitizer::new(config.max_input_length),
            classifier: QueryClassifier::new(config.high_valuation_billions),
            retrieval: RetrievalEngine::new(),
            policy: ClarificationPolicy::new(config.clarification_threshold),
            formatter: ResponseFormatter::new(config.display_limit),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Handle one user turn against a session's state.
    ///
    /// Returns `Err` only for rejected input; unresolvable queries come back
    /// as `TurnOutcome::Clarification`. The state is advanced only when the
    /// outcome is an answer.
    pub fn handle_turn(
        &self,
        raw: &str,
        state: &mut ConversationState,
        metrics: &dyn MetricsSink,
    ) -> Result<TurnOutcome, ChatError> {
        let query = match self.sanitizer.sanitize(raw) {
            Ok(query) => query,
            Err(e) => {
                warn!(session = %state.id(), error = %e, "Input rejected");
                metrics.record(MetricEvent::new(TurnKind::Error, 0.0));
                return Err(e.into());
            }
        };

        let started = Instant::now();
        let dataset = self.catalog.dataset();

        let candidates = self.classifier.classify(&query, &self.catalog, state);
        let results = self
            .retrieval
            .execute_all(&candidates, dataset, state.current_context());
        let leading = candidates.into_iter().next().unwrap_or(Resolution::Unresolvable {
            reason: UnresolvedReason::NoRecognizedTerms,
            dimensions: Vec::new(),
        });

        let clarification = self.policy.evaluate(&leading, &results, dataset);
        let tier = match (clarification, leading.tier()) {
            (None, Some(tier)) => tier,
            (clarification, _) => {
                let clarification = clarification.unwrap_or_else(|| {
                    ClarificationPolicy::unresolved(UnresolvedReason::NoRecognizedTerms, &[])
                });
                return Ok(self.clarify(query, clarification, started, state, metrics));
            }
        };

        let rows = results.len();
        let answer = self
            .formatter
            .compose(tier, leading.uses_context(), results.clone());
        state.apply(TurnResult::Resolved {
            query: query.clone(),
            tier,
            results,
        });

        let latency_ms = elapsed_ms(started);
        info!(
            session = %state.id(),
            query = %query,
            tier = %tier,
            rows,
            latency_ms,
            "Turn answered"
        );
        metrics.record(MetricEvent::new(TurnKind::Answer, latency_ms).with_result(tier, rows));

        Ok(TurnOutcome::Answer(answer))
    }

    fn clarify(
        &self,
        query: String,
        clarification: Clarification,
        started: Instant,
        state: &mut ConversationState,
        metrics: &dyn MetricsSink,
    ) -> TurnOutcome {
        let latency_ms = elapsed_ms(started);
        info!(
            session = %state.id(),
            query = %query,
            reason = ?clarification.reason,
            latency_ms,
            "Turn needs clarification"
        );
        state.apply(TurnResult::Clarification { query });
        metrics.record(MetricEvent::new(TurnKind::Clarification, latency_ms));
        TurnOutcome::Clarification(clarification)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
