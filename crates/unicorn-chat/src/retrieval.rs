//! Retrieval engine: executes a resolution against the dataset or context.

use std::sync::Arc;

use tracing::warn;

use unicorn_core::{CompanyRecord, Dataset};

use crate::types::{Predicate, Resolution, ResultSet, Scope};

/// Executes resolutions. Never mutates its inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetrievalEngine;

impl RetrievalEngine {
    pub fn new() -> Self {
        Self
    }

    /// Execute one resolution.
    ///
    /// - Entity: the single record for the key, or empty when the key is stale.
    /// - Sector / Contextual: logical AND of all predicates over the base
    ///   table, preserving its row order. No predicates returns the base
    ///   table unchanged.
    /// - Unresolvable: empty.
    pub fn execute(
        &self,
        resolution: &Resolution,
        dataset: &Dataset,
        context: &ResultSet,
    ) -> ResultSet {
        match resolution {
            Resolution::Entity { key, alias } => match dataset.get(*key) {
                Some(record) => ResultSet::from_rows(vec![Arc::clone(record)]),
                None => {
                    warn!(%key, alias = %alias, "Stale entity key, treating as not found");
                    ResultSet::empty()
                }
            },
            Resolution::Sector {
                predicates,
                scope: Scope::Dataset,
                ..
            } => self.filter(dataset.records(), predicates),
            Resolution::Sector {
                predicates,
                scope: Scope::Context,
                ..
            }
            | Resolution::Contextual { predicates } => self.filter(context.rows(), predicates),
            Resolution::Unresolvable { .. } => ResultSet::empty(),
        }
    }

    /// Execute several candidates and concatenate their rows, first occurrence wins.
    pub fn execute_all(
        &self,
        resolutions: &[Resolution],
        dataset: &Dataset,
        context: &ResultSet,
    ) -> ResultSet {
        let mut out = ResultSet::empty();
        for resolution in resolutions {
            out.extend_unique(self.execute(resolution, dataset, context));
        }
        out
    }

    /// AND of `predicates` over `base`, in base order.
    pub fn filter(&self, base: &[Arc<CompanyRecord>], predicates: &[Predicate]) -> ResultSet {
        if predicates.is_empty() {
            return ResultSet::from_rows(base.to_vec());
        }
        ResultSet::from_rows(
            base.iter()
                .filter(|r| predicates.iter().all(|p| p.matches(r)))
                .cloned()
                .collect(),
        )
    }
}
