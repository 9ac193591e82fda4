// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The prepared-per-query artifact.
//!
//! Everything about a query that does not depend on the candidate document is
//! computed once here: normalized text, deduplicated tokens, folded token
//! strings, per-term character budgets, and per-term IDF. Candidate scoring
//! then only touches the document side.
//!
//! The context is immutable after preparation and released when the query
//! completes. It is cheap to clone the pieces that matter (IDF is behind an
//! `Arc` shared with the engine's memo).

use crate::idf::{compute_term_idf, TermCollection, WordIdfProvider};
use crate::tokenize::{dedup_tokens, tokenize};
use crate::types::{CoverageSetup, StringSlice};
use std::sync::Arc;

/// Immutable per-query state: deduplicated tokens, budgets, and IDF.
#[derive(Debug, Clone)]
pub struct CoverageQueryContext {
    /// The normalized query text that the token slices resolve against.
    pub query: String,
    /// Deduplicated query tokens, ordered by first occurrence.
    pub query_tokens: Vec<StringSlice>,
    /// Case-folded text of each query token.
    pub term_text: Vec<String>,
    /// Character budget per term: the token's character length.
    pub term_max_chars: Vec<f64>,
    /// Per-term IDF, averaged over the configured n-gram sizes.
    pub term_idf: Arc<Vec<f64>>,
    /// Optional per-token IDF from a word-level cache.
    pub word_level_idf: Option<Vec<f64>>,
}

impl CoverageQueryContext {
    /// Build a context for `query` (already normalized by the caller).
    ///
    /// `cached_idf` short-circuits the IDF computation when the engine's
    /// per-query memo already holds a value for this query string.
    pub(crate) fn prepare(
        query: String,
        setup: &CoverageSetup,
        terms: Option<&dyn TermCollection>,
        word_idf: Option<&dyn WordIdfProvider>,
        cached_idf: Option<Arc<Vec<f64>>>,
    ) -> Self {
        let raw = tokenize(&query, setup.min_word_size, &setup.delimiters);
        let query_tokens = dedup_tokens(&query, &raw);

        let term_text: Vec<String> = query_tokens
            .iter()
            .map(|t| t.resolve(&query).to_lowercase())
            .collect();
        let term_max_chars: Vec<f64> = term_text
            .iter()
            .map(|t| t.chars().count() as f64)
            .collect();

        let term_idf = match cached_idf {
            Some(idf) if idf.len() == query_tokens.len() => idf,
            _ => Arc::new(
                term_text
                    .iter()
                    .map(|t| compute_term_idf(t, terms, &setup.index_sizes))
                    .collect(),
            ),
        };

        let word_level_idf = word_idf.map(|provider| {
            term_text
                .iter()
                .map(|t| provider.word_idf(t).unwrap_or(0.0))
                .collect()
        });

        Self {
            query,
            query_tokens,
            term_text,
            term_max_chars,
            term_idf,
            word_level_idf,
        }
    }

    /// Number of deduplicated query terms.
    #[inline]
    pub fn terms_count(&self) -> usize {
        self.query_tokens.len()
    }

    /// True for empty or whitespace-only queries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.query_tokens.is_empty()
    }
}
