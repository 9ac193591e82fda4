// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The coverage engine: the public face of the scoring pipeline.
//!
//! One engine per index. Collaborator caches (term collection, word IDF,
//! document metadata) are installed once after indexing and read-only from
//! then on. Per query, `prepare_query` builds the immutable context;
//! per candidate, `calculate_features` rents scratch, runs the matcher
//! cascade, derives features, and attaches fusion signals. The engine owns
//! the per-query IDF memo so repeated queries skip the n-gram walk.
//!
//! Candidate scoring is embarrassingly parallel: the context is shared
//! immutably and every call rents its own thread-local scratch. With the
//! `rayon` feature, `score_candidates` fans out over a candidate slice.

use crate::context::CoverageQueryContext;
use crate::coverage::derive_features;
use crate::idf::{MetadataProvider, QueryIdfCache, TermCollection, WordIdfProvider};
use crate::matchers::{run_cascade, MatchState};
use crate::normalize::Normalizer;
use crate::scratch::CoverageBuffer;
use crate::segments::calculate_lcs;
use crate::signals::FusionSignalComputer;
use crate::types::{CoverageFeatures, CoverageSetup, ANCHOR_STEM_LENGTH};
use std::sync::Arc;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Coverage scoring engine. Cheap to share behind an `Arc`; all per-query
/// and per-candidate state lives outside it.
pub struct CoverageEngine {
    setup: CoverageSetup,
    normalizer: Normalizer,
    terms: Option<Arc<dyn TermCollection>>,
    word_idf: Option<Arc<dyn WordIdfProvider>>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    idf_cache: QueryIdfCache,
}

impl Default for CoverageEngine {
    fn default() -> Self {
        Self::new(CoverageSetup::default())
    }
}

impl CoverageEngine {
    /// An engine with the given setup and no collaborators installed.
    pub fn new(setup: CoverageSetup) -> Self {
        Self {
            setup,
            normalizer: Normalizer::default(),
            terms: None,
            word_idf: None,
            metadata: None,
            idf_cache: QueryIdfCache::new(),
        }
    }

    /// The active setup.
    pub fn setup(&self) -> &CoverageSetup {
        &self.setup
    }

    /// Install the n-gram term collection built at index time.
    pub fn set_term_collection(&mut self, terms: Arc<dyn TermCollection>) {
        self.terms = Some(terms);
    }

    /// Install the word-level IDF cache.
    pub fn set_word_idf_provider(&mut self, provider: Arc<dyn WordIdfProvider>) {
        self.word_idf = Some(provider);
    }

    /// Install the document metadata cache.
    pub fn set_metadata_provider(&mut self, provider: Arc<dyn MetadataProvider>) {
        self.metadata = Some(provider);
    }

    /// Build the immutable per-query context.
    ///
    /// Empty and whitespace-only queries produce an empty context; scoring
    /// against it yields zeroes everywhere, never an error.
    pub fn prepare_query(&self, query: &str) -> CoverageQueryContext {
        let normalized = self.normalizer.normalize(query).into_owned();
        let cached = self.idf_cache.get(&normalized);
        let had_cache = cached.is_some();
        let context = CoverageQueryContext::prepare(
            normalized,
            &self.setup,
            self.terms.as_deref(),
            self.word_idf.as_deref(),
            cached,
        );
        if !had_cache && !context.is_empty() {
            self.idf_cache
                .insert(&context.query, Arc::clone(&context.term_idf));
        }
        context
    }

    /// Score one candidate document against a prepared context.
    ///
    /// `lcs_sum` is the whole-query LCS the caller computed (or 0 to let the
    /// engine compute it when the whole-query blend is enabled). `doc_id`
    /// keys the metadata cache lookup.
    pub fn calculate_features(
        &self,
        context: &CoverageQueryContext,
        doc_text: &str,
        lcs_sum: usize,
        doc_id: i64,
    ) -> CoverageFeatures {
        if context.is_empty() {
            return CoverageFeatures::default();
        }
        let doc_text = self.normalizer.normalize(doc_text);

        let lcs_sum = if lcs_sum == 0 && self.setup.cover_whole_query {
            calculate_lcs(&context.query, &doc_text)
        } else {
            lcs_sum
        };

        let mut buffer = CoverageBuffer::acquire();
        let mut state = MatchState::new(context, &doc_text, &self.setup, &mut buffer);
        run_cascade(&mut state, &self.setup);
        let mut features = derive_features(&state, lcs_sum, &self.setup);
        drop(state);

        let metadata = self
            .metadata
            .as_deref()
            .and_then(|provider| provider.document_metadata(doc_id));
        features.signals = FusionSignalComputer::new(&self.setup.delimiters, ANCHOR_STEM_LENGTH)
            .compute(&context.query, &doc_text, metadata.as_ref());
        features
    }

    /// Convenience: prepare, score, and return only the coverage byte.
    pub fn calculate_coverage_score(&self, query: &str, doc_text: &str, lcs_sum: usize) -> u8 {
        let context = self.prepare_query(query);
        self.calculate_features(&context, doc_text, lcs_sum, -1)
            .coverage_score
    }

    /// Score a batch of `(doc_id, text)` candidates in parallel.
    ///
    /// Each worker rents its own scratch; results are in input order and
    /// identical to sequential scoring.
    #[cfg(feature = "rayon")]
    pub fn score_candidates(
        &self,
        context: &CoverageQueryContext,
        candidates: &[(i64, String)],
    ) -> Vec<(i64, CoverageFeatures)> {
        candidates
            .par_iter()
            .map(|(doc_id, text)| (*doc_id, self.calculate_features(context, text, 0, *doc_id)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idf::TermCollection;
    use std::collections::HashMap;

    struct FixedTerms {
        total: u64,
        df: HashMap<String, u64>,
    }

    impl TermCollection for FixedTerms {
        fn document_frequency(&self, ngram: &str) -> Option<u64> {
            self.df.get(ngram).copied()
        }

        fn total_documents(&self) -> u64 {
            self.total
        }
    }

    #[test]
    fn empty_query_scores_zero_everywhere() {
        let engine = CoverageEngine::default();
        let context = engine.prepare_query("   ");
        assert!(context.is_empty());
        let features = engine.calculate_features(&context, "any document", 0, 1);
        assert_eq!(features.terms_count, 0);
        assert_eq!(features.coverage_score, 0);
        assert_eq!(engine.calculate_coverage_score("", "any document", 0), 0);
    }

    #[test]
    fn features_flow_through_the_whole_pipeline() {
        let engine = CoverageEngine::default();
        let context = engine.prepare_query("the matrix rev");
        let features = engine.calculate_features(&context, "The Matrix Revisited", 0, 1);
        assert_eq!(features.terms_with_any_match, 3);
        assert!(features.signals.lexical_prefix_last);
        assert!(features.signals.is_perfect_doc_lexical);
        assert!(features.coverage_score > 200);
    }

    #[test]
    fn scoring_is_deterministic_across_repeats() {
        let engine = CoverageEngine::default();
        let context = engine.prepare_query("two fo");
        let first = engine.calculate_features(&context, "Two for Joy", 0, 7);
        for _ in 0..5 {
            let again = engine.calculate_features(&context, "Two for Joy", 0, 7);
            assert_eq!(first, again);
        }
    }

    #[test]
    fn idf_cache_reuses_prepared_values() {
        let mut engine = CoverageEngine::default();
        engine.set_term_collection(Arc::new(FixedTerms {
            total: 100,
            df: HashMap::new(),
        }));
        let first = engine.prepare_query("matrix reloaded");
        let second = engine.prepare_query("matrix reloaded");
        assert!(Arc::ptr_eq(&first.term_idf, &second.term_idf));
    }

    #[test]
    fn doc_normalization_applies_before_matching() {
        let engine = CoverageEngine::default();
        let context = engine.prepare_query("cafe");
        let features = engine.calculate_features(&context, "Caf\u{e9}  Royale", 0, 1);
        if cfg!(feature = "unicode-normalization") {
            assert_eq!(features.terms_strict_matched, 1);
        }
    }
}
