// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Term rarity estimation.
//!
//! Per-term IDF drives two things downstream: the IDF-weighted coverage blend
//! and the partial-coverage forgiveness logic (missing a common word costs
//! less than missing a rare one). The estimate is averaged over the n-grams
//! the index actually stores, so it agrees with what the posting lists would
//! say about the term.
//!
//! When no term collection is installed (or it is empty), the fallback is
//! `log2(length + 1)`: longer terms are treated as rarer, which is the right
//! prior for typeahead queries against an unknown corpus.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Read access to the n-gram term dictionary built at index time.
///
/// Installed once post-indexing and read-only thereafter.
pub trait TermCollection: Send + Sync {
    /// Document frequency of an n-gram, or `None` when it was never indexed.
    fn document_frequency(&self, ngram: &str) -> Option<u64>;
    /// Total documents in the collection.
    fn total_documents(&self) -> u64;
}

/// Optional word-level IDF source, distinct from the n-gram dictionary.
pub trait WordIdfProvider: Send + Sync {
    /// IDF of a whole word, or `None` when unknown.
    fn word_idf(&self, word: &str) -> Option<f64>;
}

/// Access to precomputed per-document token metadata.
pub trait MetadataProvider: Send + Sync {
    /// Metadata for a document, or `None` to fall back to the empty sentinel.
    fn document_metadata(&self, doc_id: i64) -> Option<crate::types::DocumentMetadata>;
}

/// BM25 IDF: `ln((N - df + 0.5) / (df + 0.5) + 1)`.
///
/// Saturates the numerator at 0.5 when `df > N` (possible with stale
/// collaborator caches) so the result stays non-negative.
#[inline]
pub fn bm25_idf(total_documents: u64, document_frequency: u64) -> f64 {
    let n = total_documents as f64;
    let df = document_frequency as f64;
    (((n - df).max(0.0) + 0.5) / (df + 0.5) + 1.0).ln()
}

/// Fallback IDF when no collection is available: `log2(length + 1)`.
#[inline]
pub fn fallback_idf(term_char_len: usize) -> f64 {
    ((term_char_len + 1) as f64).log2()
}

/// Average IDF of `term` over all n-grams of the configured sizes.
///
/// N-grams are character windows of the case-folded term. Sizes longer than
/// the term contribute nothing. An n-gram absent from the collection scores
/// as `df = 0`, i.e. maximally rare.
pub fn compute_term_idf(
    term: &str,
    terms: Option<&dyn TermCollection>,
    index_sizes: &[usize],
) -> f64 {
    let chars: Vec<char> = term.chars().flat_map(char::to_lowercase).collect();
    let collection = match terms {
        Some(c) if c.total_documents() > 0 => c,
        _ => return fallback_idf(chars.len()),
    };

    let total = collection.total_documents();
    let mut sum = 0.0;
    let mut grams = 0usize;
    let mut gram = String::new();
    for &size in index_sizes {
        if size == 0 || size > chars.len() {
            continue;
        }
        for window in chars.windows(size) {
            gram.clear();
            gram.extend(window.iter());
            let df = collection.document_frequency(&gram).unwrap_or(0);
            sum += bm25_idf(total, df);
            grams += 1;
        }
    }

    if grams == 0 {
        fallback_idf(chars.len())
    } else {
        sum / grams as f64
    }
}

/// Per-query IDF memo, keyed by the full query string.
///
/// Candidate evaluations for the same query reuse one computation. Writes are
/// last-writer-wins; both writers computed identical values, so the race is
/// benign. Bounded by wholesale eviction rather than LRU bookkeeping: the
/// memo is a hot-path cache, not a store.
pub(crate) struct QueryIdfCache {
    entries: RwLock<HashMap<String, Arc<Vec<f64>>>>,
}

/// Eviction threshold for the query IDF memo.
const MAX_CACHED_QUERIES: usize = 512;

impl QueryIdfCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn get(&self, query: &str) -> Option<Arc<Vec<f64>>> {
        self.entries.read().get(query).cloned()
    }

    pub(crate) fn insert(&self, query: &str, idf: Arc<Vec<f64>>) {
        let mut entries = self.entries.write();
        if entries.len() >= MAX_CACHED_QUERIES && !entries.contains_key(query) {
            entries.clear();
        }
        entries.insert(query.to_string(), idf);
    }
}
