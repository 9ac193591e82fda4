// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Word-level document lookup backing the lexical prescreen.
//!
//! A plain token-to-documents map with three probe modes: exact, fuzzy
//! (Damerau-Levenshtein within a length-derived budget), and affix (the probe
//! is a prefix or suffix of an indexed word). The prescreen uses it to cheaply
//! shrink the candidate set before the coverage engine does real work; it is
//! deliberately not a posting list and stores no positions.

use crate::matchers::damerau_within;
use crate::tokenize::word_tokens;
use crate::types::{CoverageSetup, DEFAULT_DELIMITERS};
use std::collections::{BTreeSet, HashMap};

/// Fraction of the probe length granted as fuzzy edit budget.
const FUZZY_BUDGET_RATIO: f64 = 0.25;

/// Token-to-documents map with exact, fuzzy, and affix probes.
#[derive(Debug, Default)]
pub struct WordMatcher {
    words: HashMap<String, BTreeSet<usize>>,
    min_word_size: usize,
    delimiters: Vec<char>,
}

impl WordMatcher {
    /// An empty matcher with default tokenization settings.
    pub fn new() -> Self {
        Self {
            words: HashMap::new(),
            min_word_size: 1,
            delimiters: DEFAULT_DELIMITERS.to_vec(),
        }
    }

    /// An empty matcher sharing the engine's tokenization settings.
    pub fn with_setup(setup: &CoverageSetup) -> Self {
        Self {
            words: HashMap::new(),
            min_word_size: setup.min_word_size.max(1),
            delimiters: setup.delimiters.clone(),
        }
    }

    /// Index every token of `text` under `doc_id`.
    pub fn insert_document(&mut self, doc_id: usize, text: &str) {
        for word in word_tokens(text, self.min_word_size, &self.delimiters) {
            self.words.entry(word).or_default().insert(doc_id);
        }
    }

    /// Number of distinct indexed words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Documents containing exactly `word` (case-insensitive).
    pub fn lookup_exact(&self, word: &str) -> BTreeSet<usize> {
        self.words
            .get(&word.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Documents containing `word` exactly, or - when nothing matches
    /// exactly - within the fuzzy edit budget `max(1, round(len / 4))`.
    pub fn lookup(&self, word: &str) -> BTreeSet<usize> {
        let exact = self.lookup_exact(word);
        if !exact.is_empty() {
            return exact;
        }

        let probe = word.to_lowercase();
        let probe_len = probe.chars().count();
        let budget = ((probe_len as f64 * FUZZY_BUDGET_RATIO).round() as usize).max(1);

        let mut results = BTreeSet::new();
        for (indexed, docs) in &self.words {
            if indexed.chars().count().abs_diff(probe_len) > budget {
                continue;
            }
            if damerau_within(&probe, indexed, budget).is_some() {
                results.extend(docs.iter().copied());
            }
        }
        results
    }

    /// Documents containing a word that starts or ends with `affix`.
    pub fn lookup_affix(&self, affix: &str) -> BTreeSet<usize> {
        let probe = affix.to_lowercase();
        if probe.is_empty() {
            return BTreeSet::new();
        }
        let mut results = BTreeSet::new();
        for (indexed, docs) in &self.words {
            if indexed.starts_with(&probe) || indexed.ends_with(&probe) {
                results.extend(docs.iter().copied());
            }
        }
        results
    }
}
