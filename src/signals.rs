// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Lexical fusion signals, computed over unfiltered token streams.
//!
//! The coverage matchers never see tokens shorter than `min_word_size`, but
//! typeahead semantics care about them: "two fo" ends in a two-character
//! prefix, and whether the doc continues "for joy" or buries "for" in the
//! middle decides the ranking. So this pass re-tokenizes both sides with no
//! length filter and answers purely lexical questions: does the query read as
//! a prefix of the doc, is the doc nothing but the query, is there stem
//! evidence for an unmatched term.
//!
//! Everything here is byte-cheap and allocation-light; the only quadratic
//! corner is the single-term similarity, which is one bounded
//! Damerau distance per doc token.

use crate::matchers::damerau_within;
use crate::tokenize::word_tokens;
use crate::types::{
    DocumentMetadata, FusionSignals, ANCHOR_STEM_LENGTH, MAX_TRAILING_TERM_LENGTH_FOR_BONUS,
};

/// Computes [`FusionSignals`] for one `(query, document)` pair.
pub struct FusionSignalComputer<'a> {
    delimiters: &'a [char],
    min_stem_length: usize,
}

impl<'a> FusionSignalComputer<'a> {
    /// A computer using the given delimiter set and stem length.
    pub fn new(delimiters: &'a [char], min_stem_length: usize) -> Self {
        Self {
            delimiters,
            min_stem_length: min_stem_length.max(1),
        }
    }

    /// A computer with the default stem length.
    pub fn with_delimiters(delimiters: &'a [char]) -> Self {
        Self::new(delimiters, ANCHOR_STEM_LENGTH)
    }

    /// Compute the signals. `metadata` (when available from a cache) lets the
    /// perfect-doc check bail out before tokenizing mismatched documents.
    pub fn compute(
        &self,
        query: &str,
        doc_text: &str,
        metadata: Option<&DocumentMetadata>,
    ) -> FusionSignals {
        let query_tokens = word_tokens(query, 0, self.delimiters);
        let mut signals = FusionSignals {
            unfiltered_query_token_count: query_tokens.len(),
            ..FusionSignals::default()
        };
        if query_tokens.is_empty() {
            return signals;
        }

        let doc_tokens = word_tokens(doc_text, 0, self.delimiters);
        if doc_tokens.is_empty() {
            return signals;
        }

        signals.lexical_prefix_last = lexical_prefix_last(&query_tokens, &doc_tokens);
        signals.is_perfect_doc_lexical =
            is_perfect_doc(&query_tokens, &doc_tokens, metadata);
        signals.has_anchor_stem = has_anchor_stem(&query_tokens, &doc_tokens, self.min_stem_length);
        signals.has_stem_evidence =
            has_stem_evidence(&query_tokens, &doc_tokens, self.min_stem_length);
        if query_tokens.len() == 1 {
            signals.single_term_lexical_sim = single_term_similarity(&query_tokens[0], &doc_tokens);
        }
        signals.trailing_match_density = trailing_match_density(&query_tokens, &doc_tokens);
        signals
    }
}

/// All but the last query token match strictly at increasing doc positions,
/// and the last is a prefix of a doc token after them.
fn lexical_prefix_last(query: &[String], doc: &[String]) -> bool {
    let last = query.len() - 1;
    let mut cursor = 0usize;
    for term in &query[..last] {
        match doc[cursor..].iter().position(|d| d == term) {
            Some(found) => cursor += found + 1,
            None => return false,
        }
    }
    doc[cursor..].iter().any(|d| d.starts_with(&query[last]))
}

/// The doc token sequence is the query token sequence, modulo the last token
/// being a prefix.
fn is_perfect_doc(query: &[String], doc: &[String], metadata: Option<&DocumentMetadata>) -> bool {
    if let Some(meta) = metadata {
        if meta.token_count != 0 && meta.token_count != query.len() {
            return false;
        }
    }
    if doc.len() != query.len() {
        return false;
    }
    let last = query.len() - 1;
    query[..last]
        .iter()
        .zip(&doc[..last])
        .all(|(q, d)| q == d)
        && doc[last].starts_with(&query[last])
}

/// Some stem-length query term is a prefix of a doc token.
fn has_anchor_stem(query: &[String], doc: &[String], min_stem_length: usize) -> bool {
    query.iter().any(|q| {
        q.chars().count() >= min_stem_length && doc.iter().any(|d| d.starts_with(q.as_str()))
    })
}

/// Some query term with no exact doc match shares a stem-length prefix with a
/// doc token. Used downstream to forgive one-term-missing coverage.
fn has_stem_evidence(query: &[String], doc: &[String], min_stem_length: usize) -> bool {
    query.iter().any(|q| {
        if doc.iter().any(|d| d == q) {
            return false;
        }
        doc.iter()
            .any(|d| common_prefix_chars(q, d) >= min_stem_length)
    })
}

/// Common prefix length of two strings, in characters.
fn common_prefix_chars(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(ca, cb)| ca == cb)
        .count()
}

/// Best normalized similarity of the single query term against doc tokens,
/// scaled to 0-255.
fn single_term_similarity(term: &str, doc: &[String]) -> u8 {
    let term_len = term.chars().count();
    let mut best = 0.0f64;
    for token in doc {
        let token_len = token.chars().count();
        let longest = term_len.max(token_len);
        if longest == 0 {
            continue;
        }
        if let Some(dist) = damerau_within(term, token, longest) {
            let similarity = 1.0 - dist as f64 / longest as f64;
            if similarity > best {
                best = similarity;
            }
        }
    }
    (best * 255.0).round() as u8
}

/// Fraction of short trailing query tokens found near the end of the doc,
/// scaled to 0-255.
///
/// The trailing run is the maximal suffix of query tokens with length at most
/// [`MAX_TRAILING_TERM_LENGTH_FOR_BONUS`]; the doc window is the last
/// `run + 1` tokens.
fn trailing_match_density(query: &[String], doc: &[String]) -> u8 {
    let trailing: Vec<&String> = query
        .iter()
        .rev()
        .take_while(|q| q.chars().count() <= MAX_TRAILING_TERM_LENGTH_FOR_BONUS)
        .collect();
    if trailing.is_empty() {
        return 0;
    }

    let window_len = (trailing.len() + 1).min(doc.len());
    let window = &doc[doc.len() - window_len..];
    let matched = trailing
        .iter()
        .filter(|q| window.iter().any(|d| d == **q))
        .count();
    ((matched as f64 / trailing.len() as f64) * 255.0).round() as u8
}
