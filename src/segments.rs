// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Segment consolidation: from per-segment scores to per-document results.
//!
//! Long documents are indexed as segments, each scored independently. A
//! document should surface once, at its best segment's score. Consolidation
//! walks the per-segment store in descending order, keeps the first (best)
//! entry per document key, and records which segment won so result rendering
//! can fetch that segment's text.
//!
//! `calculate_lcs` lives here because the whole-query LCS feeds both the
//! coverage blend and best-segment selection.

use crate::normalize::Normalizer;
use crate::score_array::ScoreArray;
use crate::types::DocumentCollection;
use std::collections::HashMap;

/// Consolidation and best-segment helpers.
pub struct SegmentProcessor;

impl SegmentProcessor {
    /// Collapse a per-`(document, segment)` store into a per-document store.
    ///
    /// Entries in `per_segment` carry the document *key* as `doc_id` and the
    /// segment number in `segment`. The winner per key is the entry with the
    /// highest `(score, tiebreaker)`; `best_segments` records its segment
    /// number for later text lookup.
    pub fn consolidate_segments(
        per_segment: &ScoreArray,
        best_segments: &mut HashMap<i64, i32>,
    ) -> ScoreArray {
        let mut consolidated = ScoreArray::new();
        for entry in per_segment.get_all() {
            if best_segments.contains_key(&entry.doc_id) {
                continue;
            }
            best_segments.insert(entry.doc_id, entry.segment.unwrap_or(0));
            consolidated.add(entry.doc_id, entry.score, entry.tiebreaker);
        }
        consolidated
    }

    /// The normalized text of the winning segment for `key`.
    ///
    /// Deleted or missing segments yield `None`; the candidate was already
    /// filtered upstream, this is only a rendering convenience.
    pub fn best_segment_text(
        collection: &dyn DocumentCollection,
        key: i64,
        best_segments: &HashMap<i64, i32>,
        normalizer: &Normalizer,
    ) -> Option<String> {
        let segment = *best_segments.get(&key)?;
        let document = collection.document_of_segment(key, segment)?;
        if document.deleted {
            return None;
        }
        Some(normalizer.normalize(&document.indexed_text).into_owned())
    }

    /// Longest common subsequence length between two strings, in characters,
    /// case-insensitive.
    ///
    /// Classic two-row DP. Both inputs are typically short (a query and a
    /// segment), so O(n*m) is fine; the caller memoizes per candidate.
    pub fn calculate_lcs(a: &str, b: &str) -> usize {
        calculate_lcs(a, b)
    }
}

/// Free-function form of [`SegmentProcessor::calculate_lcs`].
pub fn calculate_lcs(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b_chars: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b_chars.len() + 1];
    let mut current = vec![0usize; b_chars.len() + 1];
    for &ac in &a_chars {
        for (j, &bc) in b_chars.iter().enumerate() {
            current[j + 1] = if ac == bc {
                prev[j] + 1
            } else {
                prev[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b_chars.len()]
}
