// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzzy matcher: bounded Damerau-Levenshtein with a growing budget.
//!
//! The budget grows from 1 edit up to a quarter of the longest still-active
//! query term, so every term gets a chance at a close match before anything
//! spends a loose one. Candidate doc tokens are length-gated first:
//! `|len(a) - len(b)|` is a lower bound on edit distance, and the gate
//! catches most non-matches before the DP allocates anything.
//!
//! The distance is optimal-string-alignment Damerau: substitutions,
//! insertions, deletions, and adjacent transpositions ("teh" → "the" is one
//! edit, not two).

use super::{flags, MatchState};
use crate::types::CoverageSetup;

/// Fraction of the longest active query term that sets the edit budget.
const EDIT_BUDGET_RATIO: f64 = 0.25;

pub(super) fn run(state: &mut MatchState<'_>, setup: &CoverageSetup) {
    if state.all_terms_fully_matched() {
        return;
    }
    let Some(max_active_len) = state.max_active_query_chars() else {
        return;
    };
    let max_edit_dist = ((max_active_len * EDIT_BUDGET_RATIO).round() as usize).max(1);

    for edit_budget in 1..=max_edit_dist {
        for i in 0..state.terms() {
            if !state.is_q_active(i) {
                continue;
            }
            let q_len = state.q_chars(i) as usize;
            let min_len = (setup.min_word_size + 1).max(q_len.saturating_sub(edit_budget));
            let max_len = setup.levenshtein_cap().min(q_len + edit_budget);
            if min_len > max_len {
                continue;
            }
            for j in 0..state.doc_count() {
                if !state.is_d_active(j) {
                    continue;
                }
                let d_len = state.d_chars(j);
                if d_len < min_len || d_len > max_len {
                    continue;
                }
                let Some(dist) = damerau_within(state.q_text(i), state.d_text(j), edit_budget)
                else {
                    continue;
                };
                let credit = (q_len - dist) as f64;
                let pos = state.d_token(j).position;
                state.credit(i, flags::FUZZY, credit, pos);
                state.word_hits += 1;
                state.num_fuzzy += credit;
                state.deactivate_q(i);
                state.deactivate_d(j);
                break;
            }
        }
    }
}

/// Damerau-Levenshtein (OSA) distance if it is within `max`, else `None`.
///
/// Three-row DP over characters with two early exits: the length-difference
/// lower bound, and abandoning the DP once a full row exceeds `max`. Inputs
/// are compared as-is; callers fold case first.
pub(crate) fn damerau_within(a: &str, b: &str, max: usize) -> Option<usize> {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (a_len, b_len) = (a_chars.len(), b_chars.len());

    if a_len.abs_diff(b_len) > max {
        return None;
    }
    if a_len == 0 {
        return (b_len <= max).then_some(b_len);
    }
    if b_len == 0 {
        return (a_len <= max).then_some(a_len);
    }

    let mut prev_prev: Vec<usize> = vec![0; b_len + 1];
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut current: Vec<usize> = vec![0; b_len + 1];

    for i in 0..a_len {
        current[0] = i + 1;
        let mut row_min = current[0];
        for j in 0..b_len {
            let cost = usize::from(a_chars[i] != b_chars[j]);
            let mut best = (prev[j + 1] + 1).min(current[j] + 1).min(prev[j] + cost);
            if i > 0
                && j > 0
                && a_chars[i] == b_chars[j - 1]
                && a_chars[i - 1] == b_chars[j]
            {
                best = best.min(prev_prev[j - 1] + 1);
            }
            current[j + 1] = best;
            if best < row_min {
                row_min = best;
            }
        }
        if row_min > max {
            return None;
        }
        std::mem::swap(&mut prev_prev, &mut prev);
        std::mem::swap(&mut prev, &mut current);
    }

    let dist = prev[b_len];
    (dist <= max).then_some(dist)
}
