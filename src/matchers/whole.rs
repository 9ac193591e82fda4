// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Whole-word matcher: exact case-folded equality.
//!
//! The first and cheapest pass. Hash prefilter, then a direct comparison of
//! the folded token strings. A hit claims both tokens and grants the full
//! character budget.

use super::{flags, MatchState};
use crate::types::CoverageSetup;

pub(super) fn run(state: &mut MatchState<'_>, _setup: &CoverageSetup) {
    for i in 0..state.terms() {
        if !state.is_q_active(i) {
            continue;
        }
        for j in 0..state.doc_count() {
            if !state.is_d_active(j) {
                continue;
            }
            if state.q_token(i).hash == state.d_token(j).hash
                && state.q_text(i) == state.d_text(j)
            {
                let credit = state.q_chars(i);
                let pos = state.d_token(j).position;
                state.credit(i, flags::WHOLE, credit, pos);
                state.word_hits += 1;
                state.deactivate_q(i);
                state.deactivate_d(j);
                break;
            }
        }
    }
}
