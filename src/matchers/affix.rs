// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Prefix/suffix matcher: the typeahead workhorse.
//!
//! A query token that is a prefix of a doc token ("rev" → "revisited") is the
//! canonical incomplete-word case. The symmetric direction (doc token is a
//! prefix of the query token) and suffix overlap are handled the same way.
//! Credit is `min(query_len, doc_len)` characters: the overlap, never more.

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
            let q = state.q_text(i);
            let d = state.d_text(j);
            let overlaps = d.starts_with(q)
                || q.starts_with(d)
                || d.ends_with(q)
                || q.ends_with(d);
            if overlaps {
                let credit = state.q_chars(i).min(state.d_chars(j) as f64);
                let pos = state.d_token(j).position;
                state.credit(i, flags::PREFIX, credit, pos);
                state.deactivate_q(i);
                state.deactivate_d(j);
                break;
            }
        }
    }
}
