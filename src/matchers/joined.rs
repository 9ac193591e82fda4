// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Joined-word matcher: compound words split differently on each side.
//!
//! Catches "key board" vs "keyboard" in both directions: a query token that
//! equals two *adjacent* doc tokens concatenated, or a doc token that equals
//! two adjacent query tokens. Adjacency means consecutive `position` values
//! in the original token stream, so filtered short words break adjacency -
//! "key of board" does not join.
//!
//! Participants are all deactivated on a hit; every joined term receives its
//! full character budget.

use super::{flags, MatchState};
use crate::types::CoverageSetup;

pub(super) fn run(state: &mut MatchState<'_>, _setup: &CoverageSetup) {
    for i in 0..state.terms() {
        if !state.is_q_active(i) {
            continue;
        }
        if try_query_spans_doc_pair(state, i) {
            continue;
        }
        try_doc_spans_query_pair(state, i);
    }
}

/// Query token `i` equals `doc[j] + doc[j2]` for adjacent doc tokens.
fn try_query_spans_doc_pair(state: &mut MatchState<'_>, i: usize) -> bool {
    let q = state.q_text(i);
    for j in 0..state.doc_count() {
        if !state.is_d_active(j) {
            continue;
        }
        let d_first = state.d_text(j);
        if q.len() <= d_first.len() || !q.starts_with(d_first) {
            continue;
        }
        let next_position = state.d_token(j).position + 1;
        let Some(j2) = state.active_doc_at_position(next_position) else {
            continue;
        };
        let d_second = state.d_text(j2);
        if q.len() == d_first.len() + d_second.len() && q.ends_with(d_second) {
            let credit = state.q_chars(i);
            let pos = state.d_token(j).position;
            state.credit(i, flags::JOINED, credit, pos);
            state.word_hits += 2;
            state.deactivate_q(i);
            state.deactivate_d(j);
            state.deactivate_d(j2);
            return true;
        }
    }
    false
}

/// Doc token equals `query[i] + query[i2]` for adjacent query tokens.
fn try_doc_spans_query_pair(state: &mut MatchState<'_>, i: usize) -> bool {
    let next_position = state.q_token(i).position + 1;
    let Some(i2) = (0..state.terms())
        .find(|&k| state.is_q_active(k) && state.q_token(k).position == next_position)
    else {
        return false;
    };

    for j in 0..state.doc_count() {
        if !state.is_d_active(j) {
            continue;
        }
        let d = state.d_text(j);
        let (q_first, q_second) = (state.q_text(i), state.q_text(i2));
        if d.len() == q_first.len() + q_second.len()
            && d.starts_with(q_first)
            && d.ends_with(q_second)
        {
            let pos = state.d_token(j).position;
            let first_credit = state.q_chars(i);
            let second_credit = state.q_chars(i2);
            state.credit(i, flags::JOINED, first_credit, pos);
            state.credit(i2, flags::JOINED, second_credit, pos);
            state.word_hits += 1;
            state.deactivate_q(i);
            state.deactivate_q(i2);
            state.deactivate_d(j);
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{context_for, state_for};
    use super::*;
    use crate::scratch::CoverageBuffer;

    #[test]
    fn query_token_spans_two_doc_tokens() {
        let setup = CoverageSetup::default();
        let ctx = context_for("keyboard", &setup);
        let mut buf = CoverageBuffer::acquire();
        let mut state = state_for(&ctx, "key board layout", &setup, &mut buf);
        run(&mut state, &setup);
        assert_eq!(state.term_flags(0), flags::JOINED);
        assert_eq!(state.matched_chars(0), 8.0);
        assert_eq!(state.first_pos(0), 0);
        assert_eq!(state.word_hits, 2);
    }

    #[test]
    fn doc_token_spans_two_query_tokens() {
        let setup = CoverageSetup::default();
        let ctx = context_for("key board", &setup);
        let mut buf = CoverageBuffer::acquire();
        let mut state = state_for(&ctx, "keyboard layout", &setup, &mut buf);
        run(&mut state, &setup);
        assert_eq!(state.term_flags(0), flags::JOINED);
        assert_eq!(state.term_flags(1), flags::JOINED);
        assert_eq!(state.matched_chars(0), 3.0);
        assert_eq!(state.matched_chars(1), 5.0);
        assert_eq!(state.word_hits, 1);
    }

    #[test]
    fn non_adjacent_doc_tokens_do_not_join() {
        let setup = CoverageSetup::default();
        let ctx = context_for("keyboard", &setup);
        let mut buf = CoverageBuffer::acquire();
        // "a" is filtered by min_word_size but still consumes a position,
        // so "key" and "board" sit at positions 0 and 2.
        let mut state = state_for(&ctx, "key a board", &setup, &mut buf);
        run(&mut state, &setup);
        assert_eq!(state.term_flags(0), 0);
        assert!(state.is_q_active(0));
    }

    #[test]
    fn length_mismatch_does_not_join() {
        let setup = CoverageSetup::default();
        let ctx = context_for("keyboards", &setup);
        let mut buf = CoverageBuffer::acquire();
        let mut state = state_for(&ctx, "key board", &setup, &mut buf);
        run(&mut state, &setup);
        assert_eq!(state.term_flags(0), 0);
    }
}
