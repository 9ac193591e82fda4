// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The matcher cascade: whole word, joined word, prefix/suffix, fuzzy.
//!
//! All four passes mutate one shared `MatchState`. A pass that matches a
//! query token `i` against a doc token `j` *claims* the pair: both are
//! deactivated and no later pass may touch them. Pass order is fixed and
//! matters - cheap, high-confidence matchers run first so the expensive fuzzy
//! pass only sees what nothing else could explain.
//!
//! Tie-breaking inside a pass is deterministic: query tokens in index order,
//! doc tokens in position order, first matching pair wins. This is what makes
//! the whole pipeline a pure function of its inputs.
//!
//! The matchers share one signature, `fn(&mut MatchState, &CoverageSetup)`,
//! and the cascade is a plain array of function pointers. No trait object,
//! no dispatch table.

mod affix;
mod fuzzy;
mod joined;
mod whole;

pub(crate) use fuzzy::damerau_within;

use crate::context::CoverageQueryContext;
use crate::scratch::CoverageBuffer;
use crate::tokenize::tokenize_into;
use crate::types::{CoverageSetup, StringSlice};

/// Match class bits stored per query term.
pub(crate) mod flags {
    /// Claimed by the whole-word matcher.
    pub const WHOLE: u8 = 1;
    /// Claimed by the joined-word matcher.
    pub const JOINED: u8 = 2;
    /// Claimed by the prefix/suffix matcher.
    pub const PREFIX: u8 = 4;
    /// Claimed by the fuzzy matcher.
    pub const FUZZY: u8 = 8;
}

/// Shared match state for one `(query, document)` pair.
///
/// Owns nothing: the query side lives in the prepared context, the document
/// side in the rented scratch buffer. Lives for exactly one candidate scoring
/// call and is not thread-safe.
pub struct MatchState<'a> {
    ctx: &'a CoverageQueryContext,
    buf: &'a mut CoverageBuffer,
    /// Matched doc words across whole, joined, and fuzzy passes.
    pub word_hits: u32,
    /// Accumulated fuzzy credit: `sum(query_len - edit_distance)`.
    pub num_fuzzy: f64,
}

impl<'a> MatchState<'a> {
    /// Tokenize and deduplicate `doc_text` into the scratch buffer and set up
    /// the per-term claim arrays.
    pub fn new(
        ctx: &'a CoverageQueryContext,
        doc_text: &str,
        setup: &CoverageSetup,
        buf: &'a mut CoverageBuffer,
    ) -> Self {
        buf.reset(ctx.terms_count());
        tokenize_into(
            doc_text,
            setup.min_word_size,
            &setup.delimiters,
            &mut buf.doc_tokens,
        );

        // Dedup by folded content, first occurrence (earliest position) wins.
        let CoverageBuffer {
            doc_tokens,
            unique_doc,
            ..
        } = &mut *buf;
        'outer: for token in doc_tokens.iter() {
            for kept in unique_doc.iter() {
                if kept.hash == token.hash
                    && crate::types::eq_fold(kept.resolve(doc_text), token.resolve(doc_text))
                {
                    continue 'outer;
                }
            }
            unique_doc.push(*token);
        }

        for token in &buf.unique_doc {
            buf.doc_folded.push(token.resolve(doc_text).to_lowercase());
        }
        buf.d_active.resize(buf.unique_doc.len(), true);

        Self {
            ctx,
            buf,
            word_hits: 0,
            num_fuzzy: 0.0,
        }
    }

    // -- query side ----------------------------------------------------------

    #[inline]
    pub(crate) fn terms(&self) -> usize {
        self.ctx.terms_count()
    }

    #[inline]
    pub(crate) fn q_text(&self, i: usize) -> &str {
        &self.ctx.term_text[i]
    }

    #[inline]
    pub(crate) fn q_chars(&self, i: usize) -> f64 {
        self.ctx.term_max_chars[i]
    }

    #[inline]
    pub(crate) fn q_token(&self, i: usize) -> StringSlice {
        self.ctx.query_tokens[i]
    }

    #[inline]
    pub(crate) fn is_q_active(&self, i: usize) -> bool {
        self.buf.q_active[i]
    }

    // -- document side -------------------------------------------------------

    #[inline]
    pub(crate) fn doc_count(&self) -> usize {
        self.buf.unique_doc.len()
    }

    #[inline]
    pub(crate) fn d_text(&self, j: usize) -> &str {
        &self.buf.doc_folded[j]
    }

    #[inline]
    pub(crate) fn d_chars(&self, j: usize) -> usize {
        self.buf.doc_folded[j].chars().count()
    }

    #[inline]
    pub(crate) fn d_token(&self, j: usize) -> StringSlice {
        self.buf.unique_doc[j]
    }

    #[inline]
    pub(crate) fn is_d_active(&self, j: usize) -> bool {
        self.buf.d_active[j]
    }

    /// Index of the active unique doc token at stream position `position`.
    pub(crate) fn active_doc_at_position(&self, position: i32) -> Option<usize> {
        (0..self.doc_count())
            .find(|&j| self.buf.d_active[j] && self.buf.unique_doc[j].position == position)
    }

    // -- claims --------------------------------------------------------------

    /// Record a match of class `flag` for term `i` at doc position `pos`,
    /// crediting `credit` characters. Does not deactivate anything; the
    /// matcher decides which participants are consumed.
    pub(crate) fn credit(&mut self, i: usize, flag: u8, credit: f64, pos: i32) {
        self.buf.flags[i] |= flag;
        self.buf.matched_chars[i] += credit;
        if self.buf.first_pos[i] < 0 || pos < self.buf.first_pos[i] {
            self.buf.first_pos[i] = pos;
        }
    }

    #[inline]
    pub(crate) fn deactivate_q(&mut self, i: usize) {
        self.buf.q_active[i] = false;
    }

    #[inline]
    pub(crate) fn deactivate_d(&mut self, j: usize) {
        self.buf.d_active[j] = false;
    }

    // -- aggregate views -----------------------------------------------------

    /// Longest character budget among still-active query terms.
    pub(crate) fn max_active_query_chars(&self) -> Option<f64> {
        (0..self.terms())
            .filter(|&i| self.buf.q_active[i])
            .map(|i| self.ctx.term_max_chars[i])
            .fold(None, |best, len| match best {
                Some(b) if b >= len => Some(b),
                _ => Some(len),
            })
    }

    /// True when every term already has full character credit.
    pub(crate) fn all_terms_fully_matched(&self) -> bool {
        (0..self.terms())
            .all(|i| self.buf.matched_chars[i] + 1e-9 >= self.ctx.term_max_chars[i])
    }

    // -- results -------------------------------------------------------------

    #[inline]
    pub(crate) fn matched_chars(&self, i: usize) -> f64 {
        self.buf.matched_chars[i]
    }

    #[inline]
    pub(crate) fn term_flags(&self, i: usize) -> u8 {
        self.buf.flags[i]
    }

    #[inline]
    pub(crate) fn first_pos(&self, i: usize) -> i32 {
        self.buf.first_pos[i]
    }

    #[inline]
    pub(crate) fn context(&self) -> &CoverageQueryContext {
        self.ctx
    }
}

/// Run the enabled matcher passes in cascade order.
pub(crate) fn run_cascade(state: &mut MatchState<'_>, setup: &CoverageSetup) {
    let passes: [(bool, fn(&mut MatchState<'_>, &CoverageSetup)); 4] = [
        (setup.cover_whole_words, whole::run),
        (setup.cover_joined_words, joined::run),
        (setup.cover_prefix_suffix, affix::run),
        (setup.cover_fuzzy_words, fuzzy::run),
    ];
    for (enabled, pass) in passes {
        if enabled {
            pass(state, setup);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::scratch::PooledBuffer;

    /// Build a context + state pair for matcher tests.
    pub(crate) fn state_for<'a>(
        ctx: &'a CoverageQueryContext,
        doc: &'a str,
        setup: &CoverageSetup,
        buf: &'a mut PooledBuffer,
    ) -> MatchState<'a> {
        MatchState::new(ctx, doc, setup, buf)
    }

    pub(crate) fn context_for(query: &str, setup: &CoverageSetup) -> CoverageQueryContext {
        CoverageQueryContext::prepare(query.to_string(), setup, None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::{context_for, state_for};
    use super::*;
    use crate::scratch::CoverageBuffer;

    #[test]
    fn state_dedups_doc_tokens_preserving_position() {
        let setup = CoverageSetup::default();
        let ctx = context_for("matrix", &setup);
        let mut buf = CoverageBuffer::acquire();
        let state = state_for(&ctx, "the matrix the Matrix", &setup, &mut buf);
        assert_eq!(state.doc_count(), 2);
        assert_eq!(state.d_text(0), "the");
        assert_eq!(state.d_text(1), "matrix");
        assert_eq!(state.d_token(1).position, 1);
    }

    #[test]
    fn cascade_respects_disabled_passes() {
        let setup = CoverageSetup {
            cover_whole_words: false,
            cover_joined_words: false,
            cover_prefix_suffix: false,
            cover_fuzzy_words: false,
            ..CoverageSetup::default()
        };
        let ctx = context_for("matrix", &setup);
        let mut buf = CoverageBuffer::acquire();
        let mut state = state_for(&ctx, "matrix", &setup, &mut buf);
        run_cascade(&mut state, &setup);
        assert_eq!(state.term_flags(0), 0);
        assert!(state.is_q_active(0));
    }

    #[test]
    fn whole_word_cascade_claims_pairs() {
        let setup = CoverageSetup::default();
        let ctx = context_for("the matrix", &setup);
        let mut buf = CoverageBuffer::acquire();
        let mut state = state_for(&ctx, "The Matrix Revisited", &setup, &mut buf);
        run_cascade(&mut state, &setup);
        assert_eq!(state.term_flags(0) & flags::WHOLE, flags::WHOLE);
        assert_eq!(state.term_flags(1) & flags::WHOLE, flags::WHOLE);
        assert!(!state.is_q_active(0));
        assert!(!state.is_q_active(1));
        assert_eq!(state.word_hits, 2);
    }
}
