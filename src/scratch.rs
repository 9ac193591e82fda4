// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-thread scratch buffers for candidate scoring.
//!
//! Scoring one candidate needs a handful of token arrays and match bitmaps.
//! Allocating them per candidate would dominate the hot path, so buffers are
//! rented from a thread-local pool and returned on drop. The drop guard is
//! the whole resource story: every exit path (early return, propagated error,
//! panic during a matcher pass) funnels through `Drop`, so release is
//! unconditional and idempotent.
//!
//! Buffers grow monotonically and are never shrunk; a pool entry that scored
//! a long document once keeps its capacity for the rest of the thread's life.
//! Not thread-safe by design: each worker owns its buffer for the duration of
//! one candidate scoring call.

use crate::types::StringSlice;
use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Upper bound on pooled buffers per thread. Anything beyond this is dropped
/// rather than pooled; steady-state usage needs exactly one per live scoring
/// call on the thread.
const MAX_POOLED: usize = 4;

thread_local! {
    static POOL: RefCell<Vec<Box<CoverageBuffer>>> = const { RefCell::new(Vec::new()) };
}

/// Scratch storage for one candidate scoring call.
///
/// All vectors are sized by `reset` at acquisition time. Field meaning
/// matches the match-state model: parallel arrays indexed by query term or by
/// deduplicated doc token.
#[derive(Debug, Default)]
pub struct CoverageBuffer {
    /// Raw doc token slices (post min-word-size filter, pre-dedup).
    pub(crate) doc_tokens: Vec<StringSlice>,
    /// Deduplicated doc token slices, first occurrence order.
    pub(crate) unique_doc: Vec<StringSlice>,
    /// Case-folded text of each unique doc token.
    pub(crate) doc_folded: Vec<String>,
    /// Claim flags per query term; false once a matcher consumed the term.
    pub(crate) q_active: Vec<bool>,
    /// Claim flags per unique doc token.
    pub(crate) d_active: Vec<bool>,
    /// Accumulated fractional character credit per query term.
    pub(crate) matched_chars: Vec<f64>,
    /// Match class bits per query term (see `matchers::flags`).
    pub(crate) flags: Vec<u8>,
    /// Minimum doc position that matched each term; -1 when unmatched.
    pub(crate) first_pos: Vec<i32>,
}

impl CoverageBuffer {
    /// Rent a buffer from the thread-local pool (or allocate a fresh one).
    pub fn acquire() -> PooledBuffer {
        let inner = POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_default();
        PooledBuffer { inner: Some(inner) }
    }

    /// Prepare the per-term arrays for a query of `terms` terms.
    ///
    /// Doc-side vectors are cleared here and filled by the match state once
    /// the candidate text is tokenized.
    pub(crate) fn reset(&mut self, terms: usize) {
        self.doc_tokens.clear();
        self.unique_doc.clear();
        self.doc_folded.clear();
        self.d_active.clear();

        self.q_active.clear();
        self.q_active.resize(terms, true);
        self.matched_chars.clear();
        self.matched_chars.resize(terms, 0.0);
        self.flags.clear();
        self.flags.resize(terms, 0);
        self.first_pos.clear();
        self.first_pos.resize(terms, -1);
    }
}

/// Drop guard returned by [`CoverageBuffer::acquire`].
///
/// Dereferences to the buffer; returning to the pool happens in `Drop`, which
/// makes release idempotent and safe along every exit path.
pub struct PooledBuffer {
    inner: Option<Box<CoverageBuffer>>,
}

impl Deref for PooledBuffer {
    type Target = CoverageBuffer;

    #[inline]
    fn deref(&self) -> &CoverageBuffer {
        // The option is only vacated in Drop.
        match &self.inner {
            Some(buffer) => buffer,
            None => unreachable!(),
        }
    }
}

impl DerefMut for PooledBuffer {
    #[inline]
    fn deref_mut(&mut self) -> &mut CoverageBuffer {
        match &mut self.inner {
            Some(buffer) => buffer,
            None => unreachable!(),
        }
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        if let Some(buffer) = self.inner.take() {
            POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOLED {
                    pool.push(buffer);
                }
            });
        }
    }
}
