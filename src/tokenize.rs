// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The tokenizer adapter: delimiter splitting plus deduplication.
//!
//! The split itself is boring. The part that matters for scoring is the
//! bookkeeping: every token records its ordinal `position` in the original
//! stream *before* the min-word-size filter runs, so phrase adjacency is
//! preserved even when a short word ("of", "to") is filtered out between two
//! kept tokens. Deduplication is by case-folded content with first occurrence
//! winning, which keeps doc positions meaningful for phrase-run scoring.

use crate::types::{fold_hash, StringSlice};

/// Split `text` into token slices.
///
/// Tokens shorter than `min_word_size` characters are dropped, but still
/// consume a `position`. The returned slices borrow nothing; resolve them
/// against the same `text` they were produced from.
pub fn tokenize(text: &str, min_word_size: usize, delimiters: &[char]) -> Vec<StringSlice> {
    let mut tokens = Vec::new();
    tokenize_into(text, min_word_size, delimiters, &mut tokens);
    tokens
}

/// Tokenize into a caller-supplied buffer, returning the token count.
///
/// The buffer is cleared first; the result is a prefix of the buffer. This is
/// the allocation-free path used by per-candidate scoring, which rents the
/// buffer from the scratch pool.
pub fn tokenize_into(
    text: &str,
    min_word_size: usize,
    delimiters: &[char],
    tokens: &mut Vec<StringSlice>,
) -> usize {
    tokens.clear();
    let mut position: i32 = 0;
    let mut start: Option<usize> = None;
    let mut char_count = 0usize;

    for (i, c) in text.char_indices() {
        if delimiters.contains(&c) {
            if let Some(s) = start.take() {
                push_token(tokens, text, s, i, char_count, &mut position, min_word_size);
            }
            char_count = 0;
        } else {
            if start.is_none() {
                start = Some(i);
            }
            char_count += 1;
        }
    }
    if let Some(s) = start {
        push_token(
            tokens,
            text,
            s,
            text.len(),
            char_count,
            &mut position,
            min_word_size,
        );
    }
    tokens.len()
}

fn push_token(
    tokens: &mut Vec<StringSlice>,
    text: &str,
    start: usize,
    end: usize,
    char_count: usize,
    position: &mut i32,
    min_word_size: usize,
) {
    let pos = *position;
    *position += 1;
    if char_count < min_word_size {
        return;
    }
    tokens.push(StringSlice {
        offset: start as i32,
        length: (end - start) as i32,
        position: pos,
        hash: fold_hash(&text[start..end]),
    });
}

/// Deduplicate tokens by case-folded content, keeping first occurrence.
///
/// Works for both query and doc streams: the first occurrence carries the
/// earliest `position`, which is exactly what phrase-run scoring wants.
/// Idempotent: feeding an already-deduplicated sequence returns it unchanged.
pub fn dedup_tokens(source: &str, tokens: &[StringSlice]) -> Vec<StringSlice> {
    let mut unique: Vec<StringSlice> = Vec::with_capacity(tokens.len());
    'outer: for token in tokens {
        for kept in &unique {
            if kept.hash == token.hash
                && crate::types::eq_fold(kept.resolve(source), token.resolve(source))
            {
                continue 'outer;
            }
        }
        unique.push(*token);
    }
    unique
}

/// Tokenize and return owned, case-folded token strings.
///
/// The unfiltered (`min_word_size = 0`) variant feeds the fusion signal
/// computer, which needs to see short trailing tokens the coverage matchers
/// filter out.
pub fn word_tokens(text: &str, min_word_size: usize, delimiters: &[char]) -> Vec<String> {
    tokenize(text, min_word_size, delimiters)
        .iter()
        .map(|t| t.resolve(text).to_lowercase())
        .collect()
}
