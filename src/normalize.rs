// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text normalization: diacritic folding plus whitespace collapse.
//!
//! The folding table is a precomputed BMP map (identity everywhere, with
//! overrides for Latin diacritics), so the hot path is a table lookup per
//! character. The whitespace rules are configurable, but the default pattern
//! (`"  "` to `" "`, tabs and line breaks to `" "`) is detected and served by
//! a single-pass scan that collapses space runs and folds characters in one
//! allocation. When no character would change, the original string is
//! returned without allocating at all.
//!
//! Folding is case-preserving: "Café" becomes "Cafe", not "cafe". Case
//! insensitivity belongs to token comparison, not to normalization, which
//! keeps the normalizer idempotent on already-clean ASCII.

use std::borrow::Cow;
use std::sync::LazyLock;

#[cfg(feature = "unicode-normalization")]
use unicode_normalization::UnicodeNormalization;

/// The default whitespace replacement rules.
const DEFAULT_REPLACEMENTS: [(&str, &str); 4] =
    [("  ", " "), ("\t", " "), ("\n", " "), ("\r", " ")];

/// BMP fold table: identity with Latin diacritic overrides.
///
/// Built once on first use. Code units outside the BMP pass through
/// unchanged, as do characters whose decomposition is not a single base
/// character ("æ" stays "æ").
static FOLD_TABLE: LazyLock<Vec<u16>> = LazyLock::new(build_fold_table);

fn build_fold_table() -> Vec<u16> {
    let mut table: Vec<u16> = (0..=u16::MAX).collect();
    for unit in 0x80u32..0x1_0000 {
        if let Some(c) = char::from_u32(unit) {
            if let Some(folded) = fold_char_slow(c) {
                table[unit as usize] = folded as u16;
            }
        }
    }
    table
}

/// Decompose one character and strip its combining marks.
///
/// Returns `None` when the character folds to itself or does not reduce to a
/// single BMP base character.
#[cfg(feature = "unicode-normalization")]
fn fold_char_slow(c: char) -> Option<char> {
    let mut base: Option<char> = None;
    for d in std::iter::once(c).nfd() {
        if is_combining_mark(d) {
            continue;
        }
        if base.is_some() {
            // Multi-character base ("ǆ" and friends): leave the original.
            return None;
        }
        base = Some(d);
    }
    match base {
        Some(b) if b != c && (b as u32) < 0x1_0000 => Some(b),
        _ => None,
    }
}

/// Without the unicode-normalization feature the table stays identity and
/// only whitespace collapsing applies. Mirrors the ASCII-only fallback used
/// on platforms where the dependency is unwanted.
#[cfg(not(feature = "unicode-normalization"))]
fn fold_char_slow(_c: char) -> Option<char> {
    None
}

/// Check if a character is a combining mark (diacritic).
///
/// Combining marks have Unicode category "Mn" (Mark, Nonspacing).
/// Examples: ́ (acute), ̄ (macron), ̣ (dot below)
#[cfg(feature = "unicode-normalization")]
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{0C00}'..='\u{0C7F}' |  // Telugu (some combining marks)
        '\u{0900}'..='\u{097F}' |  // Devanagari (some combining marks)
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

/// Fold a single character through the precomputed table.
#[inline]
pub fn fold_char(c: char) -> char {
    let unit = c as u32;
    if unit < 0x1_0000 {
        let folded = FOLD_TABLE[unit as usize];
        // Surrogate code units never appear in a char, so this cannot fail.
        char::from_u32(u32::from(folded)).unwrap_or(c)
    } else {
        c
    }
}

/// Configurable text normalizer.
///
/// The default instance carries the standard whitespace rules and takes the
/// single-pass fast path. Custom replacement rules fall back to a generic
/// replace-then-fold pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    replacements: Vec<(String, String)>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            replacements: DEFAULT_REPLACEMENTS
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }
}

impl Normalizer {
    /// A normalizer with custom string-level replacement rules.
    pub fn with_replacements(replacements: Vec<(String, String)>) -> Self {
        Self { replacements }
    }

    /// True when the rules are exactly the default whitespace pattern.
    fn has_default_whitespace_rules(&self) -> bool {
        self.replacements.len() == DEFAULT_REPLACEMENTS.len()
            && self
                .replacements
                .iter()
                .zip(DEFAULT_REPLACEMENTS.iter())
                .all(|((from, to), (dfrom, dto))| from == dfrom && to == dto)
    }

    /// Normalize `text`: apply replacement rules, then fold characters.
    ///
    /// Returns the original string (no allocation) when nothing would change.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.has_default_whitespace_rules() {
            normalize_default(text)
        } else {
            self.normalize_generic(text)
        }
    }

    /// Generic path: each replacement applied once, then the char map.
    fn normalize_generic<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(text);
        for (from, to) in &self.replacements {
            if !from.is_empty() && current.contains(from.as_str()) {
                current = Cow::Owned(current.replace(from.as_str(), to));
            }
        }
        if current.chars().any(|c| fold_char(c) != c) {
            let folded: String = current.chars().map(fold_char).collect();
            return Cow::Owned(folded);
        }
        current
    }
}

/// Single-pass scan for the default whitespace pattern.
///
/// Collapses runs of whitespace to a single space and folds every character
/// through the table, in one allocation. The leading scan finds the first
/// byte that needs to change; clean inputs return borrowed.
fn normalize_default(text: &str) -> Cow<'_, str> {
    let mut prev_space = false;
    let mut dirty_at: Option<usize> = None;
    for (i, c) in text.char_indices() {
        let is_ws = matches!(c, ' ' | '\t' | '\n' | '\r');
        if is_ws {
            if c != ' ' || prev_space {
                dirty_at = Some(i);
                break;
            }
        } else if fold_char(c) != c {
            dirty_at = Some(i);
            break;
        }
        prev_space = is_ws;
    }

    let Some(start) = dirty_at else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    let mut prev_space = out.ends_with(' ');
    for c in text[start..].chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r') {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(fold_char(c));
            prev_space = false;
        }
    }
    Cow::Owned(out)
}
