// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of coverage scoring.
//!
//! These types define how query tokens, match features, and ranking keys fit
//! together. The feature record is deliberately rich: the fusion scorer reads
//! almost every field, and keeping them in one flat struct means a single
//! scoring call can explain exactly why a document ranked where it did.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **StringSlice**: `offset + length` stays within the host string, and the
//!   range falls on UTF-8 boundaries. Slices are produced by the tokenizer
//!   and never constructed from arbitrary offsets.
//!
//! - **CoverageFeatures**: `terms_strict_matched <= terms_prefix_matched <=
//!   terms_with_any_match <= terms_count`. The counter chain is checked in
//!   debug builds by `contracts::check_feature_chain`.
//!
//! - **ScoreEntry**: `sort_key = (score << 8) | tiebreaker` is monotone in
//!   `(score, tiebreaker)`. The 24-bit key is the total order used for
//!   ranking; nothing else may reorder results.

use serde::{Deserialize, Serialize};

// =============================================================================
// TOKEN SLICES
// =============================================================================

/// A non-owning view into a host string: one token.
///
/// `offset` and `length` are byte ranges into the host string (always on
/// UTF-8 boundaries because the tokenizer splits on character boundaries).
/// `position` is the token's ordinal index in the original token stream,
/// counted before any length filtering, so phrase adjacency survives the
/// min-word-size filter. `hash` caches a case-folded content hash so
/// deduplication and whole-word matching can prefilter without comparing
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringSlice {
    /// Byte offset into the host string.
    pub offset: i32,
    /// Byte length of the token.
    pub length: i32,
    /// Ordinal index in the original token stream (pre-filter).
    pub position: i32,
    /// Cached case-folded FNV-1a hash of the token content.
    pub hash: i32,
}

impl StringSlice {
    /// Resolve this slice against its host string.
    #[inline]
    pub fn resolve<'a>(&self, source: &'a str) -> &'a str {
        &source[self.offset as usize..(self.offset + self.length) as usize]
    }

    /// Token length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// True when the slice covers no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Token length in characters. Equal to `len()` for ASCII tokens.
    #[inline]
    pub fn char_len(&self, source: &str) -> usize {
        self.resolve(source).chars().count()
    }
}

/// Case-folded FNV-1a hash over the lowercase form of `text`.
///
/// Used for token dedup prefiltering and for `DocumentMetadata::last_token_hash`.
/// Collisions are fine; every hash hit is confirmed with a folded comparison.
pub fn fold_hash(text: &str) -> i32 {
    let mut hash: u32 = 0x811c_9dc5;
    let mut buf = [0u8; 4];
    for c in text.chars().flat_map(char::to_lowercase) {
        for &b in c.encode_utf8(&mut buf).as_bytes() {
            hash ^= u32::from(b);
            hash = hash.wrapping_mul(0x0100_0193);
        }
    }
    hash as i32
}

/// Case-insensitive equality without allocating.
pub(crate) fn eq_fold(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Intent bonus added to the semantic byte per lexical intent signal.
pub const INTENT_BONUS_PER_SIGNAL: f64 = 0.15;

/// Minimum query-term length for a term to act as an anchor stem.
pub const ANCHOR_STEM_LENGTH: usize = 3;

/// Maximum length of a trailing query token eligible for the trailing bonus.
pub const MAX_TRAILING_TERM_LENGTH_FOR_BONUS: usize = 2;

/// Hard upper cap on `levenshtein_max_word_size`.
pub const LEVENSHTEIN_WORD_SIZE_CAP: usize = 63;

/// Default delimiter set used when splitting text into tokens.
pub const DEFAULT_DELIMITERS: &[char] = &[
    ' ', '\t', '\n', '\r', '.', ',', ';', ':', '!', '?', '-', '_', '/', '\\', '(', ')', '[', ']',
    '{', '}', '"', '\'', '&', '+', '@', '#', '*', '|', '<', '>', '=',
];

/// Configuration for the coverage engine.
///
/// The matcher toggles gate the four cascade passes independently. All passes
/// default to enabled; turning one off skips the pass but never changes the
/// semantics of the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSetup {
    /// Minimum token length (in characters) kept after filtering.
    pub min_word_size: usize,
    /// Enable the whole-word matcher pass.
    pub cover_whole_words: bool,
    /// Enable the joined-word matcher pass.
    pub cover_joined_words: bool,
    /// Enable the prefix/suffix matcher pass.
    pub cover_prefix_suffix: bool,
    /// Enable the fuzzy (Damerau-Levenshtein) matcher pass.
    pub cover_fuzzy_words: bool,
    /// Blend the whole-query LCS ratio into the coverage byte.
    pub cover_whole_query: bool,
    /// Largest word length the fuzzy matcher will consider. Hard-capped at
    /// [`LEVENSHTEIN_WORD_SIZE_CAP`].
    pub levenshtein_max_word_size: usize,
    /// Characters that separate tokens.
    pub delimiters: Vec<char>,
    /// N-gram sizes the term collection is indexed with. Term IDF is averaged
    /// over all n-grams of these sizes.
    pub index_sizes: Vec<usize>,
}

impl Default for CoverageSetup {
    fn default() -> Self {
        Self {
            min_word_size: 2,
            cover_whole_words: true,
            cover_joined_words: true,
            cover_prefix_suffix: true,
            cover_fuzzy_words: true,
            cover_whole_query: true,
            levenshtein_max_word_size: 24,
            delimiters: DEFAULT_DELIMITERS.to_vec(),
            index_sizes: vec![2, 3],
        }
    }
}

impl CoverageSetup {
    /// The effective fuzzy word-size cap after applying the hard limit.
    #[inline]
    pub fn levenshtein_cap(&self) -> usize {
        self.levenshtein_max_word_size.min(LEVENSHTEIN_WORD_SIZE_CAP)
    }
}

// =============================================================================
// FEATURE RECORDS
// =============================================================================

/// Precomputed lexical fusion signals.
///
/// Computed over the *unfiltered* token streams (no min-word-size filter), so
/// a trailing "of" or "to" still participates in typeahead semantics even
/// though the coverage matchers never see it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusionSignals {
    /// All but the last query token match strictly, the last is a prefix of
    /// some doc token, and the matched positions increase in query order.
    pub lexical_prefix_last: bool,
    /// The doc token sequence equals the query token sequence modulo the last
    /// token being a prefix.
    pub is_perfect_doc_lexical: bool,
    /// Some unmatched query term shares a stem-length prefix with a doc token.
    pub has_stem_evidence: bool,
    /// Some query term of stem length or longer is a prefix of a doc token.
    pub has_anchor_stem: bool,
    /// Query token count before min-word-size filtering.
    pub unfiltered_query_token_count: usize,
    /// For single-term queries: normalized similarity against the best doc
    /// token, scaled to 0-255.
    pub single_term_lexical_sim: u8,
    /// Fraction of short trailing query tokens found near the end of the doc,
    /// scaled to 0-255.
    pub trailing_match_density: u8,
}

/// The feature record produced for one `(query, document)` pair.
///
/// Everything the fusion scorer needs, plus per-term arrays for callers that
/// want to explain a ranking. Counters follow the chain
/// `terms_strict_matched <= terms_prefix_matched <= terms_with_any_match <=
/// terms_count`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageFeatures {
    /// Blended coverage in 0-255.
    pub coverage_score: u8,
    /// Number of deduplicated query terms.
    pub terms_count: usize,
    /// Terms claimed by any matcher class.
    pub terms_with_any_match: usize,
    /// Terms with full character credit.
    pub terms_fully_matched: usize,
    /// Terms claimed by the whole-word matcher.
    pub terms_strict_matched: usize,
    /// Terms claimed by whole-word or prefix/suffix (fuzzy-only excluded).
    pub terms_prefix_matched: usize,
    /// Minimum doc position over matched terms, or -1 when nothing matched.
    pub first_match_index: i32,
    /// Sum of per-term credit, accumulated in query-term index order.
    pub sum_ci: f64,
    /// Matched doc words (whole, joined, fuzzy classes).
    pub word_hits: u32,
    /// Deduplicated doc token count.
    pub doc_token_count: usize,
    /// Longest run of consecutive query terms at contiguous doc positions.
    pub longest_prefix_run: usize,
    /// Length of the contiguous run ending at the last query term.
    pub suffix_prefix_run: usize,
    /// `max_doc_pos - min_doc_pos + 1` over matched terms; 0 when none.
    pub phrase_span: usize,
    /// Strictly matched terms before the last query term.
    pub preceding_strict_count: usize,
    /// The last query term was claimed by the prefix/suffix matcher.
    pub last_token_has_prefix: bool,
    /// Credit of the last query term.
    pub last_term_ci: f64,
    /// The blended coverage value before byte quantization.
    pub weighted_coverage: f64,
    /// The last query token is short enough to be an incomplete prefix and
    /// was not strictly matched.
    pub last_term_is_type_ahead: bool,
    /// IDF-weighted coverage: `sum(ci * idf) / sum(idf)`.
    pub idf_coverage: f64,
    /// Sum of per-term IDF.
    pub total_idf: f64,
    /// IDF mass of the unmatched portion: `sum((1 - ci) * idf)`.
    pub missing_idf: f64,
    /// Per-term IDF, aligned to the deduplicated query terms.
    pub term_idf: Vec<f64>,
    /// Per-term credit in [0, 1], aligned to the deduplicated query terms.
    pub term_ci: Vec<f64>,
    /// Lexical fusion signals for this pair.
    pub signals: FusionSignals,
}

// =============================================================================
// RANKING ENTRIES
// =============================================================================

/// One scored document (or document segment) in a `ScoreArray`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Packed fusion score: `(precedence << 8) | semantic`.
    pub score: u16,
    /// Document identifier (or document key during segment consolidation).
    pub doc_id: i64,
    /// Length-ratio tiebreaker; higher favours more focused matches.
    pub tiebreaker: u8,
    /// Segment number when the entry is per-segment.
    pub segment: Option<i32>,
}

impl ScoreEntry {
    /// The 24-bit total-order ranking key.
    #[inline]
    pub fn sort_key(&self) -> u32 {
        (u32::from(self.score) << 8) | u32::from(self.tiebreaker)
    }
}

// =============================================================================
// COLLABORATOR TYPES
// =============================================================================

/// Precomputed per-document token facts, used to shortcut fusion signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Token count of the indexed text (unfiltered).
    pub token_count: usize,
    /// Case-folded hash of the last token.
    pub last_token_hash: i32,
}

impl DocumentMetadata {
    /// Sentinel used when no metadata cache is installed.
    pub const EMPTY: DocumentMetadata = DocumentMetadata {
        token_count: 0,
        last_token_hash: 0,
    };
}

/// One stored document (or segment of a document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Storage identifier of this row.
    pub id: i64,
    /// Key shared by all segments of the same logical document.
    pub document_key: i64,
    /// Segment number within the logical document.
    pub segment_number: i32,
    /// The text that was indexed for this segment.
    pub indexed_text: String,
    /// Deleted rows are filtered out of every lookup path.
    pub deleted: bool,
}

/// Read access to the document repository.
///
/// Installed once after indexing and read-only thereafter; no locking is
/// required on the consumer side.
pub trait DocumentCollection: Send + Sync {
    /// Look up a document row by its storage identifier.
    fn document_by_key(&self, id: i64) -> Option<Document>;
    /// All segments sharing a document key.
    fn documents_for_key(&self, key: i64) -> Vec<Document>;
    /// A specific segment of a logical document.
    fn document_of_segment(&self, key: i64, segment: i32) -> Option<Document>;
}
