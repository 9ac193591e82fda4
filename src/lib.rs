// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Lexical coverage scoring and fusion ranking for typeahead search.
//!
//! Given a query and a candidate document's text, this crate answers "how
//! well does the document match" twice over: as a rich feature record
//! (coverage counters, phrase runs, IDF-weighted credit) and as a packed
//! 24-bit ranking key whose plain lexicographic order realises the relevance
//! ordering. A bucketed top-K store consolidates the keys into results.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐    ┌──────────────────────┐    ┌──────────────────┐
//! │ normalize  │───▶│ tokenize + context   │───▶│ matcher cascade  │
//! │ (fold, ws) │    │ (dedup, IDF, budgets)│    │ whole→joined→    │
//! └────────────┘    └──────────────────────┘    │ affix→fuzzy      │
//!                                               └────────┬─────────┘
//!                       ┌──────────────────┐             ▼
//!                       │ fusion signals   │    ┌──────────────────┐
//!                       │ (unfiltered toks)│───▶│ features + score │
//!                       └──────────────────┘    │ (u16, u8) key    │
//!                                               └────────┬─────────┘
//!                                                        ▼
//!                                               ┌──────────────────┐
//!                                               │ ScoreArray top-K │
//!                                               │ + segment merge  │
//!                                               └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use covex::{CoverageEngine, FusionScorer, ScoreArray};
//!
//! let engine = CoverageEngine::default();
//! let context = engine.prepare_query("the matrix rev");
//!
//! let mut scores = ScoreArray::new();
//! for (doc_id, text) in [(1i64, "The Matrix Reloaded"), (2, "The Matrix Revisited")] {
//!     let features = engine.calculate_features(&context, text, 0, doc_id);
//!     let (score, tiebreaker) =
//!         FusionScorer::new().calculate("the matrix rev", text, &features, 0.0);
//!     scores.add(doc_id, score, tiebreaker);
//! }
//!
//! let top = scores.get_top_k(1);
//! assert_eq!(top[0].doc_id, 2);
//! ```
//!
//! # Determinism
//!
//! For a fixed `(query, document)` pair the feature record, fusion score, and
//! tiebreaker are pure functions of the inputs. Floating-point accumulation
//! order is fixed, so scores are bit-reproducible across platforms.

mod context;
mod contracts;
mod coverage;
mod engine;
mod fusion;
mod idf;
mod matchers;
mod normalize;
mod score_array;
mod scratch;
mod segments;
mod signals;
pub mod testing;
mod tokenize;
mod types;
mod word_index;

pub use context::CoverageQueryContext;
pub use engine::CoverageEngine;
pub use fusion::FusionScorer;
pub use idf::{bm25_idf, fallback_idf, MetadataProvider, TermCollection, WordIdfProvider};
pub use normalize::{fold_char, Normalizer};
pub use score_array::ScoreArray;
pub use segments::{calculate_lcs, SegmentProcessor};
pub use signals::FusionSignalComputer;
pub use tokenize::{dedup_tokens, tokenize, word_tokens};
pub use types::{
    fold_hash, CoverageFeatures, CoverageSetup, Document, DocumentCollection, DocumentMetadata,
    FusionSignals, ScoreEntry, StringSlice, ANCHOR_STEM_LENGTH, DEFAULT_DELIMITERS,
    INTENT_BONUS_PER_SIGNAL, LEVENSHTEIN_WORD_SIZE_CAP, MAX_TRAILING_TERM_LENGTH_FOR_BONUS,
};
pub use word_index::WordMatcher;
