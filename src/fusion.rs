// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The fusion scorer: features plus BM25 in, a 24-bit ranking key out.
//!
//! The returned `(u16, u8)` pair packs as `score = (precedence << 8) |
//! semantic` with the length-ratio tiebreaker below it, so plain
//! lexicographic comparison on `(score, tiebreaker)` realises the full
//! relevance ordering. The class of a match dominates its numeric quality: a
//! clean prefix-last match at mediocre coverage beats a scattered match at
//! perfect coverage, the same way a title hit beats a body hit in classic
//! field-bucketed ranking.
//!
//! # Precedence byte
//!
//! | Bit | Meaning |
//! |-----|---------|
//! | 7   | complete: every term matched (or partial coverage with stem evidence) |
//! | 6   | clean: every term matched without fuzzy help |
//! | 5   | exact-prefix: multi-term, clean, starts at doc position 0, reads as a prefix of the doc |
//! | 4-3 | tier: phrase-shape class (single-term tier 4 spills into bit 5, which single-term never uses otherwise) |
//! | 2-0 | phrase quality (multi-term), capped at 7 |
//! | 3   | partial-coverage info-ratio boost (only reachable with a zero tier) |
//!
//! # Semantic byte
//!
//! Coverage times doc match density, with an intent bonus for anchored
//! three-plus-term queries, a trailing-token bonus, and a BM25 blend that
//! only kicks in when coverage is partial and BM25 is strong enough to
//! matter.

use crate::types::{CoverageFeatures, INTENT_BONUS_PER_SIGNAL};

/// Stateless scorer; all tuning lives in the fusion constants. The setup's
/// matcher toggles act upstream, in the features.
#[derive(Debug, Default, Clone, Copy)]
pub struct FusionScorer;

impl FusionScorer {
    /// A scorer instance. Stateless; exists for call-site symmetry with the
    /// other pipeline stages.
    pub fn new() -> Self {
        Self
    }

    /// Compute the packed score and tiebreaker.
    ///
    /// `bm25` is the normalized BM25 contribution in [0, 1]; pass 0.0 when no
    /// BM25 source participates. Deterministic in its inputs.
    pub fn calculate(
        &self,
        query: &str,
        doc_text: &str,
        features: &CoverageFeatures,
        bm25: f64,
    ) -> (u16, u8) {
        let n_terms = features.terms_count;
        if n_terms == 0 {
            return (0, 0);
        }

        let n = if features.signals.unfiltered_query_token_count > 0 {
            features.signals.unfiltered_query_token_count
        } else {
            n_terms
        };
        let is_single_term = n <= 1;

        let is_complete = features.terms_with_any_match == n_terms;
        let is_clean = features.terms_prefix_matched == n_terms;
        let is_exact = features.terms_strict_matched == n_terms;
        let starts_at_beginning = features.first_match_index == 0;
        let coverage_prefix_last =
            features.preceding_strict_count == n_terms - 1 && features.last_token_has_prefix;
        let is_prefix_last_strong = features.signals.lexical_prefix_last && coverage_prefix_last;
        let is_exact_prefix = !is_single_term
            && is_clean
            && starts_at_beginning
            && features.signals.lexical_prefix_last
            && is_complete;

        let coverage_ratio = features.terms_with_any_match as f64 / n_terms as f64;
        let has_partial_coverage = coverage_ratio > 0.0 && coverage_ratio < 1.0;

        let mut precedence: u16 = 0;
        if is_complete {
            precedence |= 128;
        }
        if is_clean {
            precedence |= 64;
        }

        if is_single_term {
            let tier: u16 = if is_complete && starts_at_beginning && is_exact {
                4
            } else if is_complete && starts_at_beginning && is_clean {
                3
            } else if is_complete && is_exact {
                2
            } else if is_complete && is_clean {
                1
            } else {
                0
            };
            precedence |= tier << 3;
        } else {
            if is_exact_prefix {
                precedence |= 32;
            }

            let has_anchor_with_run =
                features.signals.has_anchor_stem && features.longest_prefix_run >= 2;
            let tier: u16 = if is_prefix_last_strong {
                3
            } else if features.signals.lexical_prefix_last {
                2
            } else if features.signals.is_perfect_doc_lexical || has_anchor_with_run {
                1
            } else {
                0
            };
            precedence |= tier << 3;

            precedence |= phrase_quality(features, n).min(7);

            if has_partial_coverage && n >= 2 {
                if features.signals.has_stem_evidence {
                    // Idempotent with the complete bit: the branch only runs
                    // when is_complete is false, and the or makes re-setting
                    // harmless either way.
                    precedence |= 128;
                } else if n_terms - features.terms_with_any_match == 1 {
                    let eligible = features.last_token_has_prefix
                        || features.terms_with_any_match == n_terms
                        || !features.last_term_is_type_ahead;
                    if eligible && features.total_idf > 0.0 {
                        let missing_info_ratio = features.missing_idf / features.total_idf;
                        let term_gap = 1.0 - coverage_ratio;
                        if missing_info_ratio < term_gap {
                            precedence |= 8;
                        }
                    }
                }
            }
        }

        let semantic = self.semantic_value(
            features,
            n_terms,
            is_single_term,
            coverage_ratio,
            has_partial_coverage,
            bm25,
        );
        let semantic_byte = (semantic.clamp(0.0, 1.0) * 255.0).round() as u16;
        let score = (precedence << 8) | semantic_byte;

        let tiebreaker = if n >= 2 {
            length_ratio_tiebreaker(query, doc_text)
        } else {
            0
        };

        (score, tiebreaker)
    }

    /// The 0-1 semantic value before quantization.
    fn semantic_value(
        &self,
        features: &CoverageFeatures,
        n_terms: usize,
        is_single_term: bool,
        coverage_ratio: f64,
        has_partial_coverage: bool,
        bm25: f64,
    ) -> f64 {
        let avg_ci = features.sum_ci / n_terms as f64;

        let mut semantic = if is_single_term {
            (avg_ci + f64::from(features.signals.single_term_lexical_sim) / 255.0) / 2.0
        } else if features.doc_token_count == 0 {
            avg_ci
        } else {
            let one_missing =
                has_partial_coverage && n_terms - features.terms_with_any_match == 1;
            let base_coverage = if one_missing
                && features.total_idf > 0.0
                && features.idf_coverage > coverage_ratio
            {
                features.idf_coverage
            } else {
                avg_ci
            };

            let density = f64::from(features.word_hits) / features.doc_token_count as f64;
            let mut value = base_coverage * density.min(1.0);

            if n_terms >= 3 {
                let signal_count = u8::from(features.signals.has_anchor_stem)
                    + u8::from(features.suffix_prefix_run >= 2);
                value = (value + INTENT_BONUS_PER_SIGNAL * f64::from(signal_count)).min(1.0);
            }
            if n_terms >= 2 {
                let trailing = f64::from(features.signals.trailing_match_density) / 255.0;
                value += (1.0 - value) * trailing;
            }
            value
        };

        if has_partial_coverage && bm25 >= 1.0 - coverage_ratio {
            semantic = coverage_ratio * semantic + (1.0 - coverage_ratio) * bm25.clamp(0.0, 1.0);
        }
        semantic
    }
}

/// Phrase-quality bits before the 3-bit cap.
fn phrase_quality(features: &CoverageFeatures, n: usize) -> u16 {
    let mut quality: u16 = 0;
    let strong_run_target = 2.max(features.terms_count.min(n).saturating_sub(1));
    if features.suffix_prefix_run >= strong_run_target {
        quality |= 8;
    } else if features.suffix_prefix_run >= 2 {
        quality |= 4;
    }
    if features.longest_prefix_run >= 3 {
        quality |= 2;
    }
    if features.terms_with_any_match >= 2 && features.phrase_span == 2 {
        quality |= 1;
    }
    quality
}

/// `round(255 * min(1, query_len / doc_len))`: favours focused documents.
fn length_ratio_tiebreaker(query: &str, doc_text: &str) -> u8 {
    let doc_len = doc_text.chars().count();
    if doc_len == 0 {
        return 0;
    }
    let query_len = query.chars().count();
    (255.0 * (query_len as f64 / doc_len as f64).min(1.0)).round() as u8
}
