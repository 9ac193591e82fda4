// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Feature derivation from a finished match state.
//!
//! Once the cascade has run, everything the fusion scorer needs is implied by
//! the claim flags, credit array, and first-match positions. This module
//! reads them out into a flat `CoverageFeatures` record.
//!
//! Floating-point accumulation order is fixed (query-term index ascending)
//! for `sum_ci`, `idf_coverage`, and `missing_idf`, so scores are
//! bit-reproducible across platforms. Do not "simplify" the loops into
//! iterator folds that an optimizer may reassociate.
//!
//! # The coverage byte
//!
//! `weighted_coverage` blends mean per-term credit with a whole-query LCS
//! ratio (60/40 when enabled), then deducts a small penalty proportional to
//! the unmatched IDF mass. The result is clipped to [0, 1] and quantized to
//! 0-255.

use crate::contracts::check_feature_chain;
use crate::matchers::{flags, MatchState};
use crate::types::{CoverageFeatures, CoverageSetup};

/// Weight of mean per-term credit in the whole-query blend.
const BLEND_CI_WEIGHT: f64 = 0.6;

/// Weight of the LCS ratio in the whole-query blend.
const BLEND_LCS_WEIGHT: f64 = 0.4;

/// Penalty coefficient on the unmatched IDF fraction.
const MISSING_IDF_PENALTY: f64 = 0.05;

/// Derive the feature record from a post-cascade match state.
///
/// `lcs_sum` is the caller-computed longest-common-subsequence length between
/// the whole query and the document text; it only participates when
/// `cover_whole_query` is set.
pub(crate) fn derive_features(
    state: &MatchState<'_>,
    lcs_sum: usize,
    setup: &CoverageSetup,
) -> CoverageFeatures {
    let ctx = state.context();
    let n = ctx.terms_count();
    if n == 0 {
        return CoverageFeatures::default();
    }
    let last = n - 1;

    let mut features = CoverageFeatures {
        terms_count: n,
        doc_token_count: state.doc_count(),
        word_hits: state.word_hits,
        first_match_index: -1,
        term_idf: ctx.term_idf.to_vec(),
        term_ci: Vec::with_capacity(n),
        ..CoverageFeatures::default()
    };

    // Counter chain, per-term credit, and IDF mass in one index-ordered pass.
    let mut min_pos = i32::MAX;
    let mut max_pos = i32::MIN;
    for i in 0..n {
        let term_flags = state.term_flags(i);
        let matched = term_flags != 0;
        let strict = term_flags & flags::WHOLE != 0;
        let prefixy = term_flags & (flags::WHOLE | flags::PREFIX) != 0;

        if matched {
            features.terms_with_any_match += 1;
            let pos = state.first_pos(i);
            if pos >= 0 {
                min_pos = min_pos.min(pos);
                max_pos = max_pos.max(pos);
            }
        }
        if strict {
            features.terms_strict_matched += 1;
            if i < last {
                features.preceding_strict_count += 1;
            }
        }
        if prefixy {
            features.terms_prefix_matched += 1;
        }

        let max_chars = ctx.term_max_chars[i];
        let ci = if max_chars > 0.0 {
            (state.matched_chars(i) / max_chars).min(1.0)
        } else {
            0.0
        };
        if ci + 1e-9 >= 1.0 {
            features.terms_fully_matched += 1;
        }
        features.term_ci.push(ci);
        features.sum_ci += ci;

        let idf = features.term_idf[i];
        features.total_idf += idf;
        features.missing_idf += (1.0 - ci) * idf;
    }

    if min_pos != i32::MAX {
        features.first_match_index = min_pos;
        features.phrase_span = (max_pos - min_pos + 1) as usize;
    }

    // IDF-weighted coverage, same index order as above.
    if features.total_idf > 0.0 {
        let mut weighted = 0.0;
        for i in 0..n {
            weighted += features.term_ci[i] * features.term_idf[i];
        }
        features.idf_coverage = weighted / features.total_idf;
    }

    derive_phrase_runs(state, &mut features);

    features.last_term_ci = features.term_ci[last];
    features.last_token_has_prefix = state.term_flags(last) & flags::PREFIX != 0;
    features.last_term_is_type_ahead = (ctx.term_max_chars[last] as usize)
        < setup.levenshtein_cap()
        && state.term_flags(last) & flags::WHOLE == 0;

    features.weighted_coverage = weighted_coverage(&features, lcs_sum, ctx.query.len(), setup);
    features.coverage_score = (features.weighted_coverage * 255.0).round() as u8;

    check_feature_chain(&features);
    features
}

/// Phrase runs over doc positions assigned to terms, in query order.
///
/// A run extends while the next term's position is exactly the previous
/// position plus one. A lone matched term is a run of length 1.
fn derive_phrase_runs(state: &MatchState<'_>, features: &mut CoverageFeatures) {
    let n = features.terms_count;
    let mut run = 0usize;
    let mut prev_pos: i32 = -1;
    for i in 0..n {
        let pos = state.first_pos(i);
        if pos < 0 {
            run = 0;
        } else if run > 0 && pos == prev_pos + 1 {
            run += 1;
        } else {
            run = 1;
        }
        prev_pos = pos;
        if run > features.longest_prefix_run {
            features.longest_prefix_run = run;
        }
        if i == n - 1 {
            features.suffix_prefix_run = run;
        }
    }
}

/// The blended coverage value in [0, 1].
fn weighted_coverage(
    features: &CoverageFeatures,
    lcs_sum: usize,
    query_byte_len: usize,
    setup: &CoverageSetup,
) -> f64 {
    let n = features.terms_count as f64;
    let mean_ci = features.sum_ci / n;

    let mut blended = if setup.cover_whole_query && query_byte_len > 0 {
        let lcs_ratio = (lcs_sum as f64 / query_byte_len as f64).min(1.0);
        BLEND_CI_WEIGHT * mean_ci + BLEND_LCS_WEIGHT * lcs_ratio
    } else {
        mean_ci
    };

    if features.total_idf > 0.0 {
        blended -= MISSING_IDF_PENALTY * (features.missing_idf / features.total_idf);
    }

    blended.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_util::{context_for, state_for};
    use crate::matchers::run_cascade;
    use crate::scratch::CoverageBuffer;
    use crate::segments::calculate_lcs;
    use crate::types::CoverageSetup;

    fn features_for(query: &str, doc: &str, setup: &CoverageSetup) -> CoverageFeatures {
        let ctx = context_for(query, setup);
        let mut buf = CoverageBuffer::acquire();
        let mut state = state_for(&ctx, doc, setup, &mut buf);
        run_cascade(&mut state, setup);
        let lcs = calculate_lcs(query, doc);
        derive_features(&state, lcs, setup)
    }

    #[test]
    fn empty_query_yields_default_features() {
        let setup = CoverageSetup::default();
        let features = features_for("", "anything at all", &setup);
        assert_eq!(features.terms_count, 0);
        assert_eq!(features.coverage_score, 0);
        assert_eq!(features.first_match_index, -1);
    }

    #[test]
    fn counter_chain_holds_for_mixed_matches() {
        let setup = CoverageSetup::default();
        // "the" and "matrix" match strictly, "rev" by prefix.
        let features = features_for("the matrix rev", "The Matrix Revisited", &setup);
        assert_eq!(features.terms_count, 3);
        assert_eq!(features.terms_with_any_match, 3);
        assert_eq!(features.terms_strict_matched, 2);
        assert_eq!(features.terms_prefix_matched, 3);
        assert_eq!(features.terms_fully_matched, 3);
        assert!(features.terms_strict_matched <= features.terms_prefix_matched);
        assert!(features.terms_prefix_matched <= features.terms_with_any_match);
    }

    #[test]
    fn phrase_runs_track_contiguous_positions() {
        let setup = CoverageSetup::default();
        let features = features_for("the matrix rev", "The Matrix Revisited", &setup);
        assert_eq!(features.longest_prefix_run, 3);
        assert_eq!(features.suffix_prefix_run, 3);
        assert_eq!(features.phrase_span, 3);
        assert_eq!(features.first_match_index, 0);
    }

    #[test]
    fn out_of_order_positions_break_runs() {
        let setup = CoverageSetup::default();
        // "two" lands at doc position 2, "fo" at position 1.
        let features = features_for("two fo", "Tea for Two", &setup);
        assert_eq!(features.longest_prefix_run, 1);
        assert_eq!(features.phrase_span, 2);
        assert_eq!(features.first_match_index, 1);
    }

    #[test]
    fn last_term_typeahead_flags() {
        let setup = CoverageSetup::default();
        let features = features_for("the matrix rev", "The Matrix Revisited", &setup);
        assert!(features.last_token_has_prefix);
        assert!(features.last_term_is_type_ahead);
        assert_eq!(features.preceding_strict_count, 2);
        assert!((features.last_term_ci - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unmatched_terms_accumulate_missing_idf() {
        let setup = CoverageSetup::default();
        let features = features_for("matrix zzgram", "the matrix", &setup);
        assert_eq!(features.terms_with_any_match, 1);
        assert!(features.missing_idf > 0.0);
        assert!(features.missing_idf <= features.total_idf + 1e-12);
        assert!(features.idf_coverage < 1.0);
    }

    #[test]
    fn coverage_byte_is_total_for_perfect_match() {
        let setup = CoverageSetup::default();
        let features = features_for("matrix", "matrix", &setup);
        assert!(features.coverage_score >= 250);
    }
}
