//! Runtime contracts for scoring invariants.
//!
//! Zero-cost in release builds (`debug_assert!` throughout), early failure in
//! development. Every check here mirrors an invariant stated in the module
//! docs of the component it guards; a firing contract is a programming error,
//! never an input error.

use crate::types::CoverageFeatures;

// ============================================================================
// COMPILE-TIME ASSERTIONS (evaluated at build time)
// ============================================================================

/// Static assertion that the precedence bit fields cannot collide into nine
/// bits: completeness, cleanliness, exact-prefix, tier, and phrase quality
/// together must fit the precedence byte.
const _: () = {
    const COMPLETE: u16 = 128;
    const CLEAN: u16 = 64;
    const EXACT_PREFIX: u16 = 32;
    const MAX_TIER: u16 = 3 << 3;
    const MAX_QUALITY: u16 = 7;
    assert!(COMPLETE | CLEAN | EXACT_PREFIX | MAX_TIER | MAX_QUALITY <= 0xFF);

    // Single-term layout: tier 4 spills into the exact-prefix bit, which is
    // never set for single-term queries.
    const MAX_SINGLE_TIER: u16 = 4 << 3;
    assert!(COMPLETE | CLEAN | MAX_SINGLE_TIER <= 0xFF);
};

/// Check the feature counter chain:
/// `strict <= prefix <= any <= count`, plus credit bounds.
#[inline]
pub(crate) fn check_feature_chain(features: &CoverageFeatures) {
    debug_assert!(
        features.terms_strict_matched <= features.terms_prefix_matched,
        "strict ({}) > prefix ({})",
        features.terms_strict_matched,
        features.terms_prefix_matched
    );
    debug_assert!(
        features.terms_prefix_matched <= features.terms_with_any_match,
        "prefix ({}) > any ({})",
        features.terms_prefix_matched,
        features.terms_with_any_match
    );
    debug_assert!(
        features.terms_with_any_match <= features.terms_count,
        "any ({}) > count ({})",
        features.terms_with_any_match,
        features.terms_count
    );
    debug_assert!(
        features
            .term_ci
            .iter()
            .all(|&ci| (0.0..=1.0 + 1e-9).contains(&ci)),
        "per-term credit out of [0, 1]"
    );
    debug_assert!(
        features.missing_idf <= features.total_idf + 1e-9,
        "missing IDF mass ({}) exceeds total ({})",
        features.missing_idf,
        features.total_idf
    );
}

/// Check that a score bucket index is within the bitmap's addressable range.
#[inline]
pub(crate) fn check_bucket_index(score: usize) {
    debug_assert!(score < 65_536, "bucket index {} out of range", score);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_features_pass_the_chain() {
        check_feature_chain(&CoverageFeatures::default());
    }

    #[test]
    fn consistent_counters_pass() {
        let features = CoverageFeatures {
            terms_count: 3,
            terms_with_any_match: 3,
            terms_prefix_matched: 2,
            terms_strict_matched: 1,
            term_ci: vec![1.0, 0.5, 1.0],
            total_idf: 3.0,
            missing_idf: 1.5,
            ..CoverageFeatures::default()
        };
        check_feature_chain(&features);
    }

    #[test]
    #[should_panic(expected = "strict")]
    #[cfg(debug_assertions)]
    fn broken_chain_panics_in_debug() {
        let features = CoverageFeatures {
            terms_count: 2,
            terms_strict_matched: 2,
            terms_prefix_matched: 1,
            terms_with_any_match: 2,
            ..CoverageFeatures::default()
        };
        check_feature_chain(&features);
    }
}
