//! Property-based tests for verifying invariants.

mod common;

#[path = "property/invariants.rs"]
mod invariants;

#[path = "property/score_array_props.rs"]
mod score_array_props;

#[path = "property/normalize_props.rs"]
mod normalize_props;

#[path = "property/determinism.rs"]
mod determinism;
