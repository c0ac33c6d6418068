//! Behavioural tests for template generation.
#![allow(
    unfulfilled_lint_expectations,
    reason = "Lint expectations vary between test targets"
)]
#![expect(clippy::expect_used, reason = "tests favour expect for clarity")]

mod fixtures;
mod scenarios;
mod steps;
