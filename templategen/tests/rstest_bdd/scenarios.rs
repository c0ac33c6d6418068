//! Binds the generation feature files to the step registry.

use rstest_bdd_macros::scenarios;

use crate::fixtures::{GenerationState, generation_state};

scenarios!(
    "tests/features/template_generation.feature",
    fixtures = [generation_state: GenerationState]
);
scenarios!(
    "tests/features/feature_flags.feature",
    fixtures = [generation_state: GenerationState]
);
