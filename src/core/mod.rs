pub mod assistant;
mod engine;
mod error;
mod format;
mod types;

pub use engine::{
    ANNUITY_RATE, ANNUITY_SHARE, ASSUMED_MARGINAL_TAX_RATE, SECTION_80C_LIMIT,
    SECTION_80CCD_1B_LIMIT, WHAT_IF_MULTIPLIERS, compute_projection,
    compute_projection_with_limits, corpus_after_months, monthly_pension, monthly_rate,
    total_tax_saved,
};
pub use error::ProjectionError;
pub use format::format_inr;
pub use types::{
    AssetMix, GrowthPoint, InputLimits, MAX_EQUITY_PERCENT, ProjectionInput, ProjectionResult,
    WhatIfScenario,
};
