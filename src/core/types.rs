use serde::Serialize;

use super::error::ProjectionError;

/// Highest equity share the scheme allows in an actively chosen mix.
pub const MAX_EQUITY_PERCENT: f64 = 75.0;

/// Split of contributions across the three asset classes.
///
/// The mix is carried alongside a projection for display only; the corpus
/// math is driven entirely by `annual_return_rate_percent`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMix {
    pub equity_percent: f64,
    pub corporate_bond_percent: f64,
    pub government_security_percent: f64,
}

impl AssetMix {
    /// Builds a mix from the equity and corporate-bond shares.
    ///
    /// The corporate share is clamped to whatever equity leaves over, so the
    /// derived government share never goes negative.
    pub fn new(equity_percent: f64, corporate_bond_percent: f64) -> Result<Self, ProjectionError> {
        if !equity_percent.is_finite() || !(0.0..=MAX_EQUITY_PERCENT).contains(&equity_percent) {
            return Err(ProjectionError::invalid(
                "equityPercent",
                format!("must be between 0 and {MAX_EQUITY_PERCENT}, got {equity_percent}"),
            ));
        }
        if !corporate_bond_percent.is_finite() || corporate_bond_percent < 0.0 {
            return Err(ProjectionError::invalid(
                "corporateBondPercent",
                format!("must be >= 0, got {corporate_bond_percent}"),
            ));
        }

        let corporate_bond_percent = corporate_bond_percent.min(100.0 - equity_percent);
        Ok(Self {
            equity_percent,
            corporate_bond_percent,
            government_security_percent: 100.0 - equity_percent - corporate_bond_percent,
        })
    }
}

impl Default for AssetMix {
    fn default() -> Self {
        Self {
            equity_percent: 50.0,
            corporate_bond_percent: 30.0,
            government_security_percent: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub monthly_contribution: f64,
    pub annual_return_rate_percent: f64,
    pub asset_mix: AssetMix,
}

impl Default for ProjectionInput {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 60,
            monthly_contribution: 5_000.0,
            annual_return_rate_percent: 10.0,
            asset_mix: AssetMix::default(),
        }
    }
}

/// Accepted ranges for [`ProjectionInput`] fields, all bounds inclusive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InputLimits {
    pub min_current_age: u32,
    pub max_current_age: u32,
    pub min_retirement_age: u32,
    pub max_retirement_age: u32,
    pub min_monthly_contribution: f64,
    pub max_monthly_contribution: f64,
    pub min_return_rate_percent: f64,
    pub max_return_rate_percent: f64,
    pub return_rate_step_percent: f64,
    /// Accept exactly 0% outside the rate range, for the no-growth projection.
    pub zero_rate_allowed: bool,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_current_age: 18,
            max_current_age: 65,
            min_retirement_age: 60,
            max_retirement_age: 70,
            min_monthly_contribution: 500.0,
            max_monthly_contribution: 50_000.0,
            min_return_rate_percent: 6.0,
            max_return_rate_percent: 12.0,
            return_rate_step_percent: 0.5,
            zero_rate_allowed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub age: u32,
    pub corpus: f64,
    pub invested: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfScenario {
    pub monthly_amount: f64,
    pub corpus_at_retirement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub years: u32,
    pub total_months: u32,
    pub total_corpus: f64,
    pub total_invested: f64,
    pub total_returns: f64,
    pub annuity_corpus: f64,
    pub lump_sum_withdrawal: f64,
    pub estimated_monthly_pension: f64,
    pub total_tax_saved: f64,
    pub asset_mix: AssetMix,
    pub growth_series: Vec<GrowthPoint>,
    pub what_if_scenarios: Vec<WhatIfScenario>,
}
