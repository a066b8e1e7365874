use super::error::ProjectionError;
use super::types::{
    AssetMix, GrowthPoint, InputLimits, ProjectionInput, ProjectionResult, WhatIfScenario,
};

const MONTHS_PER_YEAR: u32 = 12;

/// Share of the corpus that must buy an annuity at normal exit.
pub const ANNUITY_SHARE: f64 = 0.40;
/// Nominal annual rate the annuity portion is assumed to pay out at.
pub const ANNUITY_RATE: f64 = 0.06;
/// Section 80C deduction ceiling per financial year.
pub const SECTION_80C_LIMIT: f64 = 150_000.0;
/// Additional Section 80CCD(1B) deduction ceiling per financial year.
pub const SECTION_80CCD_1B_LIMIT: f64 = 50_000.0;
pub const ASSUMED_MARGINAL_TAX_RATE: f64 = 0.30;
pub const WHAT_IF_MULTIPLIERS: [f64; 3] = [1.0, 1.5, 2.0];

// Below this the annuity closed form divides by (almost) zero.
const DEGENERATE_MONTHLY_RATE: f64 = 1e-12;

/// Projects the corpus, pension and tax relief for one set of contribution
/// parameters, checked against [`InputLimits::default`].
pub fn compute_projection(input: &ProjectionInput) -> Result<ProjectionResult, ProjectionError> {
    compute_projection_with_limits(input, &InputLimits::default())
}

pub fn compute_projection_with_limits(
    input: &ProjectionInput,
    limits: &InputLimits,
) -> Result<ProjectionResult, ProjectionError> {
    validate_input(input, limits)?;
    let asset_mix = AssetMix::new(
        input.asset_mix.equity_percent,
        input.asset_mix.corporate_bond_percent,
    )?;

    let years = input.retirement_age - input.current_age;
    let total_months = years * MONTHS_PER_YEAR;
    let monthly_rate = monthly_rate(input.annual_return_rate_percent);

    let total_corpus = corpus_after_months(input.monthly_contribution, monthly_rate, total_months);
    let total_invested = input.monthly_contribution * f64::from(total_months);
    let annuity_corpus = total_corpus * ANNUITY_SHARE;

    Ok(ProjectionResult {
        years,
        total_months,
        total_corpus,
        total_invested,
        total_returns: total_corpus - total_invested,
        annuity_corpus,
        lump_sum_withdrawal: total_corpus * (1.0 - ANNUITY_SHARE),
        estimated_monthly_pension: monthly_pension(total_corpus),
        total_tax_saved: total_tax_saved(input.monthly_contribution, years),
        asset_mix,
        growth_series: growth_series(input, monthly_rate, years),
        what_if_scenarios: what_if_scenarios(input.monthly_contribution, monthly_rate, total_months),
    })
}

pub fn monthly_rate(annual_return_rate_percent: f64) -> f64 {
    annual_return_rate_percent / 100.0 / f64::from(MONTHS_PER_YEAR)
}

/// Future value of a monthly annuity due after `months` contributions.
///
/// A zero (or vanishing) rate falls back to plain accumulation.
pub fn corpus_after_months(monthly_contribution: f64, monthly_rate: f64, months: u32) -> f64 {
    if monthly_rate.abs() < DEGENERATE_MONTHLY_RATE {
        return monthly_contribution * f64::from(months);
    }

    let growth = (1.0 + monthly_rate).powf(f64::from(months));
    monthly_contribution * ((growth - 1.0) / monthly_rate) * (1.0 + monthly_rate)
}

pub fn monthly_pension(total_corpus: f64) -> f64 {
    total_corpus * ANNUITY_SHARE * ANNUITY_RATE / f64::from(MONTHS_PER_YEAR)
}

/// Cumulative relief under 80C and 80CCD(1B) at the assumed marginal rate.
pub fn total_tax_saved(monthly_contribution: f64, years: u32) -> f64 {
    let yearly_contribution = monthly_contribution * f64::from(MONTHS_PER_YEAR);
    let section_80c = yearly_contribution.min(SECTION_80C_LIMIT);
    let section_80ccd_1b = (yearly_contribution - SECTION_80C_LIMIT)
        .max(0.0)
        .min(SECTION_80CCD_1B_LIMIT);
    (section_80c + section_80ccd_1b) * ASSUMED_MARGINAL_TAX_RATE * f64::from(years)
}

// Each year is evaluated with the closed form rather than accumulated, so
// entries carry no drift from earlier years.
fn growth_series(input: &ProjectionInput, monthly_rate: f64, years: u32) -> Vec<GrowthPoint> {
    (1..=years)
        .map(|year| {
            let months = year * MONTHS_PER_YEAR;
            GrowthPoint {
                age: input.current_age + year,
                corpus: corpus_after_months(input.monthly_contribution, monthly_rate, months),
                invested: input.monthly_contribution * f64::from(months),
            }
        })
        .collect()
}

fn what_if_scenarios(
    monthly_contribution: f64,
    monthly_rate: f64,
    total_months: u32,
) -> Vec<WhatIfScenario> {
    WHAT_IF_MULTIPLIERS
        .iter()
        .map(|multiplier| {
            let monthly_amount = monthly_contribution * multiplier;
            WhatIfScenario {
                monthly_amount,
                corpus_at_retirement: corpus_after_months(
                    monthly_amount,
                    monthly_rate,
                    total_months,
                ),
            }
        })
        .collect()
}

fn validate_input(input: &ProjectionInput, limits: &InputLimits) -> Result<(), ProjectionError> {
    if !(limits.min_current_age..=limits.max_current_age).contains(&input.current_age) {
        return Err(ProjectionError::invalid(
            "currentAge",
            format!(
                "must be between {} and {}, got {}",
                limits.min_current_age, limits.max_current_age, input.current_age
            ),
        ));
    }

    if input.retirement_age <= input.current_age {
        return Err(ProjectionError::invalid(
            "retirementAge",
            format!(
                "must be greater than currentAge ({}), got {}",
                input.current_age, input.retirement_age
            ),
        ));
    }

    let min_retirement_age = limits.min_retirement_age.max(input.current_age + 1);
    if !(min_retirement_age..=limits.max_retirement_age).contains(&input.retirement_age) {
        return Err(ProjectionError::invalid(
            "retirementAge",
            format!(
                "must be between {} and {}, got {}",
                min_retirement_age, limits.max_retirement_age, input.retirement_age
            ),
        ));
    }

    let contribution = input.monthly_contribution;
    if !contribution.is_finite()
        || !(limits.min_monthly_contribution..=limits.max_monthly_contribution)
            .contains(&contribution)
    {
        return Err(ProjectionError::invalid(
            "monthlyContribution",
            format!(
                "must be between {} and {}, got {}",
                limits.min_monthly_contribution, limits.max_monthly_contribution, contribution
            ),
        ));
    }
    if !is_whole_paise(contribution) {
        return Err(ProjectionError::invalid(
            "monthlyContribution",
            format!("must have at most two decimal places, got {contribution}"),
        ));
    }

    let rate = input.annual_return_rate_percent;
    if rate == 0.0 && limits.zero_rate_allowed {
        return Ok(());
    }
    if !rate.is_finite()
        || !(limits.min_return_rate_percent..=limits.max_return_rate_percent).contains(&rate)
    {
        return Err(ProjectionError::invalid(
            "annualReturnRatePercent",
            format!(
                "must be between {} and {}, got {}",
                limits.min_return_rate_percent, limits.max_return_rate_percent, rate
            ),
        ));
    }
    if !is_multiple_of(rate, limits.return_rate_step_percent) {
        return Err(ProjectionError::invalid(
            "annualReturnRatePercent",
            format!(
                "must be a multiple of {}, got {}",
                limits.return_rate_step_percent, rate
            ),
        ));
    }

    Ok(())
}

fn is_whole_paise(amount: f64) -> bool {
    let paise = amount * 100.0;
    (paise - paise.round()).abs() < 1e-6
}

fn is_multiple_of(value: f64, step: f64) -> bool {
    if step <= 0.0 {
        return true;
    }
    let steps = value / step;
    (steps - steps.round()).abs() < 1e-9
}
