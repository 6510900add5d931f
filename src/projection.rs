//! Goal projection math
//!
//! Compound-growth and time-to-target calculations shared by the simulator
//! and the domain assessors. Pure, referentially transparent, no I/O.

use crate::models::{FinancialGoal, GoalImpact, LiquidityBand, LiquidityImpact};
use chrono::Utc;

/// Nominal annual growth rate assumed for savings balances (compounded monthly).
pub const SAVINGS_ANNUAL_RATE: f64 = 0.04;

/// Default nominal annual growth rate assumed for invested balances.
pub const INVESTMENT_ANNUAL_RATE: f64 = 0.07;

/// Hard cap on the iterative time-to-goal loop: 1200 months (100 years).
/// Required for termination with pathologically small contributions; the
/// cutover to `INFINITY` at this boundary is part of the contract.
pub const MAX_PROJECTION_MONTHS: u32 = 1200;

/// Round a monetary value to cents.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Future value of `principal` plus a recurring `monthly_contribution`,
/// compounded monthly at `annual_rate` over `years`.
///
/// Zero years returns the principal unchanged; a zero rate degenerates to
/// simple linear accumulation of the contributions.
pub fn future_value(
    principal: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    years: f64,
) -> f64 {
    let months = (years * 12.0).round().max(0.0) as u32;
    let monthly_rate = annual_rate / 12.0;

    let mut value = principal;
    for _ in 0..months {
        value = value * (1.0 + monthly_rate) + monthly_contribution;
    }
    round_to_cents(value)
}

/// Months until the goal target is reached with a recurring monthly
/// contribution, optionally compounding at `assumed_return`.
///
/// Returns `0` for an already-achieved goal and `INFINITY` when the
/// contribution is non-positive or the 1200-month cap is hit.
pub fn time_to_goal(goal: &FinancialGoal, monthly_contribution: f64, assumed_return: f64) -> f64 {
    if goal.is_achieved() {
        return 0.0;
    }
    if monthly_contribution <= 0.0 {
        return f64::INFINITY;
    }

    if assumed_return == 0.0 {
        return (goal.remaining() / monthly_contribution).ceil();
    }

    let monthly_rate = assumed_return / 12.0;
    let mut value = goal.current_amount;
    for month in 1..=MAX_PROJECTION_MONTHS {
        value = value * (1.0 + monthly_rate) + monthly_contribution;
        if value >= goal.target_amount {
            return f64::from(month);
        }
    }
    f64::INFINITY
}

/// Impact of adding `amount_added` toward a goal.
///
/// Already-achieved goals and zero contributions are distinct short-circuits;
/// both report an all-zero impact. The contribution is treated as the
/// recurring monthly amount when projecting months-to-goal before and after.
pub fn goal_impact(goal: &FinancialGoal, amount_added: f64, assumed_annual_return: f64) -> GoalImpact {
    if goal.is_achieved() {
        return zero_impact(goal);
    }
    if amount_added == 0.0 {
        return zero_impact(goal);
    }

    let before_pct = goal.current_amount / goal.target_amount * 100.0;
    let after_pct = (goal.current_amount + amount_added) / goal.target_amount * 100.0;

    let boosted = FinancialGoal {
        current_amount: goal.current_amount + amount_added,
        ..goal.clone()
    };

    let months_before = time_to_goal(goal, amount_added, assumed_annual_return);
    let months_after = time_to_goal(&boosted, amount_added, assumed_annual_return);

    // A contribution cannot increase time-to-goal in this model. When both
    // projections are infinite their difference is NaN; max() resolves to 0.
    let time_saved = (months_before - months_after).max(0.0);

    let projected_value_at_deadline = if assumed_annual_return > 0.0 {
        let now = Utc::now();
        if goal.deadline > now {
            let years = (goal.deadline - now).num_days() as f64 / 365.25;
            Some(future_value(amount_added, 0.0, assumed_annual_return, years))
        } else {
            None
        }
    } else {
        None
    };

    GoalImpact {
        goal_id: goal.id,
        goal_name: goal.name.clone(),
        progress_change_pct: after_pct - before_pct,
        months_to_goal_before: months_before,
        months_to_goal_after: months_after,
        time_saved_months: time_saved,
        projected_value_at_deadline,
    }
}

fn zero_impact(goal: &FinancialGoal) -> GoalImpact {
    GoalImpact {
        goal_id: goal.id,
        goal_name: goal.name.clone(),
        progress_change_pct: 0.0,
        months_to_goal_before: 0.0,
        months_to_goal_after: 0.0,
        time_saved_months: 0.0,
        projected_value_at_deadline: None,
    }
}

/// Classify the percentage change in total liquid assets before vs. after.
///
/// The breakpoints are part of the observable contract:
/// `> +5%` high increase, `< -10%` significant decrease, `< -5%` moderate
/// decrease, `< 0%` minor decrease, else no significant change.
pub fn classify_liquidity_change(liquid_before: f64, liquid_after: f64) -> LiquidityImpact {
    let change_pct = if liquid_before.abs() > f64::EPSILON {
        (liquid_after - liquid_before) / liquid_before * 100.0
    } else {
        0.0
    };

    let (band, description) = if change_pct > 5.0 {
        (LiquidityBand::HighIncrease, "high increase in liquidity")
    } else if change_pct < -10.0 {
        (
            LiquidityBand::SignificantDecrease,
            "significant decrease in liquidity",
        )
    } else if change_pct < -5.0 {
        (
            LiquidityBand::ModerateDecrease,
            "moderate decrease in liquidity",
        )
    } else if change_pct < 0.0 {
        (LiquidityBand::MinorDecrease, "minor decrease in liquidity")
    } else {
        (
            LiquidityBand::NoSignificantChange,
            "no significant change in liquidity",
        )
    };

    LiquidityImpact {
        change_pct,
        band,
        description: description.to_string(),
    }
}
