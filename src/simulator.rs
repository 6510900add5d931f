//! Simulation engine
//!
//! Pure projection of a proposed action into "if do" / "if don't" scenarios.
//! The input profile is read-only; both scenarios are built from independent
//! copies of the account snapshot. No operation fails for zero or negative
//! amounts — the one hard error lives in the dispatcher.

use crate::constraints;
use crate::error::{AdvisorError, Result};
use crate::models::{
    ActionKind, BudgetImpact, BudgetStatus, FinancialAction, GoalImpact, InvestmentAccountKind,
    Scenario, SimulationResult, TimelineChange, UserProfile, ValidationResult,
};
use crate::projection::{
    classify_liquidity_change, future_value, goal_impact, round_to_cents, INVESTMENT_ANNUAL_RATE,
    SAVINGS_ANNUAL_RATE,
};
use tracing::debug;
use uuid::Uuid;

/// Default projection horizon for investment future value.
pub const DEFAULT_INVEST_HORIZON_YEARS: f64 = 5.0;

/// Spending never helps a goal; goals at or above this priority cutoff are
/// still listed (with zero change) so callers can see they are unaffected.
const SPEND_GOAL_PRIORITY_CUTOFF: u8 = 2;

/// Project moving `amount` from checking into savings.
pub fn simulate_save(profile: &UserProfile, amount: f64, goal_id: Option<Uuid>) -> SimulationResult {
    let mut after = profile.accounts;
    after.checking -= amount;
    after.savings += amount;

    // Save does not alter spending categories; percent-used is recomputed
    // against the unchanged spend.
    let budget_impacts = unchanged_budget_impacts(profile);

    let goal_impacts: Vec<GoalImpact> = goal_id
        .and_then(|id| profile.goal(id))
        .map(|goal| vec![goal_impact(goal, amount, SAVINGS_ANNUAL_RATE)])
        .unwrap_or_default();

    let timeline_changes = timeline_from_impacts(&goal_impacts);

    let liquidity_impact =
        classify_liquidity_change(profile.accounts.total_liquid(), after.total_liquid());

    let action = FinancialAction {
        kind: ActionKind::Save,
        amount,
        goal_id,
        target_account: None,
        category: None,
    };

    let validation_result = constraints::validate(profile, &action, &after);

    let reasoning = format!(
        "Moving {:.2} from checking to savings leaves checking at {:.2} and savings at {:.2}; \
         total liquidity is unchanged.",
        amount, after.checking, after.savings
    );

    debug!(amount, checking_after = after.checking, "Simulated save");

    assemble(
        profile,
        action,
        Scenario {
            accounts_after: after,
            goal_impacts,
            budget_impacts,
            liquidity_impact,
            risk_impact: "No change to market risk exposure.".to_string(),
            timeline_changes,
        },
        reasoning,
        validation_result,
    )
}

/// Project moving `amount` from checking into an investment slot.
///
/// Goal-impact growth uses the default 7% rate regardless of the slot's own
/// allocation mix; the mix is informational, not a blended-return input.
pub fn simulate_invest(
    profile: &UserProfile,
    amount: f64,
    account_kind: InvestmentAccountKind,
    goal_id: Option<Uuid>,
    horizon_years: f64,
) -> SimulationResult {
    let mut after = profile.accounts;
    after.checking -= amount;
    after.investments.slot_mut(account_kind).credit(amount);

    let budget_impacts = unchanged_budget_impacts(profile);

    let goal_impacts: Vec<GoalImpact> = goal_id
        .and_then(|id| profile.goal(id))
        .map(|goal| vec![goal_impact(goal, amount, INVESTMENT_ANNUAL_RATE)])
        .unwrap_or_default();

    let timeline_changes = timeline_from_impacts(&goal_impacts);

    let liquidity_impact =
        classify_liquidity_change(profile.accounts.total_liquid(), after.total_liquid());

    let projected = future_value(amount, 0.0, INVESTMENT_ANNUAL_RATE, horizon_years);

    let action = FinancialAction {
        kind: ActionKind::Invest,
        amount,
        goal_id,
        target_account: Some(account_kind),
        category: None,
    };

    let validation_result = constraints::validate(profile, &action, &after);

    let reasoning = format!(
        "Investing {:.2} into {:?} projects to {:.2} after {:.1} years at a 7% nominal annual \
         rate; checking drops to {:.2}.",
        amount, account_kind, projected, horizon_years, after.checking
    );

    debug!(
        amount,
        ?account_kind,
        projected_value = projected,
        "Simulated invest"
    );

    assemble(
        profile,
        action,
        Scenario {
            accounts_after: after,
            goal_impacts,
            budget_impacts,
            liquidity_impact,
            risk_impact: format!(
                "Market exposure increases: {:.2} moves from cash into {:?}.",
                amount, account_kind
            ),
            timeline_changes,
        },
        reasoning,
        validation_result,
    )
}

/// Project spending `amount` from checking against a named category.
pub fn simulate_spend(profile: &UserProfile, amount: f64, category: &str) -> SimulationResult {
    let mut after = profile.accounts;
    after.checking -= amount;

    let budget_impacts: Vec<BudgetImpact> = profile
        .spending_categories
        .iter()
        .map(|c| {
            let new_spent = if c.name == category {
                c.current_spent + amount
            } else {
                c.current_spent
            };
            budget_impact(&c.name, c.monthly_budget, c.current_spent, new_spent)
        })
        .collect();

    // Spending never helps a goal: high-priority goals are listed with zero
    // effective change so the caller can see they are unaffected.
    let goal_impacts: Vec<GoalImpact> = profile
        .goals
        .iter()
        .filter(|g| g.priority <= SPEND_GOAL_PRIORITY_CUTOFF)
        .map(|g| goal_impact(g, 0.0, 0.0))
        .collect();

    let liquidity_impact =
        classify_liquidity_change(profile.accounts.total_liquid(), after.total_liquid());

    let action = FinancialAction {
        kind: ActionKind::Spend,
        amount,
        goal_id: None,
        target_account: None,
        category: Some(category.to_string()),
    };

    let validation_result = constraints::validate(profile, &action, &after);

    let reasoning = format!(
        "Spending {:.2} on {} leaves checking at {:.2}; goal progress is unaffected.",
        amount, category, after.checking
    );

    debug!(amount, category, "Simulated spend");

    assemble(
        profile,
        action,
        Scenario {
            accounts_after: after,
            goal_impacts,
            budget_impacts,
            liquidity_impact,
            risk_impact: "No change to market risk exposure.".to_string(),
            timeline_changes: Vec::new(),
        },
        reasoning,
        validation_result,
    )
}

/// Dispatch each action to the matching simulator.
///
/// This is a pure map: results are not compared or ranked here. The only
/// surfaced validation error is an unrecognized action kind.
pub fn compare_options(
    profile: &UserProfile,
    actions: &[FinancialAction],
) -> Result<Vec<SimulationResult>> {
    actions.iter().map(|a| simulate_action(profile, a)).collect()
}

/// Simulate a single action by kind.
pub fn simulate_action(profile: &UserProfile, action: &FinancialAction) -> Result<SimulationResult> {
    match action.kind {
        ActionKind::Save => Ok(simulate_save(profile, action.amount, action.goal_id)),
        ActionKind::Invest => Ok(simulate_invest(
            profile,
            action.amount,
            action.target_account.unwrap_or(InvestmentAccountKind::Taxable),
            action.goal_id,
            DEFAULT_INVEST_HORIZON_YEARS,
        )),
        ActionKind::Spend => Ok(simulate_spend(
            profile,
            action.amount,
            action.category.as_deref().unwrap_or("uncategorized"),
        )),
        ActionKind::Unknown => Err(AdvisorError::UnknownActionKind(action.kind.to_string())),
    }
}

//
// ================= Helpers =================
//

fn assemble(
    profile: &UserProfile,
    action: FinancialAction,
    scenario_if_do: Scenario,
    reasoning: String,
    validation_result: ValidationResult,
) -> SimulationResult {
    // The abstain branch keeps the original snapshot and is violation-free
    // by construction.
    let scenario_if_dont = Scenario {
        accounts_after: profile.accounts,
        goal_impacts: Vec::new(),
        budget_impacts: unchanged_budget_impacts(profile),
        liquidity_impact: classify_liquidity_change(
            profile.accounts.total_liquid(),
            profile.accounts.total_liquid(),
        ),
        risk_impact: "Status quo: balances and exposure unchanged.".to_string(),
        timeline_changes: Vec::new(),
    };

    let overdraws = action.amount > profile.accounts.checking;
    let confidence = if overdraws {
        (validation_result.overall_confidence - 0.05).clamp(0.1, 1.0)
    } else {
        validation_result.overall_confidence
    };

    SimulationResult {
        action,
        scenario_if_do,
        scenario_if_dont,
        confidence,
        reasoning,
        validation_result,
    }
}

fn unchanged_budget_impacts(profile: &UserProfile) -> Vec<BudgetImpact> {
    profile
        .spending_categories
        .iter()
        .map(|c| budget_impact(&c.name, c.monthly_budget, c.current_spent, c.current_spent))
        .collect()
}

fn budget_impact(category: &str, monthly_budget: f64, current_spent: f64, new_spent: f64) -> BudgetImpact {
    let percent_used = percent_used(monthly_budget, new_spent);
    BudgetImpact {
        category: category.to_string(),
        monthly_budget,
        current_spent,
        new_spent,
        percent_used,
        status: budget_status(monthly_budget, new_spent, percent_used),
    }
}

/// Percent of budget used. A zero budget with nothing spent reads 0; a zero
/// budget with any spend reads 100 (and is always over budget).
fn percent_used(monthly_budget: f64, spent: f64) -> f64 {
    if monthly_budget > 0.0 {
        round_to_cents(spent / monthly_budget * 100.0)
    } else if spent > 0.0 {
        100.0
    } else {
        0.0
    }
}

fn budget_status(monthly_budget: f64, spent: f64, percent_used: f64) -> BudgetStatus {
    if monthly_budget <= 0.0 {
        if spent > 0.0 {
            BudgetStatus::OverBudget
        } else {
            BudgetStatus::UnderBudget
        }
    } else if percent_used > 100.0 {
        BudgetStatus::OverBudget
    } else if percent_used >= 80.0 {
        BudgetStatus::Warning
    } else {
        BudgetStatus::UnderBudget
    }
}

fn timeline_from_impacts(impacts: &[GoalImpact]) -> Vec<TimelineChange> {
    impacts
        .iter()
        .filter(|i| i.time_saved_months > 0.0 && i.time_saved_months.is_finite())
        .map(|i| TimelineChange {
            goal_id: i.goal_id,
            description: format!(
                "Reaches \"{}\" about {:.0} month(s) sooner",
                i.goal_name, i.time_saved_months
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuardrailKind, InvestmentSlot, LiquidAccount, LiquidityBand};
    use crate::sample_data::{guardrail, sample_profile};

    #[test]
    fn save_moves_funds_and_passes_min_balance() {
        // checking 3000, savings 8000, min_balance(checking, 1000)
        let profile = sample_profile();
        let goal_id = profile.goals[0].id;

        let result = simulate_save(&profile, 500.0, Some(goal_id));

        assert_eq!(result.scenario_if_do.accounts_after.checking, 2500.0);
        assert_eq!(result.scenario_if_do.accounts_after.savings, 8500.0);
        assert!(result.validation_result.passed);
        assert!(result.validation_result.constraint_violations.is_empty());

        // The abstain branch is untouched and violation-free.
        assert_eq!(result.scenario_if_dont.accounts_after, profile.accounts);
    }

    #[test]
    fn save_below_threshold_produces_one_violation() {
        let profile = sample_profile();
        let result = simulate_save(&profile, 2500.0, None);

        // 3000 - 2500 = 500 < 1000
        assert_eq!(result.scenario_if_do.accounts_after.checking, 500.0);
        assert_eq!(result.validation_result.constraint_violations.len(), 1);
        assert!(!result.validation_result.passed);
    }

    #[test]
    fn simulators_never_mutate_the_profile() {
        let profile = sample_profile();
        let before = serde_json::to_string(&profile).unwrap();

        let _ = simulate_save(&profile, 500.0, Some(profile.goals[0].id));
        let _ = simulate_invest(
            &profile,
            1000.0,
            InvestmentAccountKind::Taxable,
            Some(profile.goals[1].id),
            5.0,
        );
        let _ = simulate_spend(&profile, 75.0, "groceries");

        let after = serde_json::to_string(&profile).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn save_keeps_liquidity_and_spending_unchanged() {
        let profile = sample_profile();
        let result = simulate_save(&profile, 500.0, None);

        assert_eq!(
            result.scenario_if_do.liquidity_impact.band,
            LiquidityBand::NoSignificantChange
        );
        for impact in &result.scenario_if_do.budget_impacts {
            assert_eq!(impact.current_spent, impact.new_spent);
        }
    }

    #[test]
    fn invest_promotes_bare_slot_and_reduces_liquidity() {
        let profile = sample_profile();
        let result = simulate_invest(&profile, 2000.0, InvestmentAccountKind::Taxable, None, 5.0);

        let after = &result.scenario_if_do.accounts_after;
        assert_eq!(after.checking, 1000.0);
        match after.investments.taxable {
            InvestmentSlot::Allocated {
                balance,
                allocation,
            } => {
                assert_eq!(balance, 7000.0);
                assert_eq!(allocation.stocks, 100.0);
            }
            InvestmentSlot::Balance(_) => panic!("legacy slot was not promoted"),
        }

        // 11000 -> 9000 liquid is an -18% change.
        assert_eq!(
            result.scenario_if_do.liquidity_impact.band,
            LiquidityBand::SignificantDecrease
        );
    }

    #[test]
    fn spend_updates_named_category_only() {
        let profile = sample_profile();
        let result = simulate_spend(&profile, 120.0, "groceries");

        let groceries = result
            .scenario_if_do
            .budget_impacts
            .iter()
            .find(|b| b.category == "groceries")
            .unwrap();
        assert_eq!(groceries.new_spent, 540.0);
        assert_eq!(groceries.status, crate::models::BudgetStatus::Warning);

        let dining = result
            .scenario_if_do
            .budget_impacts
            .iter()
            .find(|b| b.category == "dining")
            .unwrap();
        assert_eq!(dining.new_spent, dining.current_spent);
    }

    #[test]
    fn spend_lists_high_priority_goals_with_zero_change() {
        let profile = sample_profile();
        let result = simulate_spend(&profile, 50.0, "dining");

        assert_eq!(result.scenario_if_do.goal_impacts.len(), 2);
        for impact in &result.scenario_if_do.goal_impacts {
            assert_eq!(impact.progress_change_pct, 0.0);
            assert_eq!(impact.time_saved_months, 0.0);
        }
    }

    #[test]
    fn zero_and_negative_amounts_never_panic() {
        let profile = sample_profile();

        let zero = simulate_save(&profile, 0.0, Some(profile.goals[0].id));
        assert_eq!(zero.scenario_if_do.accounts_after, profile.accounts);
        assert!(zero.scenario_if_do.goal_impacts[0].progress_change_pct == 0.0);

        let negative = simulate_spend(&profile, -40.0, "groceries");
        assert!(!negative.validation_result.passed);
        assert!(!negative.validation_result.contradictions.is_empty());

        let negative_invest =
            simulate_invest(&profile, -100.0, InvestmentAccountKind::RothIra, None, 5.0);
        assert_eq!(
            negative_invest
                .scenario_if_do
                .accounts_after
                .investments
                .roth_ira
                .balance(),
            11900.0
        );
    }

    #[test]
    fn negative_balances_are_kept_for_violation_detection() {
        let mut profile = sample_profile();
        profile.guardrails = vec![guardrail(
            GuardrailKind::MinBalance,
            Some(LiquidAccount::Checking),
            Some(0.0),
        )];

        let result = simulate_spend(&profile, 5000.0, "groceries");
        assert_eq!(result.scenario_if_do.accounts_after.checking, -2000.0);
        assert_eq!(result.validation_result.constraint_violations.len(), 1);
    }

    #[test]
    fn compare_options_dispatches_and_rejects_unknown() {
        let profile = sample_profile();
        let actions = vec![
            FinancialAction {
                kind: ActionKind::Save,
                amount: 300.0,
                goal_id: None,
                target_account: None,
                category: None,
            },
            FinancialAction {
                kind: ActionKind::Spend,
                amount: 60.0,
                goal_id: None,
                target_account: None,
                category: Some("dining".to_string()),
            },
        ];

        let results = compare_options(&profile, &actions).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].action.kind, ActionKind::Save);

        let bad = vec![FinancialAction {
            kind: ActionKind::Unknown,
            amount: 10.0,
            goal_id: None,
            target_account: None,
            category: None,
        }];
        let err = compare_options(&profile, &bad).unwrap_err();
        assert!(matches!(err, AdvisorError::UnknownActionKind(_)));
    }

    #[test]
    fn simulation_is_deterministic() {
        let profile = sample_profile();
        let a = simulate_save(&profile, 500.0, Some(profile.goals[1].id));
        let b = simulate_save(&profile, 500.0, Some(profile.goals[1].id));
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
