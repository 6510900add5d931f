//! Guardrail evaluation
//!
//! Deterministic enforcement of user-declared constraints against a
//! projected post-action snapshot. This module is the only producer of
//! `ValidationResult`; nothing here may depend on a model assessment.

use crate::models::{
    AccountSnapshot, ActionKind, FinancialAction, Guardrail, GuardrailKind, UserProfile,
    ValidationResult,
};
use tracing::info;

const BASE_CONFIDENCE: f64 = 0.95;
const VIOLATION_PENALTY: f64 = 0.20;
const CONTRADICTION_PENALTY: f64 = 0.10;
const UNCERTAINTY_PENALTY: f64 = 0.05;

/// Evaluate every guardrail against the projected snapshot.
///
/// Each independently-violated guardrail contributes one entry; nothing is
/// deduplicated or merged. A guardrail with an unrecognized kind, or a
/// balance/percentage guardrail with no threshold, is inert.
pub fn check_violations(profile: &UserProfile, accounts_after: &AccountSnapshot) -> Vec<String> {
    let mut violations = Vec::new();

    for guardrail in &profile.guardrails {
        if let Some(violation) = check_guardrail(guardrail, &profile.accounts, accounts_after) {
            violations.push(violation);
        }
    }

    violations
}

fn check_guardrail(
    guardrail: &Guardrail,
    accounts_before: &AccountSnapshot,
    accounts_after: &AccountSnapshot,
) -> Option<String> {
    match guardrail.kind {
        GuardrailKind::MinBalance => {
            let account = guardrail.account?;
            let threshold = guardrail.threshold?;
            let projected = accounts_after.liquid_balance(account);
            // Strictly less-than: exactly at threshold is not a violation.
            if projected < threshold {
                Some(format!(
                    "{}: projected {:?} balance {:.2} falls below minimum {:.2}",
                    guardrail.rule, account, projected, threshold
                ))
            } else {
                None
            }
        }
        GuardrailKind::MaxInvestmentPct => {
            let threshold = guardrail.threshold?;
            let total = accounts_after.total_assets();
            // Zero total assets yields ratio 0, never NaN.
            let ratio = if total > 0.0 {
                accounts_after.investments.total() / total
            } else {
                0.0
            };
            if ratio > threshold {
                Some(format!(
                    "{}: invested share {:.1}% exceeds maximum {:.1}%",
                    guardrail.rule,
                    ratio * 100.0,
                    threshold * 100.0
                ))
            } else {
                None
            }
        }
        GuardrailKind::ProtectedAccount => {
            // Any decrease at all violates, regardless of threshold.
            if accounts_after.savings < accounts_before.savings {
                Some(format!(
                    "{}: protected savings would drop from {:.2} to {:.2}",
                    guardrail.rule, accounts_before.savings, accounts_after.savings
                ))
            } else {
                None
            }
        }
        GuardrailKind::Unknown => None,
    }
}

/// Assemble the deterministic validation verdict for a simulated action.
pub fn validate(
    profile: &UserProfile,
    action: &FinancialAction,
    accounts_after: &AccountSnapshot,
) -> ValidationResult {
    let constraint_violations = check_violations(profile, accounts_after);

    let mut contradictions = Vec::new();
    if action.amount < 0.0 {
        contradictions.push(format!(
            "Action proposes a negative amount ({:.2}); treated as a flagged no-op",
            action.amount
        ));
    }
    if action.kind == ActionKind::Spend && action.goal_id.is_some() {
        contradictions.push(
            "Spending is tied to a goal but spending never advances goal progress".to_string(),
        );
    }

    let mut uncertainty_sources = Vec::new();
    if action.kind == ActionKind::Invest {
        uncertainty_sources
            .push("Projected returns assume a constant 7% nominal annual rate".to_string());
    }
    if action.goal_id.is_some() {
        uncertainty_sources
            .push("Goal timelines treat the contribution as recurring monthly".to_string());
    }
    if action.amount > profile.accounts.checking {
        uncertainty_sources.push(format!(
            "Amount {:.2} exceeds checking balance {:.2}; projection assumes overdraft",
            action.amount, profile.accounts.checking
        ));
    }

    let passed = constraint_violations.is_empty() && contradictions.is_empty();

    let overall_confidence = (BASE_CONFIDENCE
        - VIOLATION_PENALTY * constraint_violations.len() as f64
        - CONTRADICTION_PENALTY * contradictions.len() as f64
        - UNCERTAINTY_PENALTY * uncertainty_sources.len() as f64)
        .clamp(0.1, 1.0);

    info!(
        guardrail_count = profile.guardrails.len(),
        violation_count = constraint_violations.len(),
        passed = passed,
        "Constraint check completed"
    );

    ValidationResult {
        passed,
        constraint_violations,
        contradictions,
        uncertainty_sources,
        overall_confidence,
    }
}
