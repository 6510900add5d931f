//! Advisor assessment seams
//!
//! Each perspective on a simulated action sits behind an async trait so the
//! orchestrator can fan the three of them out concurrently and swap the
//! rule-based reference implementations for external ones. The rule-based
//! assessors are pure functions of the simulation result and profile, which
//! keeps the whole decision path deterministic and testable.

use crate::error::Result;
use crate::models::{
    ActionKind, AdvisorAssessment, BudgetStatus, GuardrailAssessment, LiquidityBand,
    Recommendation, RiskTolerance, SimulationResult, UserProfile,
};
use async_trait::async_trait;
use tracing::debug;

//
// ================= Trait seams =================
//

/// Judges a simulated action from the spending-plan perspective.
#[async_trait]
pub trait BudgetingAssessor: Send + Sync {
    async fn assess(
        &self,
        profile: &UserProfile,
        simulation: &SimulationResult,
    ) -> Result<AdvisorAssessment>;
}

/// Judges a simulated action from the portfolio and risk perspective.
#[async_trait]
pub trait InvestmentAssessor: Send + Sync {
    async fn assess(
        &self,
        profile: &UserProfile,
        simulation: &SimulationResult,
    ) -> Result<AdvisorAssessment>;
}

/// Reports whether user-declared guardrails hold for the projected outcome.
///
/// Unlike the advisor seams this one carries a hard veto: its verdict is
/// checked against the deterministic constraint result before aggregation.
#[async_trait]
pub trait GuardrailAssessor: Send + Sync {
    async fn assess(
        &self,
        profile: &UserProfile,
        simulation: &SimulationResult,
    ) -> Result<GuardrailAssessment>;
}

//
// ================= Rule-based implementations =================
//

/// Deterministic budgeting verdict driven by projected category status.
pub struct RuleBasedBudgetingAssessor;

#[async_trait]
impl BudgetingAssessor for RuleBasedBudgetingAssessor {
    async fn assess(
        &self,
        _profile: &UserProfile,
        simulation: &SimulationResult,
    ) -> Result<AdvisorAssessment> {
        let impacts = &simulation.scenario_if_do.budget_impacts;
        let any_over = impacts.iter().any(|b| b.status == BudgetStatus::OverBudget);
        let any_warning = impacts.iter().any(|b| b.status == BudgetStatus::Warning);

        let (recommendation, summary) = if any_over {
            (
                Recommendation::StronglyOppose,
                "At least one spending category would go over budget.".to_string(),
            )
        } else if !simulation.validation_result.passed {
            (
                Recommendation::NotRecommended,
                "The projection carries violations or contradictions that need a closer look."
                    .to_string(),
            )
        } else if any_warning {
            (
                Recommendation::ApproveWithCaution,
                "A spending category would move into its warning band.".to_string(),
            )
        } else if simulation.action.kind == ActionKind::Save {
            (
                Recommendation::StronglyApprove,
                "Saving fits comfortably within the current spending plan.".to_string(),
            )
        } else {
            (
                Recommendation::Approve,
                "All spending categories stay under budget.".to_string(),
            )
        };

        debug!(?recommendation, "Budgeting assessment");

        Ok(AdvisorAssessment {
            recommendation,
            confidence: simulation.confidence,
            summary,
        })
    }
}

/// Deterministic portfolio verdict driven by liquidity, risk tolerance, and
/// goal effects.
pub struct RuleBasedInvestmentAssessor;

#[async_trait]
impl InvestmentAssessor for RuleBasedInvestmentAssessor {
    async fn assess(
        &self,
        profile: &UserProfile,
        simulation: &SimulationResult,
    ) -> Result<AdvisorAssessment> {
        let scenario = &simulation.scenario_if_do;
        let accelerates_goal = scenario
            .goal_impacts
            .iter()
            .any(|g| g.time_saved_months > 0.0 && g.time_saved_months.is_finite());

        let (recommendation, summary) = if !simulation.validation_result.passed {
            (
                Recommendation::NotRecommended,
                "Validation surfaced issues; the portfolio view defers to them.".to_string(),
            )
        } else if scenario.liquidity_impact.band == LiquidityBand::SignificantDecrease {
            (
                Recommendation::ApproveWithCaution,
                "The action draws down liquid reserves significantly.".to_string(),
            )
        } else if simulation.action.kind == ActionKind::Invest
            && profile.risk_tolerance == RiskTolerance::Low
        {
            (
                Recommendation::ApproveWithCaution,
                "Adding market exposure sits uneasily with a low risk tolerance.".to_string(),
            )
        } else if accelerates_goal {
            (
                Recommendation::StronglyApprove,
                "The action measurably shortens at least one goal timeline.".to_string(),
            )
        } else {
            (
                Recommendation::Approve,
                "No adverse effect on liquidity or goal timelines.".to_string(),
            )
        };

        debug!(?recommendation, "Investment assessment");

        Ok(AdvisorAssessment {
            recommendation,
            confidence: simulation.confidence,
            summary,
        })
    }
}

/// Mirrors the deterministic constraint verdict into an assessment.
pub struct RuleBasedGuardrailAssessor;

#[async_trait]
impl GuardrailAssessor for RuleBasedGuardrailAssessor {
    async fn assess(
        &self,
        _profile: &UserProfile,
        simulation: &SimulationResult,
    ) -> Result<GuardrailAssessment> {
        let violations = &simulation.validation_result.constraint_violations;
        let violated = !violations.is_empty();

        let summary = if violated {
            format!("Guardrail violations: {}", violations.join("; "))
        } else {
            "All guardrails hold for the projected balances.".to_string()
        };

        Ok(GuardrailAssessment {
            violated,
            can_proceed: !violated,
            summary,
        })
    }
}
