//! Decision orchestrator
//!
//! Runs the full pipeline for one proposed action: simulate, fan the three
//! assessors out concurrently, apply the deterministic minimum-balance
//! override, aggregate, and record the decision in the audit log.

use crate::assessors::{
    BudgetingAssessor, GuardrailAssessor, InvestmentAssessor, RuleBasedBudgetingAssessor,
    RuleBasedGuardrailAssessor, RuleBasedInvestmentAssessor,
};
use crate::audit::{compute_input_hash, DecisionLog};
use crate::error::Result;
use crate::models::{DecisionRecord, FinancialAction, UserProfile};
use crate::policy;
use crate::simulator;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

pub struct DecisionOrchestrator {
    budgeting: Box<dyn BudgetingAssessor>,
    investment: Box<dyn InvestmentAssessor>,
    guardrail: Box<dyn GuardrailAssessor>,
    decision_log: DecisionLog,
}

impl Default for DecisionOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionOrchestrator {
    /// Orchestrator wired with the rule-based assessors.
    pub fn new() -> Self {
        Self::with_assessors(
            Box::new(RuleBasedBudgetingAssessor),
            Box::new(RuleBasedInvestmentAssessor),
            Box::new(RuleBasedGuardrailAssessor),
        )
    }

    pub fn with_assessors(
        budgeting: Box<dyn BudgetingAssessor>,
        investment: Box<dyn InvestmentAssessor>,
        guardrail: Box<dyn GuardrailAssessor>,
    ) -> Self {
        Self {
            budgeting,
            investment,
            guardrail,
            decision_log: DecisionLog::new(),
        }
    }

    pub fn decision_log(&self) -> &DecisionLog {
        &self.decision_log
    }

    /// Decide on one proposed action and record the outcome.
    #[instrument(skip(self, profile, action), fields(user_id = %profile.user_id, kind = %action.kind))]
    pub async fn decide(
        &self,
        profile: &UserProfile,
        action: &FinancialAction,
    ) -> Result<DecisionRecord> {
        let input_hash = compute_input_hash(profile, action)?;
        let simulation = simulator::simulate_action(profile, action)?;

        let mut trace = vec![format!(
            "Simulated {} of {:.2}: {}",
            action.kind, action.amount, simulation.reasoning
        )];
        if !simulation.validation_result.passed {
            trace.push(format!(
                "Validation flagged {} violation(s) and {} contradiction(s)",
                simulation.validation_result.constraint_violations.len(),
                simulation.validation_result.contradictions.len()
            ));
        }

        let (budgeting, investment, guardrail) = tokio::join!(
            self.budgeting.assess(profile, &simulation),
            self.investment.assess(profile, &simulation),
            self.guardrail.assess(profile, &simulation),
        );
        let budgeting = budgeting?;
        let investment = investment?;
        let mut guardrail = guardrail?;

        trace.push(format!(
            "Budgeting: {} ({})",
            budgeting.recommendation, budgeting.summary
        ));
        trace.push(format!(
            "Investment: {} ({})",
            investment.recommendation, investment.summary
        ));
        trace.push(format!("Guardrail: {}", guardrail.summary));

        let overridden = policy::apply_min_balance_override(
            &mut guardrail,
            &profile.guardrails,
            &simulation.scenario_if_do.accounts_after,
        );
        if overridden {
            trace.push(
                "Minimum-balance guardrails re-checked against projected balances: all satisfied"
                    .to_string(),
            );
        }

        let outcome = policy::aggregate(
            &guardrail,
            budgeting.recommendation,
            investment.recommendation,
        );
        trace.push(format!(
            "Final decision: {} (consensus: {:?})",
            outcome.final_decision, outcome.consensus_level
        ));

        let record = DecisionRecord {
            decision_id: Uuid::new_v4(),
            user_id: profile.user_id,
            input_hash,
            simulation,
            budgeting,
            investment,
            guardrail,
            outcome,
            reasoning_trace: trace,
            created_at: Utc::now(),
        };

        self.decision_log.record(record.clone()).await?;

        info!(
            decision_id = %record.decision_id,
            final_decision = %record.outcome.final_decision,
            "Decision complete"
        );

        Ok(record)
    }
}
