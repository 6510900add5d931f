//! Decision aggregation policy
//!
//! Pure functions that merge the budgeting, investment, and guardrail
//! assessments into one final verdict. This is the single home for the
//! resolution order and the consensus truth table; the orchestrator and
//! every test path import it from here. None of these functions can fail:
//! every input combination maps to a defined output.

use crate::models::{
    AccountSnapshot, ConsensusLevel, DecisionOutcome, DecisionTally, FinalDecision, Guardrail,
    GuardrailAssessment, GuardrailKind, Recommendation,
};
use tracing::{debug, info};

impl Recommendation {
    /// Severity rank: lower is more favorable.
    pub fn severity(&self) -> u8 {
        match self {
            Recommendation::StronglyApprove => 0,
            Recommendation::Approve => 1,
            Recommendation::ApproveWithCaution => 2,
            Recommendation::NotRecommended => 3,
            Recommendation::StronglyOppose => 4,
            Recommendation::Blocked => 5,
        }
    }

    fn is_hard_oppose(&self) -> bool {
        matches!(self, Recommendation::StronglyOppose | Recommendation::Blocked)
    }

    fn is_soft_concern(&self) -> bool {
        matches!(
            self,
            Recommendation::ApproveWithCaution | Recommendation::NotRecommended
        )
    }

    fn is_full_approve(&self) -> bool {
        matches!(self, Recommendation::StronglyApprove | Recommendation::Approve)
    }

    /// "Approving" for consensus purposes: anything short of definitive
    /// opposition, including approve-with-caution.
    fn is_consensus_approving(&self) -> bool {
        matches!(
            self,
            Recommendation::StronglyApprove
                | Recommendation::Approve
                | Recommendation::ApproveWithCaution
        )
    }
}

/// Resolve the final verdict.
///
/// Resolution order: (1) guardrail veto, (2) any hard opposition,
/// (3) any soft concern, (4) both full approvals, (5) safe default.
pub fn final_decision(
    guardrail: &GuardrailAssessment,
    budgeting: Recommendation,
    investment: Recommendation,
) -> FinalDecision {
    if !guardrail.can_proceed {
        return FinalDecision::Blocked;
    }
    if budgeting.is_hard_oppose() || investment.is_hard_oppose() {
        return FinalDecision::DoNotProceed;
    }
    if budgeting.is_soft_concern() || investment.is_soft_concern() {
        return FinalDecision::ProceedWithCaution;
    }
    if budgeting.is_full_approve() && investment.is_full_approve() {
        return FinalDecision::Proceed;
    }
    // Unreachable under the enum, but the default must stay safe.
    FinalDecision::ProceedWithCaution
}

/// Classify agreement between the budgeting and investment assessments.
///
/// Both approving (including with caution) is unanimous; both opposing, or a
/// split, is divided. Counting approve-with-caution as approving is
/// intentional and depended upon downstream; do not replace this with a
/// majority rule.
pub fn consensus(
    guardrail: &GuardrailAssessment,
    budgeting: Recommendation,
    investment: Recommendation,
) -> ConsensusLevel {
    if !guardrail.can_proceed {
        return ConsensusLevel::Blocked;
    }

    match (
        budgeting.is_consensus_approving(),
        investment.is_consensus_approving(),
    ) {
        (true, true) => ConsensusLevel::Unanimous,
        (false, false) => ConsensusLevel::Divided,
        (true, false) | (false, true) => ConsensusLevel::Divided,
    }
}

/// Tally the two domain assessments; the three buckets always sum to 2.
pub fn tally(budgeting: Recommendation, investment: Recommendation) -> DecisionTally {
    let mut t = DecisionTally {
        approving: 0,
        cautioning: 0,
        opposing: 0,
    };
    for rec in [budgeting, investment] {
        if rec.is_full_approve() {
            t.approving += 1;
        } else if rec == Recommendation::ApproveWithCaution {
            t.cautioning += 1;
        } else {
            t.opposing += 1;
        }
    }
    t
}

pub fn should_proceed(decision: FinalDecision) -> bool {
    matches!(
        decision,
        FinalDecision::Proceed | FinalDecision::ProceedWithCaution
    )
}

/// Deterministic minimum-balance override.
///
/// Free-text assessments are unreliable at strict numeric comparison, so
/// minimum-balance guardrails are re-checked directly against the simulated
/// post-action balances. When at least one such guardrail exists (with both
/// an account and a numeric threshold) and every one of them is satisfied,
/// the upstream claim is superseded: the assessment is forced to pass and an
/// audit note is appended to its summary. No other guardrail kind has a
/// deterministic check here, so no other kind is overridden.
///
/// Returns true when the assessment was overridden.
pub fn apply_min_balance_override(
    assessment: &mut GuardrailAssessment,
    guardrails: &[Guardrail],
    accounts_after: &AccountSnapshot,
) -> bool {
    let eligible: Vec<&Guardrail> = guardrails
        .iter()
        .filter(|g| {
            g.kind == GuardrailKind::MinBalance && g.account.is_some() && g.threshold.is_some()
        })
        .collect();

    if eligible.is_empty() {
        return false;
    }

    let all_satisfied = eligible.iter().all(|g| match (g.account, g.threshold) {
        (Some(account), Some(threshold)) => accounts_after.liquid_balance(account) >= threshold,
        _ => true,
    });

    if !all_satisfied {
        return false;
    }

    if assessment.violated || !assessment.can_proceed {
        info!(
            guardrail_count = eligible.len(),
            "Overriding upstream guardrail assessment: all minimum-balance guardrails satisfied"
        );
    }

    assessment.violated = false;
    assessment.can_proceed = true;
    assessment.summary.push_str(
        " [deterministic check: every minimum-balance guardrail is satisfied by the projected \
         balances; overriding to pass]",
    );
    true
}

/// Convenience: compute the full outcome in one call.
pub fn aggregate(
    guardrail: &GuardrailAssessment,
    budgeting: Recommendation,
    investment: Recommendation,
) -> DecisionOutcome {
    let decision = final_decision(guardrail, budgeting, investment);
    let outcome = DecisionOutcome {
        final_decision: decision,
        consensus_level: consensus(guardrail, budgeting, investment),
        should_proceed: should_proceed(decision),
        tally: tally(budgeting, investment),
    };

    debug!(
        final_decision = %outcome.final_decision,
        should_proceed = outcome.should_proceed,
        "Decision aggregated"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvestmentAccounts, LiquidAccount};
    use crate::sample_data::guardrail as make_guardrail;
    use Recommendation::*;

    const ALL: [Recommendation; 6] = [
        StronglyApprove,
        Approve,
        ApproveWithCaution,
        NotRecommended,
        StronglyOppose,
        Blocked,
    ];

    fn pass() -> GuardrailAssessment {
        GuardrailAssessment {
            violated: false,
            can_proceed: true,
            summary: "No guardrails at risk".to_string(),
        }
    }

    fn veto() -> GuardrailAssessment {
        GuardrailAssessment {
            violated: true,
            can_proceed: false,
            summary: "Hard constraint violated".to_string(),
        }
    }

    #[test]
    fn veto_precedes_everything() {
        assert_eq!(
            final_decision(&veto(), StronglyApprove, StronglyApprove),
            FinalDecision::Blocked
        );
        assert_eq!(
            consensus(&veto(), StronglyApprove, StronglyApprove),
            ConsensusLevel::Blocked
        );
    }

    #[test]
    fn resolution_order_matches_contract() {
        assert_eq!(
            final_decision(&pass(), StronglyApprove, Approve),
            FinalDecision::Proceed
        );
        assert_eq!(
            final_decision(&pass(), Approve, ApproveWithCaution),
            FinalDecision::ProceedWithCaution
        );
        assert_eq!(
            final_decision(&pass(), NotRecommended, StronglyApprove),
            FinalDecision::ProceedWithCaution
        );
        assert_eq!(
            final_decision(&pass(), StronglyOppose, StronglyApprove),
            FinalDecision::DoNotProceed
        );
        assert_eq!(
            final_decision(&pass(), Approve, Blocked),
            FinalDecision::DoNotProceed
        );
        // Hard opposition wins over a coexisting soft concern.
        assert_eq!(
            final_decision(&pass(), ApproveWithCaution, StronglyOppose),
            FinalDecision::DoNotProceed
        );
    }

    #[test]
    fn tally_always_sums_to_two() {
        for a in ALL {
            for b in ALL {
                let t = tally(a, b);
                assert_eq!(t.approving + t.cautioning + t.opposing, 2, "{a} / {b}");
            }
        }
    }

    #[test]
    fn downgrading_one_recommendation_never_upgrades_decision() {
        fn decision_rank(d: FinalDecision) -> u8 {
            match d {
                FinalDecision::Proceed => 0,
                FinalDecision::ProceedWithCaution => 1,
                FinalDecision::DoNotProceed => 2,
                FinalDecision::Blocked => 3,
            }
        }

        for a in ALL {
            for b in ALL {
                let base = decision_rank(final_decision(&pass(), a, b));
                // Downgrade either side by one severity level.
                for (x, y) in [(a, b), (b, a)] {
                    if let Some(worse) = ALL.iter().find(|r| r.severity() == x.severity() + 1) {
                        let downgraded = decision_rank(final_decision(&pass(), *worse, y));
                        assert!(
                            downgraded >= base,
                            "downgrading {x} to {worse} upgraded the decision"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn consensus_truth_table_is_preserved_verbatim() {
        // Both approving-ish: unanimous, even with one merely cautioning.
        assert_eq!(
            consensus(&pass(), StronglyApprove, ApproveWithCaution),
            ConsensusLevel::Unanimous
        );
        assert_eq!(
            consensus(&pass(), ApproveWithCaution, ApproveWithCaution),
            ConsensusLevel::Unanimous
        );
        // Both opposing: divided.
        assert_eq!(
            consensus(&pass(), NotRecommended, StronglyOppose),
            ConsensusLevel::Divided
        );
        // Split: divided.
        assert_eq!(
            consensus(&pass(), Approve, NotRecommended),
            ConsensusLevel::Divided
        );
        assert_eq!(
            consensus(&pass(), Blocked, ApproveWithCaution),
            ConsensusLevel::Divided
        );
    }

    #[test]
    fn min_balance_override_forces_pass_when_numbers_hold() {
        let guardrails = vec![make_guardrail(
            GuardrailKind::MinBalance,
            Some(LiquidAccount::Checking),
            Some(1000.0),
        )];
        let accounts = AccountSnapshot {
            checking: 2500.0,
            savings: 8000.0,
            investments: InvestmentAccounts::default(),
        };

        // Upstream wrongly claims a violation; the numbers say otherwise.
        let mut assessment = veto();
        let overridden = apply_min_balance_override(&mut assessment, &guardrails, &accounts);
        assert!(overridden);
        assert!(!assessment.violated);
        assert!(assessment.can_proceed);
        assert!(assessment.summary.contains("deterministic check"));
    }

    #[test]
    fn min_balance_override_leaves_real_violations_alone() {
        let guardrails = vec![make_guardrail(
            GuardrailKind::MinBalance,
            Some(LiquidAccount::Checking),
            Some(1000.0),
        )];
        let accounts = AccountSnapshot {
            checking: 500.0,
            savings: 8000.0,
            investments: InvestmentAccounts::default(),
        };

        let mut assessment = veto();
        assert!(!apply_min_balance_override(&mut assessment, &guardrails, &accounts));
        assert!(assessment.violated);
        assert!(!assessment.can_proceed);
    }

    #[test]
    fn override_ignores_other_guardrail_kinds() {
        // Only a protected-account guardrail exists: nothing eligible, no
        // override, the upstream claim stands.
        let guardrails = vec![make_guardrail(
            GuardrailKind::ProtectedAccount,
            Some(LiquidAccount::Savings),
            None,
        )];
        let accounts = AccountSnapshot {
            checking: 2500.0,
            savings: 8000.0,
            investments: InvestmentAccounts::default(),
        };

        let mut assessment = veto();
        assert!(!apply_min_balance_override(&mut assessment, &guardrails, &accounts));
        assert!(assessment.violated);
    }

    #[test]
    fn aggregate_is_deterministic() {
        let a = aggregate(&pass(), Approve, ApproveWithCaution);
        let b = aggregate(&pass(), Approve, ApproveWithCaution);
        assert_eq!(a, b);
        assert!(a.should_proceed);
        assert_eq!(a.final_decision, FinalDecision::ProceedWithCaution);
        assert_eq!(a.consensus_level, ConsensusLevel::Unanimous);
    }
}
