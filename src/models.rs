//! Core data models for the simulation and decision core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeHorizon {
    Short,
    Medium,
    Long,
}

/// The kind of monetary action being proposed.
///
/// `Unknown` captures unrecognized wire values so the dispatcher can surface
/// `UnknownActionKind` instead of a deserialization failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Save,
    Invest,
    Spend,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentAccountKind {
    Taxable,
    RothIra,
    Traditional401k,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LiquidAccount {
    Checking,
    Savings,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailKind {
    MinBalance,
    MaxInvestmentPct,
    ProtectedAccount,
    /// Unrecognized guardrail kinds are inert, never an error.
    #[serde(other)]
    Unknown,
}

//
// ================= Accounts =================
//

/// Asset allocation percentages; the four slots sum to ~100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Allocation {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<f64>,
}

impl Allocation {
    /// The documented default for legacy bare-balance slots: 100% stocks.
    pub fn all_stocks() -> Self {
        Self {
            stocks: 100.0,
            bonds: 0.0,
            cash: 0.0,
            other: None,
        }
    }
}

/// An investment slot is either a legacy bare balance (implies 100% stocks)
/// or a balance with an explicit allocation record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InvestmentSlot {
    Balance(f64),
    Allocated { balance: f64, allocation: Allocation },
}

impl InvestmentSlot {
    pub fn balance(&self) -> f64 {
        match self {
            InvestmentSlot::Balance(b) => *b,
            InvestmentSlot::Allocated { balance, .. } => *balance,
        }
    }

    /// Allocation for this slot; the legacy case reports the 100%-stock default.
    pub fn allocation(&self) -> Allocation {
        match self {
            InvestmentSlot::Balance(_) => Allocation::all_stocks(),
            InvestmentSlot::Allocated { allocation, .. } => *allocation,
        }
    }

    /// Credit the slot. A bare balance is promoted to an allocation record
    /// with the 100%-stock default.
    pub fn credit(&mut self, amount: f64) {
        *self = match *self {
            InvestmentSlot::Balance(b) => InvestmentSlot::Allocated {
                balance: b + amount,
                allocation: Allocation::all_stocks(),
            },
            InvestmentSlot::Allocated {
                balance,
                allocation,
            } => InvestmentSlot::Allocated {
                balance: balance + amount,
                allocation,
            },
        };
    }
}

impl Default for InvestmentSlot {
    fn default() -> Self {
        InvestmentSlot::Balance(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentAccounts {
    pub taxable: InvestmentSlot,
    pub roth_ira: InvestmentSlot,
    pub traditional_401k: InvestmentSlot,
}

impl InvestmentAccounts {
    pub fn total(&self) -> f64 {
        self.taxable.balance() + self.roth_ira.balance() + self.traditional_401k.balance()
    }

    pub fn slot_mut(&mut self, kind: InvestmentAccountKind) -> &mut InvestmentSlot {
        match kind {
            InvestmentAccountKind::Taxable => &mut self.taxable,
            InvestmentAccountKind::RothIra => &mut self.roth_ira,
            InvestmentAccountKind::Traditional401k => &mut self.traditional_401k,
        }
    }
}

/// Snapshot of liquid and invested balances.
///
/// Balances are never negative-clamped; a negative simulated balance is a
/// valid state used to detect guardrail violations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub checking: f64,
    pub savings: f64,
    pub investments: InvestmentAccounts,
}

impl AccountSnapshot {
    /// Total liquid assets (checking + savings).
    pub fn total_liquid(&self) -> f64 {
        self.checking + self.savings
    }

    pub fn total_assets(&self) -> f64 {
        self.total_liquid() + self.investments.total()
    }

    pub fn liquid_balance(&self, account: LiquidAccount) -> f64 {
        match account {
            LiquidAccount::Checking => self.checking,
            LiquidAccount::Savings => self.savings,
        }
    }
}

//
// ================= Goals & Budget =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: DateTime<Utc>,
    pub priority: u8,
    pub time_horizon: TimeHorizon,
}

impl FinancialGoal {
    /// `current_amount` may exceed `target_amount`; that is a terminal case,
    /// not an error.
    pub fn is_achieved(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpendingCategory {
    pub name: String,
    pub monthly_budget: f64,
    pub current_spent: f64,
}

//
// ================= Guardrails =================
//

/// A user-declared hard constraint on balances or allocation.
///
/// A guardrail with an undefined threshold is inert (never triggers).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Guardrail {
    pub id: Uuid,
    pub rule: String,
    pub kind: GuardrailKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<LiquidAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

//
// ================= Action & Profile =================
//

/// A proposed monetary action. `amount` is not required to be positive;
/// negative/zero amounts produce no-op or flagged scenarios, never errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAction {
    pub kind: ActionKind,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_account: Option<InvestmentAccountKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: Uuid,
    pub accounts: AccountSnapshot,
    pub goals: Vec<FinancialGoal>,
    pub spending_categories: Vec<SpendingCategory>,
    pub guardrails: Vec<Guardrail>,
    pub risk_tolerance: RiskTolerance,
}

impl UserProfile {
    pub fn goal(&self, id: Uuid) -> Option<&FinancialGoal> {
        self.goals.iter().find(|g| g.id == id)
    }
}

//
// ================= Scenario Projections =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalImpact {
    pub goal_id: Uuid,
    pub goal_name: String,
    /// Percentage-point difference in progress, not a ratio.
    pub progress_change_pct: f64,
    /// Months; `f64::INFINITY` means the goal is never reached.
    pub months_to_goal_before: f64,
    pub months_to_goal_after: f64,
    /// Never negative: a contribution cannot increase time-to-goal.
    pub time_saved_months: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projected_value_at_deadline: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    UnderBudget,
    Warning,
    OverBudget,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetImpact {
    pub category: String,
    pub monthly_budget: f64,
    pub current_spent: f64,
    pub new_spent: f64,
    pub percent_used: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LiquidityBand {
    HighIncrease,
    SignificantDecrease,
    ModerateDecrease,
    MinorDecrease,
    NoSignificantChange,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityImpact {
    pub change_pct: f64,
    pub band: LiquidityBand,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineChange {
    pub goal_id: Uuid,
    pub description: String,
}

/// One projected future: either taking the action or abstaining.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub accounts_after: AccountSnapshot,
    pub goal_impacts: Vec<GoalImpact>,
    pub budget_impacts: Vec<BudgetImpact>,
    pub liquidity_impact: LiquidityImpact,
    pub risk_impact: String,
    pub timeline_changes: Vec<TimelineChange>,
}

//
// ================= Validation =================
//

/// Produced deterministically by the constraint checker. The only part of a
/// decision that must never depend on a non-deterministic assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub passed: bool,
    pub constraint_violations: Vec<String>,
    pub contradictions: Vec<String>,
    pub uncertainty_sources: Vec<String>,
    pub overall_confidence: f64,
}

//
// ================= Simulation Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub action: FinancialAction,
    pub scenario_if_do: Scenario,
    pub scenario_if_dont: Scenario,
    pub confidence: f64,
    pub reasoning: String,
    pub validation_result: ValidationResult,
}

//
// ================= Domain Assessments =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    StronglyApprove,
    Approve,
    ApproveWithCaution,
    NotRecommended,
    StronglyOppose,
    Blocked,
}

/// Budgeting or investment assessment, consumed (not produced) by the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorAssessment {
    pub recommendation: Recommendation,
    /// In [0, 1].
    pub confidence: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailAssessment {
    pub violated: bool,
    pub can_proceed: bool,
    pub summary: String,
}

//
// ================= Decision Outputs =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinalDecision {
    Proceed,
    ProceedWithCaution,
    DoNotProceed,
    Blocked,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusLevel {
    Unanimous,
    Divided,
    Blocked,
}

/// Counts over the budgeting and investment assessments; always sums to 2.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionTally {
    pub approving: u8,
    pub cautioning: u8,
    pub opposing: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOutcome {
    pub final_decision: FinalDecision,
    pub consensus_level: ConsensusLevel,
    pub should_proceed: bool,
    pub tally: DecisionTally,
}

/// Full auditable record of one decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub decision_id: Uuid,
    pub user_id: Uuid,
    pub input_hash: String,
    pub simulation: SimulationResult,
    pub budgeting: AdvisorAssessment,
    pub investment: AdvisorAssessment,
    pub guardrail: GuardrailAssessment,
    pub outcome: DecisionOutcome,
    pub reasoning_trace: Vec<String>,
    pub created_at: DateTime<Utc>,
}

//
// ================= Display =================
//

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Save => "save",
            ActionKind::Invest => "invest",
            ActionKind::Spend => "spend",
            ActionKind::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FinalDecision::Proceed => "proceed",
            FinalDecision::ProceedWithCaution => "proceed_with_caution",
            FinalDecision::DoNotProceed => "do_not_proceed",
            FinalDecision::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::StronglyApprove => "strongly_approve",
            Recommendation::Approve => "approve",
            Recommendation::ApproveWithCaution => "approve_with_caution",
            Recommendation::NotRecommended => "not_recommended",
            Recommendation::StronglyOppose => "strongly_oppose",
            Recommendation::Blocked => "blocked",
        };
        write!(f, "{}", s)
    }
}
