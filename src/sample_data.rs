//! Shared sample-profile builders
//!
//! Deterministic fixtures used across module tests. Kept in the library so
//! downstream crates can exercise the core without inventing data.

use crate::models::{
    AccountSnapshot, FinancialGoal, Guardrail, GuardrailKind, InvestmentAccounts, InvestmentSlot,
    LiquidAccount, RiskTolerance, SpendingCategory, TimeHorizon, UserProfile,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

/// A representative profile: comfortable liquid balances, one legacy
/// investment slot, two active goals, a couple of spending categories, and a
/// checking minimum-balance guardrail.
pub fn sample_profile() -> UserProfile {
    UserProfile {
        user_id: Uuid::new_v4(),
        accounts: AccountSnapshot {
            checking: 3000.0,
            savings: 8000.0,
            investments: InvestmentAccounts {
                taxable: InvestmentSlot::Balance(5000.0),
                roth_ira: InvestmentSlot::Allocated {
                    balance: 12000.0,
                    allocation: crate::models::Allocation {
                        stocks: 80.0,
                        bonds: 15.0,
                        cash: 5.0,
                        other: None,
                    },
                },
                traditional_401k: InvestmentSlot::Balance(20000.0),
            },
        },
        goals: vec![
            FinancialGoal {
                id: Uuid::new_v4(),
                name: "Emergency fund".to_string(),
                target_amount: 10000.0,
                current_amount: 8000.0,
                deadline: Utc::now() + Duration::days(365),
                priority: 1,
                time_horizon: TimeHorizon::Short,
            },
            FinancialGoal {
                id: Uuid::new_v4(),
                name: "House deposit".to_string(),
                target_amount: 50000.0,
                current_amount: 15000.0,
                deadline: Utc::now() + Duration::days(365 * 4),
                priority: 2,
                time_horizon: TimeHorizon::Long,
            },
        ],
        spending_categories: vec![
            SpendingCategory {
                name: "groceries".to_string(),
                monthly_budget: 600.0,
                current_spent: 420.0,
            },
            SpendingCategory {
                name: "dining".to_string(),
                monthly_budget: 250.0,
                current_spent: 180.0,
            },
        ],
        guardrails: vec![guardrail(
            GuardrailKind::MinBalance,
            Some(LiquidAccount::Checking),
            Some(1000.0),
        )],
        risk_tolerance: RiskTolerance::Medium,
    }
}

/// Shorthand guardrail constructor for tests.
pub fn guardrail(
    kind: GuardrailKind,
    account: Option<LiquidAccount>,
    threshold: Option<f64>,
) -> Guardrail {
    let rule = match kind {
        GuardrailKind::MinBalance => "Keep a minimum balance",
        GuardrailKind::MaxInvestmentPct => "Cap invested share of assets",
        GuardrailKind::ProtectedAccount => "Never draw down savings",
        GuardrailKind::Unknown => "Unrecognized rule",
    };
    Guardrail {
        id: Uuid::new_v4(),
        rule: rule.to_string(),
        kind,
        account,
        threshold,
    }
}
