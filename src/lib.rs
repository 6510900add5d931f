//! Financial advisor core
//!
//! Deterministic simulation and decision engine for proposed financial
//! actions. A proposed save, invest, or spend is projected into parallel
//! "if do" / "if don't" scenarios, checked against user-declared guardrails,
//! assessed from the budgeting and portfolio perspectives, and merged into a
//! single auditable verdict.
//!
//! Modules:
//! - `models`: domain types shared across the pipeline
//! - `projection`: compound-growth and goal-timeline math
//! - `simulator`: pure scenario construction per action kind
//! - `constraints`: guardrail evaluation and validation verdicts
//! - `assessors`: async assessment seams plus rule-based implementations
//! - `policy`: resolution order, consensus, and the minimum-balance override
//! - `aggregator`: the orchestrator tying simulation to a recorded decision
//! - `audit`: hash-verified in-memory decision log
//! - `sample_data`: deterministic fixtures

pub mod aggregator;
pub mod assessors;
pub mod audit;
pub mod constraints;
pub mod error;
pub mod models;
pub mod policy;
pub mod projection;
pub mod sample_data;
pub mod simulator;

pub use aggregator::DecisionOrchestrator;
pub use audit::DecisionLog;
pub use error::{AdvisorError, Result};
pub use models::{
    DecisionOutcome, DecisionRecord, FinalDecision, FinancialAction, SimulationResult, UserProfile,
};
