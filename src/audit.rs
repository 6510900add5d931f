//! Decision audit log
//!
//! In-memory, concurrency-safe store of every decision the orchestrator
//! produces, keyed by decision id. Each stored record carries a SHA-256
//! digest of its serialized form so later reads can detect tampering, and
//! every decision references a digest of the exact profile and action it
//! was computed from.

use crate::error::{AdvisorError, Result};
use crate::models::{DecisionRecord, FinancialAction, UserProfile};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Streams serialized bytes straight into the digest, no intermediate buffer.
struct HashWriter(Sha256);

impl std::io::Write for HashWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn digest_of<T: Serialize>(value: &T) -> Result<String> {
    let mut writer = HashWriter(Sha256::new());
    serde_json::to_writer(&mut writer, value)?;
    Ok(hex::encode(writer.0.finalize()))
}

/// Digest of the exact inputs a decision was computed from.
pub fn compute_input_hash(profile: &UserProfile, action: &FinancialAction) -> Result<String> {
    let mut writer = HashWriter(Sha256::new());
    serde_json::to_writer(&mut writer, profile)?;
    serde_json::to_writer(&mut writer, action)?;
    Ok(hex::encode(writer.0.finalize()))
}

struct StoredRecord {
    record: DecisionRecord,
    record_hash: String,
}

/// Append-only decision store shared across the orchestrator.
#[derive(Clone, Default)]
pub struct DecisionLog {
    records: Arc<RwLock<HashMap<Uuid, Arc<StoredRecord>>>>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a decision record, hashing it at insert time.
    pub async fn record(&self, record: DecisionRecord) -> Result<()> {
        let record_hash = digest_of(&record)?;
        let decision_id = record.decision_id;

        let mut records = self.records.write().await;
        records.insert(
            decision_id,
            Arc::new(StoredRecord {
                record,
                record_hash,
            }),
        );

        info!(%decision_id, "Decision recorded");
        Ok(())
    }

    pub async fn get(&self, decision_id: Uuid) -> Option<DecisionRecord> {
        let records = self.records.read().await;
        records.get(&decision_id).map(|s| s.record.clone())
    }

    /// All decisions for a user, oldest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Vec<DecisionRecord> {
        let records = self.records.read().await;
        let mut out: Vec<DecisionRecord> = records
            .values()
            .filter(|s| s.record.user_id == user_id)
            .map(|s| s.record.clone())
            .collect();
        out.sort_by_key(|r| r.created_at);
        out
    }

    /// Recompute the stored record's digest and compare it to the one taken
    /// at insert time.
    pub async fn verify_integrity(&self, decision_id: Uuid) -> Result<bool> {
        let records = self.records.read().await;
        let stored = records.get(&decision_id).ok_or_else(|| {
            AdvisorError::AuditError(format!("no decision record for {decision_id}"))
        })?;
        Ok(digest_of(&stored.record)? == stored.record_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActionKind, ConsensusLevel, DecisionOutcome, DecisionTally, FinalDecision,
    };
    use crate::sample_data::sample_profile;
    use crate::simulator::simulate_save;
    use chrono::Utc;

    fn record_for(user_id: Uuid) -> DecisionRecord {
        let profile = sample_profile();
        let simulation = simulate_save(&profile, 100.0, None);
        DecisionRecord {
            decision_id: Uuid::new_v4(),
            user_id,
            input_hash: "deadbeef".to_string(),
            simulation,
            budgeting: crate::models::AdvisorAssessment {
                recommendation: crate::models::Recommendation::Approve,
                confidence: 0.9,
                summary: "ok".to_string(),
            },
            investment: crate::models::AdvisorAssessment {
                recommendation: crate::models::Recommendation::Approve,
                confidence: 0.9,
                summary: "ok".to_string(),
            },
            guardrail: crate::models::GuardrailAssessment {
                violated: false,
                can_proceed: true,
                summary: "ok".to_string(),
            },
            outcome: DecisionOutcome {
                final_decision: FinalDecision::Proceed,
                consensus_level: ConsensusLevel::Unanimous,
                should_proceed: true,
                tally: DecisionTally {
                    approving: 2,
                    cautioning: 0,
                    opposing: 0,
                },
            },
            reasoning_trace: vec!["simulated".to_string()],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_round_trip_and_verify() {
        let log = DecisionLog::new();
        let user_id = Uuid::new_v4();
        let record = record_for(user_id);
        let decision_id = record.decision_id;

        log.record(record).await.unwrap();

        let fetched = log.get(decision_id).await.unwrap();
        assert_eq!(fetched.user_id, user_id);
        assert!(log.verify_integrity(decision_id).await.unwrap());
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_user_and_ordered() {
        let log = DecisionLog::new();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();

        let first = record_for(user_a);
        let second = record_for(user_a);
        let other = record_for(user_b);
        let first_id = first.decision_id;

        log.record(first).await.unwrap();
        log.record(second).await.unwrap();
        log.record(other).await.unwrap();

        let listed = log.list_for_user(user_a).await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].decision_id, first_id);
    }

    #[tokio::test]
    async fn missing_record_is_an_audit_error() {
        let log = DecisionLog::new();
        let err = log.verify_integrity(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AdvisorError::AuditError(_)));
    }

    #[test]
    fn input_hash_is_stable_and_input_sensitive() {
        let profile = sample_profile();
        let action = FinancialAction {
            kind: ActionKind::Save,
            amount: 100.0,
            goal_id: None,
            target_account: None,
            category: None,
        };

        let a = compute_input_hash(&profile, &action).unwrap();
        let b = compute_input_hash(&profile, &action).unwrap();
        assert_eq!(a, b);

        let mut different = action.clone();
        different.amount = 200.0;
        assert_ne!(a, compute_input_hash(&profile, &different).unwrap());
    }
}
