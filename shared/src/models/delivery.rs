//! Delivery state machine types and run report

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of one (recipient, document) delivery attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Pending,
    Sent,
    RateLimited { retry_after_secs: u64 },
    TransientFailure,
    PermanentlyBlocked,
    Failed,
}

impl DeliveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeliveryState::Sent | DeliveryState::PermanentlyBlocked | DeliveryState::Failed
        )
    }
}

/// Terminal result of one (recipient, document) delivery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeliveryOutcome {
    Sent { attempts: u32 },
    Blocked { reason: String },
    Failed { reason: String, attempts: u32 },
}

/// A recipient left out of the rest of the run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedRecipient {
    pub chat_id: i64,
    pub reason: String,
}

/// A single document that could not be delivered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub chat_id: i64,
    pub scope_label: String,
    pub reason: String,
}

/// Summary of a fan-out run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeliveryReport {
    pub run_id: Option<Uuid>,
    pub recipients_attempted: usize,
    pub documents_sent: usize,
    pub skipped: Vec<SkippedRecipient>,
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    pub fn blocked_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn record_sent(&mut self) {
        self.documents_sent += 1;
    }

    pub fn record_skipped(&mut self, chat_id: i64, reason: impl Into<String>) {
        self.skipped.push(SkippedRecipient {
            chat_id,
            reason: reason.into(),
        });
    }

    pub fn record_failure(&mut self, chat_id: i64, scope_label: &str, reason: impl Into<String>) {
        self.failures.push(DeliveryFailure {
            chat_id,
            scope_label: scope_label.to_string(),
            reason: reason.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(DeliveryState::Sent.is_terminal());
        assert!(DeliveryState::PermanentlyBlocked.is_terminal());
        assert!(!DeliveryState::RateLimited { retry_after_secs: 3 }.is_terminal());
        assert!(!DeliveryState::Pending.is_terminal());
    }

    #[test]
    fn test_report_keeps_skips_and_failures_apart() {
        let mut report = DeliveryReport::default();
        report.record_sent();
        report.record_skipped(7, "blocked");
        report.record_failure(8, "Zala", "rejected");

        assert_eq!(report.documents_sent, 1);
        assert_eq!(report.blocked_count(), 1);
        assert_eq!(report.failures[0].scope_label, "Zala");
    }
}
