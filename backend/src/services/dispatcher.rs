//! Push delivery of rendered articles
//!
//! Every (recipient, document) pair runs through a small retry state machine
//! with a bounded attempt budget. Provider rate-limit hints are waited out
//! in full, up to a ceiling. A recipient who blocked the bot is dropped
//! for the rest of the run; any other failure only affects its own pair.

use std::sync::Arc;
use std::time::Duration;

use shared::{DeliveryOutcome, DeliveryReport, DeliveryState, RenderedDocument};
use uuid::Uuid;

use crate::config::DeliveryConfig;
use crate::external::{MessageTransport, SendError};
use crate::services::notifier::{truncate_chars, OperatorNotifier};

/// Retry and pacing knobs for a fan-out run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub max_message_chars: usize,
    pub send_delay: Duration,
    pub transient_retry_delay: Duration,
    /// Longest provider `retry_after` honored; a longer hint fails the pair
    pub max_rate_limit_wait: Duration,
    pub max_attempts: u32,
}

impl DeliveryPolicy {
    /// Same budget, no pacing or transient delay. Rate-limit hints are still
    /// honored up to the default ceiling.
    pub fn immediate(max_message_chars: usize, max_attempts: u32) -> Self {
        Self {
            max_message_chars,
            send_delay: Duration::ZERO,
            transient_retry_delay: Duration::ZERO,
            max_rate_limit_wait: Duration::from_secs(300),
            max_attempts,
        }
    }
}

impl From<&DeliveryConfig> for DeliveryPolicy {
    fn from(config: &DeliveryConfig) -> Self {
        Self {
            max_message_chars: config.max_message_chars,
            send_delay: Duration::from_millis(config.send_delay_ms),
            transient_retry_delay: Duration::from_millis(config.transient_retry_delay_ms),
            max_rate_limit_wait: Duration::from_secs(config.max_rate_limit_wait_secs),
            max_attempts: config.max_attempts.max(1),
        }
    }
}

/// Sends documents to recipients over a [`MessageTransport`]
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn MessageTransport>,
    policy: DeliveryPolicy,
    notifier: OperatorNotifier,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        policy: DeliveryPolicy,
        notifier: OperatorNotifier,
    ) -> Self {
        Self {
            transport,
            policy,
            notifier,
        }
    }

    /// Deliver `documents` in order to every recipient
    pub async fn dispatch(&self, documents: &[RenderedDocument], recipients: &[i64]) -> DeliveryReport {
        let run_id = Uuid::new_v4();
        let mut report = DeliveryReport {
            run_id: Some(run_id),
            ..Default::default()
        };

        tracing::info!(
            %run_id,
            documents = documents.len(),
            recipients = recipients.len(),
            "Starting delivery run"
        );

        for &chat_id in recipients {
            report.recipients_attempted += 1;

            for document in documents {
                let text = truncate_chars(&document.body_text, self.policy.max_message_chars);

                match self.deliver(chat_id, &text).await {
                    DeliveryOutcome::Sent { attempts } => {
                        report.record_sent();
                        tracing::info!(chat_id, scope = %document.scope_label, attempts, "Document sent");
                        if !self.policy.send_delay.is_zero() {
                            tokio::time::sleep(self.policy.send_delay).await;
                        }
                    }
                    DeliveryOutcome::Blocked { reason } => {
                        tracing::warn!(chat_id, "Recipient blocked the bot, skipping remaining documents");
                        report.record_skipped(chat_id, reason);
                        break;
                    }
                    DeliveryOutcome::Failed { reason, attempts } => {
                        let context = format!(
                            "Kézbesítés sikertelen: chat {} / {} ({} próbálkozás)",
                            chat_id, document.scope_label, attempts
                        );
                        self.notifier.notify_error(&context, &reason).await;
                        report.record_failure(chat_id, &document.scope_label, reason);
                    }
                }
            }
        }

        tracing::info!(
            %run_id,
            recipients = report.recipients_attempted,
            sent = report.documents_sent,
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Delivery run finished"
        );
        report
    }

    /// Drive one (recipient, document) pair to a terminal state
    async fn deliver(&self, chat_id: i64, text: &str) -> DeliveryOutcome {
        let mut state = DeliveryState::Pending;
        let mut attempts = 0u32;
        let mut last_error = String::new();

        loop {
            state = match state {
                DeliveryState::Pending => {
                    if attempts >= self.policy.max_attempts {
                        DeliveryState::Failed
                    } else {
                        attempts += 1;
                        match self.transport.send_text(chat_id, text).await {
                            Ok(()) => DeliveryState::Sent,
                            Err(SendError::RateLimited { retry_after }) => {
                                last_error = format!("rate limited ({}s)", retry_after.as_secs());
                                DeliveryState::RateLimited {
                                    retry_after_secs: retry_after.as_secs(),
                                }
                            }
                            Err(SendError::Transient(reason)) => {
                                last_error = reason;
                                DeliveryState::TransientFailure
                            }
                            Err(SendError::Blocked(reason)) => {
                                last_error = reason;
                                DeliveryState::PermanentlyBlocked
                            }
                            Err(SendError::Rejected(reason)) => {
                                last_error = reason;
                                return DeliveryOutcome::Failed {
                                    reason: last_error,
                                    attempts,
                                };
                            }
                        }
                    }
                }
                DeliveryState::RateLimited { retry_after_secs } => {
                    let wait = Duration::from_secs(retry_after_secs);
                    if wait > self.policy.max_rate_limit_wait {
                        return DeliveryOutcome::Failed {
                            reason: format!(
                                "rate limit wait of {}s exceeds the {}s ceiling",
                                retry_after_secs,
                                self.policy.max_rate_limit_wait.as_secs()
                            ),
                            attempts,
                        };
                    }
                    tracing::warn!(chat_id, wait_secs = retry_after_secs, attempts, "Rate limited, waiting");
                    sleep_unless_zero(wait).await;
                    DeliveryState::Pending
                }
                DeliveryState::TransientFailure => {
                    tracing::warn!(chat_id, attempts, error = %last_error, "Transient send failure, retrying");
                    sleep_unless_zero(self.policy.transient_retry_delay).await;
                    DeliveryState::Pending
                }
                DeliveryState::Sent => return DeliveryOutcome::Sent { attempts },
                DeliveryState::PermanentlyBlocked => {
                    return DeliveryOutcome::Blocked { reason: last_error }
                }
                DeliveryState::Failed => {
                    return DeliveryOutcome::Failed {
                        reason: format!("retry budget exhausted: {}", last_error),
                        attempts,
                    }
                }
            };
        }
    }
}

async fn sleep_unless_zero(wait: Duration) {
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }
}
