//! Push recipient targeting with lazy pause expiry

use chrono::{DateTime, Utc};
use shared::Recipient;

use crate::error::AppResult;
use crate::services::recipients::RecipientDirectory;

/// Decide whether `recipient` may receive pushes at `now`, clearing an
/// expired pause in the directory as part of the decision.
///
/// Recipients without a pause, or whose pause ended, are eligible. The
/// clear is only written when a stale timestamp is present, so evaluating an
/// already-cleared recipient writes nothing.
pub async fn evaluate_and_reconcile_pause(
    directory: &dyn RecipientDirectory,
    recipient: &Recipient,
    now: DateTime<Utc>,
) -> AppResult<bool> {
    if recipient.has_expired_pause(now) {
        directory.clear_pause(recipient.recipient_id).await?;
        tracing::info!(
            recipient_id = recipient.recipient_id,
            chat_id = recipient.chat_id,
            "Expired pause cleared"
        );
        return Ok(true);
    }

    Ok(recipient.is_eligible_at(now))
}

/// Chat ids that should receive the next fan-out.
///
/// An override chat short-circuits before the directory is touched.
pub async fn eligible_recipients(
    directory: &dyn RecipientDirectory,
    now: DateTime<Utc>,
    override_chat: Option<i64>,
) -> AppResult<Vec<i64>> {
    if let Some(chat_id) = override_chat {
        tracing::info!(chat_id, "Using override recipient, directory skipped");
        return Ok(vec![chat_id]);
    }

    let recipients = directory.list_all().await?;
    let mut eligible = Vec::with_capacity(recipients.len());

    for recipient in &recipients {
        if evaluate_and_reconcile_pause(directory, recipient, now).await? {
            eligible.push(recipient.chat_id);
        } else {
            tracing::debug!(chat_id = recipient.chat_id, "Recipient paused, skipped");
        }
    }

    tracing::info!(
        total = recipients.len(),
        eligible = eligible.len(),
        "Recipients evaluated"
    );
    Ok(eligible)
}
