//! Operator alert channel
//!
//! Errors from batch runs and interactive paths are forwarded to a single
//! operator chat. Sending an alert never fails the caller.

use std::fmt::Display;
use std::sync::Arc;

use crate::external::MessageTransport;

/// Longest alert text forwarded to the operator chat
pub const MAX_ALERT_CHARS: usize = 4000;

/// Forwards errors to the operator chat, or only logs when none is configured
#[derive(Clone)]
pub struct OperatorNotifier {
    transport: Option<Arc<dyn MessageTransport>>,
    alert_chat_id: Option<i64>,
}

impl OperatorNotifier {
    pub fn new(transport: Arc<dyn MessageTransport>, alert_chat_id: Option<i64>) -> Self {
        Self {
            transport: Some(transport),
            alert_chat_id,
        }
    }

    /// Log-only notifier
    pub fn disabled() -> Self {
        Self {
            transport: None,
            alert_chat_id: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some() && self.alert_chat_id.is_some()
    }

    /// Report an error to the operator
    pub async fn notify_error(&self, context: &str, error: &(dyn Display + Sync)) {
        tracing::error!(context = %context, "{}", error);
        self.send(format_alert(context, error)).await;
    }

    /// Report a monitoring warning (for example a degraded source)
    pub async fn notify_warning(&self, context: &str, message: &(dyn Display + Sync)) {
        tracing::warn!(context = %context, "{}", message);
        self.send(format_alert(context, message)).await;
    }

    async fn send(&self, text: String) {
        let (Some(transport), Some(chat_id)) = (&self.transport, self.alert_chat_id) else {
            tracing::debug!("Operator alert chat not configured, alert only logged");
            return;
        };

        if let Err(e) = transport.send_text(chat_id, &text).await {
            tracing::error!(chat_id, "Failed to deliver operator alert: {}", e);
        }
    }
}

/// `🟥 Hiba: {context}\n\n{error}`, cut to [`MAX_ALERT_CHARS`] characters
pub fn format_alert(context: &str, error: &(dyn Display + Sync)) -> String {
    let text = format!("🟥 Hiba: {}\n\n{}", context, error);
    truncate_chars(&text, MAX_ALERT_CHARS)
}

/// Truncate on a character boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_alert() {
        let text = format_alert("build_articles / Zala", &"timeout");
        assert_eq!(text, "🟥 Hiba: build_articles / Zala\n\ntimeout");
    }

    #[test]
    fn test_alert_is_truncated_by_chars() {
        let long = "é".repeat(5000);
        let text = format_alert("x", &long);
        assert_eq!(text.chars().count(), MAX_ALERT_CHARS);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("árvíztűrő", 3), "árv");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_disabled_notifier_does_not_panic() {
        let notifier = OperatorNotifier::disabled();
        assert!(!notifier.is_enabled());
        notifier.notify_error("test", &"boom").await;
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_notify_futures_are_send() {
        let notifier = OperatorNotifier::disabled();
        let error = String::from("boom");
        assert_send(&notifier.notify_error("ctx", &error));
        assert_send(&notifier.notify_warning("ctx", &error));
    }
}
