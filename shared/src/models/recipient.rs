//! Push notification recipients

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Language;

/// Pause lengths a user may pick, in hours
pub const ALLOWED_PAUSE_HOURS: [i64; 4] = [24, 48, 72, 96];
pub const DEFAULT_PAUSE_HOURS: i64 = 48;

/// A chat user subscribed to daily pushes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipient {
    pub recipient_id: i64,
    pub chat_id: i64,
    pub display_name: Option<String>,
    pub username: Option<String>,
    /// Language reported by the chat client
    pub interface_language: Option<String>,
    /// Language the user explicitly chose
    pub preferred_language: Option<Language>,
    pub paused_until: Option<DateTime<Utc>>,
}

impl Recipient {
    pub fn new(recipient_id: i64, chat_id: i64) -> Self {
        Self {
            recipient_id,
            chat_id,
            display_name: None,
            username: None,
            interface_language: None,
            preferred_language: None,
            paused_until: None,
        }
    }

    /// Paused and the window has not ended yet
    pub fn is_paused_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.paused_until, Some(until) if until >= now)
    }

    /// Carries a pause timestamp that lies in the past
    pub fn has_expired_pause(&self, now: DateTime<Utc>) -> bool {
        matches!(self.paused_until, Some(until) if until < now)
    }

    /// Eligible when never paused or the pause has ended
    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_paused_at(now)
    }
}

/// Fields written by a registration or profile update
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipientUpdate {
    pub chat_id: i64,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub interface_language: Option<String>,
}

/// Map a requested pause length onto an allowed one
pub fn normalize_pause_hours(requested: Option<i64>) -> i64 {
    match requested {
        Some(hours) if ALLOWED_PAUSE_HOURS.contains(&hours) => hours,
        _ => DEFAULT_PAUSE_HOURS,
    }
}

pub fn pause_end(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now + Duration::hours(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_predicates() {
        let now = Utc::now();
        let mut r = Recipient::new(1, 1);
        assert!(r.is_eligible_at(now));
        assert!(!r.has_expired_pause(now));

        r.paused_until = Some(now + Duration::hours(1));
        assert!(!r.is_eligible_at(now));

        r.paused_until = Some(now - Duration::seconds(1));
        assert!(r.is_eligible_at(now));
        assert!(r.has_expired_pause(now));
    }

    #[test]
    fn test_pause_hours_normalized() {
        assert_eq!(normalize_pause_hours(Some(72)), 72);
        assert_eq!(normalize_pause_hours(Some(5)), 48);
        assert_eq!(normalize_pause_hours(None), 48);
    }
}
