//! Common types used across ForeAIcast

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl Coordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Supported languages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "hu")]
    Hungarian,
    #[serde(alias = "en")]
    English,
    #[serde(alias = "ru")]
    Russian,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Hungarian, Language::English, Language::Russian];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Hungarian => "hu",
            Language::English => "en",
            Language::Russian => "ru",
        }
    }

    /// Native name of the language, used in confirmations
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Hungarian => "magyar",
            Language::English => "English",
            Language::Russian => "русский",
        }
    }

    /// Parse a language or locale code ("en", "en-GB", "RU").
    ///
    /// Returns `None` for anything that is not one of the supported languages.
    pub fn from_code(code: &str) -> Option<Self> {
        let prefix: String = code.trim().chars().take(2).collect::<String>().to_lowercase();
        match prefix.as_str() {
            "hu" => Some(Language::Hungarian),
            "en" => Some(Language::English),
            "ru" => Some(Language::Russian),
            _ => None,
        }
    }

    /// Like [`Language::from_code`] but falls back to Hungarian
    pub fn normalize(code: Option<&str>) -> Self {
        code.and_then(Self::from_code).unwrap_or_default()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The day a forecast targets, relative to the request date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetDay {
    Today,
    #[default]
    Tomorrow,
}

impl TargetDay {
    /// Index into a provider's daily series
    pub fn offset(&self) -> usize {
        match self {
            TargetDay::Today => 0,
            TargetDay::Tomorrow => 1,
        }
    }

    pub fn date_from(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.offset() as i64)
    }

    /// Recognize a day keyword in any supported language
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.trim().to_lowercase().as_str() {
            "ma" | "today" | "сегодня" => Some(TargetDay::Today),
            "holnap" | "tomorrow" | "завтра" => Some(TargetDay::Tomorrow),
            _ => None,
        }
    }

    pub fn label(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (TargetDay::Today, Language::Hungarian) => "ma",
            (TargetDay::Tomorrow, Language::Hungarian) => "holnap",
            (TargetDay::Today, Language::English) => "today",
            (TargetDay::Tomorrow, Language::English) => "tomorrow",
            (TargetDay::Today, Language::Russian) => "сегодня",
            (TargetDay::Tomorrow, Language::Russian) => "завтра",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_locale_code() {
        assert_eq!(Language::from_code("en-GB"), Some(Language::English));
        assert_eq!(Language::from_code("RU"), Some(Language::Russian));
        assert_eq!(Language::from_code("de"), None);
        assert_eq!(Language::normalize(None), Language::Hungarian);
        assert_eq!(Language::normalize(Some("fr")), Language::Hungarian);
    }

    #[test]
    fn test_target_day_keywords() {
        assert_eq!(TargetDay::from_keyword("MA"), Some(TargetDay::Today));
        assert_eq!(TargetDay::from_keyword("завтра"), Some(TargetDay::Tomorrow));
        assert_eq!(TargetDay::from_keyword("yesterday"), None);
    }

    #[test]
    fn test_target_day_date() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(TargetDay::Today.date_from(today), today);
        assert_eq!(
            TargetDay::Tomorrow.date_from(today),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
    }
}
