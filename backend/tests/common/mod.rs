//! In-memory fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foreaicast_backend::error::AppResult;
use foreaicast_backend::external::{ForecastSource, MessageTransport, SendError, SourceError};
use foreaicast_backend::services::{PlaceDirectory, RecipientDirectory};
use rust_decimal::Decimal;
use shared::{
    Coordinates, CountyGroup, Language, Place, RawForecast, Recipient, RecipientUpdate, TargetDay,
};

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn raw(tmax: &str, tmin: &str, precip: &str) -> RawForecast {
    RawForecast::new(dec(tmax), dec(tmin), dec(precip))
}

pub fn place(name: &str, county: &str, lat: i64, seat: bool) -> Place {
    Place {
        display_name: name.to_string(),
        country: "Hungary".to_string(),
        region_name: Some(county.to_string()),
        coordinates: Coordinates::new(Decimal::from(lat), Decimal::from(19)),
        country_code: "HU".to_string(),
        is_primary_seat: seat,
        population: Some(50_000),
    }
}

// ============================================================================
// Forecast source
// ============================================================================

/// Answers per latitude, with a fallback for unknown coordinates
pub struct FakeSource {
    name: String,
    by_latitude: HashMap<Decimal, Result<RawForecast, SourceError>>,
    fallback: Result<RawForecast, SourceError>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn always(name: &str, result: Result<RawForecast, SourceError>) -> Self {
        Self {
            name: name.to_string(),
            by_latitude: HashMap::new(),
            fallback: result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, lat: i64, result: Result<RawForecast, SourceError>) -> Self {
        self.by_latitude.insert(Decimal::from(lat), result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ForecastSource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_daily(
        &self,
        coords: Coordinates,
        _day: TargetDay,
    ) -> Result<RawForecast, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.by_latitude
            .get(&coords.latitude)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

// ============================================================================
// Place directory
// ============================================================================

#[derive(Default)]
pub struct InMemoryPlaces {
    pub places: Vec<Place>,
    pub languages: HashMap<String, Language>,
}

impl InMemoryPlaces {
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            places,
            languages: HashMap::from([("HU".to_string(), Language::Hungarian)]),
        }
    }
}

#[async_trait]
impl PlaceDirectory for InMemoryPlaces {
    async fn resolve(&self, query: &str, default_country: &str) -> AppResult<Option<Place>> {
        let query = query.trim().to_lowercase();
        let candidates: Vec<Place> = self
            .places
            .iter()
            .filter(|p| p.display_name.to_lowercase().starts_with(&query))
            .cloned()
            .collect();
        Ok(shared::best_place_match(candidates, default_country))
    }

    async fn cities_by_county(
        &self,
        _country_code: &str,
        _min_population: i64,
    ) -> AppResult<Vec<CountyGroup>> {
        Ok(foreaicast_backend::services::places::group_by_county(
            self.places.iter().cloned(),
        ))
    }

    async fn country_default_language(&self, iso2: &str) -> AppResult<Option<Language>> {
        Ok(self.languages.get(iso2).copied())
    }
}

// ============================================================================
// Recipient directory
// ============================================================================

#[derive(Default)]
pub struct InMemoryRecipients {
    pub recipients: Mutex<Vec<Recipient>>,
    pub clear_calls: AtomicUsize,
    pub reads: AtomicUsize,
}

impl InMemoryRecipients {
    pub fn with(recipients: Vec<Recipient>) -> Self {
        Self {
            recipients: Mutex::new(recipients),
            ..Default::default()
        }
    }

    pub fn snapshot(&self, recipient_id: i64) -> Option<Recipient> {
        self.recipients
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.recipient_id == recipient_id)
            .cloned()
    }

    fn modify(&self, recipient_id: i64, f: impl FnOnce(&mut Recipient)) {
        if let Some(r) = self
            .recipients
            .lock()
            .unwrap()
            .iter_mut()
            .find(|r| r.recipient_id == recipient_id)
        {
            f(r);
        }
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryRecipients {
    async fn list_all(&self) -> AppResult<Vec<Recipient>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.recipients.lock().unwrap().clone())
    }

    async fn list_eligible(&self, now: DateTime<Utc>) -> AppResult<Vec<i64>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .recipients
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_eligible_at(now))
            .map(|r| r.chat_id)
            .collect())
    }

    async fn get(&self, recipient_id: i64) -> AppResult<Option<Recipient>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot(recipient_id))
    }

    async fn upsert(&self, recipient_id: i64, update: RecipientUpdate) -> AppResult<()> {
        let mut recipients = self.recipients.lock().unwrap();
        match recipients.iter_mut().find(|r| r.recipient_id == recipient_id) {
            Some(r) => {
                r.chat_id = update.chat_id;
                r.username = update.username;
                r.interface_language = update.interface_language;
                if update.display_name.is_some() {
                    r.display_name = update.display_name;
                }
            }
            None => {
                let mut r = Recipient::new(recipient_id, update.chat_id);
                r.username = update.username;
                r.display_name = update.display_name;
                r.interface_language = update.interface_language;
                recipients.push(r);
            }
        }
        Ok(())
    }

    async fn set_preferred_language(&self, recipient_id: i64, lang: Language) -> AppResult<()> {
        self.modify(recipient_id, |r| r.preferred_language = Some(lang));
        Ok(())
    }

    async fn set_pause(&self, recipient_id: i64, until: DateTime<Utc>) -> AppResult<()> {
        self.modify(recipient_id, |r| r.paused_until = Some(until));
        Ok(())
    }

    async fn clear_pause(&self, recipient_id: i64) -> AppResult<()> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        self.modify(recipient_id, |r| r.paused_until = None);
        Ok(())
    }

    async fn delete(&self, recipient_id: i64) -> AppResult<()> {
        self.recipients
            .lock()
            .unwrap()
            .retain(|r| r.recipient_id != recipient_id);
        Ok(())
    }
}

// ============================================================================
// Message transport
// ============================================================================

/// Records sent texts; scripted failures are consumed per chat in order
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(i64, String)>>,
    pub script: Mutex<HashMap<i64, Vec<SendError>>>,
    /// Chats that always answer "blocked"
    pub blocked: Vec<i64>,
    pub attempts: AtomicUsize,
}

impl RecordingTransport {
    pub fn blocking(chats: Vec<i64>) -> Self {
        Self {
            blocked: chats,
            ..Default::default()
        }
    }

    pub fn fail_next(&self, chat_id: i64, errors: Vec<SendError>) {
        self.script.lock().unwrap().insert(chat_id, errors);
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.blocked.contains(&chat_id) {
            return Err(SendError::Blocked("Forbidden: bot was blocked by the user".to_string()));
        }

        if let Some(queue) = self.script.lock().unwrap().get_mut(&chat_id) {
            if !queue.is_empty() {
                return Err(queue.remove(0));
            }
        }

        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}
