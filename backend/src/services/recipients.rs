//! Recipient directory over the `telegram_users` table

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Language, Recipient, RecipientUpdate};
use sqlx::{FromRow, PgPool};

use crate::error::AppResult;

/// Persistence of chat recipients and their preferences
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn list_all(&self) -> AppResult<Vec<Recipient>>;

    /// Chat ids with no active pause at `now`. Pure read, expired pauses are
    /// left in place; see `services::targeting` for the clearing variant.
    async fn list_eligible(&self, now: DateTime<Utc>) -> AppResult<Vec<i64>>;

    async fn get(&self, recipient_id: i64) -> AppResult<Option<Recipient>>;

    /// Insert or refresh a recipient; an existing display name is kept when
    /// the update carries none
    async fn upsert(&self, recipient_id: i64, update: RecipientUpdate) -> AppResult<()>;

    async fn set_preferred_language(&self, recipient_id: i64, lang: Language) -> AppResult<()>;

    async fn set_pause(&self, recipient_id: i64, until: DateTime<Utc>) -> AppResult<()>;

    async fn clear_pause(&self, recipient_id: i64) -> AppResult<()>;

    async fn delete(&self, recipient_id: i64) -> AppResult<()>;
}

/// PostgreSQL implementation
#[derive(Clone)]
pub struct PgRecipientDirectory {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct RecipientRow {
    user_id: i64,
    chat_id: i64,
    username: Option<String>,
    name: Option<String>,
    lang: Option<String>,
    preferred_lang: Option<String>,
    paused_until: Option<DateTime<Utc>>,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Recipient {
            recipient_id: row.user_id,
            chat_id: row.chat_id,
            display_name: row.name,
            username: row.username,
            interface_language: row.lang,
            preferred_language: row.preferred_lang.as_deref().and_then(Language::from_code),
            paused_until: row.paused_until,
        }
    }
}

impl PgRecipientDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecipientDirectory for PgRecipientDirectory {
    async fn list_all(&self) -> AppResult<Vec<Recipient>> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT user_id, chat_id, username, name, lang, preferred_lang, paused_until
            FROM telegram_users
            ORDER BY created_at, user_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn list_eligible(&self, now: DateTime<Utc>) -> AppResult<Vec<i64>> {
        let chat_ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT chat_id
            FROM telegram_users
            WHERE paused_until IS NULL OR paused_until < $1
            ORDER BY created_at, user_id
            "#,
        )
        .bind(now)
        .fetch_all(&self.db)
        .await?;

        Ok(chat_ids)
    }

    async fn get(&self, recipient_id: i64) -> AppResult<Option<Recipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT user_id, chat_id, username, name, lang, preferred_lang, paused_until
            FROM telegram_users
            WHERE user_id = $1
            "#,
        )
        .bind(recipient_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Recipient::from))
    }

    async fn upsert(&self, recipient_id: i64, update: RecipientUpdate) -> AppResult<()> {
        let lang = Language::normalize(update.interface_language.as_deref());

        sqlx::query(
            r#"
            INSERT INTO telegram_users (user_id, chat_id, name, username, lang, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET chat_id = EXCLUDED.chat_id,
                name = COALESCE(EXCLUDED.name, telegram_users.name),
                username = EXCLUDED.username,
                lang = EXCLUDED.lang,
                updated_at = NOW()
            "#,
        )
        .bind(recipient_id)
        .bind(update.chat_id)
        .bind(update.display_name)
        .bind(update.username)
        .bind(lang.code())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn set_preferred_language(&self, recipient_id: i64, lang: Language) -> AppResult<()> {
        sqlx::query(
            "UPDATE telegram_users SET preferred_lang = $1, updated_at = NOW() WHERE user_id = $2",
        )
        .bind(lang.code())
        .bind(recipient_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn set_pause(&self, recipient_id: i64, until: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE telegram_users SET paused_until = $1, updated_at = NOW() WHERE user_id = $2",
        )
        .bind(until)
        .bind(recipient_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn clear_pause(&self, recipient_id: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE telegram_users SET paused_until = NULL, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(recipient_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn delete(&self, recipient_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM telegram_users WHERE user_id = $1")
            .bind(recipient_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
