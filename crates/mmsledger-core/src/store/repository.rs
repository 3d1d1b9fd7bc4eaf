//! SQLite-backed message store.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mmsledger_pdu::{MessageType, RetrieveConf};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

use super::RecordStore;
use super::model::{
    DownloadState, Locator, MessageBox, NewNotification, NotificationRecord, StoredMessage,
    StoredPart,
};
use crate::{Error, Result};

/// Message store on SQLite: threads, PDU rows and their parts.
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new repository with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS threads (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                address TEXT NOT NULL UNIQUE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS pdu (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id INTEGER,
                msg_box INTEGER NOT NULL,
                m_type INTEGER NOT NULL,
                m_id TEXT,
                tr_id TEXT,
                ct_l TEXT,
                ct_t TEXT,
                from_address TEXT,
                recipients TEXT NOT NULL DEFAULT '[]',
                sub TEXT,
                m_cls TEXT,
                m_size INTEGER,
                st INTEGER,
                locked INTEGER NOT NULL DEFAULT 0,
                date TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS part (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mid INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                ct TEXT NOT NULL,
                chset INTEGER NOT NULL DEFAULT 0,
                name TEXT,
                cid TEXT,
                cl TEXT,
                data BLOB NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Duplicate detection looks messages up by Message-ID
        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_pdu_message_id ON pdu(m_id, m_type)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_pdu_thread ON pdu(thread_id, date)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_part_mid ON part(mid)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// File a notification into the inbox with an unstarted download.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn insert_notification(&self, notification: &NewNotification) -> Result<Locator> {
        let mut tx = self.pool.begin().await?;
        let thread_id =
            thread_for(&mut *tx, notification.from.as_deref().unwrap_or_default()).await?;

        let result = sqlx::query(
            r"
            INSERT INTO pdu
                (thread_id, msg_box, m_type, tr_id, ct_l, from_address, sub, m_size, st, locked, date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(thread_id)
        .bind(MessageBox::Inbox.code())
        .bind(i64::from(MessageType::NotificationInd.code()))
        .bind(&notification.transaction_id)
        .bind(&notification.content_location)
        .bind(&notification.from)
        .bind(&notification.subject)
        .bind(i64::try_from(notification.message_size).unwrap_or(i64::MAX))
        .bind(DownloadState::Unstarted.code())
        .bind(notification.locked)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Locator(result.last_insert_rowid()))
    }

    /// Load a persisted message with its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn load_message(&self, locator: Locator) -> Result<Option<StoredMessage>> {
        let row = sqlx::query(
            r"
            SELECT id, thread_id, msg_box, m_type, m_id, tr_id, ct_l, from_address,
                   recipients, sub, locked, date
            FROM pdu
            WHERE id = ?
            ",
        )
        .bind(locator.id())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let parts = sqlx::query(
            r"
            SELECT seq, ct, chset, name, cid, cl, data
            FROM part
            WHERE mid = ?
            ORDER BY seq
            ",
        )
        .bind(locator.id())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(part_from_row)
        .collect();

        let recipients: String = row.get("recipients");
        let date: String = row.get("date");
        let message_type: i64 = row.get("m_type");

        Ok(Some(StoredMessage {
            locator: Locator(row.get("id")),
            thread_id: row.get("thread_id"),
            message_box: MessageBox::from_code(row.get("msg_box")),
            message_type: u8::try_from(message_type).unwrap_or_default(),
            message_id: row.get("m_id"),
            transaction_id: row.get("tr_id"),
            content_location: row.get("ct_l"),
            from: row.get("from_address"),
            to: serde_json::from_str(&recipients)?,
            subject: row.get("sub"),
            locked: row.get("locked"),
            date: DateTime::parse_from_rfc3339(&date)
                .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc)),
            parts,
        }))
    }

    /// Count the rows filed in a thread, notifications included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_in_thread(&self, thread_id: i64) -> Result<i64> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) as count FROM pdu WHERE thread_id = ?
            ",
        )
        .bind(thread_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("count"))
    }

    /// Pin or unpin a record against auto-deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_locked(&self, locator: Locator, locked: bool) -> Result<()> {
        sqlx::query(
            r"
            UPDATE pdu SET locked = ? WHERE id = ?
            ",
        )
        .bind(locked)
        .bind(locator.id())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Find or create the thread for a peer address.
async fn thread_for(conn: &mut SqliteConnection, address: &str) -> Result<i64> {
    sqlx::query(
        r"
        INSERT INTO threads (address) VALUES (?)
        ON CONFLICT(address) DO NOTHING
        ",
    )
    .bind(address)
    .execute(&mut *conn)
    .await?;

    let row = sqlx::query(
        r"
        SELECT id FROM threads WHERE address = ?
        ",
    )
    .bind(address)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.get("id"))
}

fn part_from_row(row: &SqliteRow) -> StoredPart {
    let charset: i64 = row.get("chset");
    StoredPart {
        seq: row.get("seq"),
        content_type: row.get("ct"),
        charset: u32::try_from(charset).unwrap_or_default(),
        name: row.get("name"),
        content_id: row.get("cid"),
        content_location: row.get("cl"),
        data: row.get("data"),
    }
}

fn message_date(conf: &RetrieveConf) -> DateTime<Utc> {
    conf.date
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now)
}

#[async_trait]
impl RecordStore for MessageRepository {
    async fn load_notification(&self, locator: Locator) -> Result<Option<NotificationRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, ct_l, locked, st
            FROM pdu
            WHERE id = ? AND m_type = ?
            ",
        )
        .bind(locator.id())
        .bind(i64::from(MessageType::NotificationInd.code()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let state: Option<i64> = row.get("st");
            NotificationRecord {
                locator: Locator(row.get("id")),
                content_location: row.get("ct_l"),
                locked: row.get("locked"),
                download_state: state.map_or_else(DownloadState::default, DownloadState::from_code),
            }
        }))
    }

    async fn set_download_state(&self, locator: Locator, state: DownloadState) -> Result<()> {
        sqlx::query(
            r"
            UPDATE pdu SET st = ? WHERE id = ?
            ",
        )
        .bind(state.code())
        .bind(locator.id())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_message(
        &self,
        message_id: &str,
        message_type: MessageType,
    ) -> Result<Option<Locator>> {
        let row = sqlx::query(
            r"
            SELECT id FROM pdu
            WHERE m_id = ? AND m_type = ?
            LIMIT 1
            ",
        )
        .bind(message_id)
        .bind(i64::from(message_type.code()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Locator(row.get("id"))))
    }

    async fn persist(&self, conf: &RetrieveConf, message_box: MessageBox) -> Result<Locator> {
        let from = conf.from.as_ref().map(mmsledger_pdu::EncodedStringValue::to_string_lossy);
        let recipients: Vec<String> = conf
            .to
            .iter()
            .map(mmsledger_pdu::EncodedStringValue::to_string_lossy)
            .collect();

        let mut tx = self.pool.begin().await?;
        let thread_id = thread_for(&mut *tx, from.as_deref().unwrap_or_default()).await?;

        let result = sqlx::query(
            r"
            INSERT INTO pdu
                (thread_id, msg_box, m_type, m_id, tr_id, ct_t, from_address, recipients,
                 sub, m_cls, locked, date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
            ",
        )
        .bind(thread_id)
        .bind(message_box.code())
        .bind(i64::from(MessageType::RetrieveConf.code()))
        .bind(
            conf.message_id
                .as_deref()
                .map(|id| String::from_utf8_lossy(id).into_owned()),
        )
        .bind(
            conf.transaction_id
                .as_deref()
                .map(|id| String::from_utf8_lossy(id).into_owned()),
        )
        .bind(conf.content_type.to_string())
        .bind(&from)
        .bind(serde_json::to_string(&recipients)?)
        .bind(conf.subject.as_ref().map(mmsledger_pdu::EncodedStringValue::to_string_lossy))
        .bind(&conf.message_class)
        .bind(message_date(conf).to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        if id <= 0 {
            return Err(Error::Persist("no row id for persisted message".to_string()));
        }

        for (seq, part) in (0_i64..).zip(conf.body.parts()) {
            sqlx::query(
                r"
                INSERT INTO part (mid, seq, ct, chset, name, cid, cl, data)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(id)
            .bind(seq)
            .bind(&part.content_type)
            .bind(part.charset)
            .bind(&part.name)
            .bind(&part.content_id)
            .bind(&part.content_location)
            .bind(&part.data)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(id, parts = conf.body.len(), "Persisted message");
        Ok(Locator(id))
    }

    async fn update_location(
        &self,
        locator: Locator,
        content_location: &str,
        locked: bool,
    ) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE pdu SET ct_l = ?, locked = ? WHERE id = ?
            ",
        )
        .bind(content_location)
        .bind(locked)
        .bind(locator.id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::Persist(format!("{locator} does not exist")));
        }
        Ok(())
    }

    async fn delete(&self, locator: Locator) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            DELETE FROM part WHERE mid = ?
            ",
        )
        .bind(locator.id())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r"
            DELETE FROM pdu WHERE id = ?
            ",
        )
        .bind(locator.id())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }

    async fn thread_of(&self, locator: Locator) -> Result<Option<i64>> {
        let row = sqlx::query(
            r"
            SELECT thread_id FROM pdu WHERE id = ?
            ",
        )
        .bind(locator.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|row| row.get("thread_id")))
    }

    async fn unlocked_messages_in_thread(&self, thread_id: i64) -> Result<Vec<Locator>> {
        let rows = sqlx::query(
            r"
            SELECT id FROM pdu
            WHERE thread_id = ? AND locked = 0 AND m_type = ?
            ORDER BY date ASC, id ASC
            ",
        )
        .bind(thread_id)
        .bind(i64::from(MessageType::RetrieveConf.code()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| Locator(row.get("id"))).collect())
    }

    async fn pending_notifications(&self) -> Result<Vec<Locator>> {
        let rows = sqlx::query(
            r"
            SELECT id FROM pdu
            WHERE m_type = ? AND (st IS NULL OR st IN (?, ?))
            ORDER BY date ASC, id ASC
            ",
        )
        .bind(i64::from(MessageType::NotificationInd.code()))
        .bind(DownloadState::Unstarted.code())
        .bind(DownloadState::TransientFailure.code())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| Locator(row.get("id"))).collect())
    }
}
