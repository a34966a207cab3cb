use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{AdminToken, Attendance, GuestId, RsvpId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredGuest {
    pub guest_id: GuestId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct StoredRsvp {
    pub rsvp_id: RsvpId,
    pub guest_name: String,
    pub attendance: Attendance,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOverview {
    pub name: String,
    pub rows: i64,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Inserts a guest, or returns the existing id for an identical name.
    pub async fn create_guest(&self, name: &str) -> Result<GuestId> {
        let rec = sqlx::query(
            "INSERT INTO guests (name) VALUES (?)
             ON CONFLICT(name) DO UPDATE SET name=excluded.name
             RETURNING id",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(GuestId(rec.get::<i64, _>(0)))
    }

    pub async fn guest_name(&self, guest_id: GuestId) -> Result<Option<String>> {
        let row = sqlx::query("SELECT name FROM guests WHERE id = ?")
            .bind(guest_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn list_guests(&self) -> Result<Vec<StoredGuest>> {
        let rows = sqlx::query("SELECT id, name FROM guests ORDER BY lower(name) ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| StoredGuest {
                guest_id: GuestId(r.get::<i64, _>(0)),
                name: r.get::<String, _>(1),
            })
            .collect())
    }

    /// Returns whether a row was removed.
    pub async fn delete_guest(&self, guest_id: GuestId) -> Result<bool> {
        let removed = sqlx::query("DELETE FROM guests WHERE id = ?")
            .bind(guest_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(removed > 0)
    }

    pub async fn insert_rsvp(
        &self,
        guest_name: &str,
        attendance: Attendance,
        message: &str,
        created_at: DateTime<Utc>,
    ) -> Result<RsvpId> {
        let rec = sqlx::query(
            "INSERT INTO rsvps (guest_name, attendance, message, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(guest_name)
        .bind(attendance.as_str())
        .bind(message)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(RsvpId(rec.get::<i64, _>(0)))
    }

    /// Newest first.
    pub async fn list_rsvps(&self, limit: u32, before: Option<i64>) -> Result<Vec<StoredRsvp>> {
        let rows = if let Some(before_id) = before {
            sqlx::query(
                "SELECT id, guest_name, attendance, message, created_at
                 FROM rsvps
                 WHERE id < ?
                 ORDER BY id DESC
                 LIMIT ?",
            )
            .bind(before_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                "SELECT id, guest_name, attendance, message, created_at
                 FROM rsvps
                 ORDER BY id DESC
                 LIMIT ?",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        rows.into_iter()
            .map(|r| {
                let attendance = r
                    .get::<String, _>(2)
                    .parse::<Attendance>()
                    .map_err(anyhow::Error::msg)?;
                Ok(StoredRsvp {
                    rsvp_id: RsvpId(r.get::<i64, _>(0)),
                    guest_name: r.get::<String, _>(1),
                    attendance,
                    message: r.get::<String, _>(3),
                    created_at: r.get::<DateTime<Utc>, _>(4),
                })
            })
            .collect()
    }

    pub async fn rsvp_summary(&self) -> Result<shared::protocol::RsvpSummary> {
        let rows = sqlx::query("SELECT attendance, COUNT(*) FROM rsvps GROUP BY attendance")
            .fetch_all(&self.pool)
            .await?;

        let mut summary = shared::protocol::RsvpSummary::default();
        for row in rows {
            let count = row.get::<i64, _>(1).max(0) as u64;
            match row.get::<String, _>(0).parse::<Attendance>() {
                Ok(Attendance::Attending) => summary.attending = count,
                Ok(Attendance::NotAttending) => summary.not_attending = count,
                Ok(Attendance::Undecided) => summary.undecided = count,
                Err(_) => {}
            }
        }
        Ok(summary)
    }

    pub async fn create_admin_session(&self, ttl: Duration) -> Result<AdminToken> {
        let token = AdminToken::generate();
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .context("admin session ttl out of range")?;
        sqlx::query("INSERT INTO admin_sessions (token, created_at, expires_at) VALUES (?, ?, ?)")
            .bind(token.to_string())
            .bind(now.timestamp())
            .bind(expires_at.timestamp())
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    pub async fn admin_session_valid(&self, token: AdminToken) -> Result<bool> {
        let row = sqlx::query("SELECT expires_at FROM admin_sessions WHERE token = ?")
            .bind(token.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some_and(|r| r.get::<i64, _>(0) > Utc::now().timestamp()))
    }

    pub async fn delete_admin_session(&self, token: AdminToken) -> Result<()> {
        sqlx::query("DELETE FROM admin_sessions WHERE token = ?")
            .bind(token.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn purge_expired_admin_sessions(&self) -> Result<u64> {
        let purged = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= ?")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(purged)
    }

    /// User tables with their row counts, sorted by name.
    pub async fn table_overview(&self) -> Result<Vec<TableOverview>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx%'
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut tables = Vec::with_capacity(names.len());
        for name in names {
            let quoted = name.replace('"', "\"\"");
            let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{quoted}\""))
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("failed to count rows in '{name}'"))?;
            tables.push(TableOverview { name, rows });
        }
        Ok(tables)
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
