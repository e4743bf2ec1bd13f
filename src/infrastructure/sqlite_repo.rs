use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};

use crate::domain::{
    keyword::{Keyword, KeywordId},
    repository::{KeywordRepository, TodoRepository},
    todo::{CreateTodo, Todo, TodoFilter, TodoId},
};

/// SQLite-backed store for todos and news keywords.
///
/// File databases run in WAL mode so readers never block the single writer.
/// Cloning shares the pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid database url {database_url}"))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        let options = if in_memory { options } else { options.journal_mode(SqliteJournalMode::Wal) };

        // Every connection to `sqlite::memory:` opens its own database, so keep exactly one alive.
        let pool_options = if in_memory {
            SqlitePoolOptions::new().max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool: Arc::new(pool) })
    }

    /// Creates both tables.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                target_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS news_keywords (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                keyword TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl TodoRepository for SqliteStore {
    async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let now = Utc::now();
        let result = sqlx::query("INSERT INTO todos (text, target_date, created_at) VALUES (?1, ?2, ?3)")
            .bind(&input.text)
            .bind(format_date(input.target_date))
            .bind(format_timestamp(now))
            .execute(&*self.pool)
            .await?;
        Ok(Todo { id: TodoId(result.last_insert_rowid()), text: input.text, target_date: input.target_date, created_at: now })
    }

    async fn list(&self, filter: TodoFilter) -> Result<Vec<Todo>> {
        let (sql, day) = match filter {
            TodoFilter::From(day) => (
                "SELECT id, text, target_date, created_at FROM todos WHERE date(target_date) >= date(?1) ORDER BY date(target_date), id",
                day,
            ),
            TodoFilter::On(day) => (
                "SELECT id, text, target_date, created_at FROM todos WHERE date(target_date) = date(?1) ORDER BY id",
                day,
            ),
        };
        let rows = sqlx::query(sql).bind(format_date(day)).fetch_all(&*self.pool).await?;
        rows.iter().map(row_to_todo).collect()
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl KeywordRepository for SqliteStore {
    async fn create(&self, keyword: String) -> Result<Keyword> {
        let now = Utc::now();
        let result = sqlx::query("INSERT INTO news_keywords (keyword, created_at) VALUES (?1, ?2)")
            .bind(&keyword)
            .bind(format_timestamp(now))
            .execute(&*self.pool)
            .await
            .with_context(|| format!("insert keyword {keyword:?}"))?;
        Ok(Keyword { id: KeywordId(result.last_insert_rowid()), keyword, created_at: now })
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Keyword>> {
        let rows = sqlx::query("SELECT id, keyword, created_at FROM news_keywords ORDER BY created_at DESC, id DESC LIMIT ?1")
            .bind(i64::from(limit))
            .fetch_all(&*self.pool)
            .await?;
        rows.iter().map(row_to_keyword).collect()
    }

    async fn delete(&self, id: KeywordId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news_keywords WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Fixed-width so that text ordering matches time ordering.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn format_date(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("bad created_at {raw:?}"))?
        .with_timezone(&Utc))
}

fn row_to_todo(row: &SqliteRow) -> Result<Todo> {
    let target_date: String = row.try_get("target_date")?;
    let created_at: String = row.try_get("created_at")?;
    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        text: row.try_get("text")?,
        target_date: NaiveDate::parse_from_str(&target_date, "%Y-%m-%d")
            .with_context(|| format!("bad target_date {target_date:?}"))?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_keyword(row: &SqliteRow) -> Result<Keyword> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Keyword {
        id: KeywordId(row.try_get("id")?),
        keyword: row.try_get("keyword")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Creates the parent directory and an empty file for file-backed URLs.
pub fn prepare_sqlite_file(database_url: &str) -> Result<()> {
    if database_url.contains(":memory:") { return Ok(()); }
    let Some(path) = database_url.strip_prefix("sqlite://").or_else(|| database_url.strip_prefix("sqlite:")) else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    // On Windows, absolute paths may look like /C:/path; strip the leading slash
    let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
        &path[1..]
    } else {
        path
    };
    use std::{fs, fs::OpenOptions, path::Path};
    let p = Path::new(path);
    if let Some(parent) = p.parent() { if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; } }
    if !p.exists() {
        let _ = OpenOptions::new().create(true).append(true).open(p)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.init().await.unwrap();
        store
    }

    fn date(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

    async fn add(store: &SqliteStore, text: &str, day: &str) -> Todo {
        TodoRepository::create(store, CreateTodo { text: text.into(), target_date: date(day) }).await.unwrap()
    }

    #[tokio::test]
    async fn todos_from_date_are_ordered_by_date_then_id() {
        let store = store().await;
        let late = add(&store, "late", "2030-01-03").await;
        let past = add(&store, "past", "2029-12-31").await;
        let first = add(&store, "first", "2030-01-01").await;
        let second = add(&store, "second", "2030-01-01").await;

        let listed = TodoRepository::list(&store, TodoFilter::From(date("2030-01-01"))).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id, late.id]);
        assert!(!ids.contains(&past.id));
        assert!(first.id < second.id);
    }

    #[tokio::test]
    async fn todos_on_date_only_match_that_day() {
        let store = store().await;
        let a = add(&store, "a", "2030-01-01").await;
        add(&store, "b", "2030-01-02").await;
        let c = add(&store, "c", "2030-01-01").await;

        let listed = TodoRepository::list(&store, TodoFilter::On(date("2030-01-01"))).await.unwrap();
        assert_eq!(listed.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id, c.id]);
        assert_eq!(listed[0].text, "a");
        assert_eq!(listed[0].target_date, date("2030-01-01"));
    }

    #[tokio::test]
    async fn deleting_twice_reports_nothing_removed() {
        let store = store().await;
        let todo = add(&store, "gone", "2030-01-01").await;
        assert!(TodoRepository::delete(&store, todo.id).await.unwrap());
        assert!(!TodoRepository::delete(&store, todo.id).await.unwrap());
        assert!(TodoRepository::list(&store, TodoFilter::From(date("2000-01-01"))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn keyword_uniqueness_is_enforced() {
        let store = store().await;
        KeywordRepository::create(&store, "AI".into()).await.unwrap();
        assert!(KeywordRepository::create(&store, "AI".into()).await.is_err());
    }

    #[tokio::test]
    async fn keywords_are_newest_first_and_limited() {
        let store = store().await;
        for i in 0..60 {
            KeywordRepository::create(&store, format!("kw{i}")).await.unwrap();
        }
        let listed = store.list_recent(50).await.unwrap();
        assert_eq!(listed.len(), 50);
        assert_eq!(listed[0].keyword, "kw59");
        assert_eq!(listed[49].keyword, "kw10");
        assert!(listed.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[tokio::test]
    async fn keyword_delete_is_idempotent() {
        let store = store().await;
        let kw = KeywordRepository::create(&store, "rust".into()).await.unwrap();
        assert!(KeywordRepository::delete(&store, kw.id).await.unwrap());
        assert!(!KeywordRepository::delete(&store, kw.id).await.unwrap());
        assert!(store.list_recent(50).await.unwrap().is_empty());
    }
}
