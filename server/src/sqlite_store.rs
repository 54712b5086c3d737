use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use common::Username;
use common::leaderboard::{GatewayError, ScoreGateway, ScoreRecord};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS score (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    inserted_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    username TEXT NOT NULL UNIQUE,
    score INTEGER NOT NULL
)";

const SELECT_COLUMNS: &str = "SELECT id, inserted_at, updated_at, username, score FROM score";

/// Score store backed by a SQLite `score` table. The UNIQUE constraint on
/// `username` makes concurrent saves of the same name fail cleanly.
#[derive(Clone)]
pub struct SqliteScoreStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteScoreStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute(CREATE_TABLE, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, GatewayError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, GatewayError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| GatewayError::Storage("connection lock poisoned".to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| GatewayError::Storage(e.to_string()))?
    }
}

fn storage_error(e: rusqlite::Error) -> GatewayError {
    GatewayError::Storage(e.to_string())
}

fn conversion_error<E>(index: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
}

fn parse_timestamp(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(index, e))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ScoreRecord> {
    Ok(ScoreRecord {
        id: row.get(0)?,
        inserted_at: parse_timestamp(row, 1)?,
        updated_at: parse_timestamp(row, 2)?,
        username: Username::from_stored(row.get(3)?),
        score: row.get(4)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(e, rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation)
}

impl ScoreGateway for SqliteScoreStore {
    async fn find_by_username(&self, username: &Username) -> Result<Option<ScoreRecord>, GatewayError> {
        let username = username.clone();
        self.with_conn(move |conn| {
            conn.query_row(
                &format!("{} WHERE username = ?1", SELECT_COLUMNS),
                params![username.as_str()],
                record_from_row,
            )
            .optional()
            .map_err(storage_error)
        })
        .await
    }

    async fn create(&self, username: &Username, score: u32) -> Result<ScoreRecord, GatewayError> {
        let username = username.clone();
        self.with_conn(move |conn| {
            let now = Utc::now();
            let stamp = now.to_rfc3339();
            let inserted = conn.execute(
                "INSERT INTO score (inserted_at, updated_at, username, score) VALUES (?1, ?2, ?3, ?4)",
                params![stamp, stamp, username.as_str(), score],
            );

            match inserted {
                Ok(_) => Ok(ScoreRecord {
                    id: conn.last_insert_rowid(),
                    inserted_at: now,
                    updated_at: now,
                    username,
                    score,
                }),
                Err(e) if is_unique_violation(&e) => Err(GatewayError::DuplicateUsername(username)),
                Err(e) => Err(storage_error(e)),
            }
        })
        .await
    }

    async fn list_top(&self, limit: usize) -> Result<Vec<ScoreRecord>, GatewayError> {
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(&format!("{} ORDER BY score DESC, id ASC LIMIT ?1", SELECT_COLUMNS))
                .map_err(storage_error)?;
            let rows = stmt
                .query_map(params![limit as i64], record_from_row)
                .map_err(storage_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(storage_error)
        })
        .await
    }
}
