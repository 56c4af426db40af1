//! Board repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Save and load whole board snapshots keyed by a board key.
//! - Keep SQL details and ordering columns inside the repository boundary.
//!
//! # Invariants
//! - `save` replaces one board snapshot atomically (single transaction).
//! - Loaded boards are ordered by `sort_order ASC, id ASC` and pass
//!   `Board::validate()` before being returned.
//! - Payloads are stored as JSON text and never inspected by SQL.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::board::{Board, Item, Stage, StageId};
use log::{debug, info};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Result type used by board repository operations.
pub type BoardRepoResult<T> = Result<T, BoardRepoError>;

/// Errors from board repository operations.
#[derive(Debug)]
pub enum BoardRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Board key is blank after trim.
    InvalidBoardKey,
    /// No board is stored under this key.
    NotFound(String),
    /// Payload could not be encoded or decoded as JSON.
    Payload(serde_json::Error),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Stored rows do not form a valid board.
    InvalidData(String),
}

impl Display for BoardRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidBoardKey => write!(f, "board key must not be blank"),
            Self::NotFound(key) => write!(f, "board not found: {key}"),
            Self::Payload(err) => write!(f, "invalid item payload: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "board repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "board repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid board data: {message}"),
        }
    }
}

impl Error for BoardRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Payload(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for BoardRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for BoardRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for BoardRepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Payload(value)
    }
}

/// Persistence contract for board snapshots.
pub trait BoardRepository {
    /// Stores `board` under `key`, replacing any previous snapshot.
    fn save<P: Serialize>(&self, key: &str, board: &Board<P>) -> BoardRepoResult<()>;
    /// Loads the snapshot stored under `key`.
    fn load<P: DeserializeOwned>(&self, key: &str) -> BoardRepoResult<Board<P>>;
    /// Returns whether a snapshot exists under `key`.
    fn exists(&self, key: &str) -> BoardRepoResult<bool>;
    /// Removes the snapshot stored under `key`.
    fn delete(&self, key: &str) -> BoardRepoResult<()>;
    /// Lists stored board keys in ascending order.
    fn list_keys(&self) -> BoardRepoResult<Vec<String>>;
}

/// SQLite-backed board repository.
pub struct SqliteBoardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBoardRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> BoardRepoResult<Self> {
        ensure_board_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl BoardRepository for SqliteBoardRepository<'_> {
    fn save<P: Serialize>(&self, key: &str, board: &Board<P>) -> BoardRepoResult<()> {
        let key = normalize_board_key(key)?;
        let started_at = Instant::now();

        // Encode before opening the write transaction so a bad payload
        // cannot leave a half-written snapshot.
        let mut encoded = Vec::with_capacity(board.stage_count());
        for stage in board.stages() {
            let mut items = Vec::with_capacity(stage.len());
            for item in stage.items() {
                items.push((item.id.to_string(), serde_json::to_string(&item.payload)?));
            }
            encoded.push((stage.id().as_str(), stage.title(), items));
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO boards (board_key) VALUES (?1)
             ON CONFLICT(board_key) DO UPDATE
             SET updated_at = (strftime('%s', 'now') * 1000);",
            [key],
        )?;
        tx.execute("DELETE FROM board_items WHERE board_key = ?1;", [key])?;
        tx.execute("DELETE FROM board_stages WHERE board_key = ?1;", [key])?;

        for (stage_order, (stage_id, title, items)) in encoded.iter().enumerate() {
            tx.execute(
                "INSERT INTO board_stages (board_key, stage_id, title, sort_order)
                 VALUES (?1, ?2, ?3, ?4);",
                params![key, stage_id, title, stage_order as i64],
            )?;
            for (item_order, (item_id, payload_json)) in items.iter().enumerate() {
                tx.execute(
                    "INSERT INTO board_items (board_key, item_id, stage_id, sort_order, payload_json)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![key, item_id, stage_id, item_order as i64, payload_json],
                )?;
            }
        }
        tx.commit()?;

        info!(
            "event=board_save module=repo status=ok board_key={} stages={} items={} duration_ms={}",
            key,
            board.stage_count(),
            board.item_count(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn load<P: DeserializeOwned>(&self, key: &str) -> BoardRepoResult<Board<P>> {
        let key = normalize_board_key(key)?;
        if !self.exists(key)? {
            return Err(BoardRepoError::NotFound(key.to_string()));
        }

        let mut items_by_stage = load_items::<P>(self.conn, key)?;

        let mut stmt = self.conn.prepare(
            "SELECT stage_id, title
             FROM board_stages
             WHERE board_key = ?1
             ORDER BY sort_order ASC, stage_id ASC;",
        )?;
        let mut rows = stmt.query([key])?;
        let mut stages = Vec::new();
        while let Some(row) = rows.next()? {
            let stage_id = StageId::new(row.get::<_, String>(0)?);
            let title: String = row.get(1)?;
            let items = items_by_stage.remove(&stage_id).unwrap_or_default();
            stages.push(Stage::from_parts(stage_id, title, items));
        }

        if let Some(orphan) = items_by_stage.keys().next() {
            return Err(BoardRepoError::InvalidData(format!(
                "items reference missing stage `{orphan}`"
            )));
        }

        let board =
            Board::from_stages(stages).map_err(|err| BoardRepoError::InvalidData(err.to_string()))?;
        debug!(
            "event=board_load module=repo status=ok board_key={} stages={} items={}",
            key,
            board.stage_count(),
            board.item_count()
        );
        Ok(board)
    }

    fn exists(&self, key: &str) -> BoardRepoResult<bool> {
        let key = normalize_board_key(key)?;
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM boards WHERE board_key = ?1);",
            [key],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn delete(&self, key: &str) -> BoardRepoResult<()> {
        let key = normalize_board_key(key)?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM board_items WHERE board_key = ?1;", [key])?;
        tx.execute("DELETE FROM board_stages WHERE board_key = ?1;", [key])?;
        let changed = tx.execute("DELETE FROM boards WHERE board_key = ?1;", [key])?;
        if changed == 0 {
            return Err(BoardRepoError::NotFound(key.to_string()));
        }
        tx.commit()?;
        info!("event=board_delete module=repo status=ok board_key={key}");
        Ok(())
    }

    fn list_keys(&self) -> BoardRepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT board_key FROM boards ORDER BY board_key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut keys = Vec::new();
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }
}

fn load_items<P: DeserializeOwned>(
    conn: &Connection,
    key: &str,
) -> BoardRepoResult<BTreeMap<StageId, Vec<Item<P>>>> {
    let mut stmt = conn.prepare(
        "SELECT item_id, stage_id, payload_json
         FROM board_items
         WHERE board_key = ?1
         ORDER BY stage_id ASC, sort_order ASC, item_id ASC;",
    )?;
    let mut rows = stmt.query([key])?;
    let mut grouped: BTreeMap<StageId, Vec<Item<P>>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let item_id_text: String = row.get(0)?;
        let item_id = Uuid::parse_str(&item_id_text).map_err(|_| {
            BoardRepoError::InvalidData(format!(
                "invalid uuid `{item_id_text}` in board_items.item_id"
            ))
        })?;
        let stage_id = StageId::new(row.get::<_, String>(1)?);
        let payload_json: String = row.get(2)?;
        let payload = serde_json::from_str(&payload_json)?;
        grouped
            .entry(stage_id)
            .or_default()
            .push(Item::with_id(item_id, payload));
    }
    Ok(grouped)
}

fn normalize_board_key(key: &str) -> BoardRepoResult<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(BoardRepoError::InvalidBoardKey);
    }
    Ok(trimmed)
}

fn ensure_board_connection_ready(conn: &Connection) -> BoardRepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(BoardRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["boards", "board_stages", "board_items"] {
        if !table_exists(conn, table)? {
            return Err(BoardRepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> BoardRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
