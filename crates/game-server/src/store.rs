use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

const BEST_SCORE_KEY: &str = "best_score";
const MUTED_KEY: &str = "muted";

/// Summary of one finished (or abandoned) game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub score: u64,
    pub highest_tile: u32,
    pub moves: u64,
    pub won: bool,
    /// Unix seconds.
    pub finished_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub id: u64,
    #[serde(flatten)]
    pub record: GameRecord,
}

/// Persistent best score, game history and player settings in `scores.db`.
///
/// Schema:
/// - history(id INTEGER PRIMARY KEY AUTOINCREMENT, score, highest_tile, moves, won, finished_at)
/// - settings(meta_key TEXT PRIMARY KEY, meta_value TEXT)
pub struct ScoreStore {
    conn: Connection,
    history_limit: usize,
}

impl ScoreStore {
    /// Create or open the store under `dir`, ensure schema exists.
    pub fn open<P: AsRef<Path>>(dir: P, history_limit: usize) -> Result<Self> {
        let data_dir = dir.as_ref();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        let db_path = data_dir.join("scores.db");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        conn.pragma_update(None, "journal_mode", &"WAL")?;
        conn.pragma_update(None, "synchronous", &"NORMAL")?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                score INT NOT NULL,
                highest_tile INT NOT NULL,
                moves INT NOT NULL,
                won INT NOT NULL,
                finished_at INT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS settings (
                meta_key TEXT PRIMARY KEY,
                meta_value TEXT NOT NULL
            );
            "#,
        )
        .with_context(|| format!("failed to create schema in {}", db_path.display()))?;
        Ok(Self {
            conn,
            history_limit: history_limit.max(1),
        })
    }

    /// Highest score ever recorded (0 if none).
    pub fn best_score(&self) -> Result<u64, rusqlite::Error> {
        Ok(self
            .get_meta(BEST_SCORE_KEY)?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    /// Store `score` as the new best if it beats the current one.
    pub fn record_score(&mut self, score: u64) -> Result<bool, rusqlite::Error> {
        if score <= self.best_score()? {
            return Ok(false);
        }
        self.set_meta(BEST_SCORE_KEY, score.to_string())?;
        Ok(true)
    }

    /// Append a finished game and evict the oldest rows beyond the retention count.
    pub fn append_history(&mut self, r: GameRecord) -> Result<u64, rusqlite::Error> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO history (score, highest_tile, moves, won, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                r.score as i64,
                r.highest_tile as i64,
                r.moves as i64,
                r.won,
                r.finished_at as i64
            ],
        )?;
        let id = tx.last_insert_rowid() as u64;
        tx.execute(
            "DELETE FROM history
             WHERE id NOT IN (SELECT id FROM history ORDER BY id DESC LIMIT ?1)",
            params![self.history_limit as i64],
        )?;
        tx.commit()?;
        Ok(id)
    }

    /// Most recent games first.
    pub fn history(&self, limit: usize) -> Result<Vec<HistoryEntry>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, score, highest_tile, moves, won, finished_at
             FROM history ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(HistoryEntry {
                id: row.get::<_, i64>(0)? as u64,
                record: GameRecord {
                    score: row.get::<_, i64>(1)? as u64,
                    highest_tile: row.get::<_, i64>(2)? as u32,
                    moves: row.get::<_, i64>(3)? as u64,
                    won: row.get::<_, bool>(4)?,
                    finished_at: row.get::<_, i64>(5)? as u64,
                },
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    /// Sound preference; only an explicit "false" turns sound on.
    pub fn muted(&self) -> Result<bool, rusqlite::Error> {
        Ok(self.get_meta(MUTED_KEY)?.as_deref() != Some("false"))
    }

    pub fn set_muted(&mut self, muted: bool) -> Result<(), rusqlite::Error> {
        self.set_meta(MUTED_KEY, if muted { "true" } else { "false" })
    }

    fn set_meta<K: AsRef<str>, V: AsRef<str>>(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO settings (meta_key, meta_value) VALUES (?1, ?2)
             ON CONFLICT(meta_key) DO UPDATE SET meta_value=excluded.meta_value",
            params![key.as_ref(), value.as_ref()],
        )?;
        Ok(())
    }

    fn get_meta<K: AsRef<str>>(&self, key: K) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT meta_value FROM settings WHERE meta_key = ?1",
                params![key.as_ref()],
                |row| row.get::<_, String>(0),
            )
            .optional()
    }

}
