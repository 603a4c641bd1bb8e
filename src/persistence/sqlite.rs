use super::{PersistenceResult, TimelineStore};
use crate::{Position, Timeline, TimelineMetadata};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;
use tracing::info;

pub struct SqliteTimelineStore {
    connection: Mutex<Connection>,
}

impl SqliteTimelineStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS timeline_metadata (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                metadata_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS positions (
                row_order INTEGER NOT NULL,
                id INTEGER PRIMARY KEY,
                position_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_metadata(
        &self,
        tx: &rusqlite::Transaction,
        metadata: &TimelineMetadata,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(metadata)?;
        tx.execute("DELETE FROM timeline_metadata", [])?;
        tx.execute(
            "INSERT INTO timeline_metadata (id, metadata_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_positions(
        &self,
        tx: &rusqlite::Transaction,
        positions: &[Position],
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM positions", [])?;
        let mut stmt =
            tx.prepare("INSERT INTO positions (row_order, id, position_json) VALUES (?1, ?2, ?3)")?;
        for (row_order, position) in positions.iter().enumerate() {
            let json = serde_json::to_string(position)?;
            stmt.execute(params![row_order as i64, position.id, json])?;
        }
        Ok(())
    }
}

impl TimelineStore for SqliteTimelineStore {
    fn save_timeline(&self, timeline: &Timeline) -> PersistenceResult<()> {
        super::validate_timeline(timeline)?;
        let positions = timeline.positions()?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_metadata(&tx, timeline.metadata())?;
        self.save_positions(&tx, &positions)?;
        tx.commit()?;
        info!(count = positions.len(), "saved timeline to sqlite");
        Ok(())
    }

    fn load_timeline(&self) -> PersistenceResult<Option<Timeline>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare("SELECT metadata_json FROM timeline_metadata WHERE id = 1")?;
        let metadata_json_opt: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(metadata_json) = metadata_json_opt else {
            return Ok(None);
        };

        let metadata: TimelineMetadata = serde_json::from_str(&metadata_json)?;

        let mut stmt = conn.prepare("SELECT position_json FROM positions ORDER BY row_order ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut positions = Vec::new();
        for json in rows {
            let json = json?;
            let position: Position = serde_json::from_str(&json)?;
            positions.push(position);
        }

        let timeline = super::assemble_timeline(metadata, positions)?;
        info!(count = timeline.len(), "loaded timeline from sqlite");
        Ok(Some(timeline))
    }
}
