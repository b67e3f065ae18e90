//! MBTiles archive writer.
//!
//! An archive is a single SQLite file with a `metadata` name/value table and
//! a `tiles` table keyed by `(zoom_level, tile_column, tile_row)`. Rows use
//! the TMS convention (row 0 at the south), so the XYZ row is flipped on
//! insert. Writes are batched into one transaction per zoom level.
//!
//! Only the orchestrator thread touches the connection; workers never write.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

use crate::coord::{TileBounds, TileCoord};

/// Errors from archive creation or writes.
///
/// Unlike per-tile failures these abort the region.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to create archive directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("archive database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Descriptive metadata stored in the archive's `metadata` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveMetadata {
    pub name: String,
    pub bounds: TileBounds,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl ArchiveMetadata {
    pub fn new(name: impl Into<String>, bounds: TileBounds, min_zoom: u8, max_zoom: u8) -> Self {
        Self {
            name: name.into(),
            bounds,
            min_zoom,
            max_zoom,
        }
    }

    /// Metadata rows in insertion order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let b = &self.bounds;
        vec![
            ("name", self.name.clone()),
            ("type", "baselayer".to_string()),
            ("version", "1.0".to_string()),
            (
                "description",
                format!("{} with MGRS grid overlay and zone labels", self.name),
            ),
            ("format", "png".to_string()),
            ("bounds", format!("{},{},{},{}", b.west, b.south, b.east, b.north)),
            ("minzoom", self.min_zoom.to_string()),
            ("maxzoom", self.max_zoom.to_string()),
        ]
    }
}

/// Writes tiles into an MBTiles file.
pub struct ArchiveWriter {
    conn: Connection,
    path: PathBuf,
}

impl ArchiveWriter {
    /// Opens (or creates) the archive at `path` and writes its metadata.
    ///
    /// Parent directories are created as needed. Opening an existing
    /// archive keeps its tiles; metadata values are replaced.
    pub fn create(path: &Path, metadata: &ArchiveMetadata) -> Result<Self, ArchiveError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ArchiveError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let writer = Self {
            conn,
            path: path.to_path_buf(),
        };
        writer.init_schema(metadata)?;

        info!(path = %path.display(), "Archive opened");
        Ok(writer)
    }

    fn init_schema(&self, metadata: &ArchiveMetadata) -> Result<(), ArchiveError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS metadata (name TEXT, value TEXT);
             CREATE TABLE IF NOT EXISTS tiles (
                 zoom_level INTEGER,
                 tile_column INTEGER,
                 tile_row INTEGER,
                 tile_data BLOB
             );
             CREATE UNIQUE INDEX IF NOT EXISTS tile_index
                 ON tiles (zoom_level, tile_column, tile_row);",
        )?;

        self.begin()?;
        for (name, value) in metadata.entries() {
            self.conn
                .execute("DELETE FROM metadata WHERE name = ?1", params![name])?;
            self.conn.execute(
                "INSERT INTO metadata (name, value) VALUES (?1, ?2)",
                params![name, value],
            )?;
        }
        self.commit()
    }

    /// Path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores a tile, replacing any previous data at the same address.
    pub fn put_tile(&self, coord: &TileCoord, data: &[u8]) -> Result<(), ArchiveError> {
        self.begin()?;
        self.conn.execute(
            "INSERT OR REPLACE INTO tiles (zoom_level, tile_column, tile_row, tile_data)
             VALUES (?1, ?2, ?3, ?4)",
            params![coord.zoom, coord.col, coord.archive_row(), data],
        )?;
        Ok(())
    }

    /// Commits pending writes. A no-op if nothing is pending.
    pub fn commit(&self) -> Result<(), ArchiveError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
            debug!(path = %self.path.display(), "Archive committed");
        }
        Ok(())
    }

    /// Commits pending writes and closes the archive.
    pub fn finish(self) -> Result<(), ArchiveError> {
        self.commit()?;
        self.conn
            .close()
            .map_err(|(_, source)| ArchiveError::Sqlite(source))
    }

    /// Number of stored tiles at a zoom level.
    pub fn tile_count(&self, zoom: u8) -> Result<u64, ArchiveError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tiles WHERE zoom_level = ?1",
            params![zoom],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Value of a metadata key, if present.
    pub fn metadata_value(&self, name: &str) -> Result<Option<String>, ArchiveError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Stored data for an XYZ tile address, if present.
    pub fn tile_data(&self, coord: &TileCoord) -> Result<Option<Vec<u8>>, ArchiveError> {
        Ok(self
            .conn
            .query_row(
                "SELECT tile_data FROM tiles
                 WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
                params![coord.zoom, coord.col, coord.archive_row()],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn begin(&self) -> Result<(), ArchiveError> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }
}
