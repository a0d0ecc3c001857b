use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, OnceCell};

use super::{NewSample, PointStore, Sample, StoreError};

/// JSON-lines file store, one sample per line.
///
/// The file handle is opened at most once, on first use, no matter how many
/// callers race to use the store.
pub struct FileStore {
    path: PathBuf,
    conn: OnceCell<Mutex<Connection>>,
}

struct Connection {
    file: File,
    last_id: u64,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        FileStore {
            path,
            conn: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<&Mutex<Connection>, StoreError> {
        self.conn
            .get_or_try_init(|| async { self.open().map(Mutex::new) })
            .await
    }

    fn open(&self) -> Result<Connection, StoreError> {
        let unavailable = |source| StoreError::Unavailable {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(unavailable)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(unavailable)?;
        discard_torn_tail(&file, &self.path)?;

        let rows = read_rows(&self.path)?;
        let last_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
        log::debug!(
            "Opened point store {} ({} rows)",
            self.path.display(),
            rows.len()
        );

        Ok(Connection { file, last_id })
    }
}

impl PointStore for FileStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.connection().await.map(|_| ())
    }

    async fn insert(&self, sample: NewSample) -> Result<Sample, StoreError> {
        let mut conn = self.connection().await?.lock().await;

        let row = sample.with_id(conn.last_id + 1);
        let mut line = serde_json::to_string(&row)?;
        line.push('\n');

        let before = conn.file.metadata()?.len();
        if let Err(e) = append(&mut conn.file, line.as_bytes()) {
            // Roll back whatever part of the row reached the file.
            if let Err(undo) = conn.file.set_len(before) {
                log::error!(
                    "Could not roll back partial row in {}: {}",
                    self.path.display(),
                    undo
                );
            }
            return Err(e.into());
        }
        conn.last_id = row.id;

        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<Sample>, StoreError> {
        let _conn = self.connection().await?.lock().await;
        read_rows(&self.path)
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let conn = self.connection().await?.lock().await;
        conn.file.set_len(0)?;
        conn.file.sync_data()?;
        log::info!("Cleared point store {}", self.path.display());
        Ok(())
    }
}

fn append(file: &mut File, line: &[u8]) -> io::Result<()> {
    file.write_all(line)?;
    file.sync_data()
}

/// Truncates an interrupted final write so the next append starts on a
/// fresh line.
fn discard_torn_tail(file: &File, path: &Path) -> Result<(), StoreError> {
    let content = std::fs::read(path)?;
    let complete = content
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    if complete < content.len() {
        log::warn!(
            "Discarding {} bytes of incomplete trailing row in {}",
            content.len() - complete,
            path.display()
        );
        file.set_len(complete as u64)?;
        file.sync_data()?;
    }
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<Sample>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    parse_rows(&content)
}

fn parse_rows(content: &str) -> Result<Vec<Sample>, StoreError> {
    let lines: Vec<&str> = content.lines().collect();
    let mut rows = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(row) => rows.push(row),
            // A torn final write is dropped; anything earlier is corruption.
            Err(e) if i + 1 == lines.len() && !content.ends_with('\n') => {
                log::warn!("Ignoring incomplete trailing row: {}", e);
            }
            Err(source) => return Err(StoreError::Corrupt { line: i + 1, source }),
        }
    }

    Ok(rows)
}
