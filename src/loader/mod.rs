//! Boot-time bulk import.
//!
//! Reads a data directory holding `options.txt` (first line: the current
//! date as epoch seconds) and batch files named by kind prefix
//! (`users_1.json`, `locations_1.json`, `visits_1.json`, ...). Batches are
//! ingested users first, then locations, then visits, whatever order the
//! directory lists them in. A file is decoded as the kind its name gives.
//! Any failure aborts the load.

use crate::core::{Capacity, EntityKind, Location, StoreError, User, Visit};
use crate::storage::EntityStore;
use chrono::DateTime;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const OPTIONS_FILE: &str = "options.txt";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{0}' does not contain a current date")]
    MissingCurrentDate(PathBuf),

    #[error("invalid current date '{value}': {source}")]
    InvalidCurrentDate {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to decode batch '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("visit {visit} references missing {kind} {id}")]
    DanglingReference {
        visit: u32,
        kind: EntityKind,
        id: u32,
    },

    #[error("batch '{batch}' rejected: {source}")]
    Store {
        batch: String,
        #[source]
        source: StoreError,
    },
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

// ============================================================================
// Batches
// ============================================================================

/// One decoded batch file.
#[derive(Debug, Clone)]
pub enum Batch {
    Users { users: Vec<User> },
    Locations { locations: Vec<Location> },
    Visits { visits: Vec<Visit> },
}

#[derive(Deserialize)]
struct UsersFile {
    users: Vec<User>,
}

#[derive(Deserialize)]
struct LocationsFile {
    locations: Vec<Location>,
}

#[derive(Deserialize)]
struct VisitsFile {
    visits: Vec<Visit>,
}

impl Batch {
    /// Decodes a batch of the given kind. The top-level key must match the
    /// kind; a file holding another kind's key fails to decode.
    pub fn decode<R: Read>(kind: EntityKind, reader: R) -> serde_json::Result<Self> {
        let batch = match kind {
            EntityKind::User => {
                let UsersFile { users } = serde_json::from_reader(reader)?;
                Batch::Users { users }
            }
            EntityKind::Location => {
                let LocationsFile { locations } = serde_json::from_reader(reader)?;
                Batch::Locations { locations }
            }
            EntityKind::Visit => {
                let VisitsFile { visits } = serde_json::from_reader(reader)?;
                Batch::Visits { visits }
            }
        };
        Ok(batch)
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Batch::Users { .. } => EntityKind::User,
            Batch::Locations { .. } => EntityKind::Location,
            Batch::Visits { .. } => EntityKind::Visit,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Batch::Users { users } => users.len(),
            Batch::Locations { locations } => locations.len(),
            Batch::Visits { visits } => visits.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Kind of a batch file, judged by its name prefix.
pub fn batch_kind(file_name: &str) -> Option<EntityKind> {
    EntityKind::ALL
        .into_iter()
        .find(|kind| file_name.starts_with(kind.plural()))
}

fn kind_rank(kind: EntityKind) -> u8 {
    match kind {
        EntityKind::User => 0,
        EntityKind::Location => 1,
        EntityKind::Visit => 2,
    }
}

// ============================================================================
// Loader
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    capacity: Capacity,
}

impl Loader {
    pub fn new(capacity: Capacity) -> Self {
        Self { capacity }
    }

    /// Builds a store from a data directory. The store is returned only once
    /// every batch has been ingested.
    pub fn load_dir(&self, dir: &Path) -> LoadResult<EntityStore> {
        let current_date = read_current_date(&dir.join(OPTIONS_FILE))?;
        info!(
            current_date,
            as_utc = %DateTime::from_timestamp(current_date, 0)
                .map(|date| date.to_rfc3339())
                .unwrap_or_default(),
            "loaded options"
        );

        let store = EntityStore::new(self.capacity, current_date);
        for (kind, path) in batch_files(dir)? {
            let batch = read_batch(kind, &path)?;
            let count = ingest(&store, batch, &path.display().to_string())?;
            info!(path = %path.display(), kind = %kind, count, "batch ingested");
        }

        info!(
            users = store.len(EntityKind::User).unwrap_or_default(),
            locations = store.len(EntityKind::Location).unwrap_or_default(),
            visits = store.len(EntityKind::Visit).unwrap_or_default(),
            "data loaded"
        );
        Ok(store)
    }

    /// Builds a store from in-memory batches, applying the same kind order
    /// as a directory load.
    pub fn load_batches(&self, current_date: i64, mut batches: Vec<Batch>) -> LoadResult<EntityStore> {
        let store = EntityStore::new(self.capacity, current_date);
        batches.sort_by_key(|batch| kind_rank(batch.kind()));
        for (index, batch) in batches.into_iter().enumerate() {
            ingest(&store, batch, &format!("batch #{index}"))?;
        }
        Ok(store)
    }
}

pub fn read_current_date(path: &Path) -> LoadResult<i64> {
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let first = raw
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| LoadError::MissingCurrentDate(path.to_path_buf()))?;
    first
        .parse::<i64>()
        .map_err(|source| LoadError::InvalidCurrentDate {
            value: first.to_string(),
            source,
        })
}

/// Batch files in `dir`, ordered users, locations, visits (by name within a
/// kind). Files without a kind prefix are skipped.
pub fn batch_files(dir: &Path) -> LoadResult<Vec<(EntityKind, PathBuf)>> {
    let io_err = |source: std::io::Error| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(kind) = path.file_name().and_then(|name| name.to_str()).and_then(batch_kind) else {
            debug!(path = %path.display(), "skipping file without a batch prefix");
            continue;
        };
        files.push((kind, path));
    }
    files.sort_by(|(a_kind, a_path), (b_kind, b_path)| {
        kind_rank(*a_kind)
            .cmp(&kind_rank(*b_kind))
            .then_with(|| a_path.cmp(b_path))
    });
    Ok(files)
}

fn read_batch(kind: EntityKind, path: &Path) -> LoadResult<Batch> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Batch::decode(kind, BufReader::new(file)).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn ingest(store: &EntityStore, batch: Batch, name: &str) -> LoadResult<usize> {
    let count = batch.len();
    let store_err = |source: StoreError| LoadError::Store {
        batch: name.to_string(),
        source,
    };
    match batch {
        Batch::Users { users } => {
            for user in users {
                store.insert_user(user).map_err(store_err)?;
            }
        }
        Batch::Locations { locations } => {
            for location in locations {
                store.insert_location(location).map_err(store_err)?;
            }
        }
        Batch::Visits { visits } => {
            for visit in visits {
                let visit_id = visit.id;
                store.insert_visit(visit).map_err(|err| match err {
                    StoreError::MissingReference { kind, id } => LoadError::DanglingReference {
                        visit: visit_id,
                        kind,
                        id,
                    },
                    other => store_err(other),
                })?;
            }
        }
    }
    Ok(count)
}
