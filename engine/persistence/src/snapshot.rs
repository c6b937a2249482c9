//! JSON snapshot of a whole store

use crate::error::{PersistenceError, Result};
use chrono::{DateTime, Utc};
use pick_ledger::{PickSet, UsageRecord};
use serde::{Deserialize, Serialize};
use standings::{SeasonStanding, WeeklyScore};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use uuid::Uuid;

/// Snapshot format written by this version
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Everything a store holds, as written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Unique identifier for this snapshot
    pub id: Uuid,

    /// Timestamp when the snapshot was created
    pub saved_at: DateTime<Utc>,

    pub format_version: u32,

    #[serde(default)]
    pub pick_sets: Vec<PickSet>,

    #[serde(default)]
    pub weekly_scores: Vec<WeeklyScore>,

    #[serde(default)]
    pub standings: Vec<SeasonStanding>,

    #[serde(default)]
    pub usage: Vec<UsageRecord>,
}

impl StoreSnapshot {
    pub fn new(
        pick_sets: Vec<PickSet>,
        weekly_scores: Vec<WeeklyScore>,
        standings: Vec<SeasonStanding>,
        usage: Vec<UsageRecord>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            saved_at: Utc::now(),
            format_version: SNAPSHOT_FORMAT_VERSION,
            pick_sets,
            weekly_scores,
            standings,
            usage,
        }
    }

    pub fn check_format(&self) -> Result<()> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(PersistenceError::corruption(format!(
                "snapshot {} has format version {}, expected {}",
                self.id, self.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write to `path`. The file is replaced in one rename so a crash never
    /// leaves a half-written snapshot behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        tracing::info!(
            "Saved snapshot {} to {:?} ({} pick sets, {} weekly scores, {} standings)",
            self.id,
            path,
            self.pick_sets.len(),
            self.weekly_scores.len(),
            self.standings.len()
        );
        Ok(())
    }

    /// Read from `path`; `Ok(None)` when there is no file
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: StoreSnapshot = serde_json::from_reader(BufReader::new(file))?;

        tracing::info!("Loaded snapshot {} saved at {}", snapshot.id, snapshot.saved_at);
        Ok(Some(snapshot))
    }
}
