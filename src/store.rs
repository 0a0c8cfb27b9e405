//! Keyed storage for converted schedules.
//!
//! Each conversion is saved under its own job id, so a later download or
//! email step fetches exactly the calendar it was issued for.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, ScheduleError};
use crate::models::ShiftRecord;

/// A converted schedule as persisted in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSchedule {
    /// Key the schedule is stored under
    pub job_id: String,
    /// Email address of the uploader, when known
    pub owner_email: Option<String>,
    /// Display name of the generated calendar
    pub calendar_name: String,
    /// Extracted shift records
    pub shifts: Vec<ShiftRecord>,
    /// Generated calendar document
    pub calendar: String,
    /// When the schedule was stored
    pub created_at: DateTime<Utc>,
}

/// Embedded store of converted schedules keyed by job id
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    db: sled::Db,
}

impl ScheduleStore {
    /// Open (or create) a store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        debug!(path = %path.display(), "Opened schedule store");
        Ok(Self { db })
    }

    /// Store a new conversion and return its generated job id
    pub fn create(
        &self,
        calendar_name: &str,
        owner_email: Option<&str>,
        shifts: &[ShiftRecord],
        calendar: &[u8],
    ) -> Result<String> {
        let calendar = String::from_utf8(calendar.to_vec())
            .map_err(|e| ScheduleError::InvalidInput(format!("calendar is not UTF-8: {e}")))?;

        let schedule = StoredSchedule {
            job_id: Uuid::new_v4().to_string(),
            owner_email: owner_email.map(ToString::to_string),
            calendar_name: calendar_name.to_string(),
            shifts: shifts.to_vec(),
            calendar,
            created_at: Utc::now(),
        };

        self.save(&schedule)?;
        info!(job_id = %schedule.job_id, shifts = shifts.len(), "Stored schedule");
        Ok(schedule.job_id)
    }

    /// Insert or replace a schedule under its job id
    pub fn save(&self, schedule: &StoredSchedule) -> Result<()> {
        let data = serde_json::to_vec(schedule)?;
        self.db.insert(schedule.job_id.as_bytes(), data)?;
        self.db.flush()?;
        Ok(())
    }

    /// Fetch a schedule by job id
    pub fn load(&self, job_id: &str) -> Result<Option<StoredSchedule>> {
        match self.db.get(job_id.as_bytes())? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Fetch a schedule by job id, failing if it is absent
    pub fn get(&self, job_id: &str) -> Result<StoredSchedule> {
        self.load(job_id)?
            .ok_or_else(|| ScheduleError::NotFound(job_id.to_string()))
    }

    /// Delete a schedule; returns whether it existed
    pub fn remove(&self, job_id: &str) -> Result<bool> {
        let existed = self.db.remove(job_id.as_bytes())?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    /// All stored job ids
    pub fn list_jobs(&self) -> Result<Vec<String>> {
        self.db
            .iter()
            .keys()
            .map(|key| -> Result<String> { Ok(String::from_utf8_lossy(&key?).into_owned()) })
            .collect()
    }

    /// Remove every stored schedule
    pub fn clear(&self) -> Result<()> {
        self.db.clear()?;
        self.db.flush()?;
        Ok(())
    }
}
