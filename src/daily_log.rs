// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Daily installation log and its key-based persistence.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar date of a log entry, written `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogDate(NaiveDate);

impl LogDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| TrackerError::InvalidDate(format!("{year:04}-{month:02}-{day:02}")))
    }

    /// The local calendar date.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }
}

impl From<NaiveDate> for LogDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for LogDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for LogDate {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| TrackerError::InvalidDate(s.to_string()))
    }
}

impl TryFrom<String> for LogDate {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LogDate> for String {
    fn from(date: LogDate) -> Self {
        date.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLogRecord {
    pub date: LogDate,
    /// MC4-completed end count at submission time.
    pub installed_panels: usize,
    pub subcontractor: String,
    pub workers: u32,
}

/// Append-only log of daily submissions.
pub trait DailyLogStore {
    fn records(&self) -> &[DailyLogRecord];
    fn add_record(&mut self, record: DailyLogRecord) -> Result<()>;
    fn reset_log(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLogStore {
    records: Vec<DailyLogRecord>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DailyLogStore for MemoryLogStore {
    fn records(&self) -> &[DailyLogRecord] {
        &self.records
    }

    fn add_record(&mut self, record: DailyLogRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn reset_log(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}

/// Store key for a site fingerprint.
pub fn log_key(fingerprint: &str) -> String {
    let short = fingerprint.get(..16).unwrap_or(fingerprint);
    format!("daily-log-{short}")
}

/// JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileLogStore {
    path: PathBuf,
    records: Vec<DailyLogRecord>,
}

impl FileLogStore {
    /// Open the log stored under `key`, starting empty if it does not exist yet.
    pub fn open<P: AsRef<Path>>(dir: P, key: &str) -> Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        let path = dir.as_ref().join(format!("{key}.json"));
        let records = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        log::info!(
            "[LOAD] Daily log {} with {} records",
            path.display(),
            records.len()
        );
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, records: &[DailyLogRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl DailyLogStore for FileLogStore {
    fn records(&self) -> &[DailyLogRecord] {
        &self.records
    }

    fn add_record(&mut self, record: DailyLogRecord) -> Result<()> {
        let mut next = self.records.clone();
        next.push(record);
        self.save(&next)?;
        self.records = next;
        Ok(())
    }

    fn reset_log(&mut self) -> Result<()> {
        self.save(&[])?;
        self.records.clear();
        Ok(())
    }
}
