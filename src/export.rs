// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use csv::Writer;
use serde::Serialize;
use std::fs::File;
use std::io::Write;

use crate::daily_log::DailyLogRecord;
use crate::error::Result;

#[derive(Debug, Serialize)]
pub struct DailyLogCsvRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Installed Panels")]
    pub installed_panels: usize,
    #[serde(rename = "Daily Increase")]
    pub daily_increase: i64,
    #[serde(rename = "Subcontractor")]
    pub subcontractor: String,
    #[serde(rename = "Workers")]
    pub workers: u32,
}

/// Rows in chronological order, each with the increase over the previous row.
pub fn daily_log_rows(records: &[DailyLogRecord]) -> Vec<DailyLogCsvRecord> {
    let mut sorted: Vec<&DailyLogRecord> = records.iter().collect();
    // Stable: same-day submissions keep their order.
    sorted.sort_by_key(|r| r.date);

    let mut previous = 0i64;
    sorted
        .into_iter()
        .map(|record| {
            let installed = record.installed_panels as i64;
            let row = DailyLogCsvRecord {
                date: record.date.to_string(),
                installed_panels: record.installed_panels,
                daily_increase: installed - previous,
                subcontractor: record.subcontractor.clone(),
                workers: record.workers,
            };
            previous = installed;
            row
        })
        .collect()
}

/// Write the daily log as CSV to any writer.
pub fn write_daily_log_csv<W: Write>(records: &[DailyLogRecord], out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    for row in daily_log_rows(records) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Export the daily log to a CSV file
pub fn export_daily_log_to_csv(records: &[DailyLogRecord], file_path: &str) -> Result<()> {
    let file = File::create(file_path)?;
    write_daily_log_csv(records, file)?;
    log::info!(
        "[PASS] Exported {} daily log records to {file_path}",
        records.len()
    );
    Ok(())
}
