// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode GeoJSON in {path}: {source}")]
    GeoJson {
        path: String,
        source: serde_json::Error,
    },

    #[error("No panel geometry found in {0}")]
    NoPanels(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Daily log store error: {0}")]
    Store(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
