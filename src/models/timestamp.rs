use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Variable;
use crate::utils::constants::CHUNK_EXTENSION;

/// How year/month/day/hour are rendered when rebuilding chunk filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Padding {
    /// `salt_2011_9_13_0_`
    #[default]
    Unpadded,
    /// `salt_2011_09_13_00_`
    ZeroPadded,
    /// Pick whichever convention is present on disk, per timestamp
    Detect,
}

/// One (year, month, day, hour) collection of chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(year: i32, month: u32, day: u32, hour: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .map(Timestamp)
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(datetime)
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
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

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Metadata key, always unpadded: `2011-9-13-0`
    pub fn key(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            self.year(),
            self.month(),
            self.day(),
            self.hour()
        )
    }

    /// Filename stem shared by every chunk of this timestamp, without the index.
    ///
    /// `Padding::Detect` is rendered unpadded; resolve it against the directory first.
    pub fn chunk_stem(&self, variable: Variable, padding: Padding) -> String {
        match padding {
            Padding::ZeroPadded => format!(
                "{}_{}_{:02}_{:02}_{:02}",
                variable.file_token(),
                self.year(),
                self.month(),
                self.day(),
                self.hour()
            ),
            Padding::Unpadded | Padding::Detect => format!(
                "{}_{}_{}_{}_{}",
                variable.file_token(),
                self.year(),
                self.month(),
                self.day(),
                self.hour()
            ),
        }
    }

    pub fn chunk_file_name(&self, variable: Variable, padding: Padding, index: usize) -> String {
        format!(
            "{}_{}{}",
            self.chunk_stem(variable, padding),
            index,
            CHUNK_EXTENSION
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
