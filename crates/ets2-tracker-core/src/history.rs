//! Totals over every recorded session.
//!
//! Trips are summed overall and per calendar month (UTC, `YYYY-MM`), fines
//! are summed overall, and the total distance maps to a [`DriverLevel`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use strum::{Display, IntoStaticStr};
use tracing::warn;

use crate::error::Result;
use crate::session::{SessionRecord, load_session};

/// Tier earned by total distance driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, IntoStaticStr)]
pub enum DriverLevel {
    /// Under 1 000 km
    Beginner,
    /// Under 5 000 km
    Amateur,
    /// Under 10 000 km
    Trucker,
    /// Under 50 000 km
    #[strum(serialize = "King of the Road")]
    KingOfTheRoad,
    Legend,
}

impl DriverLevel {
    pub fn for_distance(km: u64) -> Self {
        match km {
            0..1_000 => DriverLevel::Beginner,
            1_000..5_000 => DriverLevel::Amateur,
            5_000..10_000 => DriverLevel::Trucker,
            10_000..50_000 => DriverLevel::KingOfTheRoad,
            _ => DriverLevel::Legend,
        }
    }
}

/// Trips finished in one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthStats {
    /// `YYYY-MM`
    pub month: String,
    pub km: u64,
    pub loads: u32,
    pub income: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_km: u64,
    pub loads: u32,
    pub income: i64,
    pub fines: u32,
    pub fines_paid: i64,
    /// Most recent month first
    pub months: Vec<MonthStats>,
}

impl HistoryStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SessionRecord>,
    {
        let mut stats = HistoryStats::default();
        let mut months: BTreeMap<String, MonthStats> = BTreeMap::new();

        for record in records {
            match record {
                SessionRecord::Trip(trip) => {
                    let km = u64::from(trip.distance_km);
                    stats.total_km += km;
                    stats.loads += 1;
                    stats.income = stats.income.saturating_add(trip.income);

                    let key = trip.finished_at.format("%Y-%m").to_string();
                    let month = months.entry(key.clone()).or_insert_with(|| MonthStats {
                        month: key,
                        km: 0,
                        loads: 0,
                        income: 0,
                    });
                    month.km += km;
                    month.loads += 1;
                    month.income = month.income.saturating_add(trip.income);
                }
                SessionRecord::Fine(fine) => {
                    stats.fines += 1;
                    stats.fines_paid = stats.fines_paid.saturating_add(fine.amount);
                }
            }
        }

        stats.months = months.into_values().rev().collect();
        stats
    }

    pub fn level(&self) -> DriverLevel {
        DriverLevel::for_distance(self.total_km)
    }
}

/// Session files under `base_dir`, oldest first
pub fn session_files<P: AsRef<Path>>(base_dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for day in fs::read_dir(base_dir)? {
        let day = day?.path();
        if !day.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&day)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Every record of every session under `base_dir`.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_history<P: AsRef<Path>>(base_dir: P) -> Result<Vec<SessionRecord>> {
    let mut records = Vec::new();
    for file in session_files(base_dir)? {
        match load_session(&file) {
            Ok(mut session) => records.append(&mut session),
            Err(e) => warn!("Skipping {}: {}", file.display(), e),
        }
    }
    Ok(records)
}
