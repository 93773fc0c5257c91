//! Totals over all recorded sessions.

use std::path::Path;

use anyhow::{Context, Result};
use ets2_tracker_core::{HistoryStats, load_history};
use owo_colors::OwoColorize;

/// Print totals for every session under `session_dir`
pub fn run(session_dir: &Path) -> Result<()> {
    let records = match load_history(session_dir) {
        Ok(records) => records,
        Err(e) if e.is_not_found() => {
            println!("No sessions recorded in {}", session_dir.display());
            return Ok(());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading sessions in {}", session_dir.display()));
        }
    };

    let stats = HistoryStats::from_records(&records);
    println!("{}", "History".bold());
    for line in report(&stats) {
        println!("{}", line);
    }
    Ok(())
}

fn report(stats: &HistoryStats) -> Vec<String> {
    let mut lines = vec![
        format!("Level        {}", stats.level()),
        format!("Distance     {} km", stats.total_km),
        format!("Loads        {}", stats.loads),
        format!("Income       {} €", stats.income),
        format!("Fines        {} ({} € paid)", stats.fines, stats.fines_paid),
    ];

    if !stats.months.is_empty() {
        lines.push(String::new());
        for month in &stats.months {
            lines.push(format!(
                "{}  {:>6} km  {:>3} loads  {:>8} €",
                month.month, month.km, month.loads, month.income
            ));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ets2_tracker_core::{FineRecord, SessionManager, SessionRecord, TripRecord, load_history};

    #[test]
    fn test_report_from_recorded_session() {
        let temp = tempfile::tempdir().unwrap();
        let mut manager = SessionManager::new(temp.path());
        manager.start_session().unwrap();

        for (month, km, income) in [(1, 600, 5000), (2, 700, 6100)] {
            manager
                .append(&SessionRecord::Trip(TripRecord {
                    finished_at: Utc.with_ymd_and_hms(2024, month, 10, 12, 0, 0).unwrap(),
                    source: "Lyon".to_string(),
                    destination: "Milano".to_string(),
                    cargo: "Cheese".to_string(),
                    income,
                    distance_km: km,
                }))
                .unwrap();
        }
        manager
            .append(&SessionRecord::Fine(FineRecord {
                received_at: Utc.with_ymd_and_hms(2024, 2, 10, 13, 0, 0).unwrap(),
                offence: "Red light".to_string(),
                amount: 250,
            }))
            .unwrap();

        let stats = HistoryStats::from_records(&load_history(temp.path()).unwrap());
        let lines = report(&stats);

        assert_eq!(lines[0], "Level        Amateur");
        assert_eq!(lines[1], "Distance     1300 km");
        assert_eq!(lines[2], "Loads        2");
        assert_eq!(lines[3], "Income       11100 €");
        assert_eq!(lines[4], "Fines        1 (250 € paid)");
        assert!(lines[6].starts_with("2024-02"));
        assert!(lines[7].starts_with("2024-01"));
    }

    #[test]
    fn test_report_without_trips() {
        let lines = report(&HistoryStats::default());
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Level        Beginner");
    }

    #[test]
    fn test_run_missing_dir_is_ok() {
        let temp = tempfile::tempdir().unwrap();
        assert!(run(&temp.path().join("sessions")).is_ok());
    }
}
