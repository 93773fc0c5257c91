//! JSON-lines session files for trips and fines.
//!
//! Sessions are stored as `<base>/<YYYY-MM-DD>/session_<HHMMSS>.jsonl`, one
//! record per line.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::dashboard::{FineRecord, TripRecord};
use crate::error::Result;

/// One line of a session file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionRecord {
    Trip(TripRecord),
    Fine(FineRecord),
}

pub struct SessionManager {
    base_dir: PathBuf,
    current_session: Option<PathBuf>,
}

impl SessionManager {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            current_session: None,
        }
    }

    pub fn start_session(&mut self) -> Result<PathBuf> {
        let now: DateTime<Local> = Local::now();
        let session_dir = self.base_dir.join(now.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&session_dir)?;

        let session_file = session_dir.join(format!("session_{}.jsonl", now.format("%H%M%S")));
        self.current_session = Some(session_file.clone());

        Ok(session_file)
    }

    /// Append a record to the current session. Does nothing before
    /// [`start_session`](Self::start_session).
    pub fn append(&self, record: &SessionRecord) -> Result<()> {
        if let Some(ref path) = self.current_session {
            let line = serde_json::to_string(record)?;
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn current_session_path(&self) -> Option<&Path> {
        self.current_session.as_deref()
    }
}

/// Read every record of a session file
pub fn load_session<P: AsRef<Path>>(path: P) -> Result<Vec<SessionRecord>> {
    let content = fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Ok(serde_json::from_str::<SessionRecord>(line)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn fine_record() -> FineRecord {
        FineRecord {
            received_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            offence: "Speeding".to_string(),
            amount: 500,
        }
    }

    fn trip_record() -> TripRecord {
        TripRecord {
            finished_at: Utc.timestamp_opt(1_700_000_600, 0).unwrap(),
            source: "Praha".to_string(),
            destination: "Berlin".to_string(),
            cargo: "Chemicals".to_string(),
            income: 4200,
            distance_km: 350,
        }
    }

    #[test]
    fn test_append_before_start_is_noop() {
        let temp = tempfile::tempdir().unwrap();
        let manager = SessionManager::new(temp.path());
        manager
            .append(&SessionRecord::Fine(fine_record()))
            .unwrap();
        assert!(manager.current_session_path().is_none());
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_session_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let mut manager = SessionManager::new(temp.path());
        let path = manager.start_session().unwrap();

        manager
            .append(&SessionRecord::Trip(trip_record()))
            .unwrap();
        manager
            .append(&SessionRecord::Fine(fine_record()))
            .unwrap();

        assert!(path.starts_with(temp.path()));
        assert_eq!(path.extension().unwrap(), "jsonl");

        let records = load_session(&path).unwrap();
        assert_eq!(
            records,
            vec![
                SessionRecord::Trip(trip_record()),
                SessionRecord::Fine(fine_record())
            ]
        );
    }

    #[test]
    fn test_record_tagged_by_kind() {
        let line = serde_json::to_string(&SessionRecord::Fine(fine_record())).unwrap();
        assert!(line.starts_with(r#"{"kind":"fine","#));
    }
}
