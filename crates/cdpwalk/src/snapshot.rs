//! Snapshot persistence and baseline comparison.
//!
//! Each run overwrites `current.csv`; `baseline.csv` is seeded on the first
//! run and never silently overwritten afterwards. The diff is line-level,
//! not field-level: any single-character difference in a row surfaces it in
//! both sections.

use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, WriterBuilder};

use cdpwalk_core::types::VisitRecord;

pub const SNAPSHOT_HEADER: [&str; 6] = ["name", "ip", "remote", "model", "description", "error"];

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Lines that differ between the baseline and current snapshots.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Present in baseline, missing verbatim from current.
    pub removed: Vec<String>,
    /// Present in current, missing verbatim from baseline.
    pub added: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Writes the per-run snapshots and diffs them against the baseline.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Root the store at `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn current_path(&self) -> PathBuf {
        self.dir.join("current.csv")
    }

    pub fn baseline_path(&self) -> PathBuf {
        self.dir.join("baseline.csv")
    }

    /// Write the current snapshot, seed the baseline if absent, and return
    /// the line-level differences between the two.
    pub fn save(&self, inventory: &[VisitRecord]) -> Result<SnapshotDiff, SnapshotError> {
        write_snapshot(&self.current_path(), inventory)?;

        let baseline = self.baseline_path();
        if !baseline.is_file() {
            tracing::info!(path = %baseline.display(), "No baseline snapshot, creating one");
            write_snapshot(&baseline, inventory)?;
        }

        let baseline_lines = read_lines(&baseline)?;
        let current_lines = read_lines(&self.current_path())?;

        Ok(SnapshotDiff {
            removed: baseline_lines
                .iter()
                .filter(|line| !current_lines.contains(line))
                .cloned()
                .collect(),
            added: current_lines
                .iter()
                .filter(|line| !baseline_lines.contains(line))
                .cloned()
                .collect(),
        })
    }
}

fn write_snapshot(path: &Path, inventory: &[VisitRecord]) -> Result<(), SnapshotError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)?;

    writer.write_record(SNAPSHOT_HEADER)?;
    for record in inventory {
        let error = record.error_text().unwrap_or_default();
        writer.write_record([
            record.org_name.as_str(),
            record.ip.as_str(),
            record.capability.as_str(),
            record.model.as_str(),
            record.description.as_str(),
            error.as_str(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

fn read_lines(path: &Path) -> Result<Vec<String>, SnapshotError> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use cdpwalk_core::types::QueryDisposition;

    use super::*;

    fn record(name: &str, ip: &str, description: &str) -> VisitRecord {
        VisitRecord {
            name: name.to_string(),
            org_name: name.to_string(),
            ip: ip.to_string(),
            capability: "edge".to_string(),
            model: "ModelX".to_string(),
            description: description.to_string(),
            disposition: QueryDisposition::Direct,
            dns_note: None,
        }
    }

    #[test]
    fn first_run_seeds_baseline_and_diff_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        let inventory = vec![record("sw1", "10.1.1.1", "DescA")];
        let diff = store.save(&inventory).unwrap();

        assert!(diff.is_empty());
        assert!(store.baseline_path().is_file());
        assert_eq!(
            fs::read_to_string(store.baseline_path()).unwrap(),
            fs::read_to_string(store.current_path()).unwrap()
        );
    }

    #[test]
    fn changed_row_appears_in_both_sections() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        store.save(&[record("sw1", "10.1.1.1", "DescA")]).unwrap();
        let diff = store.save(&[record("sw1", "10.1.1.1", "DescB")]).unwrap();

        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.added.len(), 1);
        assert!(diff.removed[0].contains("DescA"));
        assert!(diff.added[0].contains("DescB"));
    }

    #[test]
    fn baseline_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        store.save(&[record("sw1", "10.1.1.1", "DescA")]).unwrap();
        let before = fs::read_to_string(store.baseline_path()).unwrap();

        store.save(&[record("sw2", "10.1.1.2", "DescB")]).unwrap();
        let after = fs::read_to_string(store.baseline_path()).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn unchanged_inventory_diffs_empty_on_second_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        let inventory = vec![
            record("sw1", "10.1.1.1", "DescA"),
            record("sw2", "10.1.1.2", "DescB"),
        ];
        store.save(&inventory).unwrap();
        let diff = store.save(&inventory).unwrap();

        assert!(diff.is_empty());
    }

    #[test]
    fn every_field_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        store.save(&[record("sw1", "10.1.1.1", "DescA")]).unwrap();
        let contents = fs::read_to_string(store.current_path()).unwrap();
        let mut lines = contents.lines();

        assert_eq!(
            lines.next().unwrap(),
            "\"name\",\"ip\",\"remote\",\"model\",\"description\",\"error\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"sw1\",\"10.1.1.1\",\"edge\",\"ModelX\",\"DescA\",\"\""
        );
    }

    #[test]
    fn error_column_carries_rendered_notes() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path()).unwrap();

        let mut rec = record("sw1", "10.1.1.1", "DescA");
        rec.disposition = QueryDisposition::IpFallback;
        rec.dns_note = Some("hostname not in DNS".to_string());
        store.save(&[rec]).unwrap();

        let contents = fs::read_to_string(store.current_path()).unwrap();
        assert!(contents.contains("\"Failed to connect by Name; hostname not in DNS\""));
    }
}
