use crate::model::{EarthquakeRecord, RecordSnapshot};
use crate::prelude::QuakeResult;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Receives every record exactly once, when it is retired.
pub trait Archive: Send + Sync {
    fn archive(&self, record: &EarthquakeRecord) -> QuakeResult<()>;
}

/// Keeps retired snapshots in memory.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    records: Mutex<Vec<RecordSnapshot>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RecordSnapshot> {
        self.records.lock().clone()
    }
}

impl Archive for MemoryArchive {
    fn archive(&self, record: &EarthquakeRecord) -> QuakeResult<()> {
        self.records.lock().push(record.snapshot());
        Ok(())
    }
}

/// Appends one JSON document per retired record.
#[derive(Debug)]
pub struct JsonLinesArchive {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesArchive {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Archive for JsonLinesArchive {
    fn archive(&self, record: &EarthquakeRecord) -> QuakeResult<()> {
        let mut line = serde_json::to_vec(&record.snapshot())?;
        line.push(b'\n');
        let _guard = self.write_lock.lock();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Coordinate;
    use crate::model::{CandidateHypocenter, Cluster, Hypocenter};
    use std::sync::Arc;

    fn record(id: u64) -> EarthquakeRecord {
        let cluster = Arc::new(Cluster::new(1, Coordinate::new(0.0, 0.0)));
        let hyp = Hypocenter::from_candidate(&CandidateHypocenter::default(), 4);
        EarthquakeRecord::new(id, &cluster, &hyp, 0)
    }

    #[test]
    fn json_lines_archive_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let archive = JsonLinesArchive::new(dir.path().join("archive/quakes.jsonl"));
        archive.archive(&record(1)).unwrap();
        archive.archive(&record(2)).unwrap();

        let contents = std::fs::read_to_string(archive.path()).unwrap();
        let lines: Vec<RecordSnapshot> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].id, 2);
    }

    #[test]
    fn memory_archive_keeps_snapshots() {
        let archive = MemoryArchive::new();
        archive.archive(&record(7)).unwrap();
        assert_eq!(archive.records()[0].id, 7);
    }
}
