//! Append-only trial data store: one `_info.csv` / `_data.csv` / `_log.csv`
//! set per experiment run. This crate is the sole writer of those files.
//! Filesystem errors are never swallowed; data integrity matters more than
//! continuing after an I/O fault.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header of the per-trial results file.
pub const DATA_HEADER: &str = "trial,cued,response";
/// Header of the timestamped event log.
pub const LOG_HEADER: &str = "time,event";

/// Owns the open file handles of one run. Every row is flushed as soon as
/// it is written so an abort or crash never loses completed trials.
#[derive(Debug)]
pub struct RunFiles {
    prefix: PathBuf,
    data: File,
    log: File,
}

impl RunFiles {
    /// Creates the output folder if absent, writes the metadata file and
    /// the two headers, and leaves the data and log files open for
    /// appending.
    pub fn create(folder: &Path, stem: &str, info: &[(String, String)]) -> Result<Self> {
        std::fs::create_dir_all(folder)
            .with_context(|| format!("creating data folder {}", folder.display()))?;
        let prefix = folder.join(stem);

        let info_path = with_suffix(&prefix, "_info.csv");
        let mut info_file = File::create(&info_path)
            .with_context(|| format!("creating {}", info_path.display()))?;
        for (key, value) in info {
            writeln!(info_file, "\"{}\",\"{}\"", key, value)?;
        }
        info_file.flush()?;

        let data_path = with_suffix(&prefix, "_data.csv");
        let mut data = File::create(&data_path)
            .with_context(|| format!("creating {}", data_path.display()))?;
        writeln!(data, "{}", DATA_HEADER)?;
        data.flush()?;

        let log_path = with_suffix(&prefix, "_log.csv");
        let mut log = File::create(&log_path)
            .with_context(|| format!("creating {}", log_path.display()))?;
        writeln!(log, "{}", LOG_HEADER)?;
        log.flush()?;

        Ok(Self { prefix, data, log })
    }

    /// Appends one event row and echoes it to the console log.
    pub fn log_event(&mut self, time: f64, event: &str) -> Result<()> {
        writeln!(self.log, "{:.3},\"{}\"", time, event)?;
        self.log.flush()?;
        log::info!("LOG: {:.3} {}", time, event);
        Ok(())
    }

    pub fn log_abort(&mut self, time: f64) -> Result<()> {
        self.log_event(time, "experiment aborted")
    }

    /// Appends one comma-joined results row.
    pub fn write_trial(&mut self, fields: &[String]) -> Result<()> {
        writeln!(self.data, "{}", fields.join(","))?;
        self.data.flush()?;
        Ok(())
    }

    /// Final flush of both open files, called when the run ends or aborts.
    /// Rows are also flushed as they are written, so this is the last
    /// chance to surface an I/O fault rather than the only durability
    /// barrier.
    pub fn close(&mut self) -> Result<()> {
        self.data.flush()?;
        self.log.flush()?;
        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        with_suffix(&self.prefix, "_data.csv")
    }

    pub fn log_path(&self) -> PathBuf {
        with_suffix(&self.prefix, "_log.csv")
    }

    pub fn info_path(&self) -> PathBuf {
        with_suffix(&self.prefix, "_info.csv")
    }
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    prefix.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> Vec<(String, String)> {
        vec![
            ("Experiment name".to_string(), "TC-test".to_string()),
            ("Participant Code".to_string(), "P01".to_string()),
        ]
    }

    #[test]
    fn creates_all_three_files_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let files = RunFiles::create(dir.path(), "TC-test_2026_P01", &info()).unwrap();

        let info_text = std::fs::read_to_string(files.info_path()).unwrap();
        assert!(info_text.contains("\"Experiment name\",\"TC-test\""));
        assert!(info_text.contains("\"Participant Code\",\"P01\""));

        let data_text = std::fs::read_to_string(files.data_path()).unwrap();
        assert_eq!(data_text, "trial,cued,response\n");

        let log_text = std::fs::read_to_string(files.log_path()).unwrap();
        assert_eq!(log_text, "time,event\n");
    }

    #[test]
    fn creates_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("session");
        RunFiles::create(&nested, "run", &[]).unwrap();
        assert!(nested.join("run_data.csv").exists());
    }

    #[test]
    fn trial_row_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = RunFiles::create(dir.path(), "run", &[]).unwrap();
        files
            .write_trial(&["3".to_string(), "love".to_string(), "timeout".to_string()])
            .unwrap();

        let text = std::fs::read_to_string(files.data_path()).unwrap();
        let last = text.lines().last().unwrap();
        let fields: Vec<&str> = last.split(',').collect();
        assert_eq!(fields, vec!["3", "love", "timeout"]);
    }

    #[test]
    fn close_leaves_all_rows_readable() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = RunFiles::create(dir.path(), "run", &[]).unwrap();
        files
            .write_trial(&["1".to_string(), "love".to_string(), "love".to_string()])
            .unwrap();
        files.log_event(1.0, "1 of 1 complete").unwrap();
        files.close().unwrap();

        let data = std::fs::read_to_string(files.data_path()).unwrap();
        assert_eq!(data.lines().count(), 2);
        let log = std::fs::read_to_string(files.log_path()).unwrap();
        assert_eq!(log.lines().last().unwrap(), "1.000,\"1 of 1 complete\"");
    }

    #[test]
    fn log_rows_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = RunFiles::create(dir.path(), "run", &[]).unwrap();
        files.log_event(0.0, "experiment started").unwrap();
        files.log_event(6.25, "toucher cue love").unwrap();
        files.log_abort(7.5).unwrap();

        let text = std::fs::read_to_string(files.log_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "0.000,\"experiment started\"");
        assert_eq!(lines[2], "6.250,\"toucher cue love\"");
        assert_eq!(lines[3], "7.500,\"experiment aborted\"");
        assert_eq!(lines.len(), 4);
    }
}
