//! CSV persistence for calculation history.
//!
//! One row per record, mandatory header, values rendered as strings:
//! `operation,operand1,operand2,result,timestamp`. Writes are atomic (temp
//! file + rename) and parent directories are created as needed. A missing
//! file is not an error; a header-only file is an empty history.

use std::fs;
use std::path::{Path, PathBuf};

use crate::calculation::Calculation;
use crate::error::{CalcError, CalcResult};

const HEADER: &str = "operation,operand1,operand2,result,timestamp";

/// Save/load adapter bound to one history file path.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the history and write it atomically.
    ///
    /// An empty history produces a file containing only the column header.
    pub fn save(&self, history: &[Calculation]) -> CalcResult<()> {
        let mut contents = String::with_capacity(64 * (history.len() + 1));
        contents.push_str(HEADER);
        contents.push('\n');
        for record in history {
            // None of the rendered fields can contain a comma or newline, so
            // no quoting is needed.
            contents.push_str(&format!(
                "{},{},{},{},{}\n",
                record.operation,
                record.operand1,
                record.operand2,
                record.result,
                record.timestamp.to_rfc3339()
            ));
        }
        write_atomic(&self.path, contents.as_bytes()).map_err(|e| {
            tracing::error!("Failed to save history to {}: {e}", self.path.display());
            CalcError::operation_with("Failed to save history", e)
        })?;
        tracing::info!(
            "Saved {} records to {}",
            history.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Parse the history file back into records.
    ///
    /// Each row's result is recomputed from its operation and operands (see
    /// [`Calculation::from_record`]); a mismatch with the stored value is
    /// logged and corrected, never fatal. A malformed row fails the whole
    /// load.
    pub fn load(&self) -> CalcResult<Vec<Calculation>> {
        if !self.path.exists() {
            tracing::info!(
                "No history file found at {}; starting with empty history",
                self.path.display()
            );
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            tracing::error!("Failed to read {}: {e}", self.path.display());
            CalcError::operation_with("Failed to load history", e)
        })?;

        let mut lines = raw.lines();
        let Some(header) = lines.next() else {
            tracing::info!("History file {} is empty", self.path.display());
            return Ok(Vec::new());
        };
        if header.trim() != HEADER {
            return Err(CalcError::operation(format!(
                "Failed to load history: unexpected header '{}'",
                header.trim()
            )));
        }

        let mut records = Vec::new();
        for (index, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != 5 {
                return Err(CalcError::operation(format!(
                    "Failed to load history: malformed row {} in {}",
                    index + 2,
                    self.path.display()
                )));
            }
            let record =
                Calculation::from_record(fields[0], fields[1], fields[2], fields[3], fields[4])
                    .map_err(|e| {
                        tracing::error!(
                            "Failed to parse row {} in {}: {e}",
                            index + 2,
                            self.path.display()
                        );
                        CalcError::operation_with("Failed to load history", e)
                    })?;
            records.push(record);
        }

        if records.is_empty() {
            tracing::info!("Loaded empty history from {}", self.path.display());
        } else {
            tracing::info!(
                "Loaded {} records from {}",
                records.len(),
                self.path.display()
            );
        }
        Ok(records)
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("csv.tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::calculation::OperationKind;
    use rust_decimal::Decimal;
    use std::io::Write as _;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> HistoryStore {
        HistoryStore::new(dir.path().join("history").join("calculator_history.csv"))
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let history = vec![
            Calculation::new(OperationKind::Addition, dec("2"), dec("3")).unwrap(),
            Calculation::new(OperationKind::Multiplication, dec("4"), dec("5")).unwrap(),
            Calculation::new(OperationKind::Division, dec("10"), dec("4")).unwrap(),
        ];

        store.save(&history).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, history);
        // Timestamps survive the RFC 3339 round trip exactly.
        assert_eq!(loaded[0].timestamp, history[0].timestamp);
    }

    #[test]
    fn test_save_empty_history_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&[]).unwrap();

        let contents = fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents, format!("{HEADER}\n"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_corrects_result_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let mut file = fs::File::create(store.path()).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "Addition,2,3,10,2024-01-15T10:30:45+00:00").unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].result, dec("5"));
    }

    #[test]
    fn test_load_malformed_row_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let mut file = fs::File::create(store.path()).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "Addition,2,3").unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().starts_with("Failed to load history"));
    }

    #[test]
    fn test_load_bad_operand_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let mut file = fs::File::create(store.path()).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "Addition,junk,3,5,2024-01-15T10:30:45+00:00").unwrap();

        let err = store.load().unwrap_err();
        assert_eq!(err.to_string(), "Failed to load history");
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("a").join("b").join("history.csv"));
        store.save(&[]).unwrap();
        assert!(store.path().exists());
    }
}
