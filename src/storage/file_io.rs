//! File I/O utilities with atomic writes
//!
//! Provides safe file operations that won't corrupt data on failure.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Longest file name, in bytes, accepted by common filesystems
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> LedgerResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| LedgerError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| LedgerError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write a file atomically: `fill` writes into a temp sibling which is
/// synced and renamed over `path` only if every step succeeds
pub fn write_atomic<P, F>(path: P, fill: F) -> LedgerResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> LedgerResult<()>,
{
    let path = path.as_ref();

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = temp_path_for(path);
    check_file_name(&temp_path)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let result = (|| {
        let file = File::create(&temp_path)
            .map_err(|e| LedgerError::Storage(format!("Failed to create temp file: {}", e)))?;

        let mut writer = BufWriter::new(file);
        fill(&mut writer)?;

        writer
            .flush()
            .map_err(|e| LedgerError::Storage(format!("Failed to flush data: {}", e)))?;

        writer
            .get_ref()
            .sync_all()
            .map_err(|e| LedgerError::Storage(format!("Failed to sync data: {}", e)))?;

        fs::rename(&temp_path, path)
            .map_err(|e| LedgerError::Storage(format!("Failed to rename temp file: {}", e)))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Reject file names longer than [`MAX_FILE_NAME_BYTES`]
///
/// Over-long names are a validation error, not a storage error.
pub fn check_file_name(path: &Path) -> LedgerResult<()> {
    match path.file_name() {
        Some(name) if name.len() <= MAX_FILE_NAME_BYTES => Ok(()),
        Some(name) => Err(LedgerError::Validation(format!(
            "file name is {} bytes, longer than {}: {}",
            name.len(),
            MAX_FILE_NAME_BYTES,
            path.display()
        ))),
        None => Err(LedgerError::Validation(format!(
            "not a file path: {}",
            path.display()
        ))),
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> LedgerResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, data)
            .map_err(|e| LedgerError::Storage(format!("Failed to serialize data: {}", e)))
    })
}

/// Write serializable rows as CSV atomically, with a header from the row type
pub fn write_csv_atomic<T, P, I>(path: P, rows: I) -> LedgerResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
    I: IntoIterator<Item = T>,
{
    write_atomic(path, |writer| {
        let mut csv_writer = csv::Writer::from_writer(&mut *writer);
        for row in rows {
            csv_writer
                .serialize(row)
                .map_err(|e| LedgerError::Storage(format!("Failed to write row: {}", e)))?;
        }
        csv_writer
            .flush()
            .map_err(|e| LedgerError::Storage(format!("Failed to flush rows: {}", e)))
    })
}

/// Write string records under an explicit header atomically
pub fn write_records_atomic<P>(path: P, headers: &[String], records: &[Vec<String>]) -> LedgerResult<()>
where
    P: AsRef<Path>,
{
    write_atomic(path, |writer| {
        let mut csv_writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(&mut *writer);
        csv_writer
            .write_record(headers)
            .map_err(|e| LedgerError::Storage(format!("Failed to write header: {}", e)))?;
        for record in records {
            csv_writer
                .write_record(record)
                .map_err(|e| LedgerError::Storage(format!("Failed to write row: {}", e)))?;
        }
        csv_writer
            .flush()
            .map_err(|e| LedgerError::Storage(format!("Failed to flush rows: {}", e)))
    })
}

/// Every regular file under `dir`, recursively, sorted by path
pub fn list_files_recursive<P: AsRef<Path>>(dir: P) -> LedgerResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.as_ref().to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|e| {
            LedgerError::Io(format!("Failed to list {}: {}", current.display(), e))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                LedgerError::Io(format!("Failed to list {}: {}", current.display(), e))
            })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Regular files directly inside `dir`, sorted by path
pub fn list_files<P: AsRef<Path>>(dir: P) -> LedgerResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir)
        .map_err(|e| LedgerError::Io(format!("Failed to list {}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| LedgerError::Io(format!("Failed to list {}: {}", dir.display(), e)))?
            .path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let data: TestData = read_json(&path).unwrap();
        assert_eq!(data, TestData::default());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_json_atomic(&path, &data).unwrap();
        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(data, loaded);
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.csv");

        write_csv_atomic(
            &path,
            vec![TestData {
                name: "a".into(),
                value: 1,
            }],
        )
        .unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("ledger.csv.tmp").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,value\na,1\n");
    }

    #[test]
    fn test_failed_fill_leaves_nothing_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ledger.csv");
        fs::write(&path, "old").unwrap();

        let result = write_atomic(&path, |_| Err(LedgerError::Storage("boom".into())));
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert!(!temp_dir.path().join("ledger.csv.tmp").exists());
    }

    #[test]
    fn test_overlong_file_name_is_validation_error() {
        let temp_dir = TempDir::new().unwrap();
        // 252 bytes plus ".tmp" is one over the limit
        let path = temp_dir.path().join(format!("{}.csv", "l".repeat(248)));

        let err = write_csv_atomic(&path, Vec::<TestData>::new()).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(!err.is_fatal());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);

        let fits = temp_dir.path().join(format!("{}.csv", "l".repeat(247)));
        assert!(check_file_name(&temp_path_for(&fits)).is_ok());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.json");

        write_json_atomic(&path, &TestData::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_records_keeps_header() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slice.csv");
        let headers = vec!["Data".to_string(), "Valor".to_string()];
        let records = vec![vec!["05/01/2023".to_string(), "1,50".to_string()]];

        write_records_atomic(&path, &headers, &records).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Data,Valor\n05/01/2023,\"1,50\"\n"
        );
    }

    #[test]
    fn test_list_files_recursive_sorted() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("b")).unwrap();
        fs::write(temp_dir.path().join("c.csv"), "").unwrap();
        fs::write(temp_dir.path().join("b").join("a.csv"), "").unwrap();

        let files = list_files_recursive(temp_dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                temp_dir.path().join("b").join("a.csv"),
                temp_dir.path().join("c.csv")
            ]
        );

        let top = list_files(temp_dir.path()).unwrap();
        assert_eq!(top, vec![temp_dir.path().join("c.csv")]);
    }

    #[test]
    fn test_list_missing_dir_is_io() {
        let temp_dir = TempDir::new().unwrap();
        let err = list_files_recursive(temp_dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
