use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::csv::{from_csv, to_csv};
use super::records::RecordStore;
use crate::error::{Result, StoreError};

/// Files above this size are rejected before being read.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
/// Suggested stem for "Save as" when nothing has been saved yet.
const DEFAULT_FILE_STEM: &str = "jornadas";

/// Result of an operation that reads a file into the store.
#[derive(Debug)]
pub enum OpenOutcome {
    Loaded { path: PathBuf, records: usize },
    /// The user dismissed the path prompt. Nothing changed.
    Cancelled,
    Failed(StoreError),
}

/// Result of an operation that writes a file.
#[derive(Debug)]
pub enum SaveOutcome {
    Written(PathBuf),
    /// The user dismissed the path prompt. Nothing changed.
    Cancelled,
    Failed(StoreError),
}

/// A record store bound to the file it was opened from or last saved to.
///
/// File-system interactions take `Option<&Path>`: `None` stands for a prompt
/// the user dismissed and always yields a `Cancelled` outcome. On any failure
/// the store, the dirty flag and the current path are left as they were.
#[derive(Debug, Default)]
pub struct Document {
    store: RecordStore,
    path: Option<PathBuf>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name shown in the UI banner.
    pub fn display_name(&self) -> Option<String> {
        self.path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
    }

    /// Suggested target for "Save as": the current file name or a default.
    pub fn default_save_name(&self) -> String {
        self.display_name()
            .unwrap_or_else(|| format!("{DEFAULT_FILE_STEM}.json"))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.is_dirty()
    }

    /// Load a JSON file, replacing the current records.
    pub fn open(&mut self, target: Option<&Path>) -> OpenOutcome {
        let Some(path) = target else {
            info!("open cancelled");
            return OpenOutcome::Cancelled;
        };

        let result = read_checked(path, "json").and_then(|raw| self.store.load(&raw));
        match result {
            Ok(records) => {
                info!("opened {} ({records} records)", path.display());
                self.path = Some(path.to_path_buf());
                OpenOutcome::Loaded {
                    path: path.to_path_buf(),
                    records,
                }
            }
            Err(err) => {
                warn!("failed to open {}: {err}", path.display());
                OpenOutcome::Failed(err)
            }
        }
    }

    /// Create an empty JSON file at `target` and make it the current file.
    pub fn create_new(&mut self, target: Option<&Path>) -> SaveOutcome {
        let Some(path) = target else {
            info!("new file cancelled");
            return SaveOutcome::Cancelled;
        };

        let path = with_json_extension(path);
        let empty = RecordStore::new().serialize();
        match write_atomic(&path, &empty) {
            Ok(()) => {
                info!("created {}", path.display());
                self.store.clear();
                self.path = Some(path.clone());
                SaveOutcome::Written(path)
            }
            Err(err) => {
                warn!("failed to create {}: {err}", path.display());
                SaveOutcome::Failed(err)
            }
        }
    }

    /// Write the records back to the current file.
    pub fn save(&mut self) -> SaveOutcome {
        let Some(path) = self.path.clone() else {
            return SaveOutcome::Failed(StoreError::NoFileSelected);
        };
        self.write_json(path)
    }

    /// Write the records to a new file, which becomes the current one.
    pub fn save_as(&mut self, target: Option<&Path>) -> SaveOutcome {
        let Some(path) = target else {
            info!("save as cancelled");
            return SaveOutcome::Cancelled;
        };
        self.write_json(with_json_extension(path))
    }

    pub fn export_csv(&self, target: Option<&Path>) -> SaveOutcome {
        let Some(path) = target else {
            info!("CSV export cancelled");
            return SaveOutcome::Cancelled;
        };
        if self.store.is_empty() {
            return SaveOutcome::Failed(StoreError::EmptyDataset);
        }

        let path = with_extension_if_missing(path, "csv");
        match write_atomic(&path, &to_csv(self.store.records())) {
            Ok(()) => {
                info!("exported {} records to {}", self.store.len(), path.display());
                SaveOutcome::Written(path)
            }
            Err(err) => {
                warn!("CSV export to {} failed: {err}", path.display());
                SaveOutcome::Failed(err)
            }
        }
    }

    /// Replace the records with the contents of a CSV file. The current JSON
    /// path is kept, and the store is left dirty until the next save.
    pub fn import_csv(&mut self, target: Option<&Path>) -> OpenOutcome {
        let Some(path) = target else {
            info!("CSV import cancelled");
            return OpenOutcome::Cancelled;
        };

        match read_checked(path, "csv").and_then(|text| from_csv(&text)) {
            Ok(records) => {
                let count = records.len();
                info!("imported {count} records from {}", path.display());
                self.store.replace(records);
                OpenOutcome::Loaded {
                    path: path.to_path_buf(),
                    records: count,
                }
            }
            Err(err) => {
                warn!("CSV import from {} failed: {err}", path.display());
                OpenOutcome::Failed(err)
            }
        }
    }

    fn write_json(&mut self, path: PathBuf) -> SaveOutcome {
        if self.store.is_empty() {
            return SaveOutcome::Failed(StoreError::EmptyDataset);
        }

        match write_atomic(&path, &self.store.serialize()) {
            Ok(()) => {
                info!("saved {} records to {}", self.store.len(), path.display());
                self.store.mark_clean();
                self.path = Some(path.clone());
                SaveOutcome::Written(path)
            }
            Err(err) => {
                warn!("failed to save {}: {err}", path.display());
                SaveOutcome::Failed(err)
            }
        }
    }
}

/// Extension and size checks that must pass before any byte is read.
pub fn check_file(path: &Path, expected: &'static str) -> Result<()> {
    let matches = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(expected))
        .unwrap_or(false);
    if !matches {
        return Err(StoreError::UnsupportedFileType { expected });
    }

    let size = fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(StoreError::SizeLimit {
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Read a JSON or CSV document as UTF-8 after `check_file`.
pub fn read_checked(path: &Path, expected: &'static str) -> Result<String> {
    check_file(path, expected)?;
    Ok(fs::read_to_string(path)?)
}

/// Append `.json` unless the name already ends with it.
pub fn with_json_extension(path: &Path) -> PathBuf {
    with_extension_if_missing(path, "json")
}

fn with_extension_if_missing(path: &Path, ext: &str) -> PathBuf {
    let has_ext = path
        .extension()
        .map(|current| current.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false);
    if has_ext {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }
}

/// Write through a sibling temporary file and rename it over the target so
/// an interrupted write never truncates the previous contents.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let written = fs::write(&tmp, contents).and_then(|()| fs::rename(&tmp, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_extension_is_appended_once() {
        assert_eq!(with_json_extension(Path::new("liga")), PathBuf::from("liga.json"));
        assert_eq!(with_json_extension(Path::new("liga.JSON")), PathBuf::from("liga.JSON"));
        assert_eq!(
            with_json_extension(Path::new("liga.2024")),
            PathBuf::from("liga.2024.json")
        );
    }

    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory at the temp path makes the write itself fail.
        let target = dir.path().join("liga.json");
        fs::create_dir(dir.path().join("liga.json.tmp")).unwrap();
        fs::write(dir.path().join("liga.json.tmp").join("keep"), "x").unwrap();

        assert!(write_atomic(&target, "[]").is_err());
        assert!(!target.exists());

        // A directory at the target makes the rename fail; the temp is removed.
        let blocked = dir.path().join("ocupado.json");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), "x").unwrap();
        assert!(write_atomic(&blocked, "[]").is_err());
        assert!(!dir.path().join("ocupado.json.tmp").exists());
    }

    #[test]
    fn default_save_name_falls_back() {
        let doc = Document::new();
        assert_eq!(doc.default_save_name(), "jornadas.json");
    }

    #[test]
    fn save_without_a_file_is_refused() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.save(),
            SaveOutcome::Failed(StoreError::NoFileSelected)
        ));
    }
}
