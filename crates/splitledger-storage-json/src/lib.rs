//! splitledger-storage-json
//!
//! Pretty-printed JSON snapshots of ledgers on the local filesystem, with a
//! rotating set of backups per ledger.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use splitledger_core::{
    storage::{ledger_warnings, LedgerBackupInfo, LedgerStorage},
    CoreError,
};
use splitledger_domain::Ledger;

const EXTENSION: &str = "json";
const STAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";
const STAMP_LEN: usize = 17;
const DEFAULT_RETENTION: usize = 5;

/// Where ledger files and their backups live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub ledger_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `<base>/ledgers` and `<base>/backups`.
    pub fn under(base: &Path) -> Self {
        Self {
            ledger_root: base.join("ledgers"),
            backup_root: base.join("backups"),
        }
    }
}

/// Summary of a stored ledger for listings.
#[derive(Debug, Clone)]
pub struct LedgerMetadata {
    pub slug: String,
    pub name: String,
    pub path: PathBuf,
    pub updated_at: DateTime<Utc>,
    pub people: usize,
    pub expenses: usize,
    pub settlements: usize,
}

/// Filesystem-backed JSON persistence for ledgers and their backups.
#[derive(Debug, Clone)]
pub struct JsonLedgerStorage {
    paths: StoragePaths,
    retention: usize,
}

impl JsonLedgerStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    /// Keeps at most `retention` backups per ledger (never fewer than one).
    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.ledger_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.paths
            .ledger_root
            .join(format!("{}.{EXTENSION}", slug(name)))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.ledger_path(name).is_file()
    }

    pub fn list_ledger_metadata(&self) -> Result<Vec<LedgerMetadata>, CoreError> {
        let mut rows = Vec::new();
        for slug in self.list_ledgers()? {
            let path = self.ledger_path(&slug);
            let ledger = read_ledger(&path)?;
            rows.push(LedgerMetadata {
                name: ledger.name.clone(),
                updated_at: ledger.updated_at,
                people: ledger.roster.len(),
                expenses: ledger.expenses.len(),
                settlements: ledger.settlements.len(),
                slug,
                path,
            });
        }
        rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(rows)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.paths.backup_root.join(slug(name))
    }

    /// Copies the current file for `name` (if any) into its backup directory.
    fn snapshot_existing(&self, name: &str) -> Result<(), CoreError> {
        let current = self.ledger_path(name);
        if !current.is_file() {
            return Ok(());
        }
        let path = self.next_backup_path(name, None)?;
        fs::copy(&current, &path)?;
        self.prune(name)
    }

    fn next_backup_path(&self, name: &str, note: Option<&str>) -> Result<PathBuf, CoreError> {
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let mut file_name = format!("{}_{}", slug(name), Utc::now().format(STAMP_FORMAT));
        if let Some(label) = note.and_then(note_label) {
            file_name.push('_');
            file_name.push_str(&label);
        }
        file_name.push('.');
        file_name.push_str(EXTENSION);
        Ok(dir.join(file_name))
    }

    fn prune(&self, name: &str) -> Result<(), CoreError> {
        for stale in self.list_backups(name)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale.path) {
                tracing::warn!(path = %stale.path.display(), error = %err, "failed to prune backup");
            }
        }
        Ok(())
    }
}

impl LedgerStorage for JsonLedgerStorage {
    /// Writes the ledger, first backing up the file it replaces.
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError> {
        self.snapshot_existing(name)?;
        let path = self.ledger_path(name);
        write_ledger(ledger, &path)?;
        tracing::info!(ledger = %ledger.name, path = %path.display(), "saved ledger");
        Ok(())
    }

    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError> {
        let path = self.ledger_path(name);
        if !path.is_file() {
            return Err(CoreError::LedgerNotFound(name.to_string()));
        }
        let ledger = read_ledger(&path)?;
        tracing::info!(ledger = %ledger.name, path = %path.display(), "loaded ledger");
        Ok(ledger)
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        let entries = match fs::read_dir(&self.paths.ledger_root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError> {
        let path = self.next_backup_path(name, note)?;
        write_file(&path, &to_json(ledger)?)?;
        self.prune(name)?;
        let id = file_name(&path);
        tracing::info!(ledger = name, backup = %id, "created ledger backup");
        Ok(LedgerBackupInfo {
            ledger: slug(name),
            created_at: created_label(&slug(name), &id),
            id,
            path,
        })
    }

    /// Backups for `name`, newest first.
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        let entries = match fs::read_dir(self.backup_dir(name)) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let ledger = slug(name);
        let mut backups = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            let id = file_name(&path);
            backups.push(LedgerBackupInfo {
                ledger: ledger.clone(),
                created_at: created_label(&ledger, &id),
                id,
                path,
            });
        }
        backups.sort_by_key(|info| Reverse((backup_stamp(&info.ledger, &info.id), info.id.clone())));
        Ok(backups)
    }

    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError> {
        if !backup.path.is_file() {
            return Err(CoreError::Storage(format!("backup `{}` not found", backup.id)));
        }
        let ledger = read_ledger(&backup.path)?;
        self.snapshot_existing(&backup.ledger)?;
        write_ledger(&ledger, &self.ledger_path(&backup.ledger))?;
        tracing::info!(backup = %backup.id, "restored ledger backup");
        Ok(ledger)
    }
}

/// Writes a ledger to `path` through a temporary sibling file.
pub fn write_ledger(ledger: &Ledger, path: &Path) -> Result<(), CoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    write_file(&tmp, &to_json(ledger)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads a ledger from `path`, logging any integrity warnings.
pub fn read_ledger(path: &Path) -> Result<Ledger, CoreError> {
    let data = fs::read_to_string(path)?;
    let ledger: Ledger =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    for warning in ledger_warnings(&ledger) {
        tracing::warn!(ledger = %ledger.name, "{warning}");
    }
    Ok(ledger)
}

/// File-name-safe form of a ledger name: lowercase ASCII alphanumerics and `_`.
pub fn slug(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() {
                ch.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if slug.chars().all(|ch| ch == '_') {
        "ledger".into()
    } else {
        slug
    }
}

fn note_label(note: &str) -> Option<String> {
    let words: Vec<String> = note
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    (!words.is_empty()).then(|| words.join("-"))
}

fn backup_stamp(ledger: &str, id: &str) -> Option<NaiveDateTime> {
    let rest = id.strip_prefix(ledger)?.strip_prefix('_')?;
    NaiveDateTime::parse_from_str(rest.get(..STAMP_LEN)?, STAMP_FORMAT).ok()
}

fn created_label(ledger: &str, id: &str) -> String {
    backup_stamp(ledger, id)
        .map(|stamp| stamp.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| id.to_string())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn to_json(ledger: &Ledger) -> Result<String, CoreError> {
    serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))
}

fn write_file(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
