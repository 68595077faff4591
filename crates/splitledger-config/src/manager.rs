use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, Utc};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const BACKUP_PREFIX: &str = "config_";
const BACKUP_EXTENSION: &str = ".json";
const STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Loads, saves, and snapshots [`Config`] under a base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// Lays out `<base>/config/config.json` and `<base>/config/backups/`.
    pub fn with_base_dir(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_dir = base.as_ref().join("config");
        let backups_dir = config_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE), backups_dir))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Returns the stored config, or defaults when nothing was saved yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.config_path) {
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        let mut tmp = self.config_path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.config_path)?;
        tracing::debug!(path = %self.config_path.display(), "saved config");
        Ok(())
    }

    /// Writes a timestamped copy of `config` and returns the backup file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let mut name = format!("{BACKUP_PREFIX}{}", Utc::now().format(STAMP_FORMAT));
        if let Some(label) = note.and_then(slug) {
            name.push('_');
            name.push_str(&label);
        }
        name.push_str(BACKUP_EXTENSION);
        write_file(
            &self.backups_dir.join(&name),
            &serde_json::to_string_pretty(config)?,
        )?;
        tracing::info!(backup = %name, "backed up config");
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        let data = fs::read_to_string(&path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("configuration backup `{backup_name}` not found"),
                )
            } else {
                err
            }
        })?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>, ConfigError> {
        let entries = match fs::read_dir(&self.backups_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_EXTENSION) {
                names.push(name);
            }
        }
        names.sort_by(|a, b| stamp(b).cmp(&stamp(a)).then_with(|| b.cmp(a)));
        Ok(names)
    }
}

fn slug(note: &str) -> Option<String> {
    let words: Vec<String> = note
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join("-"))
    }
}

fn stamp(name: &str) -> Option<NaiveDateTime> {
    let body = name.strip_prefix(BACKUP_PREFIX)?;
    let raw = body.get(..15)?;
    NaiveDateTime::parse_from_str(raw, STAMP_FORMAT).ok()
}

fn write_file(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
