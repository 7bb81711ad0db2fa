//! Output Namer/Writer.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to back up {path}: {source}")]
    Backup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error writing file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub backup: Option<PathBuf>,
}

/// `candidate_<first>_<last>_<role>.html`, all lowercase, whitespace stripped
/// from the role. Path separators never survive into the name.
pub fn output_file_name(first_name: &str, last_name: &str, role: &str) -> String {
    let role: String = role.chars().filter(|c| !c.is_whitespace()).collect();
    format!(
        "candidate_{}_{}_{}.html",
        file_component(first_name),
        file_component(last_name),
        file_component(&role)
    )
}

fn file_component(part: &str) -> String {
    part.to_lowercase()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect()
}

/// Writes `content` to `path`, creating parent directories. With
/// `auto_backup`, an existing file is first copied to
/// `<path>.backup_<unix millis>`.
pub fn write_output(
    path: &Path,
    content: &str,
    auto_backup: bool,
) -> Result<WriteOutcome, WriteError> {
    let write_err = |source: std::io::Error| WriteError::Write {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let backup = if auto_backup && path.exists() {
        let backup_path = backup_path_for(path, chrono::Utc::now().timestamp_millis());
        std::fs::copy(path, &backup_path).map_err(|source| WriteError::Backup {
            path: backup_path.display().to_string(),
            source,
        })?;
        debug!("Backup created: {}", backup_path.display());
        Some(backup_path)
    } else {
        None
    };

    std::fs::write(path, content).map_err(write_err)?;
    info!("File saved: {}", path.display());

    Ok(WriteOutcome {
        path: path.to_path_buf(),
        backup,
    })
}

fn backup_path_for(path: &Path, millis: i64) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".backup_{millis}"));
    PathBuf::from(name)
}
