//! Command implementations.

pub mod config;
pub mod extract;
pub mod missing;
pub mod run;
pub mod show;
pub mod stats;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::missing::execute_missing;
pub use self::run::execute_run;
pub use self::show::{execute_list, execute_show};
pub use self::stats::execute_stats;

use crate::cli::SnapshotArgs;
use crate::error::{CliError, Result};
use std::fs;
use std::path::PathBuf;
use taxa_export::{ExportConfig, ExportFormat};
use taxa_store::SqliteStore;

/// Newest snapshot database written with the configured prefix.
///
/// Snapshot names end in a `%Y%m%d_%H%M%S` timestamp, so the greatest
/// name is the newest run.
pub fn latest_snapshot(export: &ExportConfig) -> Result<PathBuf> {
    let not_found = || {
        CliError::NotFound(format!(
            "no snapshot in {}; run `taxa run` first or pass --db",
            export.output_dir.display()
        ))
    };

    if !export.output_dir.is_dir() {
        return Err(not_found());
    }

    let prefix = format!("{}_", export.file_prefix);
    let suffix = format!(".{}", ExportFormat::Sqlite.extension());

    let mut newest: Option<(String, PathBuf)> = None;
    for entry in fs::read_dir(&export.output_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(&prefix) || !name.ends_with(&suffix) {
            continue;
        }
        if newest.as_ref().map_or(true, |(best, _)| name > *best) {
            newest = Some((name, entry.path()));
        }
    }

    newest.map(|(_, path)| path).ok_or_else(not_found)
}

/// Open the snapshot named on the command line, or the newest one.
pub fn open_snapshot(args: &SnapshotArgs, export: &ExportConfig) -> Result<SqliteStore> {
    let path = match &args.db {
        Some(path) => path.clone(),
        None => latest_snapshot(export)?,
    };

    if !path.is_file() {
        return Err(CliError::NotFound(format!("snapshot {}", path.display())));
    }

    tracing::debug!("Opening snapshot {}", path.display());
    Ok(SqliteStore::new(&path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_latest_snapshot_picks_newest_name() {
        let dir = TempDir::new().unwrap();
        for name in [
            "municipal_fees_20240101_090000.db",
            "municipal_fees_20250301_120000.db",
            "municipal_fees_20250301_120000.csv",
            "other_20260101_000000.db",
        ] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let latest = latest_snapshot(&ExportConfig::in_dir(dir.path())).unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_string_lossy(),
            "municipal_fees_20250301_120000.db"
        );
    }

    #[test]
    fn test_latest_snapshot_without_runs() {
        let dir = TempDir::new().unwrap();
        let err = latest_snapshot(&ExportConfig::in_dir(dir.path().join("absent")));
        assert!(matches!(err, Err(CliError::NotFound(_))));

        let err = latest_snapshot(&ExportConfig::in_dir(dir.path()));
        assert!(matches!(err, Err(CliError::NotFound(_))));
    }

    #[test]
    fn test_open_missing_db_does_not_create_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nothing.db");
        let args = SnapshotArgs {
            db: Some(path.clone()),
        };
        assert!(matches!(
            open_snapshot(&args, &ExportConfig::default()),
            Err(CliError::NotFound(_))
        ));
        assert!(!path.exists());
    }
}
