//! Local archive catalog: listing and offline verification

use chrono::{DateTime, Local, NaiveDateTime};
use glob::{glob_with, MatchOptions, Pattern};
use shared::{
    diagnostic_text, ArchiveFormat, ArchiveName, FailureMarkers, FormatMismatchError, Result, TransferConfig,
    TransferError,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One file in the backup directory
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Parsed filename, `None` for files not named by an export
    pub name: Option<ArchiveName>,
    pub format: ArchiveFormat,
    /// Creation time from the filename, else the file's modification time
    pub created_at: Option<NaiveDateTime>,
}

/// Result of a successful offline verification
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub name: Option<ArchiveName>,
    pub format: ArchiveFormat,
}

/// File is non-empty and holds no failure marker
///
/// Returns the file size.
pub fn check_archive(path: &Path, markers: &FailureMarkers) -> Result<u64> {
    let size = match fs::metadata(path) {
        Ok(meta) if meta.is_file() => meta.len(),
        _ => 0,
    };
    if size == 0 {
        return Err(TransferError::EmptyArchive {
            path: path.to_path_buf(),
            diagnostic: String::new(),
        });
    }

    let content = fs::read(path)?;
    if let Some(marker) = markers.find(&content) {
        debug!(path = %path.display(), marker, "failure marker in archive");
        return Err(marker_failure(marker, &content));
    }
    Ok(size)
}

/// Archive content that is really an error transcript
pub(crate) fn marker_failure(marker: &str, content: &[u8]) -> TransferError {
    TransferError::DisguisedFailure {
        reason: format!("the captured archive contains '{}'", marker),
        diagnostic: diagnostic_text(content),
    }
}

/// Vet a local archive without contacting the remote side
pub fn verify_archive(path: &Path, config: &TransferConfig) -> Result<VerifyReport> {
    if !path.exists() {
        return Err(TransferError::FileNotFound(path.to_path_buf()));
    }
    let format = ArchiveFormat::detect(path, config);
    if let ArchiveFormat::Alternate(ext) = &format {
        return Err(FormatMismatchError {
            path: path.to_path_buf(),
            format: ext.clone(),
            alternate_tool: config.alternate_tool.clone(),
        }
        .into());
    }

    let markers = FailureMarkers::new(&config.failure_markers)?;
    let size_bytes = check_archive(path, &markers)?;
    let name = path
        .file_name()
        .and_then(|n| ArchiveName::parse(&n.to_string_lossy()));

    Ok(VerifyReport {
        path: path.to_path_buf(),
        size_bytes,
        name,
        format,
    })
}

/// Every regular, non-hidden file in the output directory, newest first
pub fn list_archives(config: &TransferConfig) -> Result<Vec<ArchiveEntry>> {
    let dir = &config.output_dir;
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let paths = glob_with(&pattern, options)
        .map_err(|e| TransferError::Config(format!("invalid backup directory pattern: {}", e)))?;

    let mut entries = Vec::new();
    for path in paths {
        let path = path.map_err(std::io::Error::from)?;
        let meta = fs::metadata(&path)?;
        if !meta.is_file() {
            continue;
        }

        let name = path
            .file_name()
            .and_then(|n| ArchiveName::parse(&n.to_string_lossy()));
        let created_at = name.as_ref().map(|n| n.created_at).or_else(|| {
            meta.modified()
                .ok()
                .map(|t| DateTime::<Local>::from(t).naive_local())
        });

        entries.push(ArchiveEntry {
            format: ArchiveFormat::detect(&path, config),
            size_bytes: meta.len(),
            path,
            name,
            created_at,
        });
    }

    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.path.cmp(&b.path)));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> TransferConfig {
        TransferConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        }
    }

    fn markers() -> FailureMarkers {
        FailureMarkers::new(["error", "failed", "not found"]).unwrap()
    }

    // ============== check_archive ==============

    #[test]
    fn test_check_archive_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.archive");
        fs::write(&path, [0x6d, 0xe2, 0x99, 0x81, 1, 2, 3]).unwrap();

        assert_eq!(check_archive(&path, &markers()).unwrap(), 7);
    }

    #[test]
    fn test_check_archive_empty_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.archive");
        fs::write(&empty, b"").unwrap();

        assert!(matches!(
            check_archive(&empty, &markers()),
            Err(TransferError::EmptyArchive { .. })
        ));
        assert!(matches!(
            check_archive(&dir.path().join("missing.archive"), &markers()),
            Err(TransferError::EmptyArchive { .. })
        ));
    }

    #[test]
    fn test_check_archive_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.archive");
        fs::write(&path, b"Error: connection refused").unwrap();

        let err = check_archive(&path, &markers()).unwrap_err();
        assert!(err.to_string().contains("'error'"));
        assert_eq!(err.diagnostic(), Some("Error: connection refused"));
    }

    // ============== verify_archive ==============

    #[test]
    fn test_verify_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("miniapp_railway_20240309_070503.archive");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let report = verify_archive(&path, &config_in(&dir)).unwrap();
        assert_eq!(report.size_bytes, 3);
        assert_eq!(report.format, ArchiveFormat::Remote);
        assert_eq!(report.name.unwrap().database, "miniapp");
    }

    #[test]
    fn test_verify_rejects_alternate_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backup.tar.gz");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let result = verify_archive(&path, &config_in(&dir));
        assert!(matches!(result, Err(TransferError::FormatMismatch(_))));
    }

    #[test]
    fn test_verify_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = verify_archive(&dir.path().join("nope.archive"), &config_in(&dir));
        assert!(matches!(result, Err(TransferError::FileNotFound(_))));
    }

    // ============== list_archives ==============

    #[test]
    fn test_list_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = TransferConfig {
            output_dir: dir.path().join("absent"),
            ..Default::default()
        };
        assert!(list_archives(&config).unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("miniapp_railway_20240101_000000.archive"), b"a").unwrap();
        fs::write(dir.path().join("miniapp_railway_20240301_120000.archive"), b"bb").unwrap();
        fs::write(dir.path().join("shop_railway_20240201_000000.archive"), b"ccc").unwrap();
        fs::write(dir.path().join(".gitkeep"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let entries = list_archives(&config_in(&dir)).unwrap();
        let names: Vec<String> = entries
            .iter()
            .map(|e| e.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                "miniapp_railway_20240301_120000.archive",
                "shop_railway_20240201_000000.archive",
                "miniapp_railway_20240101_000000.archive",
            ]
        );
        assert_eq!(entries[0].size_bytes, 2);
        assert_eq!(entries[1].name.as_ref().unwrap().database, "shop");
    }

    #[test]
    fn test_list_keeps_unparsed_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("backup_20240309_070503.json.gz"), b"gz").unwrap();

        let entries = list_archives(&config_in(&dir)).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].name.is_none());
        assert!(entries[0].created_at.is_some());
        assert_eq!(entries[0].format, ArchiveFormat::Alternate(".json.gz".to_string()));
    }
}
