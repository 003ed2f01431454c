//! Archive naming and format detection

use chrono::NaiveDateTime;
use regex::Regex;
use std::path::Path;

use crate::TransferConfig;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Structured form of `{database}_{platform_tag}_{YYYYMMDD_HHMMSS}.{extension}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    pub database: String,
    pub platform_tag: String,
    pub created_at: NaiveDateTime,
    pub extension: String,
}

impl ArchiveName {
    pub fn new(
        database: impl Into<String>,
        platform_tag: impl Into<String>,
        created_at: NaiveDateTime,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            platform_tag: platform_tag.into(),
            created_at,
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Render the filename. Second granularity: two names in the same second collide.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.{}",
            self.database,
            self.platform_tag,
            self.created_at.format(TIMESTAMP_FORMAT),
            self.extension
        )
    }

    /// Parse a filename produced by [`ArchiveName::file_name`]
    ///
    /// The database name may contain underscores; the platform tag may not.
    pub fn parse(file_name: &str) -> Option<Self> {
        let re = Regex::new(r"^(?P<db>.+)_(?P<tag>[^_]+)_(?P<ts>\d{8}_\d{6})\.(?P<ext>[^.]+)$").ok()?;
        let caps = re.captures(file_name)?;
        let created_at = NaiveDateTime::parse_from_str(&caps["ts"], TIMESTAMP_FORMAT).ok()?;
        Some(Self::new(&caps["db"], &caps["tag"], created_at, &caps["ext"]))
    }
}

impl std::fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Which backup pathway a local file belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Produced by the remote dump tool
    Remote,
    /// Produced by the admin panel backup endpoints; carries the matched extension
    Alternate(String),
    Unknown,
}

impl ArchiveFormat {
    /// Classify a path by its file name
    pub fn detect(path: &Path, config: &TransferConfig) -> Self {
        let name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_lowercase(),
            None => return ArchiveFormat::Unknown,
        };

        // Longest alternate suffix first so ".json.gz" wins over ".gz"-style entries
        let mut alternates: Vec<&String> = config.alternate_extensions.iter().collect();
        alternates.sort_by_key(|ext| std::cmp::Reverse(ext.len()));
        if let Some(ext) = alternates
            .into_iter()
            .find(|ext| !ext.is_empty() && name.ends_with(&ext.to_lowercase()))
        {
            return ArchiveFormat::Alternate(ext.clone());
        }

        let own = format!(".{}", config.extension().to_lowercase());
        if name.ends_with(&own) {
            ArchiveFormat::Remote
        } else {
            ArchiveFormat::Unknown
        }
    }
}
