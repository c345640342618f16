//! Export configuration and the image loading collaborator

use crate::error::{ExcelError, Result};
use std::path::{Path, PathBuf};

/// Reference prefix that maps onto [`ExportConfig::profile_dir`]
pub const PROFILE_PREFIX: &str = "/profile";

pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
pub const DEFAULT_FLUSH_INTERVAL: u32 = 1000;

/// Where exports land and how the archive is written
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExportConfig {
    /// Root for local image references starting with `/profile`
    pub profile_dir: PathBuf,
    /// Directory generated files are persisted into
    pub download_dir: PathBuf,
    /// Deflate level, 0-9
    pub compression_level: u32,
    /// Rows between flushes of the worksheet stream
    pub flush_interval: u32,
}

impl ExportConfig {
    /// Defaults rooted at `profile_dir`, downloads in `<profile_dir>/download`.
    pub fn new<P: AsRef<Path>>(profile_dir: P) -> Self {
        let profile_dir = profile_dir.as_ref().to_path_buf();
        ExportConfig {
            download_dir: profile_dir.join("download"),
            profile_dir,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    pub fn builder<P: AsRef<Path>>(profile_dir: P) -> ExportConfigBuilder {
        ExportConfigBuilder::new(profile_dir)
    }

    /// Read `EXCELBATCH_PROFILE`, `EXCELBATCH_DOWNLOAD_DIR`,
    /// `EXCELBATCH_COMPRESSION_LEVEL` and `EXCELBATCH_FLUSH_INTERVAL`.
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let profile = lookup("EXCELBATCH_PROFILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_profile_dir);

        let mut builder = ExportConfigBuilder::new(profile);
        if let Some(dir) = lookup("EXCELBATCH_DOWNLOAD_DIR").filter(|d| !d.trim().is_empty()) {
            builder = builder.with_download_dir(dir);
        }
        if let Some(level) = lookup("EXCELBATCH_COMPRESSION_LEVEL").and_then(|s| s.parse().ok()) {
            builder = builder.with_compression_level(level);
        }
        if let Some(interval) = lookup("EXCELBATCH_FLUSH_INTERVAL").and_then(|s| s.parse().ok()) {
            builder = builder.with_flush_interval(interval);
        }
        builder.build()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig::new(default_profile_dir())
    }
}

fn default_profile_dir() -> PathBuf {
    std::env::temp_dir().join("excelbatch")
}

/// Builder for [`ExportConfig`]
pub struct ExportConfigBuilder {
    profile_dir: PathBuf,
    download_dir: Option<PathBuf>,
    compression_level: Option<u32>,
    flush_interval: Option<u32>,
}

impl ExportConfigBuilder {
    pub fn new<P: AsRef<Path>>(profile_dir: P) -> Self {
        ExportConfigBuilder {
            profile_dir: profile_dir.as_ref().to_path_buf(),
            download_dir: None,
            compression_level: None,
            flush_interval: None,
        }
    }

    pub fn with_download_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.download_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Clamped to 9
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = Some(level.min(9));
        self
    }

    /// Zero is treated as 1
    pub fn with_flush_interval(mut self, interval: u32) -> Self {
        self.flush_interval = Some(interval.max(1));
        self
    }

    pub fn build(self) -> ExportConfig {
        let mut config = ExportConfig::new(&self.profile_dir);
        if let Some(dir) = self.download_dir {
            config.download_dir = dir;
        }
        if let Some(level) = self.compression_level {
            config.compression_level = level;
        }
        if let Some(interval) = self.flush_interval {
            config.flush_interval = interval;
        }
        config
    }
}

/// Source of picture bytes for image columns
pub trait ImageLoader {
    fn load_image(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Loads pictures from the local file system
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    profile_dir: PathBuf,
}

impl FsImageLoader {
    pub fn new<P: AsRef<Path>>(profile_dir: P) -> Self {
        FsImageLoader {
            profile_dir: profile_dir.as_ref().to_path_buf(),
        }
    }

    /// `/profile/a/b.png` resolves under the profile directory; other
    /// references are used as paths directly.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        match reference.strip_prefix(PROFILE_PREFIX) {
            Some(rest) => self.profile_dir.join(rest.trim_start_matches(['/', '\\'])),
            None => PathBuf::from(reference),
        }
    }
}

impl From<&ExportConfig> for FsImageLoader {
    fn from(config: &ExportConfig) -> Self {
        FsImageLoader::new(&config.profile_dir)
    }
}

impl ImageLoader for FsImageLoader {
    fn load_image(&self, reference: &str) -> Result<Vec<u8>> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Err(ExcelError::InvalidArgument(format!(
                "remote image references are not supported: {}",
                reference
            )));
        }
        Ok(std::fs::read(self.resolve(reference))?)
    }
}
