//! Tracker configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use strum::{Display, EnumString};
use tracing::warn;

use crate::state::DEFAULT_FINE_DWELL;

/// Overrides the snapshot file path
pub const ENV_OUTPUT: &str = "ETS2_TRACKER_OUTPUT";

/// `raw` or `escaped`
pub const ENV_STRINGS: &str = "ETS2_TRACKER_STRINGS";

/// Fine dwell window in milliseconds
pub const ENV_FINE_DWELL_MS: &str = "ETS2_TRACKER_FINE_DWELL_MS";

/// Directory under `<home>/Documents` that holds the tracker file
pub const OUTPUT_DIR: &str = "ETS2_Tracker";

/// Name of the published snapshot file
pub const OUTPUT_FILE: &str = "tracker_data.json";

/// How free-text fields are written into the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StringEncoding {
    /// Copied verbatim between quotes. Quotes or backslashes in a cargo or
    /// city name make the file invalid JSON.
    #[default]
    Raw,
    /// Escaped with JSON string rules
    Escaped,
}

/// Default snapshot location: `<home>/Documents/ETS2_Tracker/tracker_data.json`,
/// or `tracker_data.json` relative to the working directory without a home.
pub fn default_output_path() -> PathBuf {
    output_path_for_home(dirs::home_dir().as_deref())
}

fn output_path_for_home(home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) => home.join("Documents").join(OUTPUT_DIR).join(OUTPUT_FILE),
        None => PathBuf::from(OUTPUT_FILE),
    }
}

/// Configuration for the tracker plugin
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// File overwritten on every frame
    pub output_path: PathBuf,
    /// How long `fine_detected` stays set after a fine
    pub fine_dwell: Duration,
    /// Encoding of string fields in the snapshot
    pub string_encoding: StringEncoding,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            fine_dwell: DEFAULT_FINE_DWELL,
            string_encoding: StringEncoding::default(),
        }
    }
}

impl TrackerConfig {
    /// Create a new configuration builder
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::default()
    }

    /// Defaults overridden by `ETS2_TRACKER_OUTPUT`, `ETS2_TRACKER_STRINGS`
    /// and `ETS2_TRACKER_FINE_DWELL_MS`
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable lookup.
    /// Unparsable values are ignored with a warning.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(path) = var(ENV_OUTPUT).filter(|p| !p.trim().is_empty()) {
            builder = builder.output_path(path);
        }

        if let Some(value) = var(ENV_STRINGS) {
            match value.trim().to_ascii_lowercase().parse::<StringEncoding>() {
                Ok(encoding) => builder = builder.string_encoding(encoding),
                Err(_) => warn!("Ignoring {}={:?}", ENV_STRINGS, value),
            }
        }

        if let Some(value) = var(ENV_FINE_DWELL_MS) {
            match value.trim().parse::<u64>() {
                Ok(ms) => builder = builder.fine_dwell(Duration::from_millis(ms)),
                Err(_) => warn!("Ignoring {}={:?}", ENV_FINE_DWELL_MS, value),
            }
        }

        builder.build()
    }

    /// Directory containing the output file, if the path has one
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

/// Builder for TrackerConfig
#[derive(Debug, Clone, Default)]
pub struct TrackerConfigBuilder {
    output_path: Option<PathBuf>,
    fine_dwell: Option<Duration>,
    string_encoding: Option<StringEncoding>,
}

impl TrackerConfigBuilder {
    /// Set the snapshot file path
    pub fn output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set the fine dwell window
    pub fn fine_dwell(mut self, dwell: Duration) -> Self {
        self.fine_dwell = Some(dwell);
        self
    }

    /// Set the string encoding
    pub fn string_encoding(mut self, encoding: StringEncoding) -> Self {
        self.string_encoding = Some(encoding);
        self
    }

    /// Build the configuration
    pub fn build(self) -> TrackerConfig {
        TrackerConfig {
            output_path: self.output_path.unwrap_or_else(default_output_path),
            fine_dwell: self.fine_dwell.unwrap_or(DEFAULT_FINE_DWELL),
            string_encoding: self.string_encoding.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_output_path_under_home() {
        let path = output_path_for_home(Some(Path::new("/home/driver")));
        assert_eq!(
            path,
            Path::new("/home/driver/Documents/ETS2_Tracker/tracker_data.json")
        );
    }

    #[test]
    fn test_output_path_without_home() {
        let path = output_path_for_home(None);
        assert_eq!(path, Path::new("tracker_data.json"));
    }

    #[test]
    fn test_builder_overrides() {
        let config = TrackerConfig::builder()
            .output_path("out/data.json")
            .fine_dwell(Duration::from_secs(5))
            .string_encoding(StringEncoding::Escaped)
            .build();

        assert_eq!(config.output_path, Path::new("out/data.json"));
        assert_eq!(config.fine_dwell, Duration::from_secs(5));
        assert_eq!(config.string_encoding, StringEncoding::Escaped);
        assert_eq!(config.output_dir(), Some(Path::new("out")));
    }

    #[test]
    fn test_builder_defaults() {
        let config = TrackerConfig::builder().build();
        assert_eq!(config.fine_dwell, Duration::from_secs(2));
        assert_eq!(config.string_encoding, StringEncoding::Raw);
        assert!(config.output_path.ends_with("tracker_data.json"));
    }

    #[test]
    fn test_relative_file_has_no_output_dir() {
        let config = TrackerConfig::builder()
            .output_path("tracker_data.json")
            .build();
        assert_eq!(config.output_dir(), None);
    }

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_env_overrides() {
        let config = TrackerConfig::from_vars(vars(&[
            (ENV_OUTPUT, "/tmp/ets2/tracker_data.json"),
            (ENV_STRINGS, "Escaped"),
            (ENV_FINE_DWELL_MS, "3500"),
        ]));

        assert_eq!(config.output_path, Path::new("/tmp/ets2/tracker_data.json"));
        assert_eq!(config.string_encoding, StringEncoding::Escaped);
        assert_eq!(config.fine_dwell, Duration::from_millis(3500));
    }

    #[test]
    fn test_env_unset_keeps_defaults() {
        let config = TrackerConfig::from_vars(vars(&[]));
        assert_eq!(config.string_encoding, StringEncoding::Raw);
        assert_eq!(config.fine_dwell, DEFAULT_FINE_DWELL);
        assert_eq!(config.output_path, default_output_path());
    }

    #[test]
    fn test_env_invalid_values_ignored() {
        let config = TrackerConfig::from_vars(vars(&[
            (ENV_OUTPUT, "  "),
            (ENV_STRINGS, "base64"),
            (ENV_FINE_DWELL_MS, "two seconds"),
        ]));
        assert_eq!(config.string_encoding, StringEncoding::Raw);
        assert_eq!(config.fine_dwell, DEFAULT_FINE_DWELL);
        assert_eq!(config.output_path, default_output_path());
    }

    #[test]
    fn test_string_encoding_from_str() {
        assert_eq!(
            StringEncoding::from_str("escaped").unwrap(),
            StringEncoding::Escaped
        );
        assert_eq!(StringEncoding::Raw.to_string(), "raw");
        assert!(StringEncoding::from_str("base64").is_err());
    }
}
