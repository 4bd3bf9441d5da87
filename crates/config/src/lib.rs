//! Layered configuration for tubesync.
//!
//! Sources are merged in order, later ones winning:
//!
//! 1. Built-in defaults.
//! 2. A TOML, YAML or JSON file, picked by extension. Defaults to
//!    `config.toml` in the platform config directory, which may be absent.
//! 3. Environment variables prefixed `TUBESYNC_`, with `__` separating
//!    nested keys (`TUBESYNC_DATABASE__MAX_CONNECTIONS=8`).

pub mod error;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};
use tubesync_cache::{DEFAULT_MAX_CONNECTIONS, Database, TtlPolicy};

use crate::error::{ErrorKind, Result};

pub const ENV_PREFIX: &str = "TUBESYNC_";
const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "cache.sqlite";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tubesync")
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub staleness: StalenessConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let path = match project_dirs() {
            Some(dirs) => dirs.data_dir().join(DATABASE_FILE),
            None => PathBuf::from(DATABASE_FILE),
        };
        Self {
            path,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    /// Open (creating if needed) the cache database and apply migrations.
    pub async fn connect(&self) -> Result<Database> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Database)?;
        }
        Database::connect_with(&self.path, self.max_connections)
            .await
            .or_raise(|| ErrorKind::Database)
    }
}

/// Time-to-live per entity kind, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessConfig {
    pub video: u64,
    pub channel: u64,
    pub image: u64,
    pub stream: u64,
    pub caption: u64,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        let policy = TtlPolicy::default();
        Self {
            video: policy.video.as_secs(),
            channel: policy.channel.as_secs(),
            image: policy.image.as_secs(),
            stream: policy.stream.as_secs(),
            caption: policy.caption.as_secs(),
        }
    }
}

impl From<StalenessConfig> for TtlPolicy {
    fn from(config: StalenessConfig) -> Self {
        Self {
            video: Duration::from_secs(config.video),
            channel: Duration::from_secs(config.channel),
            image: Duration::from_secs(config.image),
            stream: Duration::from_secs(config.stream),
            caption: Duration::from_secs(config.caption),
        }
    }
}

impl Config {
    /// Where the config file is looked for when none is given.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load and validate the configuration.
    ///
    /// An explicit `path` must exist. The default location is optional.
    #[instrument(level = "debug", skip_all, fields(path = ?path))]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        debug!(database = %config.database.path.display(), "configuration loaded");
        Ok(config)
    }

    /// The merged sources, for callers that want to layer their own on top.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let defaults = Figment::from(Serialized::defaults(Self::default()));
        let figment = match path {
            Some(path) if !path.exists() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => with_file(defaults, path)?,
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => with_file(defaults, &path)?,
                None => defaults,
            },
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            exn::bail!(ErrorKind::Validation("database.max_connections"));
        }
        if self.database.path.file_name().is_none() {
            exn::bail!(ErrorKind::Validation("database.path"));
        }
        Ok(())
    }
}

fn with_file(figment: Figment, path: &Path) -> Result<Figment> {
    debug!(path = %path.display(), "reading config file");
    let figment = match path.extension().and_then(|extension| extension.to_str()) {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    };
    Ok(figment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use tubesync_cache::{EntityKind, Repository};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.path.file_name().unwrap(), DATABASE_FILE);
        assert_eq!(TtlPolicy::from(config.staleness), TtlPolicy::default());
        config.validate().unwrap();
    }

    #[rstest]
    #[case::toml("tubesync.toml", "[database]\nmax_connections = 8\n\n[staleness]\nstream = 60\n")]
    #[case::yaml("tubesync.yaml", "database:\n  max_connections: 8\nstaleness:\n  stream: 60\n")]
    #[case::json("tubesync.json", r#"{"database": {"max_connections": 8}, "staleness": {"stream": 60}}"#)]
    fn test_file(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = Config::load(Some(Path::new(name))).unwrap();
            assert_eq!(config.database.max_connections, 8);
            assert_eq!(config.staleness.stream, 60);
            // Untouched keys keep their defaults.
            assert_eq!(config.staleness.video, 3600);
            assert_eq!(config.database.path, DatabaseConfig::default().path);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("tubesync.toml", "[database]\npath = \"file.sqlite\"\nmax_connections = 8\n")?;
            jail.set_env("TUBESYNC_DATABASE__MAX_CONNECTIONS", 2);
            jail.set_env("TUBESYNC_STALENESS__IMAGE", 10);
            let config = Config::load(Some(Path::new("tubesync.toml"))).unwrap();
            assert_eq!(config.database.path, PathBuf::from("file.sqlite"));
            assert_eq!(config.database.max_connections, 2);
            assert_eq!(TtlPolicy::from(config.staleness).ttl(EntityKind::Image), Duration::from_secs(10));
            Ok(())
        });
    }

    #[test]
    fn test_rejects_zero_connections() {
        Jail::expect_with(|jail| {
            jail.set_env("TUBESYNC_DATABASE__MAX_CONNECTIONS", 0);
            let error = Config::load(None).unwrap_err();
            assert_eq!(*error, ErrorKind::Validation("database.max_connections"));
            Ok(())
        });
    }

    #[rstest]
    #[case::missing("missing.toml", ErrorKind::NotFound(PathBuf::from("missing.toml")))]
    #[case::format("tubesync.ini", ErrorKind::UnsupportedFormat(PathBuf::from("tubesync.ini")))]
    fn test_bad_file(#[case] name: &str, #[case] expected: ErrorKind) {
        Jail::expect_with(|jail| {
            if name.ends_with(".ini") {
                jail.create_file(name, "[database]\n")?;
            }
            let error = Config::load(Some(Path::new(name))).unwrap_err();
            assert_eq!(*error, expected);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value() {
        Jail::expect_with(|jail| {
            jail.create_file("tubesync.toml", "[database]\nmax_connections = \"many\"\n")?;
            let error = Config::load(Some(Path::new("tubesync.toml"))).unwrap_err();
            assert_eq!(*error, ErrorKind::Invalid);
            Ok(())
        });
    }

    #[tokio::test]
    async fn test_connect_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested").join(DATABASE_FILE),
            max_connections: 2,
        };
        let db = config.connect().await.unwrap();
        assert!(config.path.exists());
        assert_eq!(Repository::from(&db).count(EntityKind::Video).await.unwrap(), 0);
        db.close().await;
    }
}
