// Daemon configuration (environment variables, optional .env)

use reelgen_api_http::server::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_RATE_LIMIT_BURST, DEFAULT_RATE_LIMIT_RATE,
};
use reelgen_core::application::engine::constants::{
    DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PROGRESS_STEPS, DEFAULT_STEP_DELAY,
};
use reelgen_core::domain::{Catalog, WorkItem};
use reelgen_core::error::{AppError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_STORAGE_DIR: &str = "videos";
const DEFAULT_STEP_DELAY_MS: u64 = DEFAULT_STEP_DELAY.as_millis() as u64;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

/// Sample videos served when no catalog file is configured
const BUILTIN_CATALOG: [(&str, &str); 2] = [
    (
        "monica",
        "https://res.cloudinary.com/djontsvk9/video/upload/v1755258663/Peppo%20AI/Monica_-_Telugu_Song__COOLIE___Superstar_Rajinikanth___Sun_Pictures___Lokesh___Anirudh___Pooja_Hegde_r9g9i1.mp4",
    ),
    (
        "golden-sparrow",
        "https://res.cloudinary.com/djontsvk9/video/upload/v1755258662/Peppo%20AI/Golden_Sparrow_-_Video_Song___Dhanush___Priyanka_Mohan___Pavish___Anikha___GV_Prakash_NEEK_zbs7ba.mp4",
    ),
];

/// Job id allocation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    Sequential,
    Uuid,
}

impl FromStr for IdStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(IdStrategy::Sequential),
            "uuid" => Ok(IdStrategy::Uuid),
            other => Err(AppError::Config(format!(
                "REELGEN_ID_STRATEGY must be 'sequential' or 'uuid', got '{}'",
                other
            ))),
        }
    }
}

/// Daemon configuration
///
/// | Env Var                      | Default      |
/// |------------------------------|--------------|
/// | `REELGEN_HOST`               | `0.0.0.0`    |
/// | `REELGEN_PORT`               | `8000`       |
/// | `REELGEN_STORAGE_DIR`        | `videos`     |
/// | `REELGEN_CATALOG_FILE`       | built-in     |
/// | `REELGEN_PROGRESS_STEPS`     | `5`          |
/// | `REELGEN_STEP_DELAY_MS`      | `1000`       |
/// | `REELGEN_FETCH_TIMEOUT_SECS` | `120`        |
/// | `REELGEN_MAX_UPLOAD_BYTES`   | `52428800`   |
/// | `REELGEN_ID_STRATEGY`        | `sequential` |
/// | `REELGEN_CORS_ORIGINS`       | `*`          |
/// | `REELGEN_RATE_LIMIT_BURST`   | `200`        |
/// | `REELGEN_RATE_LIMIT_RATE`    | `100`        |
/// | `REELGEN_LOG_FORMAT`         | `pretty`     |
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: PathBuf,
    pub catalog_file: Option<PathBuf>,
    pub progress_steps: u8,
    pub step_delay: Duration,
    pub fetch_timeout: Duration,
    pub max_upload_bytes: u64,
    pub id_strategy: IdStrategy,
    pub cors_origins: Vec<String>,
    pub rate_limit_burst: u32,
    pub rate_limit_rate: u32,
    pub log_format: String,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; used by `from_env` and tests
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage_dir = var("REELGEN_STORAGE_DIR")
            .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string());
        let catalog_file = var("REELGEN_CATALOG_FILE")
            .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()));

        let progress_steps: u8 =
            parse_or(var("REELGEN_PROGRESS_STEPS"), "REELGEN_PROGRESS_STEPS", DEFAULT_PROGRESS_STEPS)?;
        if progress_steps == 0 {
            return Err(AppError::Config(
                "REELGEN_PROGRESS_STEPS must be at least 1".to_string(),
            ));
        }

        let id_strategy = match var("REELGEN_ID_STRATEGY") {
            Some(value) => value.parse()?,
            None => IdStrategy::Sequential,
        };

        let cors_origins = var("REELGEN_CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: var("REELGEN_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(var("REELGEN_PORT"), "REELGEN_PORT", DEFAULT_PORT)?,
            storage_dir: PathBuf::from(shellexpand::tilde(&storage_dir).into_owned()),
            catalog_file,
            progress_steps,
            step_delay: Duration::from_millis(parse_or(
                var("REELGEN_STEP_DELAY_MS"),
                "REELGEN_STEP_DELAY_MS",
                DEFAULT_STEP_DELAY_MS,
            )?),
            fetch_timeout: Duration::from_secs(parse_or(
                var("REELGEN_FETCH_TIMEOUT_SECS"),
                "REELGEN_FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            max_upload_bytes: parse_or(
                var("REELGEN_MAX_UPLOAD_BYTES"),
                "REELGEN_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            id_strategy,
            cors_origins,
            rate_limit_burst: parse_or(
                var("REELGEN_RATE_LIMIT_BURST"),
                "REELGEN_RATE_LIMIT_BURST",
                DEFAULT_RATE_LIMIT_BURST,
            )?,
            rate_limit_rate: parse_or(
                var("REELGEN_RATE_LIMIT_RATE"),
                "REELGEN_RATE_LIMIT_RATE",
                DEFAULT_RATE_LIMIT_RATE,
            )?,
            log_format: var("REELGEN_LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
        })
    }

    /// Catalog from `catalog_file`, or the built-in sample videos
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_file {
            Some(path) => load_catalog_file(path),
            None => builtin_catalog(),
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &str, default: T) -> Result<T> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::Config(format!("{} has an invalid value: '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

pub fn builtin_catalog() -> Result<Catalog> {
    let items = BUILTIN_CATALOG
        .iter()
        .map(|(name, source)| WorkItem::new(*name, *source))
        .collect();
    Ok(Catalog::new(items)?)
}

/// JSON array of `{"name", "source"}`
pub fn load_catalog_file(path: &Path) -> Result<Catalog> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::Config(format!("Cannot read catalog file {}: {}", path.display(), e))
    })?;
    let items: Vec<WorkItem> = serde_json::from_str(&raw).map_err(|e| {
        AppError::Config(format!("Invalid catalog file {}: {}", path.display(), e))
    })?;
    Ok(Catalog::new(items)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelgen_api_http::HttpServerConfig;
    use reelgen_core::application::EngineConfig;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DaemonConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.storage_dir, PathBuf::from("videos"));
        assert!(config.catalog_file.is_none());
        assert_eq!(config.progress_steps, 5);
        assert_eq!(config.step_delay, Duration::from_secs(1));
        assert_eq!(config.fetch_timeout, Duration::from_secs(120));
        assert_eq!(config.max_upload_bytes, 52_428_800);
        assert_eq!(config.id_strategy, IdStrategy::Sequential);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.rate_limit_burst, 200);
        assert_eq!(config.rate_limit_rate, 100);
        assert_eq!(config.log_format, "pretty");
    }

    #[test]
    fn test_defaults_match_library_defaults() {
        let config = config_from(&[]).unwrap();

        let engine = EngineConfig::default();
        assert_eq!(config.progress_steps, engine.progress_steps);
        assert_eq!(config.step_delay, engine.step_delay);
        assert_eq!(config.max_upload_bytes, engine.max_upload_bytes);

        let server = HttpServerConfig::default();
        assert_eq!(config.host, server.host);
        assert_eq!(config.port, server.port);
        assert_eq!(config.cors_origins, server.cors_origins);
        assert_eq!(config.rate_limit_burst, server.rate_limit_burst);
        assert_eq!(config.rate_limit_rate, server.rate_limit_rate);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("REELGEN_PORT", "9000"),
            ("REELGEN_STEP_DELAY_MS", "10"),
            ("REELGEN_ID_STRATEGY", "uuid"),
            ("REELGEN_CORS_ORIGINS", "http://a.test, http://b.test,"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.step_delay, Duration::from_millis(10));
        assert_eq!(config.id_strategy, IdStrategy::Uuid);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        let err = config_from(&[("REELGEN_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("REELGEN_PORT")));

        assert!(matches!(
            config_from(&[("REELGEN_PROGRESS_STEPS", "0")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("REELGEN_ID_STRATEGY", "random")]),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = builtin_catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.items().iter().all(|i| i.extension() == "mp4"));
    }

    #[test]
    fn test_load_catalog_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"name": "local", "source": "file:///srv/a.mp4"}, {"name": "remote", "source": "https://cdn.test/b.webm"}]"#,
        )
        .unwrap();

        let catalog = load_catalog_file(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.items()[1].name, "remote");
    }

    #[test]
    fn test_load_catalog_file_rejects_bad_input() {
        let dir = tempfile::TempDir::new().unwrap();

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "[]").unwrap();
        assert!(load_catalog_file(&empty).is_err());

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(
            load_catalog_file(&garbage),
            Err(AppError::Config(_))
        ));

        assert!(load_catalog_file(&dir.path().join("missing.json")).is_err());
    }
}
