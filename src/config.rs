use anyhow::{Context, Result};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

#[derive(Debug, Clone)]
pub struct Config {
    // Servidor
    pub bind_addr: SocketAddr,
    pub frontend_dir: Option<PathBuf>,

    // Paths
    pub data_dir: PathBuf,

    // Extractor
    pub ytdlp_path: String,
    pub max_concurrent_extractions: usize,
    pub youtube_api_key: Option<String>,

    // Caché
    pub stream_cache_ttl: Duration,
    pub upnext_cache_ttl: Duration,

    // Límites de latencia
    pub extract_timeout: Duration,
    pub lookup_timeout: Duration,
    pub search_timeout: Duration,

    // Autoplay
    pub upnext_seed: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda de
    /// variables; `load` usa el entorno del proceso.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = match var("PORT") {
            Some(port) => port.parse().context("PORT must be a port number")?,
            None => defaults.bind_addr.port(),
        };

        let duration = |key: &str, default: Duration| -> Result<Duration> {
            match var(key) {
                Some(value) => humantime::parse_duration(value.trim())
                    .with_context(|| format!("{key} must be a duration like 30m or 6s")),
                None => Ok(default),
            }
        };

        let config = Self {
            bind_addr: format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid listen address {host}:{port}"))?,
            frontend_dir: var("FRONTEND_DIR").map(PathBuf::from),

            data_dir: var("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),

            ytdlp_path: var("YTDLP_PATH").unwrap_or(defaults.ytdlp_path),
            max_concurrent_extractions: match var("YTDLP_CONCURRENCY") {
                Some(value) => value.parse().context("YTDLP_CONCURRENCY must be a number")?,
                None => defaults.max_concurrent_extractions,
            },
            youtube_api_key: var("YOUTUBE_API_KEY"),

            stream_cache_ttl: duration("STREAM_CACHE_TTL", defaults.stream_cache_ttl)?,
            upnext_cache_ttl: duration("UPNEXT_CACHE_TTL", defaults.upnext_cache_ttl)?,

            extract_timeout: duration("EXTRACT_TIMEOUT", defaults.extract_timeout)?,
            lookup_timeout: duration("LOOKUP_TIMEOUT", defaults.lookup_timeout)?,
            search_timeout: duration("SEARCH_TIMEOUT", defaults.search_timeout)?,

            upnext_seed: match var("UPNEXT_SEED") {
                Some(value) => Some(value.parse().context("UPNEXT_SEED must be an integer")?),
                None => None,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values for correctness.
    ///
    /// # Validation Rules
    ///
    /// - TTLs and timeouts must be non-zero
    /// - At least one extractor process must be allowed
    pub fn validate(&self) -> Result<()> {
        if self.stream_cache_ttl.is_zero() || self.upnext_cache_ttl.is_zero() {
            anyhow::bail!("Cache TTLs must be greater than 0");
        }

        if self.extract_timeout.is_zero()
            || self.lookup_timeout.is_zero()
            || self.search_timeout.is_zero()
        {
            anyhow::bail!("Timeouts must be greater than 0");
        }

        if self.max_concurrent_extractions == 0 {
            anyhow::bail!("YTDLP_CONCURRENCY must be greater than 0");
        }

        Ok(())
    }

    /// Returns a summary of the current configuration for logging.
    ///
    /// The API key is never printed, only whether it is set.
    pub fn summary(&self) -> String {
        format!(
            "Config Summary:\n  \
            Server: {} (frontend: {})\n  \
            Data: {}\n  \
            Extractor: {} x{} (API key: {})\n  \
            Cache TTL: stream {}, up next {}\n  \
            Timeouts: extract {}, lookup {}, search {}",
            self.bind_addr,
            self.frontend_dir
                .as_ref()
                .map_or("none".to_string(), |d| d.display().to_string()),
            self.data_dir.display(),
            self.ytdlp_path,
            self.max_concurrent_extractions,
            if self.youtube_api_key.is_some() { "set" } else { "unset" },
            humantime::format_duration(self.stream_cache_ttl),
            humantime::format_duration(self.upnext_cache_ttl),
            humantime::format_duration(self.extract_timeout),
            humantime::format_duration(self.lookup_timeout),
            humantime::format_duration(self.search_timeout),
        )
    }
}

/// Default configuration values.
///
/// Used as fallbacks when environment variables are not provided.
impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            frontend_dir: None,

            data_dir: "./data".into(),

            ytdlp_path: "yt-dlp".to_string(),
            max_concurrent_extractions: 3,
            youtube_api_key: None,

            stream_cache_ttl: Duration::from_secs(30 * 60), // 30 minutos
            upnext_cache_ttl: Duration::from_secs(10 * 60), // 10 minutos

            extract_timeout: Duration::from_secs(20),
            lookup_timeout: Duration::from_secs(6),
            search_timeout: Duration::from_secs(15),

            upnext_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_env() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.stream_cache_ttl, Duration::from_secs(1800));
        assert_eq!(config.upnext_cache_ttl, Duration::from_secs(600));
        assert_eq!(config.lookup_timeout, Duration::from_secs(6));
        assert!(config.youtube_api_key.is_none());
    }

    #[test]
    fn parses_humantime_durations_and_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("HOST", "127.0.0.1"),
            ("STREAM_CACHE_TTL", "1h"),
            ("LOOKUP_TIMEOUT", "3s"),
            ("UPNEXT_SEED", "42"),
            ("YOUTUBE_API_KEY", "secret"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.stream_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.lookup_timeout, Duration::from_secs(3));
        assert_eq!(config.upnext_seed, Some(42));
        assert!(!config.summary().contains("secret"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("YOUTUBE_API_KEY", "  "), ("DATA_DIR", "")]).unwrap();
        assert!(config.youtube_api_key.is_none());
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("STREAM_CACHE_TTL", "0s")]).is_err());
        assert!(config_from(&[("YTDLP_CONCURRENCY", "0")]).is_err());
        assert!(config_from(&[("EXTRACT_TIMEOUT", "soon")]).is_err());
    }
}
