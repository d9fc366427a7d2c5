//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::Path;

/// Primary API key variable.
pub const API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";

/// Key variable used by the web front end, checked second.
pub const PUBLIC_API_KEY_VAR: &str = "NEXT_PUBLIC_GOOGLE_MAPS_API_KEY";

/// Overrides the geocoding endpoint.
pub const ENDPOINT_VAR: &str = "PHARMALINK_GEOCODE_ENDPOINT";

/// Overrides the geocoding timeout, in seconds.
pub const TIMEOUT_VAR: &str = "PHARMALINK_GEOCODE_TIMEOUT_SECS";

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or standard locations, then apply
    /// environment overrides.
    ///
    /// An explicit path that does not exist is an error; a missing file in
    /// the standard locations just means defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(p) = path {
            if !Path::new(p).exists() {
                return Err(Error::config_not_found(p));
            }
        }

        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        let mut config = Self {
            schema,
            path: config_path,
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.schema.validate()?;

        Ok(config)
    }

    /// Load with defaults only (no file, no environment)
    pub fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }

    /// Apply overrides from a variable lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_VAR).or_else(|| non_empty(PUBLIC_API_KEY_VAR)) {
            self.schema.geocoding.api_key = Some(key);
        }

        if let Some(endpoint) = non_empty(ENDPOINT_VAR) {
            self.schema.geocoding.endpoint = endpoint;
        }

        if let Some(secs) = non_empty(TIMEOUT_VAR).and_then(|s| s.trim().parse().ok()) {
            self.schema.geocoding.timeout_secs = secs;
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [
        "pharmalink.toml",
        ".pharmalink.toml",
        ".config/pharmalink.toml",
    ];

    candidates
        .into_iter()
        .find(|candidate| Path::new(candidate).exists())
        .map(String::from)
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path, e))
            .with_source(e)
    })?;

    toml::from_str(&content).map_err(|e| {
        Error::new(ErrorCode::ConfigParseError, format!("Failed to parse config file {}: {}", path, e))
            .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.schema.short_links.max_redirects, 5);
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[short_links]\nmax_redirects = 3\ndomains = [\"short.example\"]\n\n[logging]\njson = true"
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = Config::load(Some(&path)).unwrap();

        assert_eq!(config.path.as_deref(), Some(path.as_str()));
        assert_eq!(config.schema.short_links.max_redirects, 3);
        assert_eq!(
            config.schema.short_links.domains,
            Some(vec!["short.example".to_string()])
        );
        assert!(config.schema.logging.json);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some("/definitely/not/here/pharmalink.toml")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigNotFound);
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[geocoding\napi_key = ").unwrap();

        let err = Config::load(Some(file.path().to_str().unwrap())).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigParseError);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (PUBLIC_API_KEY_VAR, "public-key"),
            (ENDPOINT_VAR, "http://127.0.0.1:9000/geocode"),
            (TIMEOUT_VAR, "3"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.schema.geocoding.api_key.as_deref(), Some("public-key"));
        assert_eq!(config.schema.geocoding.endpoint, "http://127.0.0.1:9000/geocode");
        assert_eq!(config.schema.geocoding.timeout_secs, 3);
    }

    #[test]
    fn test_primary_key_wins_and_blank_is_ignored() {
        let env: HashMap<&str, &str> =
            [(API_KEY_VAR, "server-key"), (PUBLIC_API_KEY_VAR, "public-key")].into_iter().collect();
        let mut config = Config::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.schema.geocoding.api_key.as_deref(), Some("server-key"));

        let mut config = Config::default();
        config.apply_overrides(|k| (k == API_KEY_VAR).then(|| "  ".to_string()));
        assert!(config.schema.geocoding.api_key.is_none());
    }
}
