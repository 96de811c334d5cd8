//! Configuration loading for frontstore.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.frontstore/config.toml`)
//! 3. User config (`~/.frontstore/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The stores run with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cookies::CookieDefaults;
use crate::error::{FailOpen, Result, StoreError};

/// Main configuration struct for frontstore.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Host store configuration.
    pub storage: StorageConfig,
    /// Cookie write defaults.
    pub cookies: CookiesConfig,
}

/// Host store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// File backing the local store. Defaults to
    /// `<frontstore_home>/local-storage.json`.
    pub local_path: Option<PathBuf>,
}

/// Cookie write defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CookiesConfig {
    /// Path attribute for writes that don't set one.
    pub path: Option<String>,
    /// Domain attribute for writes that don't set one.
    pub domain: Option<String>,
    /// Whether writes are `secure` unless they say otherwise. Unset means
    /// off, and leaves a lower layer's choice in place.
    pub secure: Option<bool>,
}

impl CookiesConfig {
    /// Check if a cookie path is valid (must start with `/`).
    pub fn is_valid_path(value: &str) -> bool {
        value.starts_with('/')
    }

    /// Check if a cookie domain is valid (non-empty, no whitespace or `;`).
    pub fn is_valid_domain(value: &str) -> bool {
        !value.is_empty() && !value.contains(|c: char| c.is_whitespace() || c == ';')
    }

    /// Drop file values that would corrupt a cookie assignment.
    fn discard_invalid(&mut self, source: &Path) {
        if let Some(path) = self.path.take_if(|path| !Self::is_valid_path(path)) {
            tracing::warn!(
                "Invalid cookies.path '{}' in {}. Must start with '/'. Ignoring.",
                path,
                source.display()
            );
        }
        if let Some(domain) = self.domain.take_if(|domain| !Self::is_valid_domain(domain)) {
            tracing::warn!(
                "Invalid cookies.domain '{}' in {}. Ignoring.",
                domain,
                source.display()
            );
        }
    }
}

impl From<&CookiesConfig> for CookieDefaults {
    fn from(config: &CookiesConfig) -> Self {
        Self {
            path: config.path.clone(),
            domain: config.domain.clone(),
            secure: config.secure.unwrap_or(false),
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.frontstore/config.toml` in cwd)
    /// 3. User config (`~/.frontstore/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.frontstore/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = frontstore_home()?;
        Self::load_optional(&home.join("config.toml"))
    }

    /// Load project config from `.frontstore/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        Self::load_optional(&cwd.join(".frontstore").join("config.toml"))
    }

    /// Load a config file that may legitimately be missing.
    ///
    /// A file that exists but fails to parse is logged and skipped.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        Self::load_from_file(path)
            .map(Some)
            .fail_open_with(&format!("ignoring config {}", path.display()), None)
    }

    /// Load config from a specific file path.
    ///
    /// Invalid cookie path or domain values are logged and left unset.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| StoreError::storage(path, e))?;
        let mut config: Config =
            toml::from_str(&content).map_err(|e| StoreError::config(e.to_string()))?;
        config.cookies.discard_invalid(path);
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // FRONTSTORE_LOCAL_PATH
        if let Ok(val) = env::var("FRONTSTORE_LOCAL_PATH") {
            if val.is_empty() {
                tracing::warn!("FRONTSTORE_LOCAL_PATH is empty, ignoring");
            } else {
                self.storage.local_path = Some(PathBuf::from(val));
            }
        }

        // FRONTSTORE_COOKIE_PATH
        if let Ok(val) = env::var("FRONTSTORE_COOKIE_PATH") {
            if CookiesConfig::is_valid_path(&val) {
                self.cookies.path = Some(val);
            } else {
                tracing::warn!(
                    "Invalid FRONTSTORE_COOKIE_PATH value '{}'. Must start with '/'. Keeping {:?}.",
                    val,
                    self.cookies.path
                );
            }
        }

        // FRONTSTORE_COOKIE_DOMAIN
        if let Ok(val) = env::var("FRONTSTORE_COOKIE_DOMAIN") {
            if CookiesConfig::is_valid_domain(&val) {
                self.cookies.domain = Some(val);
            } else {
                tracing::warn!(
                    "Invalid FRONTSTORE_COOKIE_DOMAIN value '{}'. Keeping {:?}.",
                    val,
                    self.cookies.domain
                );
            }
        }

        // FRONTSTORE_COOKIE_SECURE
        if let Ok(val) = env::var("FRONTSTORE_COOKIE_SECURE") {
            self.cookies.secure = Some(val == "true" || val == "1");
        }
    }

    /// Merge another config into this one.
    ///
    /// The `other` config takes precedence field by field. Unset fields in
    /// `other` leave `self` alone, so a layer only needs to name what it
    /// customizes.
    fn merge(mut self, other: Config) -> Self {
        if other.storage.local_path.is_some() {
            self.storage.local_path = other.storage.local_path;
        }

        if other.cookies.path.is_some() {
            self.cookies.path = other.cookies.path;
        }
        if other.cookies.domain.is_some() {
            self.cookies.domain = other.cookies.domain;
        }
        if other.cookies.secure.is_some() {
            self.cookies.secure = other.cookies.secure;
        }

        self
    }

    /// The local store file: the configured path, else the default location.
    pub fn local_storage_path(&self) -> Option<PathBuf> {
        self.storage.local_path.clone().or_else(local_storage_path)
    }

    /// Cookie defaults for the cookie adapter.
    pub fn cookie_defaults(&self) -> CookieDefaults {
        CookieDefaults::from(&self.cookies)
    }
}

/// Get the frontstore home directory.
///
/// Checks `FRONTSTORE_HOME` first, then falls back to `~/.frontstore`.
/// An empty `FRONTSTORE_HOME` is ignored.
pub fn frontstore_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("FRONTSTORE_HOME") {
        if home.is_empty() {
            tracing::warn!("FRONTSTORE_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("FRONTSTORE_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(".frontstore"))
}

/// Get the default local store file.
///
/// Returns `<frontstore_home>/local-storage.json`.
pub fn local_storage_path() -> Option<PathBuf> {
    frontstore_home().map(|h| h.join("local-storage.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Point FRONTSTORE_HOME at an empty directory so no user config leaks in.
    fn isolated_home() -> TempDir {
        let home = TempDir::new().unwrap();
        env::set_var("FRONTSTORE_HOME", home.path());
        home
    }

    fn clear_env() {
        for var in [
            "FRONTSTORE_HOME",
            "FRONTSTORE_LOCAL_PATH",
            "FRONTSTORE_COOKIE_PATH",
            "FRONTSTORE_COOKIE_DOMAIN",
            "FRONTSTORE_COOKIE_SECURE",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.local_path.is_none());
        assert!(config.cookies.path.is_none());
        assert!(config.cookies.domain.is_none());
        assert!(config.cookies.secure.is_none());
        assert!(!config.cookie_defaults().secure);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
[storage]
local_path = "/var/lib/app/local.json"

[cookies]
path = "/"
secure = true
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert_eq!(
            config.storage.local_path,
            Some(PathBuf::from("/var/lib/app/local.json"))
        );
        assert_eq!(config.cookies.path.as_deref(), Some("/"));
        assert_eq!(config.cookies.secure, Some(true));
        // Other fields should be defaults
        assert!(config.cookies.domain.is_none());
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(StoreError::Config { .. })));
    }

    #[test]
    #[serial]
    fn test_project_config_overrides_user_config() {
        clear_env();
        let home = isolated_home();
        fs::write(
            home.path().join("config.toml"),
            "[cookies]\npath = \"/user\"\ndomain = \"user.example\"\n",
        )
        .unwrap();

        let project = TempDir::new().unwrap();
        let project_dir = project.path().join(".frontstore");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("config.toml"), "[cookies]\npath = \"/project\"\n").unwrap();

        let config = Config::load_from_cwd(project.path());

        assert_eq!(config.cookies.path.as_deref(), Some("/project"));
        // Fields the project doesn't name come from the user layer
        assert_eq!(config.cookies.domain.as_deref(), Some("user.example"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_project_config_is_skipped() {
        clear_env();
        let _home = isolated_home();
        let project = TempDir::new().unwrap();
        let project_dir = project.path().join(".frontstore");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("config.toml"), "[[[").unwrap();

        let config = Config::load_from_cwd(project.path());

        assert_eq!(config, Config::default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        let _home = isolated_home();
        env::set_var("FRONTSTORE_LOCAL_PATH", "/tmp/elsewhere.json");
        env::set_var("FRONTSTORE_COOKIE_PATH", "/app");
        env::set_var("FRONTSTORE_COOKIE_DOMAIN", "example.com");
        env::set_var("FRONTSTORE_COOKIE_SECURE", "1");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert_eq!(
            config.storage.local_path,
            Some(PathBuf::from("/tmp/elsewhere.json"))
        );
        assert_eq!(config.cookies.path.as_deref(), Some("/app"));
        assert_eq!(config.cookies.domain.as_deref(), Some("example.com"));
        assert_eq!(config.cookies.secure, Some(true));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values_ignored() {
        clear_env();
        let _home = isolated_home();
        env::set_var("FRONTSTORE_COOKIE_PATH", "no-leading-slash");
        env::set_var("FRONTSTORE_COOKIE_DOMAIN", "bad domain;");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert!(config.cookies.path.is_none());
        assert!(config.cookies.domain.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_secure_false_overrides_file() {
        clear_env();
        let home = isolated_home();
        fs::write(home.path().join("config.toml"), "[cookies]\nsecure = true\n").unwrap();
        env::set_var("FRONTSTORE_COOKIE_SECURE", "false");

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.cookies.secure, Some(false));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_project_secure_false_overrides_user() {
        clear_env();
        let home = isolated_home();
        fs::write(home.path().join("config.toml"), "[cookies]\nsecure = true\n").unwrap();

        let project = TempDir::new().unwrap();
        let project_dir = project.path().join(".frontstore");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("config.toml"), "[cookies]\nsecure = false\n").unwrap();

        let config = Config::load_from_cwd(project.path());

        assert_eq!(config.cookies.secure, Some(false));
        assert!(!config.cookie_defaults().secure);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_project_without_secure_keeps_user_choice() {
        clear_env();
        let home = isolated_home();
        fs::write(home.path().join("config.toml"), "[cookies]\nsecure = true\n").unwrap();

        let project = TempDir::new().unwrap();
        let project_dir = project.path().join(".frontstore");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("config.toml"), "[cookies]\npath = \"/app\"\n").unwrap();

        let config = Config::load_from_cwd(project.path());

        assert_eq!(config.cookies.secure, Some(true));
        assert_eq!(config.cookies.path.as_deref(), Some("/app"));

        clear_env();
    }

    #[test]
    fn test_invalid_file_cookie_values_dropped() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[cookies]\npath = \"app; secure\"\ndomain = \"bad domain;\"\nsecure = true\n",
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert!(config.cookies.path.is_none());
        assert!(config.cookies.domain.is_none());
        assert_eq!(config.cookies.secure, Some(true));
    }

    #[test]
    #[serial]
    fn test_invalid_user_cookie_path_is_dropped() {
        clear_env();
        let home = isolated_home();
        fs::write(
            home.path().join("config.toml"),
            "[cookies]\npath = \"relative\"\ndomain = \"example.com\"\n",
        )
        .unwrap();

        let dir = TempDir::new().unwrap();
        let config = Config::load_from_cwd(dir.path());

        assert!(config.cookies.path.is_none());
        assert_eq!(config.cookies.domain.as_deref(), Some("example.com"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_frontstore_home_env() {
        clear_env();
        let home = isolated_home();

        assert_eq!(frontstore_home(), Some(home.path().to_path_buf()));
        assert_eq!(
            local_storage_path(),
            Some(home.path().join("local-storage.json"))
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_configured_local_path_wins() {
        clear_env();
        let _home = isolated_home();
        let mut config = Config::default();
        config.storage.local_path = Some(PathBuf::from("/srv/local.json"));

        assert_eq!(
            config.local_storage_path(),
            Some(PathBuf::from("/srv/local.json"))
        );

        clear_env();
    }

    #[test]
    fn test_cookie_defaults_from_config() {
        let config = Config {
            cookies: CookiesConfig {
                path: Some("/".into()),
                domain: Some("example.com".into()),
                secure: Some(true),
            },
            ..Default::default()
        };

        let defaults = config.cookie_defaults();
        assert_eq!(defaults.path.as_deref(), Some("/"));
        assert_eq!(defaults.domain.as_deref(), Some("example.com"));
        assert!(defaults.secure);
    }

    #[test]
    fn test_validators() {
        assert!(CookiesConfig::is_valid_path("/"));
        assert!(!CookiesConfig::is_valid_path("app"));
        assert!(CookiesConfig::is_valid_domain(".example.com"));
        assert!(!CookiesConfig::is_valid_domain(""));
        assert!(!CookiesConfig::is_valid_domain("a b"));
    }
}
