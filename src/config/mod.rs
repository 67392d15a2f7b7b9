//! Configuration management
//!
//! Configuration is loaded from a config.yml file; environment
//! variables (`QUILLPRESS_*`) override file settings. Missing files and
//! missing keys fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Site identity (base URL for absolute links)
    #[serde(default)]
    pub site: SiteConfig,
    /// Theme configuration
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Outbound mail configuration
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/quillpress.db".to_string()
}

/// Site identity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name, used in page titles
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Absolute base URL, used when composing share emails
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            base_url: default_base_url(),
        }
    }
}

fn default_site_name() -> String {
    "Quillpress".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

/// Theme configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Path to the themes directory
    #[serde(default = "default_theme_path")]
    pub path: String,
    /// Active theme name
    #[serde(default = "default_theme_active")]
    pub active: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            path: default_theme_path(),
            active: default_theme_active(),
        }
    }
}

fn default_theme_path() -> String {
    "themes".to_string()
}

fn default_theme_active() -> String {
    "default".to_string()
}

/// SMTP configuration for the share-by-email feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host; empty means mail sending is unconfigured
    #[serde(default)]
    pub host: String,
    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username
    #[serde(default)]
    pub username: String,
    /// SMTP password
    #[serde(default)]
    pub password: String,
    /// Fixed sender address for all outgoing mail
    #[serde(default = "default_smtp_from")]
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: default_smtp_from(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "admin@myblog.com".to_string()
}

impl Config {
    /// Load configuration from file.
    ///
    /// A missing or empty file yields the default configuration; a file
    /// with invalid YAML is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config file {}: {}", path.display(), e))?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Recognized variables:
    /// - QUILLPRESS_SERVER_HOST / QUILLPRESS_SERVER_PORT
    /// - QUILLPRESS_DATABASE_URL
    /// - QUILLPRESS_SITE_BASE_URL
    /// - QUILLPRESS_SMTP_HOST / QUILLPRESS_SMTP_PORT
    /// - QUILLPRESS_SMTP_USERNAME / QUILLPRESS_SMTP_PASSWORD
    /// - QUILLPRESS_SMTP_FROM
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("QUILLPRESS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("QUILLPRESS_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("QUILLPRESS_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(base_url) = std::env::var("QUILLPRESS_SITE_BASE_URL") {
            self.site.base_url = base_url;
        }
        if let Ok(host) = std::env::var("QUILLPRESS_SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Ok(port) = std::env::var("QUILLPRESS_SMTP_PORT") {
            if let Ok(port) = port.parse() {
                self.smtp.port = port;
            }
        }
        if let Ok(username) = std::env::var("QUILLPRESS_SMTP_USERNAME") {
            self.smtp.username = username;
        }
        if let Ok(password) = std::env::var("QUILLPRESS_SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        if let Ok(from) = std::env::var("QUILLPRESS_SMTP_FROM") {
            self.smtp.from = from;
        }
    }
}
