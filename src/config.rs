//! Configuration module for the webmail service.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, WebmailError};

/// Secret key shipped in the defaults. Only acceptable in debug mode.
pub const DEFAULT_SECRET_KEY: &str = "change-me-in-production";

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Host names accepted in the `Host` header (`*` accepts any).
    #[serde(default = "default_allowed_hosts")]
    pub allowed_hosts: Vec<String>,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_allowed_hosts() -> Vec<String> {
    vec![
        "mail.webiime.ir".to_string(),
        "localhost".to_string(),
        "127.0.0.1".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_hosts: default_allowed_hosts(),
            cors_origins: vec![],
        }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Secret used to sign access tokens.
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Debug mode. Disables the allowed-host check.
    #[serde(default)]
    pub debug: bool,
    /// Access token expiry in seconds.
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiry in days.
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry_days: u64,
}

fn default_secret_key() -> String {
    DEFAULT_SECRET_KEY.to_string()
}

fn default_access_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_expiry() -> u64 {
    7
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            debug: false,
            access_token_expiry_secs: default_access_expiry(),
            refresh_token_expiry_days: default_refresh_expiry(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL.
    #[serde(default = "default_db_url")]
    pub url: String,
    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_url() -> String {
    "sqlite://data/webmail.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// SMTP relay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// Relay host name.
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// Relay port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// Login user. Empty disables authentication.
    #[serde(default = "default_smtp_user")]
    pub user: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Upgrade the connection with STARTTLS.
    #[serde(default = "default_smtp_tls")]
    pub use_tls: bool,
    /// Connect with implicit TLS (usually port 465).
    #[serde(default)]
    pub use_ssl: bool,
    /// Connect and command timeout in seconds.
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

fn default_smtp_host() -> String {
    "mail.webiime.ir".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_user() -> String {
    "admin@webiime.ir".to_string()
}

fn default_smtp_tls() -> bool {
    true
}

fn default_smtp_timeout() -> u64 {
    30
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            user: default_smtp_user(),
            password: String::new(),
            use_tls: default_smtp_tls(),
            use_ssl: false,
            timeout_secs: default_smtp_timeout(),
        }
    }
}

/// Mail domain configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Domain appended to usernames to form mailbox addresses.
    #[serde(default = "default_mail_domain")]
    pub domain: String,
    /// Sender used when a message has no explicit from address.
    #[serde(default = "default_from")]
    pub default_from: String,
    /// Maximum total size of one message's attachments in megabytes.
    #[serde(default = "default_max_attachment_size")]
    pub max_attachment_size_mb: u64,
}

fn default_mail_domain() -> String {
    "webiime.ir".to_string()
}

fn default_from() -> String {
    "admin@webiime.ir".to_string()
}

fn default_max_attachment_size() -> u64 {
    10
}

impl MailConfig {
    /// Attachment limit in bytes.
    pub fn max_attachment_bytes(&self) -> usize {
        (self.max_attachment_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            domain: default_mail_domain(),
            default_from: default_from(),
            max_attachment_size_mb: default_max_attachment_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/webmail.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Security configuration.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// SMTP relay configuration.
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Mail domain configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(WebmailError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| WebmailError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// Supported variables:
    /// - `WEBMAIL_HOST`, `WEBMAIL_PORT`, `WEBMAIL_ALLOWED_HOSTS` (comma separated)
    /// - `WEBMAIL_SECRET_KEY`, `WEBMAIL_DEBUG`
    /// - `WEBMAIL_DATABASE_URL`
    /// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASSWORD`, `SMTP_TLS`, `SMTP_SSL`
    /// - `WEBMAIL_MAIL_DOMAIN`, `DEFAULT_FROM_EMAIL`
    ///
    /// Empty values are ignored, except for `SMTP_USER` and `SMTP_PASSWORD`
    /// where an empty value is meaningful.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(host) = non_empty("WEBMAIL_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("WEBMAIL_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(hosts) = non_empty("WEBMAIL_ALLOWED_HOSTS") {
            self.server.allowed_hosts = hosts
                .split(',')
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(secret) = non_empty("WEBMAIL_SECRET_KEY") {
            self.security.secret_key = secret;
        }
        if let Some(debug) = non_empty("WEBMAIL_DEBUG") {
            self.security.debug = parse_flag(&debug);
        }
        if let Some(url) = non_empty("WEBMAIL_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(host) = non_empty("SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Some(port) = non_empty("SMTP_PORT").and_then(|p| p.parse().ok()) {
            self.smtp.port = port;
        }
        if let Some(user) = lookup("SMTP_USER") {
            self.smtp.user = user;
        }
        if let Some(password) = lookup("SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        if let Some(tls) = non_empty("SMTP_TLS") {
            self.smtp.use_tls = parse_flag(&tls);
        }
        if let Some(ssl) = non_empty("SMTP_SSL") {
            self.smtp.use_ssl = parse_flag(&ssl);
        }
        if let Some(domain) = non_empty("WEBMAIL_MAIL_DOMAIN") {
            self.mail.domain = domain;
        }
        if let Some(from) = non_empty("DEFAULT_FROM_EMAIL") {
            self.mail.default_from = from;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the secret key is empty
    /// - both STARTTLS and implicit TLS are enabled
    /// - the SMTP timeout is zero
    /// - the mail domain is empty
    pub fn validate(&self) -> Result<()> {
        if self.security.secret_key.is_empty() {
            return Err(WebmailError::Config(
                "secret_key is not set. Set it in config.toml or via WEBMAIL_SECRET_KEY."
                    .to_string(),
            ));
        }
        if self.smtp.use_tls && self.smtp.use_ssl {
            return Err(WebmailError::Config(
                "smtp.use_tls and smtp.use_ssl are mutually exclusive".to_string(),
            ));
        }
        if self.smtp.timeout_secs == 0 {
            return Err(WebmailError::Config(
                "smtp.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.mail.domain.trim().is_empty() {
            return Err(WebmailError::Config("mail.domain is empty".to_string()));
        }
        if self.security.secret_key == DEFAULT_SECRET_KEY && !self.security.debug {
            tracing::warn!("Using the default secret key outside debug mode");
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(
            config.server.allowed_hosts,
            vec!["mail.webiime.ir", "localhost", "127.0.0.1"]
        );
        assert!(config.server.cors_origins.is_empty());

        assert_eq!(config.security.secret_key, DEFAULT_SECRET_KEY);
        assert!(!config.security.debug);
        assert_eq!(config.security.access_token_expiry_secs, 900);
        assert_eq!(config.security.refresh_token_expiry_days, 7);

        assert_eq!(config.database.url, "sqlite://data/webmail.db");
        assert_eq!(config.database.max_connections, 5);

        assert_eq!(config.smtp.host, "mail.webiime.ir");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.user, "admin@webiime.ir");
        assert!(config.smtp.password.is_empty());
        assert!(config.smtp.use_tls);
        assert!(!config.smtp.use_ssl);
        assert_eq!(config.smtp.timeout_secs, 30);

        assert_eq!(config.mail.domain, "webiime.ir");
        assert_eq!(config.mail.default_from, "admin@webiime.ir");
        assert_eq!(config.mail.max_attachment_size_mb, 10);
        assert_eq!(config.mail.max_attachment_bytes(), 10 * 1024 * 1024);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/webmail.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
allowed_hosts = ["example.org"]
cors_origins = ["http://localhost:5173"]

[security]
secret_key = "s3cret"
debug = true
access_token_expiry_secs = 600
refresh_token_expiry_days = 14

[database]
url = "sqlite://custom.db"
max_connections = 2

[smtp]
host = "smtp.example.org"
port = 465
user = ""
password = "pw"
use_tls = false
use_ssl = true
timeout_secs = 10

[mail]
domain = "example.org"
default_from = "noreply@example.org"
max_attachment_size_mb = 2

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.allowed_hosts, vec!["example.org"]);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.security.secret_key, "s3cret");
        assert!(config.security.debug);
        assert_eq!(config.security.access_token_expiry_secs, 600);
        assert_eq!(config.security.refresh_token_expiry_days, 14);
        assert_eq!(config.database.url, "sqlite://custom.db");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.smtp.host, "smtp.example.org");
        assert_eq!(config.smtp.port, 465);
        assert!(config.smtp.user.is_empty());
        assert_eq!(config.smtp.password, "pw");
        assert!(!config.smtp.use_tls);
        assert!(config.smtp.use_ssl);
        assert_eq!(config.smtp.timeout_secs, 10);
        assert_eq!(config.mail.domain, "example.org");
        assert_eq!(config.mail.default_from, "noreply@example.org");
        assert_eq!(config.mail.max_attachment_size_mb, 2);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[smtp]
port = 2525
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.smtp.host, "mail.webiime.ir");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.mail.domain, "webiime.ir");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.url, "sqlite://data/webmail.db");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(WebmailError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(WebmailError::Io(_))));
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[
            ("WEBMAIL_SECRET_KEY", "env-secret"),
            ("WEBMAIL_DEBUG", "True"),
            ("WEBMAIL_ALLOWED_HOSTS", "a.example, b.example,,"),
            ("WEBMAIL_DATABASE_URL", "sqlite::memory:"),
            ("SMTP_HOST", "relay.example"),
            ("SMTP_PORT", "2525"),
            ("SMTP_USER", "relay-user"),
            ("SMTP_PASSWORD", "relay-pass"),
            ("SMTP_TLS", "false"),
            ("SMTP_SSL", "true"),
            ("DEFAULT_FROM_EMAIL", "noreply@example.org"),
        ]));

        assert_eq!(config.security.secret_key, "env-secret");
        assert!(config.security.debug);
        assert_eq!(config.server.allowed_hosts, vec!["a.example", "b.example"]);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.smtp.host, "relay.example");
        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.smtp.user, "relay-user");
        assert_eq!(config.smtp.password, "relay-pass");
        assert!(!config.smtp.use_tls);
        assert!(config.smtp.use_ssl);
        assert_eq!(config.mail.default_from, "noreply@example.org");
    }

    #[test]
    fn test_overrides_ignore_empty_and_garbage() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[
            ("WEBMAIL_SECRET_KEY", ""),
            ("SMTP_PORT", "not-a-port"),
        ]));

        assert_eq!(config.security.secret_key, DEFAULT_SECRET_KEY);
        assert_eq!(config.smtp.port, 587);
    }

    #[test]
    fn test_empty_smtp_user_disables_auth() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup_from(&[("SMTP_USER", "")]));
        assert!(config.smtp.user.is_empty());
    }

    #[test]
    fn test_validate_default_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_secret() {
        let mut config = Config::default();
        config.security.secret_key = String::new();

        let result = config.validate();
        if let Err(WebmailError::Config(msg)) = result {
            assert!(msg.contains("secret_key"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_tls_and_ssl() {
        let mut config = Config::default();
        config.smtp.use_ssl = true;
        assert!(config.validate().is_err());

        config.smtp.use_tls = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_smtp_timeout() {
        let mut config = Config::default();
        config.smtp.timeout_secs = 0;

        match config.validate() {
            Err(WebmailError::Config(msg)) => assert!(msg.contains("timeout_secs")),
            other => panic!("Expected Config error, got {other:?}"),
        }

        config.smtp.timeout_secs = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_domain() {
        let mut config = Config::default();
        config.mail.domain = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
