// pokedex-config/src/config.rs
// ============================================================================
// Module: Pokedex Configuration
// Description: Configuration loading and validation for the Pokedex server
//              and client commands.
// Purpose: Provide strict config parsing with hard limits and env overrides.
// Dependencies: pokedex-core, pokedex-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file is resolved from an explicit path, then `POKEDEX_CONFIG`, then
//! `pokedex.toml` in the working directory. Only the implicit default file
//! may be absent; in that case built-in defaults apply. Environment overrides
//! (`PORT`, `POKEDEX_DATABASE`, `POKEDEX_BACKEND_URL`) are applied after
//! parsing and before validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use pokedex_core::Credentials;
use pokedex_core::DEFAULT_PASSWORD;
use pokedex_core::DEFAULT_USERNAME;
use pokedex_store_sqlite::SqliteStoreConfig;
use pokedex_store_sqlite::SqliteStoreMode;
use pokedex_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "pokedex.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "POKEDEX_CONFIG";
/// Environment variable replacing the server bind port.
pub const PORT_ENV_VAR: &str = "PORT";
/// Environment variable selecting a `SQLite` database file.
pub const DATABASE_ENV_VAR: &str = "POKEDEX_DATABASE";
/// Environment variable replacing the client backend URL.
pub const BACKEND_URL_ENV_VAR: &str = "POKEDEX_BACKEND_URL";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum accepted request body limit.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 1024 * 1024;
/// Maximum length of a configured login field.
pub(crate) const MAX_LOGIN_FIELD_BYTES: usize = 256;
/// Maximum length of a configured URL.
pub(crate) const MAX_URL_LENGTH: usize = 2048;
/// Maximum roster size fetched by the client.
pub(crate) const MAX_ROSTER_LIMIT: u32 = 2_000;
/// Minimum client request timeout in milliseconds.
pub(crate) const MIN_CLIENT_TIMEOUT_MS: u64 = 100;
/// Maximum client request timeout in milliseconds.
pub(crate) const MAX_CLIENT_TIMEOUT_MS: u64 = 120_000;
/// Maximum client response body limit.
pub(crate) const MAX_CLIENT_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Maximum concurrent detail fetches.
pub(crate) const MAX_CLIENT_CONCURRENCY: usize = 64;
/// Maximum `SQLite` busy timeout in milliseconds.
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Pokedex configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PokedexConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Search history store configuration.
    #[serde(default)]
    pub history_store: HistoryStoreConfig,
    /// Expected login credentials.
    #[serde(default)]
    pub login: LoginConfig,
    /// Client command configuration.
    #[serde(default)]
    pub client: ClientConfig,
    /// Path the configuration was loaded from, when a file was read.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl PokedexConfig {
    /// Loads configuration from disk using the default resolution rules and
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| env::var(key).ok())
    }

    /// Loads configuration using `lookup` in place of the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = resolve_path(path, &lookup)?;
        validate_path(source.path())?;
        let mut config = match source {
            ConfigSource::Implicit(ref resolved) if !resolved.exists() => Self::default(),
            ConfigSource::Implicit(resolved) | ConfigSource::Explicit(resolved) => {
                let mut parsed = Self::from_toml_bytes(&read_bounded(&resolved)?)?;
                parsed.source_path = Some(resolved);
                parsed
            }
        };
        config.apply_env_overrides_from(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from raw TOML bytes without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the input is oversized, not UTF-8, or not
    /// valid TOML for this model.
    pub fn from_toml_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an override value is malformed.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(PORT_ENV_VAR) {
            let port: u16 = port.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{PORT_ENV_VAR} must be a port number"))
            })?;
            let mut addr = self.server.bind_addr()?;
            addr.set_port(port);
            self.server.bind = addr.to_string();
        }
        if let Some(path) = lookup(DATABASE_ENV_VAR) {
            self.history_store.store_type = HistoryStoreType::Sqlite;
            self.history_store.path = Some(PathBuf::from(path.trim()));
        }
        if let Some(url) = lookup(BACKEND_URL_ENV_VAR) {
            self.client.backend_url = url.trim().to_string();
        }
        Ok(())
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.history_store.validate()?;
        self.login.validate()?;
        self.client.validate()?;
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Cross-origin response header configuration.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: ServerAuditConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
            cors: CorsConfig::default(),
            audit: ServerAuditConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses the configured bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid server.bind address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be between 1 and {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        self.cors.validate()?;
        self.audit.validate()
    }
}

/// Cross-origin response header configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Emit CORS headers and answer preflight requests.
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
    /// Value of `Access-Control-Allow-Origin`.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

impl CorsConfig {
    /// Validates CORS configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.allowed_origin.trim();
        if origin.is_empty() {
            return Err(ConfigError::Invalid(
                "server.cors.allowed_origin must be non-empty".to_string(),
            ));
        }
        if !origin.bytes().all(|byte| (0x20 .. 0x7f).contains(&byte)) {
            return Err(ConfigError::Invalid(
                "server.cors.allowed_origin must be printable ascii".to_string(),
            ));
        }
        Ok(())
    }
}

/// Audit logging configuration for API requests.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerAuditConfig {
    /// Enable structured audit logging.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional audit log path (JSON lines); stderr when unset.
    #[serde(default)]
    pub path: Option<String>,
    /// Include raw search terms in search audit events.
    #[serde(default = "default_log_search_terms")]
    pub log_search_terms: bool,
}

impl Default for ServerAuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
            log_search_terms: default_log_search_terms(),
        }
    }
}

impl ServerAuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("server.audit.path", path)?;
        }
        Ok(())
    }
}

/// Search history store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryStoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: HistoryStoreType,
    /// `SQLite` database path; defaults to `pokedex.db` for the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for HistoryStoreConfig {
    fn default() -> Self {
        Self {
            store_type: HistoryStoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl HistoryStoreConfig {
    /// Returns the effective `SQLite` database path.
    #[must_use]
    pub fn sqlite_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_NAME))
    }

    /// Builds the `SQLite` store configuration for this section.
    #[must_use]
    pub fn sqlite_store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.sqlite_path(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }

    /// Validates history store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            HistoryStoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid(
                        "memory history_store must not set path".to_string(),
                    ));
                }
                Ok(())
            }
            HistoryStoreType::Sqlite => {
                let path = self.sqlite_path();
                validate_path_string("history_store.path", &path.to_string_lossy())?;
                if self.busy_timeout_ms == 0 || self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
                    return Err(ConfigError::Invalid(format!(
                        "history_store.busy_timeout_ms must be between 1 and \
                         {MAX_BUSY_TIMEOUT_MS}"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Default `SQLite` database filename.
const DEFAULT_DATABASE_NAME: &str = "pokedex.db";

/// History store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStoreType {
    /// Use the in-memory store (history is lost on restart).
    Memory,
    /// Use the `SQLite`-backed durable store.
    #[default]
    Sqlite,
}

/// Expected login credentials.
#[derive(Clone, Deserialize)]
pub struct LoginConfig {
    /// Expected username.
    #[serde(default = "default_username")]
    pub username: String,
    /// Expected password.
    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

impl fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginConfig {
    /// Builds the credential pair checked by the login handler.
    #[must_use]
    pub fn to_credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    /// Validates login configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("login.username", &self.username), ("login.password", &self.password)]
        {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
            }
            if value.len() > MAX_LOGIN_FIELD_BYTES {
                return Err(ConfigError::Invalid(format!(
                    "{field} exceeds {MAX_LOGIN_FIELD_BYTES} bytes"
                )));
            }
        }
        Ok(())
    }
}

/// Client command configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the Pokedex backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Base URL of the PokeAPI pokemon resource.
    #[serde(default = "default_pokeapi_url")]
    pub pokeapi_url: String,
    /// Number of Pokémon fetched by the roster command.
    #[serde(default = "default_roster_limit")]
    pub roster_limit: u32,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_client_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Maximum concurrent detail fetches for the roster.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            pokeapi_url: default_pokeapi_url(),
            roster_limit: default_roster_limit(),
            timeout_ms: default_client_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            concurrency: default_concurrency(),
        }
    }
}

impl ClientConfig {
    /// Validates client configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("client.backend_url", &self.backend_url)?;
        validate_http_url("client.pokeapi_url", &self.pokeapi_url)?;
        validate_roster_limit(self.roster_limit)?;
        if !(MIN_CLIENT_TIMEOUT_MS ..= MAX_CLIENT_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "client.timeout_ms must be between {MIN_CLIENT_TIMEOUT_MS} and \
                 {MAX_CLIENT_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_CLIENT_RESPONSE_BYTES {
            return Err(ConfigError::Invalid(format!(
                "client.max_response_bytes must be between 1 and {MAX_CLIENT_RESPONSE_BYTES}"
            )));
        }
        if self.concurrency == 0 || self.concurrency > MAX_CLIENT_CONCURRENCY {
            return Err(ConfigError::Invalid(format!(
                "client.concurrency must be between 1 and {MAX_CLIENT_CONCURRENCY}"
            )));
        }
        Ok(())
    }
}

/// Validates a roster size against the accepted range.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when `limit` is zero or too large.
pub fn validate_roster_limit(limit: u32) -> Result<(), ConfigError> {
    if limit == 0 || limit > MAX_ROSTER_LIMIT {
        return Err(ConfigError::Invalid(format!(
            "roster limit must be between 1 and {MAX_ROSTER_LIMIT}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Where the configuration path came from.
enum ConfigSource {
    /// Named by the caller or `POKEDEX_CONFIG`; must exist.
    Explicit(PathBuf),
    /// The default filename; may be absent.
    Implicit(PathBuf),
}

impl ConfigSource {
    /// Returns the resolved path.
    fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Implicit(path) => path,
        }
    }
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path<F>(path: Option<&Path>, lookup: &F) -> Result<ConfigSource, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = path {
        return Ok(ConfigSource::Explicit(path.to_path_buf()));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ConfigSource::Explicit(PathBuf::from(env_path)));
    }
    Ok(ConfigSource::Implicit(PathBuf::from(DEFAULT_CONFIG_NAME)))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads a config file, refusing files over the size limit before reading.
fn read_bounded(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if !usize::try_from(metadata.len()).is_ok_and(|len| len <= MAX_CONFIG_FILE_SIZE) {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an absolute `http`/`https` URL with a non-empty host.
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.len() > MAX_URL_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!("{field} must not contain whitespace")));
    }
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must be an http(s) url")));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::Invalid(format!("{field} is missing a host")));
    }
    Ok(())
}

/// Default bind address.
fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

/// Default request body limit.
pub(crate) const fn default_max_body_bytes() -> usize {
    64 * 1024
}

/// CORS headers are emitted by default.
const fn default_cors_enabled() -> bool {
    true
}

/// Default `Access-Control-Allow-Origin` value.
fn default_allowed_origin() -> String {
    "*".to_string()
}

/// Audit logging is on by default.
const fn default_audit_enabled() -> bool {
    true
}

/// Search terms are logged by default.
const fn default_log_search_terms() -> bool {
    true
}

/// Default `SQLite` busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    5_000
}

/// Default login username.
fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

/// Default login password.
fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

/// Default backend base URL.
fn default_backend_url() -> String {
    "http://localhost:3000".to_string()
}

/// Default PokeAPI pokemon resource URL.
fn default_pokeapi_url() -> String {
    "https://pokeapi.co/api/v2/pokemon".to_string()
}

/// Default roster size (the first generation).
const fn default_roster_limit() -> u32 {
    151
}

/// Default client request timeout.
const fn default_client_timeout_ms() -> u64 {
    10_000
}

/// Default client response body limit.
const fn default_max_response_bytes() -> usize {
    2 * 1024 * 1024
}

/// Default roster detail fetch concurrency.
const fn default_concurrency() -> usize {
    16
}

// ============================================================================
// SECTION: Tests
// ============================================================================
