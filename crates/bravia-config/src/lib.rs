//! Shared configuration for Bravia tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `bravia_api` transport and credential types. The
//! CLI layers its flag overrides on top of this crate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use bravia_api::{Credentials, PinSession, TlsMode, TransportConfig};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "bravia";

/// Environment variable consulted for the PIN session token.
pub const PIN_TOKEN_ENV: &str = "BRAVIA_PIN_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: Vec<String> },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named display profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Config {
    /// Look up a named profile.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_owned(),
                available: self.profile_names(),
            })
    }

    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Output format used when `--output` is not given.
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "json".into()
}
fn default_timeout() -> u64 {
    10
}

/// A named display profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Display base URL (e.g., "http://192.168.1.20").
    pub host: String,

    /// Pre-shared key (plaintext -- prefer keyring or env var).
    pub psk: Option<String>,

    /// Environment variable name containing the pre-shared key.
    pub psk_env: Option<String>,

    /// PIN session token from a previous pairing (plaintext).
    pub pin_token: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "bravia", "bravia").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("bravia");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from a specific file, layered with `BRAVIA_` env vars.
///
/// Nested keys use a double underscore: `BRAVIA_DEFAULTS__TIMEOUT=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BRAVIA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// First hit wins: env var, then keyring, then plaintext.
fn resolve_chain(
    env_value: Option<String>,
    keyring_value: impl FnOnce() -> Option<String>,
    plaintext: Option<&String>,
) -> Option<SecretString> {
    env_value
        .or_else(keyring_value)
        .or_else(|| plaintext.cloned())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

fn keyring_secret(profile_name: &str, kind: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}"))
        .ok()?
        .get_password()
        .ok()
}

/// Resolve the pre-shared key: `psk_env` var, keyring, plaintext.
pub fn resolve_psk(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    let env_value = profile
        .psk_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok());
    resolve_chain(
        env_value,
        || keyring_secret(profile_name, "psk"),
        profile.psk.as_ref(),
    )
}

/// Resolve the PIN session token: `BRAVIA_PIN_TOKEN`, keyring, plaintext.
pub fn resolve_pin_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    resolve_chain(
        std::env::var(PIN_TOKEN_ENV).ok(),
        || keyring_secret(profile_name, "pin-token"),
        profile.pin_token.as_ref(),
    )
}

/// Resolve `Credentials` for a profile. Missing secrets are not an
/// error: the display may accept anonymous requests.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Credentials {
    Credentials {
        psk: resolve_psk(profile, profile_name),
        pin: resolve_pin_token(profile, profile_name).map(|token| PinSession { token: Some(token) }),
    }
}

/// Store a secret for a profile in the system keyring.
pub fn store_secret(profile_name: &str, kind: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}"))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: format!("failed to access keyring: {e}"),
        })?;
    entry.set_password(secret).map_err(|e| ConfigError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store {kind} in keyring: {e}"),
    })
}

// ── Profile → target ────────────────────────────────────────────────

/// Everything needed to talk to one display.
#[derive(Debug, Clone)]
pub struct Target {
    pub base_url: Url,
    pub credentials: Credentials,
    pub transport: TransportConfig,
}

impl Target {
    /// Endpoint of a REST service, e.g. `system` → `{base}/sony/system`.
    pub fn service_url(&self, service: &str) -> Result<Url, ConfigError> {
        self.base_url
            .join(&format!("sony/{}", service.trim_start_matches('/')))
            .map_err(|e| ConfigError::Validation {
                field: "service".into(),
                reason: format!("cannot build URL for '{service}': {e}"),
            })
    }
}

/// Parse a display host, accepting a bare IP or hostname.
pub fn parse_host(host: &str) -> Result<Url, ConfigError> {
    let with_scheme = if host.contains("://") {
        host.to_owned()
    } else {
        format!("http://{host}")
    };
    let mut url = Url::parse(&with_scheme).map_err(|_| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid URL: {host}"),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Build a `Target` from a profile -- no CLI flag overrides.
pub fn profile_to_target(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<Target, ConfigError> {
    let base_url = parse_host(&profile.host)?;
    let credentials = resolve_credentials(profile, profile_name);

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(Target {
        base_url,
        credentials,
        transport: TransportConfig::default()
            .with_tls(tls)
            .with_timeout(timeout),
    })
}
