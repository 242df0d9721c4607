//! CLI configuration -- thin wrapper around `bravia_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --psk, --pin-token, --header, ...).

use std::time::Duration;

use clap::ValueEnum;
use tracing::warn;

use bravia_api::header::{HeaderMap, HeaderName, HeaderValue};
use bravia_api::{Credentials, TlsMode, TransportConfig};
use bravia_config::Target;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use bravia_config::{Config, Profile, config_path, load_config_or_default, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Output format from `defaults.output`, used when `--output` is absent.
pub fn default_output(config: &Config) -> OutputFormat {
    OutputFormat::from_str(&config.defaults.output, true).unwrap_or_else(|_| {
        warn!(output = %config.defaults.output, "unknown defaults.output in config, using json");
        OutputFormat::Json
    })
}

/// Build a `Target` from the config, the active profile, and CLI overrides.
pub fn resolve_target(global: &GlobalOpts, cfg: &Config) -> Result<Target, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut target = match cfg.profile(&profile_name) {
        Ok(profile) => {
            let mut target = bravia_config::profile_to_target(profile, &profile_name, &cfg.defaults)?;
            if let Some(ref host) = global.host {
                target.base_url = bravia_config::parse_host(host)?;
            }
            target
        }
        // An explicitly requested profile must exist.
        Err(err) if global.profile.is_some() => return Err(err.into()),
        // No profile -- build from CLI flags / env vars alone.
        Err(_) => {
            let host = global.host.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let tls = if cfg.defaults.insecure {
                TlsMode::DangerAcceptInvalid
            } else {
                TlsMode::System
            };
            Target {
                base_url: bravia_config::parse_host(host)?,
                credentials: Credentials::none(),
                transport: TransportConfig::default()
                    .with_tls(tls)
                    .with_timeout(Duration::from_secs(cfg.defaults.timeout)),
            }
        }
    };

    // Flag overrides
    if let Some(ref psk) = global.psk {
        target.credentials = target.credentials.with_psk(psk.clone());
    }
    if let Some(ref token) = global.pin_token {
        target.credentials = target.credentials.with_pin_token(token.clone());
    }
    if global.insecure {
        target.transport = target.transport.with_tls(TlsMode::DangerAcceptInvalid);
    }
    if let Some(secs) = global.timeout {
        target.transport = target.transport.with_timeout(Duration::from_secs(secs));
    }

    Ok(target)
}

/// Parse repeated `--header "Name: value"` flags.
pub fn parse_headers(raw: &[String]) -> Result<HeaderMap, CliError> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry.split_once(':').ok_or_else(|| CliError::Validation {
            field: "header".into(),
            reason: format!("expected NAME:VALUE, got '{entry}'"),
        })?;

        let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| {
            CliError::Validation {
                field: "header".into(),
                reason: format!("invalid header name '{}': {e}", name.trim()),
            }
        })?;
        let value = HeaderValue::from_str(value.trim()).map_err(|e| CliError::Validation {
            field: "header".into(),
            reason: format!("invalid value for {name}: {e}"),
        })?;
        headers.append(name, value);
    }
    Ok(headers)
}
