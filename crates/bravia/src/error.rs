//! CLI error types with miette diagnostics.
//!
//! Maps `bravia_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bravia_api::Error as ApiError;
use bravia_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const DEVICE: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code, unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("No response from {url}: {message}")]
    #[diagnostic(
        code(bravia::no_response),
        help(
            "Check that the display is on the network and that\n\
             Settings > Network > Remote start is enabled."
        )
    )]
    NoResponse { url: String, message: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(bravia::timeout),
        help("Increase timeout with --timeout or check that the display is reachable.")
    )]
    Timeout { url: String },

    #[error("Invalid response from {url} ({status} {message})")]
    #[diagnostic(code(bravia::invalid_response))]
    InvalidResponse {
        url: String,
        status: u16,
        message: String,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication rejected by the display")]
    #[diagnostic(
        code(bravia::auth_failed),
        help(
            "Check the pre-shared key under Settings > Network > IP control.\n\
             Set it with: bravia config init --host <HOST> --psk <KEY>"
        )
    )]
    AuthFailed,

    // ── Device ───────────────────────────────────────────────────────

    #[error("Display error [{}]: {message}", .code.as_deref().unwrap_or("?"))]
    #[diagnostic(code(bravia::api_error))]
    Api { code: Option<String>, message: String },

    #[error("Display returned an error ({status}): {message}")]
    #[diagnostic(code(bravia::fault))]
    Fault { status: u16, message: String },

    #[error("{0}")]
    #[diagnostic(code(bravia::unexpected))]
    Unexpected(String),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bravia::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(bravia::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: bravia config init --host <HOST> --name {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No display configured")]
    #[diagnostic(
        code(bravia::no_config),
        help(
            "Pass --host, or create a profile with: bravia config init --host <HOST>\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(bravia::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(bravia::json), help("--params expects a JSON value, e.g. '{{\"volume\":\"5\"}}'"))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoResponse { .. } | Self::InvalidResponse { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed => exit_code::AUTH,
            Self::Api { .. } | Self::Fault { .. } => exit_code::DEVICE,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

fn is_auth_status(status: i64) -> bool {
    matches!(status, 401 | 403)
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NoResponse { code: "timeout", url, .. } => CliError::Timeout { url },

            ApiError::NoResponse { url, message, .. } => CliError::NoResponse { url, message },

            ApiError::InvalidResponse { status, .. }
            | ApiError::Fault { status, .. }
            | ApiError::MalformedFault { status, .. }
            | ApiError::FaultParse { status, .. }
                if is_auth_status(i64::from(status)) =>
            {
                CliError::AuthFailed
            }

            ApiError::Api {
                code: Some(code), ..
            } if is_auth_status(code) => CliError::AuthFailed,

            ApiError::InvalidResponse {
                status,
                message,
                url,
                ..
            } => CliError::InvalidResponse {
                url,
                status,
                message,
            },

            ApiError::Api { code, message } => CliError::Api {
                code: code.map(|c| c.to_string()),
                message,
            },

            err @ (ApiError::Fault { .. }
            | ApiError::MalformedFault { .. }
            | ApiError::FaultParse { .. }) => CliError::Fault {
                status: err.code().and_then(|c| c.parse().ok()).unwrap_or_default(),
                message: err.to_string(),
            },

            ApiError::Unexpected(message) => CliError::Unexpected(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name, available } => CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Serialization(e) => CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
