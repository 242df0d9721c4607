use reqwest::header::HeaderMap;
use thiserror::Error;

/// Top-level error type for the `bravia-api` crate.
///
/// Every failed [`execute`](crate::RequestExecutor::execute) call produces
/// exactly one of these. Recoverable vendor conditions (no active
/// application, display off) never surface here; they are folded into the
/// response body instead.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// A 200 response arrived but its body was not the JSON that was asked for.
    #[error("{status} - {message}")]
    InvalidResponse {
        status: u16,
        message: String,
        url: String,
        headers: HeaderMap,
    },

    /// The request went out but nothing came back (timeout, refused
    /// connection, reset while reading the body).
    #[error("{message} - {code}")]
    NoResponse {
        code: &'static str,
        message: String,
        url: String,
    },

    // ── Vendor API ──────────────────────────────────────────────────
    /// The `error` member of a JSON body that is not a recoverable condition.
    ///
    /// `code` is `None` when the member was not an `[int, string]` pair;
    /// `message` then holds the raw JSON.
    #[error("API error [{}, {message}]", fmt_code(.code.as_ref()))]
    Api { code: Option<i64>, message: String },

    // ── SOAP fault (non-200 status) ─────────────────────────────────
    /// `errorDescription` extracted from a `UPnPError` fault.
    #[error("{description}")]
    Fault { status: u16, description: String },

    /// The body parsed as XML but the fault path was missing.
    #[error("Unexpected or malformed error response: {parsed}.")]
    MalformedFault { status: u16, parsed: String },

    /// The body of a non-200 response was not XML at all.
    #[error("Failed to parse the error response: {body}.")]
    FaultParse { status: u16, body: String },

    // ── Other ───────────────────────────────────────────────────────
    /// Anything else, e.g. a request that could not be built.
    #[error("{0}")]
    Unexpected(String),
}

fn fmt_code(code: Option<&i64>) -> String {
    code.map_or_else(|| "?".to_owned(), |c| c.to_string())
}

impl Error {
    /// Classification label for transport-level failures.
    pub fn title(&self) -> Option<&'static str> {
        match self {
            Self::InvalidResponse { .. } => Some("Invalid Response"),
            Self::NoResponse { .. } => Some("No Response"),
            _ => None,
        }
    }

    /// HTTP status or transport error code, rendered as a string.
    pub fn code(&self) -> Option<String> {
        match self {
            Self::InvalidResponse { status, .. }
            | Self::Fault { status, .. }
            | Self::MalformedFault { status, .. }
            | Self::FaultParse { status, .. } => Some(status.to_string()),
            Self::NoResponse { code, .. } => Some((*code).to_owned()),
            Self::Api { code, .. } => code.map(|c| c.to_string()),
            Self::Unexpected(_) => None,
        }
    }

    /// The requested URL, when the transport reported one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::InvalidResponse { url, .. } | Self::NoResponse { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Response headers, only present on [`Error::InvalidResponse`].
    pub fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::InvalidResponse { headers, .. } => Some(headers),
            _ => None,
        }
    }

    /// Returns `true` if retrying the same call might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NoResponse { code, .. } => matches!(*code, "timeout" | "connect"),
            Self::InvalidResponse { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Classify a `reqwest` failure into the transport taxonomy.
    ///
    /// `url` is the requested URL, used when the error does not carry one.
    pub(crate) fn from_transport(err: &reqwest::Error, url: &str) -> Self {
        let url = err.url().map_or_else(|| url.to_owned(), ToString::to_string);

        if err.is_builder() {
            return Self::Unexpected(err.to_string());
        }

        let code = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_redirect() {
            "redirect"
        } else if err.is_body() {
            "body"
        } else if err.is_decode() {
            "decode"
        } else {
            "request"
        };

        Self::NoResponse {
            code,
            message: err.to_string(),
            url,
        }
    }
}
