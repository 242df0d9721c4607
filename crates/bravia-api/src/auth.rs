use reqwest::header::{COOKIE, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Header carrying the pre-shared key.
pub const PSK_HEADER: &str = "X-Auth-PSK";

/// Which authentication header a request will carry.
///
/// Marker enum (no data) -- the actual secrets live in [`Credentials`].
/// Useful for logging the auth flow without carrying secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// `X-Auth-PSK` header.
    Psk,
    /// `Cookie: auth=<token>` obtained through PIN pairing.
    PinCookie,
    /// No auth header at all.
    Anonymous,
}

/// Session obtained through the PIN pairing flow.
#[derive(Debug, Clone, Default)]
pub struct PinSession {
    pub token: Option<SecretString>,
}

/// Credentials for a Bravia display.
///
/// Both fields may be set; the pre-shared key wins. Empty strings count
/// as absent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub psk: Option<SecretString>,
    pub pin: Option<PinSession>,
}

impl Credentials {
    /// No credentials: requests go out unauthenticated.
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the pre-shared key.
    pub fn with_psk(mut self, psk: impl Into<String>) -> Self {
        self.psk = Some(SecretString::from(psk.into()));
        self
    }

    /// Set the PIN session token.
    pub fn with_pin_token(mut self, token: impl Into<String>) -> Self {
        self.pin = Some(PinSession {
            token: Some(SecretString::from(token.into())),
        });
        self
    }

    fn psk_value(&self) -> Option<&str> {
        self.psk
            .as_ref()
            .map(|s| s.expose_secret())
            .filter(|v| !v.is_empty())
    }

    fn pin_token_value(&self) -> Option<&str> {
        self.pin
            .as_ref()
            .and_then(|pin| pin.token.as_ref())
            .map(|s| s.expose_secret())
            .filter(|v| !v.is_empty())
    }

    /// The strategy [`auth_header`](Self::auth_header) will apply.
    pub fn strategy(&self) -> AuthStrategy {
        if self.psk_value().is_some() {
            AuthStrategy::Psk
        } else if self.pin_token_value().is_some() {
            AuthStrategy::PinCookie
        } else {
            AuthStrategy::Anonymous
        }
    }

    /// Build the auth header for these credentials, if any.
    ///
    /// The returned value is flagged sensitive so it never shows up in
    /// `Debug` output of the request.
    pub fn auth_header(&self) -> Result<Option<(HeaderName, HeaderValue)>, Error> {
        let (name, raw) = if let Some(psk) = self.psk_value() {
            (HeaderName::from_static("x-auth-psk"), psk.to_owned())
        } else if let Some(token) = self.pin_token_value() {
            (COOKIE, format!("auth={token}"))
        } else {
            return Ok(None);
        };

        let mut value = HeaderValue::from_str(&raw)
            .map_err(|e| Error::Unexpected(format!("invalid {name} header value: {e}")))?;
        value.set_sensitive(true);
        Ok(Some((name, value)))
    }
}
