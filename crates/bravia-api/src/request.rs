// Request executor
//
// One POST per call: attach the fixed SOAP headers and the auth header,
// let caller headers win, then turn the reply into either a normalized
// body or a classified `Error`. Nothing is shared between calls.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::outcome::{ErrorOutcome, VendorError, application_closed_result};
use crate::soap::{self, FaultError};
use crate::transport::TransportConfig;

/// Content type sent with every request, JSON bodies included.
pub const DEFAULT_CONTENT_TYPE: &str = "text/xml; charset=UTF-8";

/// SOAP action sent with every request. The quotes are part of the value.
pub const DEFAULT_SOAP_ACTION: &str = "\"urn:schemas-sony-com:service:IRCC:1#X_SendIRCC\"";

const SOAP_ACTION: HeaderName = HeaderName::from_static("soapaction");

// ── Request side ────────────────────────────────────────────────────

/// Outbound body. Also selects how the reply is read.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Raw XML/SOAP text, sent as is; the reply stays text.
    Xml(String),
    /// JSON-RPC payload; the reply is decoded as JSON.
    Json(Value),
}

impl RequestBody {
    fn expects_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

// ── Response side ───────────────────────────────────────────────────

/// Normalized JSON body.
///
/// `error` never survives normalization: it is either folded into
/// `result` or turned into an [`Error`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JsonBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// `Some(true)` when the display reported it is powered off.
    #[serde(rename = "turnedOff")]
    pub turned_off: Option<bool>,

    /// Remaining top-level members (`id`, ...), untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JsonBody {
    pub fn is_turned_off(&self) -> bool {
        self.turned_off == Some(true)
    }

    /// Deserialize `result` into a typed value.
    pub fn result_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let result = self.result.clone().unwrap_or(Value::Null);
        serde_json::from_value(result)
            .map_err(|e| Error::Unexpected(format!("unexpected result shape: {e}")))
    }
}

/// Body of a successful response, shaped by the [`RequestBody`] variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(JsonBody),
    Text(String),
}

/// A successful exchange.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl Response {
    pub fn json(&self) -> Option<&JsonBody> {
        match &self.body {
            ResponseBody::Json(body) => Some(body),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }
}

/// Wire shape of a JSON reply before normalization.
#[derive(Debug, Deserialize)]
struct RawBody {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

// ── Executor ────────────────────────────────────────────────────────

/// Sends single requests to a Bravia display.
///
/// Cheap to clone; holds no per-call state, so concurrent calls are fine.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    http: reqwest::Client,
}

impl RequestExecutor {
    /// Create an executor from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Create an executor around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// POST `body` to `uri` and normalize the reply.
    ///
    /// `uri` is not validated here; a malformed one fails when the
    /// request is built. `headers` are applied last and replace any
    /// default or auth header of the same name.
    pub async fn execute(
        &self,
        uri: &str,
        credentials: &Credentials,
        body: RequestBody,
        headers: &HeaderMap,
    ) -> Result<Response, Error> {
        let expects_json = body.expects_json();
        let request_headers = build_headers(credentials, headers)?;

        debug!("initializing request for {uri}");
        trace!(
            auth = ?credentials.strategy(),
            headers = ?request_headers,
            json = expects_json,
            "request options"
        );

        let builder = self.http.post(uri).headers(request_headers);
        let builder = match body {
            RequestBody::Xml(xml) => builder.body(xml),
            // Content-Type is already set, so `json` keeps the text/xml default.
            RequestBody::Json(value) => builder.json(&value),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| Error::from_transport(&e, uri))?;

        let status = resp.status();
        let url = resp.url().clone();
        let resp_headers = resp.headers().clone();
        debug!(status = status.as_u16(), "POST {url}");

        let text = resp
            .text()
            .await
            .map_err(|e| Error::from_transport(&e, uri))?;
        trace!(body = %text, "response body");

        interpret(expects_json, status, url, resp_headers, text)
    }
}

/// Defaults, then auth, then caller overrides (replace, not append).
fn build_headers(credentials: &Credentials, overrides: &HeaderMap) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    headers.insert(SOAP_ACTION, HeaderValue::from_static(DEFAULT_SOAP_ACTION));

    if let Some((name, value)) = credentials.auth_header()? {
        headers.insert(name, value);
    }

    for name in overrides.keys() {
        headers.remove(name);
        for value in overrides.get_all(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    Ok(headers)
}

/// Turn a received reply into a `Response` or an `Error`.
fn interpret(
    expects_json: bool,
    status: StatusCode,
    url: Url,
    headers: HeaderMap,
    text: String,
) -> Result<Response, Error> {
    // Vendor errors are judged before the status code.
    let json = if expects_json {
        serde_json::from_str::<RawBody>(&text)
            .ok()
            .map(normalize)
            .transpose()?
    } else {
        None
    };

    if status != StatusCode::OK {
        return Err(fault_error(status, &text));
    }

    let body = match json {
        Some(body) => ResponseBody::Json(body),
        None if !expects_json => ResponseBody::Text(text),
        None => {
            return Err(Error::InvalidResponse {
                status: status.as_u16(),
                message: "response body is not a JSON object".into(),
                url: url.to_string(),
                headers,
            });
        }
    };

    Ok(Response {
        status,
        url,
        headers,
        body,
    })
}

/// Fold the `error` member into the body, or fail.
fn normalize(raw: RawBody) -> Result<JsonBody, Error> {
    let RawBody {
        error,
        result,
        extra,
    } = raw;

    let Some(error) = error else {
        return Ok(JsonBody {
            result,
            turned_off: None,
            extra,
        });
    };

    let Some(vendor) = VendorError::from_value(&error) else {
        return Err(Error::Api {
            code: None,
            message: error.to_string(),
        });
    };

    match vendor.classify() {
        ErrorOutcome::ApplicationClosed => {
            debug!("no application in foreground");
            Ok(JsonBody {
                result: Some(application_closed_result()),
                turned_off: None,
                extra,
            })
        }
        ErrorOutcome::DeviceOff => {
            debug!(code = vendor.code, "display is turned off");
            Ok(JsonBody {
                result: Some(error),
                turned_off: Some(true),
                extra,
            })
        }
        ErrorOutcome::ApplicationError {
            code: Some(code),
            message: Some(message),
        } => Err(Error::Api {
            code: Some(code),
            message,
        }),
        // Not a `[int, string]` pair: report it as received.
        ErrorOutcome::ApplicationError { .. } => Err(Error::Api {
            code: None,
            message: error.to_string(),
        }),
    }
}

fn fault_error(status: StatusCode, text: &str) -> Error {
    let status = status.as_u16();
    match soap::extract_fault_description(text) {
        Ok(description) => Error::Fault {
            status,
            description,
        },
        Err(FaultError::Malformed { parsed }) => Error::MalformedFault { status, parsed },
        Err(FaultError::Unparsable(_)) => Error::FaultParse {
            status,
            body: text.to_owned(),
        },
    }
}
