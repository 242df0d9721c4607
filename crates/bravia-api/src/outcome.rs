// Vendor error classification
//
// Bravia JSON bodies report failures as `"error": [code, message]`. Some of
// those are not failures from the caller's point of view (no app in the
// foreground, display off) and get folded into a normal result. The
// error list lives at
// https://pro-bravia.sony.net/develop/integrate/rest-api/spec/errorcode-list/

use serde_json::{Value, json};

/// Code returned by most services while the display is in standby.
pub const DISPLAY_OFF_CODE: i64 = 40005;

/// Message reported when no application is in the foreground.
pub const ILLEGAL_STATE: &str = "Illegal State";

/// Messages meaning the display is powered off, whatever the code.
pub const DISPLAY_TURNED_OFF: &str = "Display Is Turned off";
pub const NOT_POWER_ON: &str = "not power-on";

/// What to do with an `error` member found in a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// No application is running; answer with a synthetic "Application" entry.
    ApplicationClosed,
    /// The display is off; answer with the error pair and `turnedOff = true`.
    DeviceOff,
    /// A real failure to hand back to the caller. Either half may be
    /// missing when the pair is not `[int, string]`.
    ApplicationError {
        code: Option<i64>,
        message: Option<String>,
    },
}

/// Classify a vendor `[code, message]` pair. Pure, no I/O.
///
/// Each position is judged on its own: the message rules apply whatever
/// the code is, and the display-off code whatever the message is.
pub fn classify(code: Option<i64>, message: Option<&str>) -> ErrorOutcome {
    match message {
        Some(ILLEGAL_STATE) => ErrorOutcome::ApplicationClosed,
        Some(DISPLAY_TURNED_OFF | NOT_POWER_ON) => ErrorOutcome::DeviceOff,
        _ if code == Some(DISPLAY_OFF_CODE) => ErrorOutcome::DeviceOff,
        _ => ErrorOutcome::ApplicationError {
            code,
            message: message.map(str::to_owned),
        },
    }
}

/// The `result` returned in place of an [`ErrorOutcome::ApplicationClosed`] error.
pub fn application_closed_result() -> Value {
    json!([{ "uri": false, "source": "application", "title": "Application" }])
}

/// A decoded `"error": [code, message]` member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorError {
    /// Integral numeric code; `40005.0` decodes as `40005`.
    pub code: Option<i64>,
    /// The message, when the second element is a string.
    pub message: Option<String>,
}

impl VendorError {
    /// Decode the pair position by position. Returns `None` only when the
    /// member is not an array.
    pub fn from_value(value: &Value) -> Option<Self> {
        let pair = value.as_array()?;
        Some(Self {
            code: pair.first().and_then(integral_code),
            message: pair.get(1).and_then(Value::as_str).map(str::to_owned),
        })
    }

    pub fn classify(&self) -> ErrorOutcome {
        classify(self.code, self.message.as_deref())
    }
}

// JSON has one number type; a float with no fractional part is still a code.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions, clippy::float_cmp)]
fn integral_code(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= 9_007_199_254_740_992.0)
            .map(|f| f as i64)
    })
}
