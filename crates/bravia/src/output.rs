//! Output formatting: JSON, YAML, plain.
//!
//! Structured formats use serde; plain emits bare values, one per line.

use std::io::{self, Write};

use serde_json::Value;

use crate::cli::OutputFormat;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// `plain_fn` produces the scripting-friendly representation.
pub fn render_single<T>(format: &OutputFormat, data: &T, plain_fn: impl Fn(&T) -> String) -> String
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => plain_fn(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Plain helpers ────────────────────────────────────────────────────

/// One line per array element; strings unquoted, everything else as compact JSON.
pub fn plain_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(plain_scalar).collect::<Vec<_>>().join("\n"),
        other => plain_scalar(other),
    }
}

fn plain_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => render_json_compact(other),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

/// Pretty-printed JSON.
pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// Compact single-line JSON.
pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    if compact {
        render_json_compact(data)
    } else {
        render_json_pretty(data)
    }
}

/// YAML output.
pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_flattens_result_arrays() {
        let result = json!([{ "status": "active" }, "text", 5]);
        assert_eq!(plain_value(&result), "{\"status\":\"active\"}\ntext\n5");
    }

    #[test]
    fn structured_formats() {
        let data = json!({ "turnedOff": true });
        assert_eq!(
            render_single(&OutputFormat::JsonCompact, &data, |_| String::new()),
            "{\"turnedOff\":true}"
        );
        assert_eq!(
            render_single(&OutputFormat::Yaml, &data, |_| String::new()),
            "turnedOff: true\n"
        );
        assert_eq!(render_single(&OutputFormat::Plain, &data, |_| "x".into()), "x");
    }
}
