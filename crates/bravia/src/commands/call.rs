//! `call` -- one JSON-RPC method on a REST service.

use serde_json::{Value, json};
use tracing::debug;

use bravia_api::header::HeaderMap;
use bravia_api::{JsonBody, RequestBody, RequestExecutor, ResponseBody};
use bravia_config::Target;

use crate::cli::{CallArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Build the `{method, id, params, version}` payload.
///
/// Bravia expects `params` to be an array; a bare object is wrapped.
pub fn rpc_payload(args: &CallArgs) -> Result<Value, CliError> {
    let params = match args.params.as_deref() {
        None => json!([]),
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Array(items) => Value::Array(items),
            other => json!([other]),
        },
    };

    Ok(json!({
        "method": args.method,
        "id": args.id,
        "params": params,
        "version": args.api_version,
    }))
}

fn plain(body: &JsonBody) -> String {
    if body.is_turned_off() {
        return "turned off".into();
    }
    body.result
        .as_ref()
        .map(output::plain_value)
        .unwrap_or_default()
}

pub async fn handle(
    executor: &RequestExecutor,
    target: &Target,
    args: CallArgs,
    headers: &HeaderMap,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let payload = rpc_payload(&args)?;
    let url = target.service_url(&args.service)?;
    debug!(service = %args.service, method = %args.method, "calling");

    let resp = executor
        .execute(
            url.as_str(),
            &target.credentials,
            RequestBody::Json(payload),
            headers,
        )
        .await?;

    let out = match &resp.body {
        ResponseBody::Json(body) => output::render_single(global.format(), body, plain),
        ResponseBody::Text(text) => text.clone(),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
