//! `ircc` -- send a remote-control code through the IRCC SOAP service.

use serde::Serialize;

use bravia_api::header::HeaderMap;
use bravia_api::soap::ircc_envelope;
use bravia_api::{RequestBody, RequestExecutor};
use bravia_config::Target;

use crate::cli::{GlobalOpts, IrccArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct IrccSent<'a> {
    code: &'a str,
    status: u16,
}

pub async fn handle(
    executor: &RequestExecutor,
    target: &Target,
    args: IrccArgs,
    headers: &HeaderMap,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let url = target.service_url("ircc")?;

    let resp = executor
        .execute(
            url.as_str(),
            &target.credentials,
            RequestBody::Xml(ircc_envelope(&args.code)),
            headers,
        )
        .await?;

    let sent = IrccSent {
        code: &args.code,
        status: resp.status.as_u16(),
    };
    let out = output::render_single(global.format(), &sent, |s| format!("sent {}", s.code));
    output::print_output(&out, global.quiet);
    Ok(())
}
