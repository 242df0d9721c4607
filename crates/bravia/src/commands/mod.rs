//! Command dispatch: bridges CLI args -> executor calls -> output formatting.

pub mod call;
pub mod config_cmd;
pub mod ircc;

use bravia_api::RequestExecutor;
use bravia_api::header::HeaderMap;
use bravia_config::Target;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a display-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    executor: &RequestExecutor,
    target: &Target,
    headers: &HeaderMap,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Call(args) => call::handle(executor, target, args, headers, global).await,
        Command::Ircc(args) => ircc::handle(executor, target, args, headers, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
