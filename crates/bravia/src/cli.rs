//! Clap derive structures for the `bravia` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bravia -- remote control for Sony Bravia displays
#[derive(Debug, Parser)]
#[command(
    name = "bravia",
    version,
    about = "Control Sony Bravia displays from the command line",
    long_about = "Sends REST (JSON-RPC) calls and IRCC remote codes to a Sony Bravia display.\n\n\
        Authenticates with a pre-shared key or a PIN session token, and reports\n\
        a powered-off display as a normal result rather than an error.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Display profile to use
    #[arg(long, short = 'p', env = "BRAVIA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Display address or URL (overrides profile)
    #[arg(long, short = 'H', env = "BRAVIA_HOST", global = true)]
    pub host: Option<String>,

    /// Pre-shared key
    #[arg(long, env = "BRAVIA_PSK", global = true, hide_env_values = true)]
    pub psk: Option<String>,

    /// PIN session token (sent as the `auth` cookie)
    #[arg(long, env = "BRAVIA_PIN_TOKEN", global = true, hide_env_values = true)]
    pub pin_token: Option<String>,

    /// Extra request header, `Name: value` (repeatable, overrides defaults)
    #[arg(long = "header", value_name = "NAME:VALUE", global = true)]
    pub headers: Vec<String>,

    /// Output format [default: `defaults.output` from config, else json]
    #[arg(long, short = 'o', env = "BRAVIA_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "BRAVIA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BRAVIA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// The output format in effect; JSON when nothing chose one.
    pub fn format(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Json)
    }
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text: the bare result, one entry per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Call a REST API method, e.g. `call system getPowerStatus`
    #[command(alias = "c")]
    Call(CallArgs),

    /// Send an IRCC remote-control code
    #[command(alias = "key")]
    Ircc(IrccArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Call ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Service name (system, audio, avContent, appControl, ...)
    pub service: String,

    /// Method name (getPowerStatus, setAudioVolume, ...)
    pub method: String,

    /// Method parameters as JSON; a non-array value is wrapped in `[...]`
    #[arg(long)]
    pub params: Option<String>,

    /// Method version
    #[arg(long, default_value = "1.0")]
    pub api_version: String,

    /// Request id
    #[arg(long, default_value_t = 1)]
    pub id: u64,
}

// ── IRCC ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IrccArgs {
    /// Base64 IRCC code, e.g. AAAAAQAAAAEAAAAVAw== (power)
    pub code: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or replace a profile from `--host` and `--psk`
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Store the key in the system keyring instead of the config file
        #[arg(long)]
        keyring: bool,
    },

    /// Show the loaded configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
