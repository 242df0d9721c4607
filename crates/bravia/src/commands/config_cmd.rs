//! Config subcommand handlers.

use bravia_config::store_secret;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: write a profile ───────────────────────────────────
        ConfigCommand::Init { name, keyring } => {
            let host = global.host.clone().ok_or_else(|| CliError::Validation {
                field: "host".into(),
                reason: "config init needs --host".into(),
            })?;
            // Fail early on an unusable host.
            bravia_config::parse_host(&host)?;

            let psk = match global.psk.clone() {
                Some(key) if keyring => {
                    store_secret(&name, "psk", &key)?;
                    eprintln!("   ✓ Pre-shared key stored in system keyring");
                    None
                }
                other => other,
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                name.clone(),
                Profile {
                    host,
                    psk,
                    ..Profile::default()
                },
            );
            if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }

            config::save_config(&cfg)?;

            let path = config::config_path();
            eprintln!("✓ Configuration written to {}", path.display());
            eprintln!("  Profile: {name}");
            eprintln!("\n  Test it: bravia call system getPowerStatus");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.psk.is_some() {
                    profile.psk = Some(REDACTED.into());
                }
                if profile.pin_token.is_some() {
                    profile.pin_token = Some(REDACTED.into());
                }
            }

            let out = output::render_single(global.format(), &cfg, |c| c.profile_names().join("\n"));
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
