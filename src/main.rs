//! POODi - pet-care chat proxy
//!
//! Entry point for the `poodi` binary: runs the HTTP server and offers a
//! few maintenance commands for configuration and personas.

mod cli;

use std::path::Path;

use clap::Parser;
use tracing::info;

use poodi::config::{self, ServerConfig};
use poodi::error::{Error, Result};
use poodi::logging::{self, LogGuards};
use poodi::persona::{build_instructions, PersonaRegistry};
use poodi::server;

use crate::cli::{Cli, Commands, ConfigSubcommand, PersonaSubcommand};

fn main() {
    if let Err(e) = run() {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_config_command(subcommand)
        }
        Commands::Persona { config, subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            handle_persona_command(config.as_deref(), subcommand)
        }
        Commands::Serve {
            config,
            port,
            static_dir,
        } => {
            let mut cfg = ServerConfig::load(config.as_deref())?;

            // CLI flags take precedence over file and environment
            if let Some(port) = port {
                cfg.server.port = port;
            }
            if let Some(dir) = static_dir {
                cfg.server.static_dir = dir;
            }
            cfg.validate()?;

            // The guards must be kept alive for the lifetime of the program
            let _log_guards = init_logging_from_config(&cfg, cli.verbose, cli.quiet)?;

            info!(version = env!("CARGO_PKG_VERSION"), "Starting POODi");
            run_server(cfg)
        }
    }
}

/// Initialize logging from configuration
fn init_logging_from_config(config: &ServerConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    logging::init_logging(&config.logging, verbose, quiet)
}

/// Build state and run the server on a multi-threaded runtime
fn run_server(config: ServerConfig) -> Result<()> {
    info!(
        addr = %config.bind_addr(),
        static_dir = %config.server.static_dir,
        base_url = %config.openai.base_url,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("poodi")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(async {
        let state = server::build_state(&config)?;
        server::serve(&config, state).await
    })
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = ServerConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg.redacted())?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            ServerConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}

/// Handle persona subcommands
fn handle_persona_command(config: Option<&str>, subcommand: PersonaSubcommand) -> Result<()> {
    let cfg = ServerConfig::load(config)?;
    let registry = match cfg.chat.personas_file {
        Some(ref path) => PersonaRegistry::load(Path::new(path))?,
        None => PersonaRegistry::bundled()?,
    };

    match subcommand {
        PersonaSubcommand::List => {
            let default_id = registry.default_persona().id.clone();
            println!("Personas:");
            for persona in registry.iter() {
                let marker = if persona.id == default_id { " (default)" } else { "" };
                println!(
                    "  {:<10} {} - {}{}",
                    persona.id, persona.display_name, persona.description, marker
                );
            }
        }
        PersonaSubcommand::Show { id } => {
            println!("{}", build_instructions(&registry, &id));
        }
    }

    Ok(())
}
