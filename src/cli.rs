//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the POODi server.

use clap::{Parser, Subcommand};

/// POODi - pet-care chat proxy
///
/// Serves the chat page and forwards each message, with a per-pet system
/// prompt, to the OpenAI Responses API.
#[derive(Parser, Debug)]
#[command(name = "poodi")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(short, long, env = "POODI_CONFIG")]
        config: Option<String>,

        /// Port to listen on (overrides config and environment)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory with the static chat page
        #[arg(long)]
        static_dir: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Inspect the pet personas
    Persona {
        /// Path to configuration file (for a custom persona table)
        #[arg(short, long, env = "POODI_CONFIG", global = true)]
        config: Option<String>,

        #[command(subcommand)]
        subcommand: PersonaSubcommand,
    },
}

/// Persona subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PersonaSubcommand {
    /// List all personas
    List,

    /// Print the instructions sent upstream for a persona id
    Show {
        /// Persona id (unknown ids fall back to the default)
        id: String,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the effective configuration (API key redacted)
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
