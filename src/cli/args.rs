//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Folder-driven node host
#[derive(Parser)]
#[command(
    name = "nodehost",
    version = env!("CARGO_PKG_VERSION"),
    about = "Host one node per folder and keep them in step with the filesystem",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Primary root directory (overrides config)
    #[arg(long, global = true, env = "NODEHOST_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .nodehost/settings.toml with default values
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,

    /// Host nodes until interrupted (Ctrl-C)
    Run {
        /// Maintenance interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Watch roots and reconcile early after changes
        #[arg(short, long)]
        watch: bool,
    },

    /// List the folders the next maintenance tick would host
    Scan {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a node folder in the primary root
    New {
        /// Node name
        name: String,

        /// Recipe to copy the folder from
        #[arg(short, long)]
        recipe: Option<String>,
    },

    /// Rename an existing node folder
    Rename {
        /// Current node folder
        folder: PathBuf,

        /// New node name
        new_name: String,
    },

    /// Show the folder name a node name is stored under
    Encode {
        /// Node name
        name: String,
    },

    /// Show the node name a folder name stands for
    Decode {
        /// Folder name
        filename: String,
    },

    /// List available recipes
    Recipes,
}
