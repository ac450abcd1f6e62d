use clap::Parser;

use nodehost::Settings;
use nodehost::cli::commands::{host, init, names};
use nodehost::cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        Settings::default()
    });

    // CLI overrides
    if let Some(root) = &cli.root {
        config.host.root = root.clone();
    }
    if let Commands::Run { interval_ms, watch } = &cli.command {
        if let Some(ms) = interval_ms {
            config.host.maintenance_interval_ms = *ms;
        }
        if *watch {
            config.host.watch_roots = true;
        }
    }

    nodehost::logging::init_with_config(&config.logging);

    match cli.command {
        Commands::Init { force } => init::run_init(force),
        Commands::Config => init::run_config(&config),
        Commands::Run { .. } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(config.host.worker_threads.max(1))
                .enable_all()
                .build()?;
            runtime.block_on(host::run_host(&config))
        }
        Commands::Scan { json } => host::run_scan(&config, json),
        Commands::New { name, recipe } => host::run_new(&config, &name, recipe.as_deref()),
        Commands::Rename { folder, new_name } => host::run_rename(&config, &folder, &new_name),
        Commands::Encode { name } => {
            names::run_encode(&name);
            Ok(())
        }
        Commands::Decode { filename } => {
            names::run_decode(&filename);
            Ok(())
        }
        Commands::Recipes => {
            host::run_recipes(&config);
            Ok(())
        }
    }
}
