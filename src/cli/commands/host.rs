//! Commands that operate on the node roots.

use std::path::Path;

use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use serde_json::json;

use crate::config::Settings;
use crate::filter::HostingFilters;
use crate::host::{NodeHost, NodeHostBuilder, Recipes, scan};

fn build_host(settings: &Settings) -> NodeHost {
    NodeHostBuilder::from_config(&settings.host).build()
}

/// Run the host until Ctrl-C.
pub async fn run_host(settings: &Settings) -> anyhow::Result<()> {
    let host = build_host(settings);
    host.start()?;

    crate::log_event!("host", "rule", "{}", host.hosting_rule());
    println!("Hosting nodes under {} (Ctrl-C to stop)", host.root().display());

    tokio::signal::ctrl_c().await?;

    crate::log_event!("host", "interrupt received");
    host.shutdown();
    host.stopped().await;
    Ok(())
}

/// Print the folders a tick would host, in scan order.
pub fn run_scan(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let mut roots = vec![settings.host.root.clone()];
    roots.extend(settings.host.other_roots.iter().cloned());
    let filters = HostingFilters::new(settings.host.include.clone(), settings.host.exclude.clone());

    let current = scan::scan_roots(&roots, &filters);

    if json {
        let entries: Vec<_> = current
            .iter()
            .map(|(name, folder)| json!({ "name": name, "key": name.reduced(), "folder": folder }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if current.is_empty() {
        println!("No eligible node folders ({}).", filters.describe());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Node", "Key", "Folder"]);
    for (name, folder) in &current {
        table.add_row(vec![
            name.to_string(),
            name.reduced().to_string(),
            folder.display().to_string(),
        ]);
    }
    println!("{table}");
    println!("{} node(s); {}", current.len(), filters.describe());
    Ok(())
}

/// Create a node folder, optionally from a recipe.
pub fn run_new(settings: &Settings, name: &str, recipe: Option<&str>) -> anyhow::Result<()> {
    let host = build_host(settings);
    // Picks up names already claimed in any root
    host.run_maintenance();

    let result = host.new_node(recipe, name);
    host.shutdown();

    let folder = result?;
    println!("Created {}", folder.display());
    Ok(())
}

/// Rename a node folder.
pub fn run_rename(settings: &Settings, folder: &Path, new_name: &str) -> anyhow::Result<()> {
    let host = build_host(settings);
    host.run_maintenance();

    let result = host.rename_node(folder, new_name);
    host.shutdown();

    let target = result?;
    println!("Renamed {} -> {}", folder.display(), target.display());
    Ok(())
}

/// List the available recipes.
pub fn run_recipes(settings: &Settings) {
    let recipes = Recipes::new(&settings.host.recipes_root);
    let names = recipes.list();

    if names.is_empty() {
        println!("No recipes under {}", recipes.root().display());
        return;
    }
    for name in names {
        println!("{name}");
    }
}
