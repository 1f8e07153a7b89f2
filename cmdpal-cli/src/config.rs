use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use cmdpal_core::PaletteConfig;

/// Default config written by `cmdpal config init`
pub const TEMPLATE: &str = include_str!("../config.template.toml");

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter config file
    Init(InitArgs),
    /// Show config file path
    Path,
    /// Print the loaded config as TOML
    Show,
    /// Validate items, categories and key bindings
    Validate,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

/// Resolve the config path: `--config` wins, then `$CMDPAL_CONFIG`, then `~/.cmdpal/config.toml`
pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(PaletteConfig::config_path)
}

/// Load and validate config for a subcommand
pub fn load(explicit: Option<&Path>) -> Result<PaletteConfig> {
    let path = resolve_path(explicit);
    PaletteConfig::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

pub fn run_config(args: ConfigArgs, explicit: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args, explicit),
        ConfigCommands::Path => run_path(explicit),
        ConfigCommands::Show => run_show(explicit),
        ConfigCommands::Validate => run_validate(explicit),
    }
}

fn run_init(args: InitArgs, explicit: Option<&Path>) -> Result<()> {
    let config_path = resolve_path(explicit);

    if config_path.exists() && !args.force {
        return Err(anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&config_path, TEMPLATE)
        .context(format!("Failed to write config file: {:?}", config_path))?;

    println!("✅ Created config at: {:?}", config_path);
    println!("\nNext steps:");
    println!("  1. Edit the config: $EDITOR {:?}", config_path);
    println!("  2. Add your own [[items]]");
    println!("  3. Run: cmdpal config validate");

    Ok(())
}

fn run_path(explicit: Option<&Path>) -> Result<()> {
    println!("{}", resolve_path(explicit).display());
    Ok(())
}

fn run_show(explicit: Option<&Path>) -> Result<()> {
    let config = load(explicit)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn run_validate(explicit: Option<&Path>) -> Result<()> {
    println!("🔍 Validating configuration...");

    let config = load(explicit)?;
    println!("   ✓ Config loaded successfully");
    println!(
        "   Items: {}  Categories: {}  Key overrides: {}",
        config.items.len(),
        config.categories.len(),
        config.keys.len()
    );

    let warnings = undeclared_categories(&config);
    if !warnings.is_empty() {
        println!("\n⚠️  Items in undeclared categories (shown under \"Other\"):");
        for warning in &warnings {
            println!("   {}", warning);
        }
    }

    println!("\n✅ Configuration valid!");
    Ok(())
}

fn undeclared_categories(config: &PaletteConfig) -> Vec<String> {
    let declared: HashSet<&str> = config.categories.iter().map(|c| c.id.as_str()).collect();
    config
        .items
        .iter()
        .filter_map(|item| {
            let category = item.category.as_deref()?;
            (!declared.is_empty() && !declared.contains(category))
                .then(|| format!("{} -> {}", item.id, category))
        })
        .collect()
}
