//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use comanda_store::StoreDocument;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { store, force } => init_config(&store, force, ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    let store = ctx.store_config();
    ctx.output.info("");
    ctx.output.info("[store]");
    ctx.output.kv(
        "path",
        &store
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(in memory)".to_string()),
    );
    ctx.output
        .kv("create_if_missing", &store.create_if_missing.to_string());
    ctx.output
        .kv("poll_interval_secs", &store.poll_interval_secs.to_string());
    ctx.output.kv("fetch_retries", &store.fetch_retries.to_string());

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", ctx.config.logging.level.as_str());
    ctx.output
        .kv("format", &format!("{:?}", ctx.config.logging.format).to_lowercase());

    let defaults = &ctx.config.defaults;
    ctx.output.info("");
    ctx.output.info("[defaults]");
    for (key, value) in [
        ("destination", &defaults.destination),
        ("payment_method", &defaults.payment_method),
        ("table", &defaults.table),
    ] {
        ctx.output.kv(key, value.as_deref().unwrap_or("-"));
    }

    Ok(())
}

async fn init_config(store: &str, force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config(store))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    let store_path = ctx.resolve_path(store);
    if store_path.exists() && !force {
        ctx.output
            .info(&format!("Keeping existing store: {}", store_path.display()));
    } else {
        StoreDocument::sample()
            .save(&store_path)
            .with_context(|| format!("Failed to write {}", store_path.display()))?;
        ctx.output
            .success(&format!("Created sample store: {}", store_path.display()));
    }

    Ok(())
}
