//! Configuration management commands.

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use handoff_cache::ExclusionPattern;
use handoff_core::{generate_default_config, HandoffConfig};

use super::{ConfigArgs, ConfigCommand};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("namespace", &ctx.config.namespace);

    let exclusions = ctx.config.exclusions();
    if exclusions.is_empty() {
        ctx.output.kv("exclude_from_fastboot_cache", "(none)");
    } else {
        ctx.output.info("");
        ctx.output.info("exclude_from_fastboot_cache:");
        for pattern in exclusions {
            ctx.output.list_item(pattern);
        }
    }

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = validate(&ctx.config, ctx.config_path.as_deref());

    // Print results
    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

fn validate(config: &HandoffConfig, path: Option<&Path>) -> (Vec<String>, Vec<String>) {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    if path.is_none() {
        warnings.push("no config file found, using defaults".to_string());
    }

    if config.namespace.trim().is_empty() {
        errors.push("namespace must not be empty".to_string());
    }

    for (i, pattern) in config.exclusions().iter().enumerate() {
        match ExclusionPattern::parse(pattern) {
            Ok(ExclusionPattern::Literal(url)) if !url.starts_with('/') && !url.contains("://") => {
                warnings.push(format!(
                    "exclude_from_fastboot_cache[{}] '{}' is neither a path nor an absolute URL",
                    i, url
                ));
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("exclude_from_fastboot_cache[{}]: {}", i, e)),
        }
    }

    (errors, warnings)
}
