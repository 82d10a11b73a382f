//! Shoebox inspection command.

use std::fs;

use anyhow::{bail, Context as _, Result};
use handoff_cache::Shoebox;
use serde::Serialize;

use super::InspectArgs;
use crate::context::Context;
use crate::output::format_bytes;

#[derive(Debug, Serialize)]
struct EntrySummary {
    key: String,
    bytes: usize,
}

/// Run the inspect command.
pub async fn run(args: InspectArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.file);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let shoebox = parse_shoebox(&content)
        .with_context(|| format!("Failed to parse shoebox in {}", path.display()))?;

    let namespace = args.namespace.as_deref().unwrap_or(&ctx.config.namespace);
    let Some(payload_box) = shoebox.retrieve(namespace) else {
        let available = shoebox.namespaces();
        if available.is_empty() {
            bail!("No shoebox namespaces in {}", path.display());
        }
        bail!(
            "Namespace '{}' not found (available: {})",
            namespace,
            available.join(", ")
        );
    };

    let entries: Vec<EntrySummary> = payload_box
        .queries
        .iter()
        .map(|(key, payload)| EntrySummary {
            key: key.clone(),
            bytes: payload.len(),
        })
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "namespace": namespace,
            "entries": entries,
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Shoebox '{}'", namespace));
    if entries.is_empty() {
        ctx.output.info("No boxed responses");
        return Ok(());
    }

    let total: usize = entries.iter().map(|e| e.bytes).sum();
    for entry in &entries {
        let size = format_bytes(entry.bytes as u64);
        ctx.output.table_row(&[entry.key.as_str(), size.as_str()], &[68, 10]);
    }
    ctx.output.info("");
    ctx.output.kv("entries", &entries.len().to_string());
    ctx.output.kv("total", &format_bytes(total as u64));

    Ok(())
}

/// Accept either the JSON document or a rendered page.
fn parse_shoebox(content: &str) -> Result<Shoebox> {
    let shoebox = if content.trim_start().starts_with('{') {
        Shoebox::from_json(content)?
    } else {
        Shoebox::from_script_tags(content)?
    };
    Ok(shoebox)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_and_page_agree() {
        let shoebox = Shoebox::new();
        shoebox.with_box_or_default("ns", |b| b.insert("q-1", r#"{"id":1}"#));

        let from_json = parse_shoebox(&shoebox.to_json()).unwrap();
        let from_page = parse_shoebox(&format!("<body>{}</body>", shoebox.to_script_tags())).unwrap();

        assert_eq!(from_json.retrieve("ns"), from_page.retrieve("ns"));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_shoebox("{nope").is_err());
    }
}
