//! Cache key derivation command.

use anyhow::{Context as _, Result};
use handoff_cache::RequestShape;
use serde_json::Value;

use super::KeyArgs;
use crate::context::Context;

/// Run the key command.
pub async fn run(args: KeyArgs, ctx: &Context) -> Result<()> {
    let shape = build_shape(&args)?;
    let key = shape.cache_key()?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "key": key.as_str(),
            "resource_type": shape.resource_type,
            "url": shape.url,
            "params": shape.params,
            "extra": shape.extra,
        }));
        return Ok(());
    }

    ctx.output.debug(&format!("components: {}", key.components().join(" ")));
    println!("{}", key);
    Ok(())
}

fn build_shape(args: &KeyArgs) -> Result<RequestShape> {
    let mut shape = RequestShape::new(&args.resource_type, &args.url);
    if let Some(params) = &args.params {
        shape = shape.with_params(parse_json("--params", params)?);
    }
    if let Some(extra) = &args.extra {
        shape = shape.with_extra(parse_json("--extra", extra)?);
    }
    Ok(shape)
}

fn parse_json(flag: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).with_context(|| format!("{flag} is not valid JSON"))
}
