//! Exclusion check command.

use anyhow::Result;
use handoff_cache::{ExclusionList, ExclusionPattern};
use serde::Serialize;

use super::CheckArgs;
use crate::context::Context;
use crate::output::excluded_badge;

#[derive(Debug, Serialize)]
struct CheckResult {
    url: String,
    excluded: bool,
    matched: Option<String>,
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let exclusions = ExclusionList::compile(ctx.config.exclusions())?;
    let results: Vec<CheckResult> = args.urls.iter().map(|url| check(&exclusions, url)).collect();

    if ctx.output.is_json() {
        ctx.output.json(&results);
        return Ok(());
    }

    if exclusions.is_empty() {
        ctx.output.warn("No exclusion patterns configured");
    }

    for result in &results {
        match &result.matched {
            Some(pattern) => ctx.output.list_item(&format!(
                "{} {} (matched {})",
                result.url,
                excluded_badge(true),
                pattern
            )),
            None => ctx
                .output
                .list_item(&format!("{} {}", result.url, excluded_badge(false))),
        }
    }

    Ok(())
}

fn check(exclusions: &ExclusionList, url: &str) -> CheckResult {
    let matched = exclusions.patterns().find(|p| p.matches(url)).map(describe);
    CheckResult {
        url: url.to_string(),
        excluded: matched.is_some(),
        matched,
    }
}

fn describe(pattern: &ExclusionPattern) -> String {
    match pattern {
        ExclusionPattern::Literal(url) => format!("\"{url}\""),
        ExclusionPattern::Regex(regex) => format!("/{}/", regex.as_str()),
    }
}
