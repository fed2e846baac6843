//! Tool listing and direct invocation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::http::create_http_client;
use crate::tools::{function_name, Tool, ToolRegistry};
use anyhow::{anyhow, Result};
use console::style;
use std::sync::Arc;

fn registry(settings: &Settings) -> Result<ToolRegistry> {
    let http = create_http_client(&settings.general)?;
    Ok(ToolRegistry::standard(settings, http))
}

/// List the available tools in registry order.
pub fn run_tools(settings: Settings) -> Result<()> {
    let registry = registry(&settings)?;

    Output::header("Study tools");
    for tool in registry.iter() {
        println!(
            "\n  {} {}",
            style(tool.name()).bold(),
            style(format!("({})", function_name(tool.name()))).dim()
        );
        println!("    {}", tool.description());
    }
    println!();

    Ok(())
}

/// Run one tool with the given input and print its output.
pub async fn run_tool(name: &str, input: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Tool, &settings)?;

    let registry = registry(&settings)?;
    let tool = find_tool(&registry, name)?;

    let spinner = Output::spinner(&format!("Running {}...", tool.name()));
    let output = tool.invoke(input).await;
    spinner.finish_and_clear();

    Output::answer(&output);
    Ok(())
}

fn find_tool(registry: &ToolRegistry, name: &str) -> Result<Arc<dyn Tool>> {
    registry.get(name).cloned().ok_or_else(|| {
        anyhow!(
            "Unknown tool '{}'. Available tools: {}",
            name,
            registry.names().join(", ")
        )
    })
}
