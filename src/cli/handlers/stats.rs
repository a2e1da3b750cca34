// src/cli/handlers/stats.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::state::AppContext;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Shows usage statistics and data locations.")]
struct StatsArgs {}

/// Prints the execution counter and where the data lives.
pub fn handle(args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    let _ = StatsArgs::try_parse_from(&args)?;

    let entries = ctx.registry.entries();
    let with_env = entries.iter().filter(|e| e.interpreter.is_some()).count();

    println!("\n{}", t!("stats.header").bold());
    println!("  {:<18} {}", "Executions:".blue(), ctx.counter.get().to_string().cyan());
    println!("  {:<18} {}", "Scripts:".blue(), entries.len());
    println!("  {:<18} {}", "With venv:".blue(), with_env);
    println!("  {:<18} {}", "Registry:".blue(), ctx.registry.file().display());
    println!("  {:<18} {}", "Settings:".blue(), ctx.paths.settings_file().display());
    println!("  {:<18} {}", "Log:".blue(), ctx.paths.log_file().display());

    if !ctx.registry.defects().is_empty() {
        println!(
            "\n  {}",
            format!(t!("stats.warning.defects"), count = ctx.registry.defects().len()).yellow()
        );
    }
    Ok(())
}
