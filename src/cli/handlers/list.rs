// src/cli/handlers/list.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, models::Entry, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists the registered scripts.")]
struct ListArgs {
    /// Show full source and interpreter paths.
    #[arg(long, short)]
    paths: bool,

    /// Print the entries as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

/// Prints every entry, or the registry as JSON with `--json`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    let entries = ctx.registry.entries();

    if list_args.json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    commons::report_defects(ctx);

    if entries.is_empty() {
        println!("\n{}", t!("list.info.empty").yellow());
        println!("  {}", t!("list.info.add_hint").dimmed());
        return Ok(());
    }

    println!("\n{}", t!("list.header").bold());
    for (index, entry) in entries.iter().enumerate() {
        print_entry(index + 1, entry, list_args.paths);
    }

    println!(
        "\n  {}",
        format!(
            t!("list.footer"),
            count = entries.len(),
            executions = ctx.counter.get()
        )
        .dimmed()
    );
    Ok(())
}

fn print_entry(position: usize, entry: &Entry, full_paths: bool) {
    let missing = !entry.source.is_file();
    let name = if missing {
        entry.name.red().to_string()
    } else {
        entry.name.cyan().bold().to_string()
    };
    println!("  {:>3}. {}", position, name);

    if full_paths {
        println!("       {:<13} {}", "Source:".blue(), entry.source.display());
        let interpreter = entry
            .interpreter
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| t!("list.global_interpreter").to_string());
        println!("       {:<13} {}", "Interpreter:".blue(), interpreter);
    } else {
        println!(
            "       {}  {}",
            entry.source_label().dimmed(),
            entry.interpreter_label().dimmed()
        );
    }
    if missing {
        println!("       {}", t!("list.warning.source_missing").yellow());
    }
}
