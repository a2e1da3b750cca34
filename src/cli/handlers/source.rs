// src/cli/handlers/source.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::{cli::handlers::commons, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Points a script entry at another file.")]
struct SourceArgs {
    /// Name of the script. Prompted for if omitted.
    name: Option<String>,
    /// Path to the new script file. Prompted for if omitted.
    path: Option<String>,
}

/// Points an entry at another script file.
pub fn handle(args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    let source_args = SourceArgs::try_parse_from(&args)?;
    let entry = commons::resolve_entry(ctx, source_args.name)?;

    let raw = match source_args.path {
        Some(path) => path,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("source.prompt.path"))
            .with_initial_text(entry.source.display().to_string())
            .interact_text()?,
    };
    let new_source = commons::absolutize(&raw);

    if !new_source.is_file() || !ctx.settings.is_script_file(&new_source) {
        eprintln!(
            "\n{}",
            format!(t!("common.warning.not_a_script"), path = new_source.display()).yellow()
        );
    }

    if !ctx.registry.update_source(&entry, &new_source)? {
        ctx.registry.load()?;
        return Err(commons::stale_entry(&entry.name));
    }

    commons::print_success(&format!(
        t!("source.success"),
        name = entry.name.cyan(),
        path = new_source.display()
    ));
    Ok(())
}
