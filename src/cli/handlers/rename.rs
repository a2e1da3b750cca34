// src/cli/handlers/rename.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::{cli::handlers::commons, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Renames a registered script.")]
struct RenameArgs {
    /// Current name of the script. Prompted for if omitted.
    name: Option<String>,
    /// The new name. Prompted for if omitted.
    new_name: Option<String>,
}

/// Renames an entry.
pub fn handle(args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    let rename_args = RenameArgs::try_parse_from(&args)?;
    let entry = commons::resolve_entry(ctx, rename_args.name)?;

    let new_name = match rename_args.new_name {
        Some(name) => name,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("rename.prompt.new_name"))
            .with_initial_text(entry.name.clone())
            .interact_text()?,
    };
    let new_name = new_name.trim().to_string();
    if new_name.is_empty() {
        return Err(anyhow!(t!("error.empty_name")));
    }

    if new_name == entry.name {
        println!(
            "\n{}",
            format!(t!("rename.info.no_change"), name = new_name).yellow()
        );
        return Ok(());
    }

    if !ctx.registry.update_name(&entry, &new_name)? {
        ctx.registry.load()?;
        return Err(commons::stale_entry(&entry.name));
    }

    commons::print_success(&format!(
        t!("rename.success"),
        old_name = entry.name,
        new_name = new_name.cyan()
    ));
    Ok(())
}
