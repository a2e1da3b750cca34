// src/cli/handlers/remove.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use dialoguer::{Confirm, theme::ColorfulTheme};

use crate::{cli::handlers::commons, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Removes a script from the registry. The file itself is kept.")]
struct RemoveArgs {
    /// Name of the script. Prompted for if omitted.
    name: Option<String>,
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,
}

/// Removes an entry after confirmation. The script file is kept.
pub fn handle(args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    let remove_args = RemoveArgs::try_parse_from(&args)?;
    let entry = commons::resolve_entry(ctx, remove_args.name)?;

    if !remove_args.yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(t!("remove.prompt.confirm"), name = entry.name))
            .default(false)
            .interact()?
    {
        println!("\n{}", t!("common.info.operation_cancelled"));
        return Ok(());
    }

    if !ctx.registry.remove(&entry)? {
        ctx.registry.load()?;
        println!(
            "\n{}",
            format!(t!("remove.info.already_gone"), name = entry.name).yellow()
        );
        return Ok(());
    }

    commons::print_success(&format!(t!("remove.success"), name = entry.name.cyan()));
    println!(
        "  {}",
        format!(t!("remove.info.file_kept"), path = entry.source.display()).dimmed()
    );
    Ok(())
}
