// src/cli/handlers/add.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::{
    cli::handlers::commons,
    constants::EXAMPLE_SCRIPT_NAME,
    models::{Entry, normalize_interpreter},
    state::AppContext,
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Registers a new script.")]
struct AddArgs {
    /// Display name. Defaults to the next free 'New Script' name.
    name: Option<String>,

    /// Path to the script file. Prompted for if omitted.
    source: Option<String>,

    /// Interpreter inside a virtual environment.
    #[arg(long, short)]
    interpreter: Option<String>,
}

/// Registers a new entry. A missing name becomes the next free default name.
pub fn handle(args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    let add_args = AddArgs::try_parse_from(&args)?;

    let name = add_args
        .name
        .map(|n| n.trim().to_string())
        .unwrap_or_else(|| ctx.registry.next_default_name());
    if name.is_empty() {
        return Err(anyhow!(t!("error.empty_name")));
    }
    if ctx.registry.contains(&name) {
        return Err(anyhow!(t!("add.error.name_taken"), name = name));
    }

    let raw_source = match add_args.source {
        Some(source) => source,
        None => {
            let example = ctx.paths.example_dir().join(EXAMPLE_SCRIPT_NAME);
            Input::with_theme(&ColorfulTheme::default())
                .with_prompt(t!("add.prompt.source"))
                .default(example.display().to_string())
                .interact_text()?
        }
    };
    let source = commons::absolutize(&raw_source);
    if !source.is_file() || !ctx.settings.is_script_file(&source) {
        eprintln!(
            "\n{}",
            format!(t!("common.warning.not_a_script"), path = source.display()).yellow()
        );
    }

    let mut entry = Entry::new(name, source);
    if let Some(raw) = add_args.interpreter {
        if normalize_interpreter(&raw).is_some() {
            entry = entry.with_interpreter(commons::absolutize(&raw));
        }
    }

    ctx.registry.add(entry.clone())?;

    commons::print_success(&format!(t!("add.success"), name = entry.name.cyan()));
    println!("  {}  {}", entry.source_label().dimmed(), entry.interpreter_label().dimmed());
    Ok(())
}
