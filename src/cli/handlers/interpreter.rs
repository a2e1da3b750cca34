// src/cli/handlers/interpreter.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use dialoguer::{Input, theme::ColorfulTheme};

use crate::{
    cli::handlers::commons, models::normalize_interpreter, state::AppContext,
    system::executor::activation_script,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Sets the virtual-environment interpreter of a script ('none' for the global one)."
)]
struct InterpreterArgs {
    /// Name of the script. Prompted for if omitted.
    name: Option<String>,
    /// Interpreter inside a virtual environment, or `none`. Prompted for if omitted.
    interpreter: Option<String>,
}

/// Sets the interpreter of an entry, or clears it with `none`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    let interp_args = InterpreterArgs::try_parse_from(&args)?;
    let entry = commons::resolve_entry(ctx, interp_args.name)?;

    let raw = match interp_args.interpreter {
        Some(value) => value,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("interpreter.prompt.path"))
            .default("none".to_string())
            .interact_text()?,
    };

    // Sentinels pass through untouched; real paths are made absolute.
    let value = match normalize_interpreter(&raw) {
        Some(_) => commons::absolutize(&raw).to_string_lossy().into_owned(),
        None => raw.clone(),
    };

    if let Some(path) = normalize_interpreter(&value) {
        if !path.is_file() {
            eprintln!(
                "\n{}",
                format!(t!("interpreter.warning.missing"), path = path.display()).yellow()
            );
        } else if !activation_script(&path).is_file() {
            eprintln!(
                "\n{}",
                format!(
                    t!("interpreter.warning.no_activate"),
                    path = activation_script(&path).display()
                )
                .yellow()
            );
        }
    }

    if !ctx.registry.update_interpreter(&entry, &value)? {
        ctx.registry.load()?;
        return Err(commons::stale_entry(&entry.name));
    }

    let label = ctx
        .registry
        .get(&entry.name)
        .map(|e| e.interpreter_label())
        .unwrap_or_default();
    commons::print_success(&format!(
        t!("interpreter.success"),
        name = entry.name.cyan(),
        label = label
    ));
    Ok(())
}
