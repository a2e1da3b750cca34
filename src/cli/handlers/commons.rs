// src/cli/handlers/commons.rs

//! Helpers shared by several handlers.

use anyhow::{Result, anyhow};
use colored::Colorize;
use dialoguer::{Select, theme::ColorfulTheme};
use std::path::PathBuf;

use crate::{models::Entry, state::AppContext};

/// Finds the entry called `name`, or lets the user pick one when no name was given.
pub fn resolve_entry(ctx: &AppContext, name: Option<String>) -> Result<Entry> {
    let name = match name {
        Some(name) => name,
        None => select_entry_name(ctx)?,
    };
    ctx.registry
        .get(&name)
        .cloned()
        .ok_or_else(|| anyhow!(t!("error.script_not_found"), name = name))
}

fn select_entry_name(ctx: &AppContext) -> Result<String> {
    let entries = ctx.registry.entries();
    if entries.is_empty() {
        return Err(anyhow!(t!("error.registry_empty")));
    }
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("common.prompt.select_script"))
        .items(&names)
        .default(0)
        .interact()?;
    names
        .get(selection)
        .map(|name| name.to_string())
        .ok_or_else(|| anyhow!(t!("error.registry_empty")))
}

/// Prints the registry's line-level problems as warnings.
pub fn report_defects(ctx: &AppContext) {
    let defects = ctx.registry.defects();
    if defects.is_empty() {
        return;
    }
    eprintln!(
        "\n{}",
        format!(
            t!("common.warning.registry_defects"),
            path = ctx.registry.file().display()
        )
        .yellow()
    );
    for defect in defects {
        eprintln!("  - {}", defect);
    }
}

/// The error shown when an update matched no line: the registry changed under us.
pub fn stale_entry(name: &str) -> anyhow::Error {
    anyhow!(t!("error.stale_entry"), name = name)
}

/// Expands `~` and makes existing paths absolute so the registry does not depend on
/// the directory the command was started from.
pub fn absolutize(raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw.trim()).into_owned());
    dunce::canonicalize(&expanded).unwrap_or(expanded)
}

/// Prints the standard success line.
pub fn print_success(message: &str) {
    println!("\n{} {}", t!("common.success").green().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_absolutize_keeps_missing_paths_and_expands_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(
            absolutize("~/not-there-3c1e/x.py"),
            home.join("not-there-3c1e/x.py")
        );
    }

    #[test]
    fn test_absolutize_canonicalizes_existing_paths() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.py");
        std::fs::write(&file, "").unwrap();
        let indirect = format!("{}/./a.py", dir.path().display());
        assert_eq!(absolutize(&indirect), dunce::canonicalize(&file).unwrap());
    }

    #[test]
    fn test_resolve_entry_by_name() {
        let dir = tempdir().unwrap();
        let paths = crate::core::paths::DataPaths::new(dir.path());
        let ctx = AppContext::open(paths, Default::default()).unwrap();

        assert_eq!(resolve_entry(&ctx, Some("Example".into())).unwrap().name, "Example");
        let err = resolve_entry(&ctx, Some("Nope".into())).unwrap_err();
        assert!(err.to_string().contains("Nope"));
    }
}
