// src/cli/handlers/run.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{
    cli::handlers::commons,
    state::AppContext,
    system::{
        executor::{ExecutionOutcome, ExecutionResolver},
        process::{InvocationMode, SystemSpawner},
    },
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Runs a registered script.")]
struct RunArgs {
    /// Name of the script. Several words are joined with spaces. Prompted for if omitted.
    name: Vec<String>,

    /// Print the command that would run, without running it.
    #[arg(long)]
    dry_run: bool,
}

/// Runs an entry, or only shows its command with `--dry-run`.
pub fn handle(args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    let run_args = RunArgs::try_parse_from(&args)?;
    let name = (!run_args.name.is_empty()).then(|| run_args.name.join(" "));
    let entry = commons::resolve_entry(ctx, name)?;
    let resolver = ExecutionResolver::new(&ctx.settings, &ctx.counter, SystemSpawner);

    if run_args.dry_run {
        let invocation = resolver.resolve(&entry)?;
        println!("\n{}", t!("run.info.dry_run").bold());
        println!("  {:<13} {}", "Command:".blue(), invocation);
        println!("  {:<13} {}", "Directory:".blue(), invocation.cwd.display());
        if let InvocationMode::VirtualEnv { activate, .. } = &invocation.mode {
            println!("  {:<13} {}", "Activate:".blue(), activate.display());
        }
        return Ok(());
    }

    println!(
        "\n{}",
        format!(t!("run.info.running"), name = entry.name.cyan().bold())
    );
    let outcome = resolver.resolve_and_run(&entry)?;
    print_outcome(&entry.name, &outcome);
    Ok(())
}

fn print_outcome(name: &str, outcome: &ExecutionOutcome) {
    let output = &outcome.output;
    if !output.stdout.is_empty() {
        print!("{}", output.stdout);
        if !output.stdout.ends_with('\n') {
            println!();
        }
    }
    if !output.stderr.is_empty() {
        eprint!("{}", output.stderr.red());
        if !output.stderr.ends_with('\n') {
            eprintln!();
        }
    }

    match output.exit_code {
        Some(0) => commons::print_success(&format!(t!("run.success"), name = name)),
        Some(code) => println!(
            "\n{}",
            format!(t!("run.warning.non_zero_exit"), name = name, code = code).yellow()
        ),
        None => println!(
            "\n{}",
            format!(t!("run.warning.signal"), name = name).yellow()
        ),
    }

    match outcome.executions {
        Some(count) => println!(
            "  {}",
            format!(t!("run.info.executions"), count = count).dimmed()
        ),
        None => eprintln!("  {}", t!("run.warning.counter_not_saved").yellow()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquoted_multi_word_names_are_joined() {
        let args = RunArgs::try_parse_from(["Backup", "DB", "--dry-run"]).unwrap();
        assert_eq!(args.name.join(" "), "Backup DB");
        assert!(args.dry_run);
    }
}
