// src/bin/scriptdeck.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use scriptdeck::{
    cli::{Cli, dispatcher},
    core::{paths::DataPaths, settings},
    state::AppContext,
    system::logging,
    t,
};

/// Resolves the data directory, loads settings, starts logging and hands the
/// arguments to the dispatcher. All errors end up in `main`.
fn run_cli(cli: Cli) -> Result<()> {
    let paths = DataPaths::resolve(cli.data_dir.as_deref())?;
    let settings = settings::load_settings(&paths).with_context(|| {
        format!(t!("main.error.settings"), path = paths.settings_file().display())
    })?;
    logging::init(&paths, &settings.log_level, cli.verbose);
    log::debug!("CLI args parsed: {:?}", cli);

    let root = paths.root().to_path_buf();
    let mut ctx = AppContext::open(paths, settings)
        .with_context(|| format!(t!("main.error.open"), path = root.display()))?;
    if ctx.first_run {
        println!(
            "{}",
            format!(t!("main.info.first_run"), path = ctx.paths.root().display()).green()
        );
    }

    dispatcher::dispatch(cli.args, &mut ctx)
}

fn main() {
    if let Err(e) = run_cli(Cli::parse()) {
        // Handler argument errors (including `--help`) are printed the way clap prints them.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        log::error!("{:#}", e);
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}
