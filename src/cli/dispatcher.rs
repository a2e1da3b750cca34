// src/cli/dispatcher.rs

//! Maps command names and aliases to their handlers.

use anyhow::Result;

use crate::{cli::handlers, state::AppContext};

/// Defines a command, its aliases and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut AppContext) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "add",
        aliases: &["new"],
        handler: handlers::add::handle,
    },
    CommandDefinition {
        name: "interpreter",
        aliases: &["interp"],
        handler: handlers::interpreter::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "remove",
        aliases: &["rm", "del"],
        handler: handlers::remove::handle,
    },
    CommandDefinition {
        name: "rename",
        aliases: &[],
        handler: handlers::rename::handle,
    },
    CommandDefinition {
        name: "run",
        aliases: &[],
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "source",
        aliases: &["src"],
        handler: handlers::source::handle,
    },
    CommandDefinition {
        name: "stats",
        aliases: &[],
        handler: handlers::stats::handle,
    },
];

/// Finds a command definition by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes the raw arguments to a handler.
///
/// - no arguments: `list`
/// - `<command> [args...]`: that command
/// - `<script name>`: shortcut for `run <script name>`
pub fn dispatch(all_args: Vec<String>, ctx: &mut AppContext) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let Some((first, rest)) = all_args.split_first() else {
        return handlers::list::handle(Vec::new(), ctx);
    };

    match find_command(first) {
        Some(command) => (command.handler)(rest.to_vec(), ctx),
        None => handlers::run::handle(all_args, ctx),
    }
}
