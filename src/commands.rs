//! Command palette entries and autocomplete.

use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
  Navigate(Route),
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub action: CommandAction,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "home",
    aliases: &["h", "index"],
    description: "Welcome screen",
    action: CommandAction::Navigate(Route::Home),
  },
  Command {
    name: "posts",
    aliases: &["p", "post"],
    description: "Browse, create and delete posts",
    action: CommandAction::Navigate(Route::Posts),
  },
  Command {
    name: "users",
    aliases: &["u", "user"],
    description: "Users directory",
    action: CommandAction::Navigate(Route::Users),
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit jpq",
    action: CommandAction::Quit,
  },
];

/// Rank of a command for the input, lower is better; `None` if unrelated.
fn rank(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else {
    None
  }
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&'static Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| rank(cmd, &input).map(|r| (cmd, r)))
    .collect();
  matches.sort_by_key(|(_, r)| *r);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Resolve typed input to an action; route paths like `/users` work too.
pub fn resolve(input: &str) -> Option<CommandAction> {
  let trimmed = input.trim();
  if trimmed.starts_with('/') {
    return Route::from_path(trimmed).map(CommandAction::Navigate);
  }
  get_suggestions(trimmed).first().map(|cmd| cmd.action)
}
