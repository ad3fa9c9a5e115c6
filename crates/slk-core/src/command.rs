//! Slash commands typed into the compose line.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch to the channel with this display name (`#name`).
    Join(String),
    Clear,
    Refresh,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Join,
    Clear,
    Refresh,
    Quit,
}

#[derive(Debug, Clone, Copy)]
struct CommandDef {
    kind: CommandKind,
    name: &'static str,
    arity: usize,
}

const COMMAND_DEFS: &[CommandDef] = &[
    CommandDef {
        kind: CommandKind::Join,
        name: "/join",
        arity: 1,
    },
    CommandDef {
        kind: CommandKind::Clear,
        name: "/clear",
        arity: 0,
    },
    CommandDef {
        kind: CommandKind::Refresh,
        name: "/refresh",
        arity: 0,
    },
    CommandDef {
        kind: CommandKind::Quit,
        name: "/quit",
        arity: 0,
    },
];

/// A submitted line that could not be acted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    WrongArity {
        command: &'static str,
        expected: usize,
    },
    ChannelNotFound(String),
    Unprocessed(String),
    NoActiveChannel,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::WrongArity { command, expected } => {
                let noun = if *expected == 1 { "argument" } else { "arguments" };
                write!(f, "{command}: need {expected} {noun}")
            }
            CommandError::ChannelNotFound(name) => write!(f, "channel not found: {name}"),
            CommandError::Unprocessed(line) => write!(f, "unprocessed command: {line}"),
            CommandError::NoActiveChannel => write!(f, "no active channel, use /join #name"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Parses a submitted line.
///
/// Returns `Ok(None)` for a line that is not a command (does not start with
/// `/`).
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Ok(None);
    }

    let mut words = trimmed.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let Some(def) = COMMAND_DEFS.iter().find(|def| def.name == name) else {
        return Err(CommandError::Unprocessed(trimmed.to_string()));
    };
    if args.len() != def.arity {
        return Err(CommandError::WrongArity {
            command: def.name,
            expected: def.arity,
        });
    }

    let command = match def.kind {
        CommandKind::Join => Command::Join(args[0].to_string()),
        CommandKind::Clear => Command::Clear,
        CommandKind::Refresh => Command::Refresh,
        CommandKind::Quit => Command::Quit,
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse("hello there"), Ok(None));
        assert_eq!(parse("  not /join"), Ok(None));
    }

    #[test]
    fn test_join() {
        assert_eq!(
            parse("/join #general"),
            Ok(Some(Command::Join("#general".to_string())))
        );
        assert_eq!(
            parse("  /join   #general  "),
            Ok(Some(Command::Join("#general".to_string())))
        );
    }

    #[test]
    fn test_join_arity() {
        let expected = Err(CommandError::WrongArity {
            command: "/join",
            expected: 1,
        });
        assert_eq!(parse("/join"), expected);
        assert_eq!(parse("/join #a #b"), expected);
        assert_eq!(expected.unwrap_err().to_string(), "/join: need 1 argument");
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/clear"), Ok(Some(Command::Clear)));
        assert_eq!(parse("/refresh"), Ok(Some(Command::Refresh)));
        assert_eq!(parse("/quit"), Ok(Some(Command::Quit)));
        assert!(matches!(
            parse("/quit now"),
            Err(CommandError::WrongArity { command: "/quit", .. })
        ));
    }

    #[test]
    fn test_unknown_command() {
        let err = parse("/topic hello").unwrap_err();
        assert_eq!(err, CommandError::Unprocessed("/topic hello".to_string()));
        assert_eq!(err.to_string(), "unprocessed command: /topic hello");
    }

    #[test]
    fn test_prefix_is_not_a_match() {
        assert!(matches!(parse("/joinx #a"), Err(CommandError::Unprocessed(_))));
    }
}
