use std::fmt;

use crate::encoding;

use super::WatchKind;

/// One parsed REPL command.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Command {
    BreakAdd { address: u16 },
    BreakList,
    BreakRemove { index: usize },
    BreakClear,
    WatchAdd { address: u16, kind: WatchKind },
    WatchList,
    WatchRemove { index: usize },
    WatchClear,
    Registers,
    RegisterSet { target: RegTarget, value: u16 },
    Memory { target: Option<Location>, count: u16 },
    Set { address: u16, value: u16 },
    Source { target: Option<Location>, count: u16 },
    Labels,
    Jump { target: Location },
    Continue,
    Next,
    Quit,
    ClearScreen,
    Reset,
}

/// Something addressable: a raw address or a label to look up.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Location {
    Address(u16),
    Label(String),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RegTarget {
    R(u16),
    Pc,
    Ps,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CommandError {
    Usage(&'static str),
    UnknownCommand(String),
    UnknownSubcommand { command: &'static str, found: String },
    InvalidAddress(String),
    InvalidInteger(String),
    InvalidRegister(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(usage) => write!(f, "usage: {usage}"),
            Self::UnknownCommand(found) => {
                write!(f, "error: '{found}' is not a valid command")
            }
            Self::UnknownSubcommand { command, found } => {
                write!(f, "{command}: '{found}' is not a valid command")
            }
            Self::InvalidAddress(found) => write!(f, "invalid address '{found}'"),
            Self::InvalidInteger(found) => write!(f, "invalid integer '{found}'"),
            Self::InvalidRegister(found) => write!(f, "invalid register '{found}'"),
        }
    }
}

impl TryFrom<&str> for Command {
    type Error = CommandError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let mut args = line.split_whitespace();
        let Some(name) = args.next() else {
            return Err(CommandError::Usage("<command> [args]"));
        };
        let args: Vec<&str> = args.collect();

        let command = match name {
            "b" | "bp" | "break" | "breakpoint" => parse_break(&args)?,
            "w" | "wp" | "watch" | "watchpoint" => parse_watch(&args)?,
            "r" | "reg" | "register" | "registers" => parse_register(&args)?,
            "m" | "mem" | "memory" => {
                let (target, count) = parse_area(&args, 1, "memory [0x####|label] [count]")?;
                Command::Memory { target, count }
            }
            "s" | "src" | "source" => {
                let (target, count) = parse_area(&args, 3, "source [0x####|label] [count]")?;
                Command::Source { target, count }
            }
            "set" => match args.as_slice() {
                [addr, value] => Command::Set {
                    address: address(addr)?,
                    value: address(value)?,
                },
                _ => return Err(CommandError::Usage("set [0x####] [0x####]")),
            },
            "l" | "label" | "labels" => {
                if !args.is_empty() {
                    return Err(CommandError::Usage("labels"));
                }
                Command::Labels
            }
            "j" | "jmp" | "jump" => match args.as_slice() {
                [target] => Command::Jump {
                    target: location(target),
                },
                _ => return Err(CommandError::Usage("jump [0x####|label]")),
            },
            "c" | "continue" => Command::Continue,
            "n" | "next" => Command::Next,
            "q" | "quit" | "exit" => Command::Quit,
            "clear" => Command::ClearScreen,
            "reset" => Command::Reset,
            _ => return Err(CommandError::UnknownCommand(name.to_string())),
        };

        Ok(command)
    }
}

fn parse_break(args: &[&str]) -> Result<Command, CommandError> {
    // Bare `break` lists
    let (sub, rest) = args.split_first().unwrap_or((&"l", &[]));
    Ok(match *sub {
        "a" | "add" => match rest {
            [addr] => Command::BreakAdd {
                address: address(addr)?,
            },
            _ => return Err(CommandError::Usage("break add [0x####]")),
        },
        "l" | "ls" | "list" => {
            if !rest.is_empty() {
                return Err(CommandError::Usage("break list"));
            }
            Command::BreakList
        }
        "r" | "rm" | "remove" => match rest {
            [index] => Command::BreakRemove {
                index: integer(index)?,
            },
            _ => return Err(CommandError::Usage("break remove [#]")),
        },
        "clear" => Command::BreakClear,
        found => {
            return Err(CommandError::UnknownSubcommand {
                command: "break",
                found: found.to_string(),
            })
        }
    })
}

fn parse_watch(args: &[&str]) -> Result<Command, CommandError> {
    let Some((sub, rest)) = args.split_first() else {
        return Err(CommandError::Usage("watch [add|list|remove|clear]"));
    };
    Ok(match *sub {
        "a" | "add" => match rest {
            [addr, kind] => Command::WatchAdd {
                address: address(addr)?,
                kind: match *kind {
                    "r" | "read" => WatchKind::Read,
                    "w" | "write" => WatchKind::Write,
                    "rw" | "rwrite" | "readwrite" => WatchKind::ReadWrite,
                    _ => {
                        return Err(CommandError::Usage(
                            "watch add [0x####] [read|write|readwrite]",
                        ))
                    }
                },
            },
            _ => {
                return Err(CommandError::Usage(
                    "watch add [0x####] [read|write|readwrite]",
                ))
            }
        },
        "l" | "ls" | "list" => {
            if !rest.is_empty() {
                return Err(CommandError::Usage("watch list"));
            }
            Command::WatchList
        }
        "r" | "rm" | "remove" => match rest {
            [index] => Command::WatchRemove {
                index: integer(index)?,
            },
            _ => return Err(CommandError::Usage("watch remove [#]")),
        },
        "clear" => Command::WatchClear,
        found => {
            return Err(CommandError::UnknownSubcommand {
                command: "watch",
                found: found.to_string(),
            })
        }
    })
}

fn parse_register(args: &[&str]) -> Result<Command, CommandError> {
    match args {
        [] => Ok(Command::Registers),
        [target, value] => {
            let target = match target.to_ascii_uppercase().as_str() {
                "PC" => RegTarget::Pc,
                "PS" => RegTarget::Ps,
                name => match name.strip_prefix('R').and_then(|n| n.parse::<u16>().ok()) {
                    Some(n) if n < 8 => RegTarget::R(n),
                    _ => return Err(CommandError::InvalidRegister(target.to_string())),
                },
            };
            Ok(Command::RegisterSet {
                target,
                value: address(value)?,
            })
        }
        _ => Err(CommandError::Usage("register [R#|PC|PS] [0x####]")),
    }
}

/// Common `[0x####|label] [count]` argument shape of `memory` and `source`.
fn parse_area(
    args: &[&str],
    default_count: u16,
    usage: &'static str,
) -> Result<(Option<Location>, u16), CommandError> {
    match args {
        [] => Ok((None, default_count)),
        [target] => Ok((Some(location(target)), default_count)),
        [target, count] => Ok((Some(location(target)), integer::<u16>(count)?)),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn address(arg: &str) -> Result<u16, CommandError> {
    encoding::decode_hex(arg).ok_or_else(|| CommandError::InvalidAddress(arg.to_string()))
}

fn location(arg: &str) -> Location {
    match encoding::decode_hex(arg) {
        Some(addr) => Location::Address(addr),
        None => Location::Label(arg.to_string()),
    }
}

fn integer<T: std::str::FromStr>(arg: &str) -> Result<T, CommandError> {
    arg.parse()
        .map_err(|_| CommandError::InvalidInteger(arg.to_string()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn break_commands() {
        assert_eq!(
            Command::try_from("break add 0x3000"),
            Ok(Command::BreakAdd { address: 0x3000 })
        );
        assert_eq!(Command::try_from("b"), Ok(Command::BreakList));
        assert_eq!(
            Command::try_from("bp rm 2"),
            Ok(Command::BreakRemove { index: 2 })
        );
        assert_eq!(Command::try_from("break clear"), Ok(Command::BreakClear));
    }

    #[test]
    fn watch_commands() {
        assert_eq!(
            Command::try_from("watch add xFE02 rw"),
            Ok(Command::WatchAdd {
                address: 0xFE02,
                kind: WatchKind::ReadWrite
            })
        );
        assert!(matches!(
            Command::try_from("watch add xFE02 nope"),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn register_commands() {
        assert_eq!(Command::try_from("reg"), Ok(Command::Registers));
        assert_eq!(
            Command::try_from("r r3 0x00FF"),
            Ok(Command::RegisterSet {
                target: RegTarget::R(3),
                value: 0xFF
            })
        );
        assert_eq!(
            Command::try_from("r pc x3000"),
            Ok(Command::RegisterSet {
                target: RegTarget::Pc,
                value: 0x3000
            })
        );
        assert!(matches!(
            Command::try_from("r r9 x0"),
            Err(CommandError::InvalidRegister(_))
        ));
    }

    #[test]
    fn area_commands() {
        assert_eq!(
            Command::try_from("mem"),
            Ok(Command::Memory {
                target: None,
                count: 1
            })
        );
        assert_eq!(
            Command::try_from("source LOOP 5"),
            Ok(Command::Source {
                target: Some(Location::Label("LOOP".to_string())),
                count: 5
            })
        );
        assert_eq!(
            Command::try_from("m x3000 8"),
            Ok(Command::Memory {
                target: Some(Location::Address(0x3000)),
                count: 8
            })
        );
    }

    #[test]
    fn control_commands() {
        assert_eq!(Command::try_from("c"), Ok(Command::Continue));
        assert_eq!(Command::try_from("next"), Ok(Command::Next));
        assert_eq!(Command::try_from("exit"), Ok(Command::Quit));
        assert!(matches!(
            Command::try_from("frobnicate"),
            Err(CommandError::UnknownCommand(_))
        ));
    }
}
