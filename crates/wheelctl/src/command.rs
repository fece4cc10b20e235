use quickwheel::Point;
use std::str::FromStr;
use thiserror::Error;

/// One line typed at the `wheelctl` prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show,
    Hide { execute: bool, sync: bool },
    Move(Point),
    Confirm,
    Cancel,
    Click(usize),
    Swap(usize, usize),
    Drag(usize, usize),
    Set(usize, String),
    Remove(usize),
    Clear,
    Cycle(i32),
    Select(Option<usize>),
    Hover(Option<usize>),
    Press,
    Hold { millis: u64, at: Point },
    Release,
    Escape,
    Offer(String),
    Status,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
show | hide [exec|sync] | confirm | cancel
move <x> <y> | press | hold <ms> <x> <y> | release | escape
set <slot> <item[:count]> | remove <slot> | clear | swap <a> <b> | drag <from> <to>
click <slot> | cycle [+1|-1] | select <slot|none> | hover <slot|none>
offer <item> | status | help | quit";

fn num<N: FromStr>(arg: Option<&str>, usage: &'static str) -> Result<N, CommandError> {
    arg.and_then(|a| a.parse().ok())
        .ok_or(CommandError::Usage(usage))
}

fn slot_or_none(arg: Option<&str>, usage: &'static str) -> Result<Option<usize>, CommandError> {
    match arg {
        Some("none" | "-1") => Ok(None),
        other => num(other, usage).map(Some),
    }
}

fn point(x: Option<&str>, y: Option<&str>, usage: &'static str) -> Result<Point, CommandError> {
    Ok(Point::new(num(x, usage)?, num(y, usage)?))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        let mut arg = || words.next();

        let command = match verb.as_str() {
            "show" => Self::Show,
            "hide" => match arg() {
                None => Self::Hide {
                    execute: false,
                    sync: false,
                },
                Some("exec") => Self::Hide {
                    execute: true,
                    sync: false,
                },
                Some("sync") => Self::Hide {
                    execute: false,
                    sync: true,
                },
                Some(_) => return Err(CommandError::Usage("hide [exec|sync]")),
            },
            "move" => {
                const USAGE: &str = "move <x> <y>";
                Self::Move(point(arg(), arg(), USAGE)?)
            }
            "confirm" => Self::Confirm,
            "cancel" => Self::Cancel,
            "click" => Self::Click(num(arg(), "click <slot>")?),
            "swap" => {
                const USAGE: &str = "swap <a> <b>";
                Self::Swap(num(arg(), USAGE)?, num(arg(), USAGE)?)
            }
            "drag" => {
                const USAGE: &str = "drag <from> <to>";
                Self::Drag(num(arg(), USAGE)?, num(arg(), USAGE)?)
            }
            "set" => {
                const USAGE: &str = "set <slot> <item[:count]>";
                let slot = num(arg(), USAGE)?;
                let item = arg().ok_or(CommandError::Usage(USAGE))?;
                Self::Set(slot, item.to_string())
            }
            "remove" => Self::Remove(num(arg(), "remove <slot>")?),
            "clear" => Self::Clear,
            "cycle" => match arg() {
                None => Self::Cycle(1),
                some => Self::Cycle(num(some, "cycle [+1|-1]")?),
            },
            "select" => Self::Select(slot_or_none(arg(), "select <slot|none>")?),
            "hover" => Self::Hover(slot_or_none(arg(), "hover <slot|none>")?),
            "press" => Self::Press,
            "hold" => {
                const USAGE: &str = "hold <ms> <x> <y>";
                let millis = num(arg(), USAGE)?;
                Self::Hold {
                    millis,
                    at: point(arg(), arg(), USAGE)?,
                }
            }
            "release" => Self::Release,
            "escape" | "esc" => Self::Escape,
            "offer" => Self::Offer(
                arg()
                    .ok_or(CommandError::Usage("offer <item>"))?
                    .to_string(),
            ),
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}
