use std::path::PathBuf;

use thiserror::Error;

use crate::types::{PageId, SlotNo, error::PageError};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error(transparent)]
    Page(#[from] PageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    Next,
    Prev,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init(PageId),
    Insert(String),
    Delete(SlotNo),
    Get(SlotNo),
    Scan,
    Slots,
    Stats,
    Link(LinkDirection, Option<PageId>),
    Save(PathBuf),
    Load(PathBuf),
    SelfTest,
    Help,
    Clear,
    Exit,
    Empty,
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let input = input.trim();
        let (word, rest) = match input.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (input, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Ok(Command::Empty),
            "init" => parse_number(rest)
                .map(Command::Init)
                .ok_or(CommandError::Usage("init <page_id>")),
            "insert" | "i" => {
                if rest.is_empty() {
                    Err(CommandError::Usage("insert <text>"))
                } else {
                    Ok(Command::Insert(rest.to_string()))
                }
            }
            "delete" | "d" => parse_number(rest)
                .map(Command::Delete)
                .ok_or(CommandError::Usage("delete <slot>")),
            "get" | "g" => parse_number(rest)
                .map(Command::Get)
                .ok_or(CommandError::Usage("get <slot>")),
            "scan" => Ok(Command::Scan),
            "slots" => Ok(Command::Slots),
            "stats" => Ok(Command::Stats),
            "link" => parse_link(rest).ok_or(CommandError::Usage("link next|prev <page_id|none>")),
            "save" if !rest.is_empty() => Ok(Command::Save(PathBuf::from(rest))),
            "save" => Err(CommandError::Usage("save <path>")),
            "load" if !rest.is_empty() => Ok(Command::Load(PathBuf::from(rest))),
            "load" => Err(CommandError::Usage("load <path>")),
            "selftest" => Ok(Command::SelfTest),
            "help" | "h" => Ok(Command::Help),
            "clear" => Ok(Command::Clear),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Option<T> {
    text.parse().ok()
}

fn parse_link(text: &str) -> Option<Command> {
    let mut parts = text.split_whitespace();
    let direction = match parts.next()? {
        "next" => LinkDirection::Next,
        "prev" => LinkDirection::Prev,
        _ => return None,
    };
    let target = match parts.next()? {
        "none" => None,
        page_id => Some(page_id.parse().ok()?),
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Command::Link(direction, target))
}

pub const HELP_TEXT: &str = r#"
Available commands:
  init <page_id>                 - Reset the page with a new page id
  insert, i <text>               - Insert a record, prints its record id
  delete, d <slot>               - Delete the record in <slot>
  get, g <slot>                  - Print the record in <slot>
  scan                           - List records in physical order
  slots                          - Dump the slot directory
  stats                          - Show header fields and free space
  link next|prev <page_id|none>  - Set a page link
  save <path> / load <path>      - Write or read the raw page image
  selftest                       - Run the built-in page checks
  help, h                        - Show this help message
  clear                          - Clear the screen
  exit, quit, q                  - Exit

Use '\' at the end of a line for multiline input.
Use Up/Down arrows to navigate command history.
"#;
