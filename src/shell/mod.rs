pub mod command;
pub mod config;

use std::{
    fmt::Write as _,
    fs,
    io::Write,
    path::Path,
};

use rustyline::{DefaultEditor, error::ReadlineError};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    driver::{HeapPageDriver, TestDriver},
    shell::{
        command::{Command, CommandError, HELP_TEXT, LinkDirection},
        config::ShellConfig,
    },
    storage::slotted_page::SlottedPage,
    types::{PAGE_DATA_SIZE, PAGE_SIZE, PageId, error::PageError, record_id::RecordId, slot::Slot},
};

const PROMPT: &str = "heapslot> ";
const CONTINUATION_PROMPT: &str = "       -> ";

pub enum Outcome {
    Continue(String),
    Exit,
}

/// One in-memory page plus the commands that operate on it.
pub struct Shell {
    page: SlottedPage<Vec<u8>>,
}

impl Shell {
    pub fn new(page_id: PageId) -> Result<Self, PageError> {
        Ok(Self {
            page: SlottedPage::init(vec![0u8; PAGE_SIZE], page_id)?,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, PageError> {
        Ok(Self {
            page: load_page(path)?,
        })
    }

    pub fn page(&self) -> &SlottedPage<Vec<u8>> {
        &self.page
    }

    pub fn execute_line(&mut self, line: &str) -> Result<Outcome, CommandError> {
        let command = Command::parse(line)?;
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome, CommandError> {
        let output = match command {
            Command::Empty => String::new(),
            Command::Exit => return Ok(Outcome::Exit),
            Command::Help => HELP_TEXT.to_string(),
            Command::Clear => "\x1B[2J\x1B[1;1H".to_string(),
            Command::Init(page_id) => {
                self.page.reinit(page_id);
                format!("Page {} initialized", page_id)
            }
            Command::Insert(text) => {
                let rid = self.page.insert(text.as_bytes())?;
                format!("Inserted {}", rid)
            }
            Command::Delete(slot_no) => {
                let rid = self.rid(slot_no);
                self.page.delete(rid)?;
                format!("Deleted {}", rid)
            }
            Command::Get(slot_no) => {
                let mut buffer = vec![0u8; PAGE_DATA_SIZE];
                let length = self.page.get(self.rid(slot_no), &mut buffer)?;
                format!(
                    "{} bytes: {}",
                    length,
                    String::from_utf8_lossy(&buffer[..length])
                )
            }
            Command::Scan => self.render_scan(),
            Command::Slots => self.render_slots(),
            Command::Stats => self.render_stats(),
            Command::Link(direction, target) => {
                match direction {
                    LinkDirection::Next => self.page.set_next_page(target),
                    LinkDirection::Prev => self.page.set_prev_page(target),
                }
                format!("{:?} page set to {}", direction, render_link(target))
            }
            Command::Save(path) => {
                save_page(&self.page, &path)?;
                format!("Saved page {} to {}", self.page.page_id(), path.display())
            }
            Command::Load(path) => {
                self.page = load_page(&path)?;
                format!("Loaded page {} from {}", self.page.page_id(), path.display())
            }
            Command::SelfTest => {
                let mut driver = HeapPageDriver::new(self.page.page_id());
                driver.run_tests().to_string()
            }
        };
        Ok(Outcome::Continue(output))
    }

    fn rid(&self, slot_no: u16) -> RecordId {
        RecordId::new(self.page.page_id(), slot_no)
    }

    fn render_scan(&self) -> String {
        let mut out = String::new();
        for (rid, data) in self.page.records() {
            let offset = self
                .page
                .slot(rid.slot_no)
                .and_then(|slot| slot.range())
                .map_or(0, |range| range.start);
            let _ = writeln!(
                out,
                "{} @{} len {}: {}",
                rid,
                offset,
                data.len(),
                String::from_utf8_lossy(data)
            );
        }
        let _ = write!(out, "{} record(s)", self.page.record_count());
        out
    }

    fn render_slots(&self) -> String {
        let mut out = String::new();
        for slot_no in 1..=self.page.slot_count() {
            match self.page.slot(slot_no) {
                Some(Slot::Occupied { offset, length }) => {
                    let _ = writeln!(out, "slot {:>4}: offset {:>4} length {:>4}", slot_no, offset, length);
                }
                _ => {
                    let _ = writeln!(out, "slot {:>4}: empty", slot_no);
                }
            }
        }
        let _ = write!(out, "{} slot(s)", self.page.slot_count());
        out
    }

    fn render_stats(&self) -> String {
        let header = self.page.header();
        format!(
            "page_id: {}\nnext_page: {}\nprev_page: {}\nslot_count: {}\n\
             data_write_cursor: {}\nfree_bytes: {}\navailable_space: {}\nrecord_count: {}",
            header.page_id,
            render_link(header.next_page),
            render_link(header.prev_page),
            header.slot_count,
            header.data_write_cursor,
            header.free_bytes,
            self.page.available_space(),
            self.page.record_count(),
        )
    }
}

fn render_link(page_id: Option<PageId>) -> String {
    page_id.map_or_else(|| "none".to_string(), |id| id.to_string())
}

/// Write the page image through a temp file so a crash never leaves half a page.
fn save_page(page: &SlottedPage<Vec<u8>>, path: &Path) -> Result<(), PageError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(page.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|err| err.error)?;
    debug!(page_id = page.page_id(), path = %path.display(), "saved page image");
    Ok(())
}

fn load_page(path: &Path) -> Result<SlottedPage<Vec<u8>>, PageError> {
    let bytes = fs::read(path)?;
    let page = SlottedPage::open(bytes)?;
    debug!(page_id = page.page_id(), path = %path.display(), "loaded page image");
    Ok(page)
}

fn read_multiline_command(rl: &mut DefaultEditor) -> rustyline::Result<String> {
    let mut input = String::new();
    let mut prompt = PROMPT;

    loop {
        let line = rl.readline(prompt)?;
        let trimmed_line = line.trim_end();

        // Check if line ends with backslash (multiline continuation)
        if let Some(without_backslash) = trimmed_line.strip_suffix('\\') {
            input.push_str(without_backslash);
            input.push(' ');
            prompt = CONTINUATION_PROMPT;
        } else {
            input.push_str(trimmed_line);
            break;
        }
    }

    Ok(input)
}

/// Run the interactive loop until `exit` or end of input.
pub fn run(config: &ShellConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut shell = match &config.page_file {
        Some(path) => Shell::from_file(path)?,
        None => Shell::new(config.page_id)?,
    };
    info!(page_id = shell.page().page_id(), "shell started");

    let mut rl = DefaultEditor::new()?;
    if !config.no_history {
        // A missing history file just means a first run.
        let _ = rl.load_history(&config.history);
    }

    loop {
        match read_multiline_command(&mut rl) {
            Ok(input) => {
                let command = input.trim().to_string();
                if !command.is_empty() {
                    rl.add_history_entry(&command)?;
                }
                match shell.execute_line(&command) {
                    Ok(Outcome::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Ok(Outcome::Continue(output)) => {
                        if !output.is_empty() {
                            println!("{}", output);
                        }
                    }
                    Err(err) => println!("Error: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Interrupted");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("EOF");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    if !config.no_history {
        rl.save_history(&config.history)?;
    }
    Ok(())
}
