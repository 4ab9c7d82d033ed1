pub mod render;

use std::io::{BufRead, Write};

use anyhow::Result;

use crate::error::Error;
use crate::store::repo::{SessionStore, SessionToken};
use crate::webmail::{Webmail, logout};

const HELP: &str = "\
commands:
  inbox [PAGE]   list a page of the inbox (newest first)
  next, prev     move between pages
  show ID        read a message
  logout, quit   forget the password and exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    LoggedOut,
    /// The server refused us mid-session; the credentials were discarded.
    Expired,
    EndOfInput,
}

enum Command {
    Inbox(Option<usize>),
    Next,
    Prev,
    Show(String),
    Logout,
    Help,
    Empty,
}

fn parse_command(line: &str) -> Command {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Command::Empty;
    };
    let arg = words.next();
    match cmd.to_ascii_lowercase().as_str() {
        "inbox" | "ls" => match arg.map(str::parse) {
            None => Command::Inbox(None),
            Some(Ok(page)) => Command::Inbox(Some(page)),
            Some(Err(_)) => Command::Help,
        },
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "show" | "read" => match arg {
            Some(id) => Command::Show(id.to_string()),
            None => Command::Help,
        },
        "logout" | "quit" | "exit" | "q" => Command::Logout,
        _ => Command::Help,
    }
}

/// Line-oriented inbox browser over an already opened session.
pub struct Shell<'a> {
    webmail: &'a Webmail,
    store: &'a dyn SessionStore,
    token: SessionToken,
    page: usize,
    json: bool,
    width: usize,
}

impl<'a> Shell<'a> {
    pub fn new(webmail: &'a Webmail, store: &'a dyn SessionStore, token: SessionToken) -> Self {
        Self {
            webmail,
            store,
            token,
            page: 1,
            json: false,
            width: 80,
        }
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn run<R: BufRead, W: Write>(mut self, input: R, out: &mut W) -> Result<Outcome> {
        if !self.list(out)? {
            return Ok(Outcome::Expired);
        }
        let mut lines = input.lines();
        loop {
            if !self.json {
                write!(out, "> ")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                logout(self.store, &self.token);
                return Ok(Outcome::EndOfInput);
            };
            let alive = match parse_command(&line?) {
                Command::Inbox(page) => {
                    self.page = page.unwrap_or(self.page).max(1);
                    self.list(out)?
                }
                Command::Next => {
                    self.page += 1;
                    self.list(out)?
                }
                Command::Prev => {
                    self.page = self.page.saturating_sub(1).max(1);
                    self.list(out)?
                }
                Command::Show(id) => self.show(out, &id)?,
                Command::Logout => {
                    logout(self.store, &self.token);
                    writeln!(out, "logged out")?;
                    return Ok(Outcome::LoggedOut);
                }
                Command::Help => {
                    writeln!(out, "{HELP}")?;
                    true
                }
                Command::Empty => true,
            };
            if !alive {
                return Ok(Outcome::Expired);
            }
        }
    }

    /// Returns `false` once the session has been dropped.
    fn list<W: Write>(&mut self, out: &mut W) -> Result<bool> {
        match self
            .webmail
            .list_inbox_for(self.store, &self.token, self.page)
        {
            Ok((items, window)) => {
                if self.json {
                    render::write_listing_json(out, &items, &window)?;
                } else {
                    render::write_listing(out, &items, &window)?;
                }
                Ok(true)
            }
            Err(e) => report(out, e),
        }
    }

    fn show<W: Write>(&mut self, out: &mut W, id: &str) -> Result<bool> {
        match self.webmail.get_message_for(self.store, &self.token, id) {
            Ok(msg) => {
                if self.json {
                    render::write_message_json(out, &msg)?;
                } else {
                    render::write_message(out, &msg, self.width)?;
                }
                Ok(true)
            }
            Err(e) => report(out, e),
        }
    }
}

fn report<W: Write>(out: &mut W, err: Error) -> Result<bool> {
    match err {
        Error::Access => {
            writeln!(out, "session expired, please log in again")?;
            Ok(false)
        }
        other => {
            writeln!(out, "{other}")?;
            Ok(true)
        }
    }
}
