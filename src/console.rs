//! Line-oriented front end: holds the current location, routes it and
//! forwards commands to the vendor screens.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use crate::error::{Error, Result};
use crate::models::{LogoFile, VendorDraft};
use crate::services::VendorApi;
use crate::storage::SessionStore;
use crate::views::{Confirm, FormModal, ListView, Notifier, Route, Router};

pub const HELP: &str = "\
Commands:
  login <token>              store the admin token and open /admin
  logout                     forget the token
  goto <path>                navigate, e.g. goto /admin/vendors
  show                       re-render the current screen
  reload                     fetch the vendor list again
  delete <id>                delete a vendor (asks first)
  new                        open the Add Vendor form
  name|details|website <v>   set a form field
  question add               add an empty question
  question edit <n> <text>   set question n (1-based)
  question remove <n>        remove question n
  logo <path>                attach a logo file
  submit                     send the form
  cancel                     close the form and discard it
  help                       this text
  quit                       exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Details,
    Website,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(String),
    Logout,
    Goto(String),
    Show,
    Reload,
    Delete(String),
    New,
    Set(Field, String),
    QuestionAdd,
    QuestionEdit(usize, String),
    QuestionRemove(usize),
    Logo(PathBuf),
    Submit,
    Cancel,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "login" => Command::Login(non_empty(rest, "login <token>")?),
            "logout" => Command::Logout,
            "goto" | "go" => Command::Goto(non_empty(rest, "goto <path>")?),
            "show" => Command::Show,
            "reload" => Command::Reload,
            "delete" | "rm" => Command::Delete(non_empty(rest, "delete <id>")?),
            "new" | "add" => Command::New,
            "name" => Command::Set(Field::Name, rest.to_string()),
            "details" => Command::Set(Field::Details, rest.to_string()),
            "website" => Command::Set(Field::Website, rest.to_string()),
            "question" | "q" => parse_question(rest)?,
            "logo" => Command::Logo(PathBuf::from(non_empty(rest, "logo <path>")?)),
            "submit" => Command::Submit,
            "cancel" => Command::Cancel,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn non_empty(rest: &str, usage: &'static str) -> std::result::Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(rest.to_string())
    }
}

fn parse_question(rest: &str) -> std::result::Result<Command, CommandError> {
    const USAGE: &str = "question add | question edit <n> <text> | question remove <n>";
    let mut parts = rest.splitn(3, char::is_whitespace);
    let action = parts.next().unwrap_or_default();
    let position = parts
        .next()
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .map(|n| n - 1);

    match (action, position) {
        ("add", _) => Ok(Command::QuestionAdd),
        ("edit", Some(index)) => Ok(Command::QuestionEdit(
            index,
            parts.next().unwrap_or_default().trim().to_string(),
        )),
        ("remove", Some(index)) => Ok(Command::QuestionRemove(index)),
        _ => Err(CommandError::Usage(USAGE)),
    }
}

/// Source of user input lines.
#[async_trait]
pub trait LineSource: Send {
    async fn next_line(&mut self) -> Result<Option<String>>;
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> LineSource for Lines<R> {
    async fn next_line(&mut self) -> Result<Option<String>> {
        Ok(Lines::next_line(self).await?)
    }
}

/// Confirmation read from the same input the console reads commands from.
pub struct PromptConfirm<S> {
    input: Arc<Mutex<S>>,
}

impl<S> PromptConfirm<S> {
    pub fn new(input: Arc<Mutex<S>>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl<S: LineSource + 'static> Confirm for PromptConfirm<S> {
    async fn confirm(&self, message: &str) -> bool {
        print!("{} [y/N] ", message);
        let _ = std::io::stdout().flush();

        match self.input.lock().await.next_line().await {
            Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Ok(None) => false,
            Err(e) => {
                error!(error = %e, "Failed to read confirmation");
                false
            }
        }
    }
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        println!("[ok] {}", message);
    }

    fn error(&self, message: &str) {
        println!("[error] {}", message);
    }
}

pub enum Step {
    Continue(String),
    Quit,
}

pub struct Console {
    router: Router,
    session: Arc<dyn SessionStore>,
    list: ListView,
    form: FormModal,
    route: Route,
}

impl Console {
    pub fn new(
        api: Arc<dyn VendorApi>,
        session: Arc<dyn SessionStore>,
        confirm: Arc<dyn Confirm>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let list = ListView::new(api.clone(), confirm);
        let form = FormModal::new(api, session.clone(), notifier, list.clone());
        Self {
            router: Router::new(session.clone()),
            session,
            list,
            form,
            route: Route::Login,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub async fn navigate(&mut self, path: &str) -> String {
        let next = self.router.navigate(path);
        if self.route == Route::Vendors && next != Route::Vendors {
            self.form.cancel().await;
            self.list.unmount().await;
        }
        let entering = next == Route::Vendors && self.route != Route::Vendors;
        self.route = next;
        if entering {
            self.list.mount().await;
        }
        info!(route = %next, "Showing screen");
        self.render().await
    }

    pub async fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} ({})", self.route.title(), self.route.path());

        match self.route {
            Route::Login => {
                let _ = writeln!(out, "Sign in with: login <token>");
            }
            Route::Dashboard => {
                for route in [Route::Vendors, Route::Orders, Route::CreditStatus] {
                    let _ = writeln!(out, "  {:<16} goto {}", route.title(), route.path());
                }
            }
            Route::Vendors => {
                out.push_str(&self.list.render().await);
                if let Some(draft) = self.form.draft().await {
                    out.push_str(&render_draft(&draft));
                }
            }
            Route::Orders | Route::CreditStatus => {
                let _ = writeln!(out, "Not available in this console.");
            }
        }
        out
    }

    /// Parses and runs one input line.
    pub async fn handle(&mut self, line: &str) -> Step {
        match Command::parse(line) {
            Ok(Some(Command::Quit)) => Step::Quit,
            Ok(Some(command)) => {
                debug!(?command, "Running command");
                match self.execute(command).await {
                    Ok(out) => Step::Continue(out),
                    Err(e) => Step::Continue(format!("{}\n", e)),
                }
            }
            Ok(None) => Step::Continue(String::new()),
            Err(e) => Step::Continue(format!("{}\n", e)),
        }
    }

    async fn execute(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Login(token) => {
                self.session.set_token(&token).await?;
                Ok(self.navigate("/admin").await)
            }
            Command::Logout => {
                self.session.clear().await?;
                let path = self.route.path();
                Ok(self.navigate(path).await)
            }
            Command::Goto(path) => Ok(self.navigate(&path).await),
            Command::Show => Ok(self.render().await),
            Command::Help => Ok(format!("{}\n", HELP)),
            Command::Quit => Ok(String::new()),
            command => {
                if self.route != Route::Vendors {
                    return Ok("Open the vendor screen first: goto /admin/vendors\n".to_string());
                }
                self.execute_vendor(command).await?;
                Ok(self.render().await)
            }
        }
    }

    async fn execute_vendor(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Reload => self.list.load().await,
            Command::Delete(id) => {
                self.list.remove(&id).await;
            }
            Command::New => self.form.open().await,
            Command::Set(field, value) => {
                self.form
                    .update(|d| match field {
                        Field::Name => d.name = value,
                        Field::Details => d.details = value,
                        Field::Website => d.website = value,
                    })
                    .await?
            }
            Command::QuestionAdd => self.form.add_question().await?,
            Command::QuestionEdit(index, text) => {
                self.form.edit_question(index, text).await?;
            }
            Command::QuestionRemove(index) => {
                self.form.remove_question(index).await?;
            }
            Command::Logo(path) => {
                if !self.form.is_open().await {
                    return Err(Error::NoOpenForm);
                }
                let logo = LogoFile::from_path(&path).await?;
                self.form.set_logo(logo).await?;
            }
            Command::Submit => match self.form.submit().await {
                Err(e @ (Error::SubmissionInFlight | Error::NoOpenForm)) => return Err(e),
                // Anything else was already notified and logged by the form.
                Ok(_) | Err(_) => {}
            },
            Command::Cancel => self.form.cancel().await,
            _ => {}
        }
        Ok(())
    }

    /// Reads commands from `input` until it ends or the user quits.
    pub async fn run<S: LineSource>(&mut self, input: &Mutex<S>) -> Result<()> {
        println!("{}", self.navigate(self.route.path()).await);

        loop {
            print!("{}> ", self.route.path());
            let _ = std::io::stdout().flush();

            let line = input.lock().await.next_line().await?;
            let Some(line) = line else {
                break;
            };

            match self.handle(&line).await {
                Step::Continue(out) => print!("{}", out),
                Step::Quit => break,
            }
        }

        self.list.unmount().await;
        info!("Console closed");
        Ok(())
    }
}

fn render_draft(draft: &VendorDraft) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-- Add Vendor --");
    let _ = writeln!(out, "  name:     {}", draft.name);
    let _ = writeln!(out, "  details:  {}", draft.details);
    let _ = writeln!(out, "  website:  {}", draft.website);
    for (index, question) in draft.questions().iter().enumerate() {
        let _ = writeln!(out, "  question {}: {}", index + 1, question);
    }
    let logo = draft
        .logo
        .as_ref()
        .map(|l| format!("{} ({}, {} bytes)", l.file_name, l.content_type, l.bytes.len()))
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "  logo:     {}", logo);
    out
}
