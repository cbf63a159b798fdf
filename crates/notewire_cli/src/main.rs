//! Terminal front end for NoteWire.
//!
//! # Responsibility
//! - Map command names to core operations through an explicit dispatch
//!   table.
//! - Render core signals (notices, view routing) to the terminal.
//!
//! # Invariants
//! - All state changes go through `notewire_core::App`; this binary never
//!   touches the network or the credential store directly.

use notewire_core::db::open_db;
use notewire_core::{
    core_version, default_log_level, init_logging, App, AppResult, Config, Note, NoticeLevel,
    Presenter, SortOrder, SqliteSessionRepository, CONFIG_FILENAME,
};
use std::io::{self, BufRead, Write};

/// Renders core signals as terminal lines.
struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        let tag = match level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
            NoticeLevel::Info => "info",
        };
        println!("[{tag}] {message}");
    }

    fn show_login(&mut self) {
        println!("(signed out — `login <email> <password>` or `register`, `forgot <email>`)");
    }
}

type CliApp = App<SqliteSessionRepository, TerminalPresenter>;

struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
}

/// Dispatch table; `run_command` resolves each name to its handler.
const COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "login", usage: "login <email> <password>", summary: "sign in" },
    CommandSpec { name: "register", usage: "register <name> <email> <password> <confirm>", summary: "create an account" },
    CommandSpec { name: "logout", usage: "logout", summary: "sign out" },
    CommandSpec { name: "notes", usage: "notes [newest|oldest|title]", summary: "list notes" },
    CommandSpec { name: "refresh", usage: "refresh", summary: "reload notes from the server" },
    CommandSpec { name: "view", usage: "view <id>", summary: "show one note in full" },
    CommandSpec { name: "save", usage: "save <title> :: <content>", summary: "create a note, or update the edit target" },
    CommandSpec { name: "edit", usage: "edit <id>", summary: "select a note for update" },
    CommandSpec { name: "cancel", usage: "cancel", summary: "drop the edit target" },
    CommandSpec { name: "delete", usage: "delete <id>", summary: "delete a note" },
    CommandSpec { name: "forgot", usage: "forgot <email>", summary: "request a password-reset code" },
    CommandSpec { name: "code", usage: "code <6-digit code>", summary: "verify the reset code" },
    CommandSpec { name: "password", usage: "password <new> <confirm>", summary: "set the new password" },
    CommandSpec { name: "resend", usage: "resend", summary: "send the reset code again" },
    CommandSpec { name: "back", usage: "back", summary: "leave the reset flow" },
    CommandSpec { name: "help", usage: "help", summary: "show this list" },
    CommandSpec { name: "quit", usage: "quit", summary: "exit" },
];

fn usage_of(name: &str) -> &'static str {
    COMMANDS
        .iter()
        .find(|spec| spec.name == name)
        .map(|spec| spec.usage)
        .unwrap_or("")
}

fn report(result: AppResult<()>) {
    if let Err(err) = result {
        println!("[error] {err}");
    }
}

fn print_note_line(note: &Note) {
    let date = note
        .created_at
        .as_deref()
        .or(note.updated_at.as_deref())
        .unwrap_or("-");
    println!("  {}  {:<24}  ({} chars)  {}", note.id, note.title, note.content.chars().count(), date);
}

fn print_help() {
    println!("commands:");
    for spec in COMMANDS {
        println!("  {:<46} {}", spec.usage, spec.summary);
    }
}

async fn run_command(app: &mut CliApp, name: &str, rest: &str) -> bool {
    let args: Vec<&str> = rest.split_whitespace().collect();
    match name {
        "login" => match args.as_slice() {
            [email, password] => report(app.login(email, password).await),
            _ => println!("usage: {}", usage_of("login")),
        },
        "register" => match args.as_slice() {
            [user_name, email, password, confirm] => {
                report(app.register(user_name, email, password, confirm).await)
            }
            _ => println!("usage: {}", usage_of("register")),
        },
        "logout" => report(app.logout()),
        "notes" => {
            let order = args
                .first()
                .and_then(|value| SortOrder::parse(value))
                .unwrap_or_default();
            report(app.load_notes(false).await);
            let notes = app.sorted_notes(order);
            if notes.is_empty() {
                println!("(no notes yet)");
            } else {
                println!("{} note(s):", notes.len());
                for note in &notes {
                    print_note_line(note);
                }
            }
        }
        "refresh" => {
            report(app.load_notes(true).await);
            println!("{} note(s) cached", app.notes().len());
        }
        "view" => match args.as_slice() {
            [id] => match app.find_note(id) {
                Some(note) => {
                    println!("# {}", note.title);
                    println!("{}", note.content);
                }
                None => println!("[error] Note not found"),
            },
            _ => println!("usage: {}", usage_of("view")),
        },
        "save" => match rest.split_once("::") {
            Some((title, content)) => report(app.save_note(title, content).await),
            None => println!("usage: {}", usage_of("save")),
        },
        "edit" => match args.as_slice() {
            [id] => {
                if let Some(note) = app.edit_note(id) {
                    println!("editing `{}` — `save <title> :: <content>` to update", note.title);
                }
            }
            _ => println!("usage: {}", usage_of("edit")),
        },
        "cancel" => {
            app.cancel_edit();
            println!("edit target dropped");
        }
        "delete" => match args.as_slice() {
            [id] => report(app.delete_note(id).await),
            _ => println!("usage: {}", usage_of("delete")),
        },
        "forgot" => match args.as_slice() {
            [email] => report(app.reset_request_code(email).await),
            _ => println!("usage: {}", usage_of("forgot")),
        },
        "code" => match args.as_slice() {
            [code] => report(app.reset_verify_code(code).await),
            _ => println!("usage: {}", usage_of("code")),
        },
        "password" => match args.as_slice() {
            [new_password, confirm] => {
                report(app.reset_set_password(new_password, confirm).await)
            }
            _ => println!("usage: {}", usage_of("password")),
        },
        "resend" => report(app.reset_resend_code().await),
        "back" => app.reset_exit(),
        "help" => print_help(),
        "quit" | "exit" => return false,
        "" => {}
        other => println!("unknown command `{other}` — `help` lists commands"),
    }
    true
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config_path =
        std::env::var("NOTEWIRE_CONFIG").unwrap_or_else(|_| CONFIG_FILENAME.to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("notewire: {err}");
            std::process::exit(1);
        }
    };

    if let Some(dir) = config.logging.dir.as_deref() {
        let level = config
            .logging
            .level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        if let Err(err) = init_logging(&level, dir) {
            eprintln!("notewire: {err}");
        }
    }

    let conn = match open_db(&config.storage.path) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("notewire: failed to open credential store: {err}");
            std::process::exit(1);
        }
    };

    let mut app = match App::new(&config, SqliteSessionRepository::new(conn), TerminalPresenter) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("notewire: {err}");
            std::process::exit(1);
        }
    };

    println!("notewire {} — {}", core_version(), config.api.base_url);
    report(app.verify_session().await);
    if app.session().is_authenticated() {
        if let Some(user) = app.session().user() {
            println!("signed in as {} <{}>", user.name, user.email);
        }
        report(app.load_notes(true).await);
    }

    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        if !run_command(&mut app, name, rest).await {
            break;
        }
    }
}
