use std::{error::Error, io::Write};

use api_types::auth::{RegisterRequest, UserView};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "finance_admin")]
#[command(about = "Admin utilities for the finance backend (bootstrap and manage users)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./finance.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register a user; the password is prompted for.
    Create(UserCreateArgs),
    /// Print a user's profile.
    Show(UsernameArgs),
    /// Allow a user to log in again.
    Activate(UsernameArgs),
    /// Block a user from logging in.
    Deactivate(UsernameArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
}

#[derive(Args, Debug)]
struct UsernameArgs {
    #[arg(long)]
    username: String,
}

const MAX_PASSWORD_LEN: usize = 72;

/// Keeps the terminal in raw mode for the lifetime of a prompt.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn notice(message: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(message),
        Print("\r\n")
    )?;
    Ok(())
}

/// Read one line without echoing it; every typed character shows as `*`.
/// bcrypt only looks at the first 72 bytes, so longer input is refused.
fn read_masked(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);

        match code {
            KeyCode::Enter => break,
            KeyCode::Esc => {
                execute!(out, Print("\r\n"))?;
                return Err("aborted".into());
            }
            KeyCode::Char('c') if ctrl => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Backspace if secret.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char(ch) if !ctrl && secret.len() + ch.len_utf8() <= MAX_PASSWORD_LEN => {
                secret.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    execute!(out, Print("\r\n"))?;
    out.flush()?;
    Ok(secret)
}

fn prompt_new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    for _ in 0..3 {
        let first = read_masked("Password: ")?;
        if first.is_empty() {
            notice("Password must not be empty.")?;
            continue;
        }

        if read_masked("Confirm password: ")? == first {
            return Ok(first);
        }
        notice("Passwords do not match. Try again.")?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn print_user(user: &UserView) {
    println!(
        "{} ({} {}) id={} active={}",
        user.username, user.first_name, user.last_name, user.user_id, user.active_status
    );
}

/// Map the errors an operator can fix to a short message and exit code.
fn exit_on_user_error(err: EngineError) -> Box<dyn Error + Send + Sync> {
    match err {
        EngineError::ExistingKey(msg) | EngineError::KeyNotFound(msg) => {
            eprintln!("{msg}");
            std::process::exit(1);
        }
        EngineError::InvalidValue(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        other => other.into(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    let Command::User(User { command }) = cli.command;
    match command {
        UserCommand::Create(args) => {
            let password = prompt_new_password()?;
            let user = engine
                .register_user(RegisterRequest {
                    username: args.username,
                    password,
                    first_name: args.first_name,
                    last_name: args.last_name,
                })
                .await
                .map_err(exit_on_user_error)?;
            println!("created user: {}", user.username);
        }
        UserCommand::Show(args) => {
            let user = engine
                .user(&args.username)
                .await
                .map_err(exit_on_user_error)?;
            print_user(&user);
        }
        UserCommand::Activate(args) => {
            let user = engine
                .set_user_active(&args.username, true)
                .await
                .map_err(exit_on_user_error)?;
            print_user(&user);
        }
        UserCommand::Deactivate(args) => {
            let user = engine
                .set_user_active(&args.username, false)
                .await
                .map_err(exit_on_user_error)?;
            print_user(&user);
        }
    }

    Ok(())
}
