//! Command-line front end.
//!
//! With no command the interactive playground starts. Every command works on
//! the storage file named by the configuration in `--config-dir`.

pub mod render;
pub mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use querylab_core::{Playground, PlaygroundError};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::lessons::published_lessons;
use crate::progress::ProgressTracker;
use crate::rowstore::{HttpRowStore, RowStore};
use crate::session::SessionFlags;
use crate::storage::FileStore;

#[derive(Parser, Debug)]
#[command(name = "querylab")]
#[command(version, about = "Interactive SQL learning playground", long_about = None)]
pub struct CliArgs {
    /// Directory holding querylab.toml and .env
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the interactive playground (default)
    Repl,

    /// Run one query and print its results
    Run {
        query: String,

        /// Print the execution as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the execution plan for a query
    Explain { query: String },

    /// Save a query under a name
    Save { name: String, query: String },

    /// List saved queries
    Saved,

    /// Show lesson progress, score and badges
    Progress {
        /// Number of lessons in the catalog (fetched from the row-store if omitted)
        #[arg(long)]
        total: Option<usize>,
    },

    /// Mark a lesson as completed
    Complete {
        lesson_id: String,

        /// Points earned for the lesson
        #[arg(long, default_value_t = 0)]
        score: u32,
    },

    /// List published lessons from the row-store
    Lessons,

    /// Sign in to the row-store
    Login {
        email: String,

        /// Password (will prompt if not provided)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the signed-in user
    Logout,

    /// Show the signed-in user
    Whoami,
}

/// Everything a command needs from the config directory
struct Workspace {
    config: Config,
    storage_path: PathBuf,
}

impl Workspace {
    fn load(dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(dir)?;
        let storage_path = config.storage_path(dir);
        tracing::debug!(storage = %storage_path.display(), "Loaded configuration");
        Ok(Self {
            config,
            storage_path,
        })
    }

    fn store(&self) -> FileStore {
        FileStore::open(&self.storage_path)
    }

    fn playground(&self) -> Playground<FileStore> {
        Playground::new(self.store()).with_history_capacity(self.config.playground.history_capacity)
    }

    fn rowstore(&self) -> anyhow::Result<HttpRowStore> {
        let settings = self.config.require_rowstore()?;
        Ok(HttpRowStore::new(&settings))
    }
}

/// Execute a parsed command line
pub fn execute(args: CliArgs) -> anyhow::Result<()> {
    let workspace = Workspace::load(&args.config_dir)?;
    match args.command.unwrap_or(Command::Repl) {
        Command::Repl => repl::run(&mut workspace.playground()),
        Command::Run { query, json } => cmd_run(&workspace, &query, json),
        Command::Explain { query } => cmd_explain(&workspace, &query),
        Command::Save { name, query } => cmd_save(&workspace, &name, &query),
        Command::Saved => cmd_saved(&workspace),
        Command::Progress { total } => cmd_progress(&workspace, total),
        Command::Complete { lesson_id, score } => cmd_complete(&workspace, &lesson_id, score),
        Command::Lessons => cmd_lessons(&workspace),
        Command::Login { email, password } => cmd_login(&workspace, &email, password),
        Command::Logout => cmd_logout(&workspace),
        Command::Whoami => cmd_whoami(&workspace),
    }
}

fn cmd_run(workspace: &Workspace, query: &str, json: bool) -> anyhow::Result<()> {
    let mut playground = workspace.playground();
    match playground.run(query) {
        Ok(execution) if json => println!("{}", serde_json::to_string_pretty(&execution)?),
        Ok(execution) => render::print_execution(&execution),
        Err(PlaygroundError::Rejected(validation)) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&validation)?);
            } else {
                render::print_validation(&validation);
            }
            anyhow::bail!("query rejected");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn cmd_explain(workspace: &Workspace, query: &str) -> anyhow::Result<()> {
    let playground = workspace.playground();
    let validation = playground.validate(query);
    render::print_validation(&validation);
    render::print_plan(&playground.execution_plan(query));
    Ok(())
}

fn cmd_save(workspace: &Workspace, name: &str, query: &str) -> anyhow::Result<()> {
    let mut playground = workspace.playground();
    let validation = playground.validate(query);
    render::print_validation(&validation);
    playground.save(name, query)?;
    println!("{} Saved {}", "✓".green(), name.trim().cyan());
    Ok(())
}

fn cmd_saved(workspace: &Workspace) -> anyhow::Result<()> {
    let playground = workspace.playground();
    let saved = playground.saved_queries();
    if saved.is_empty() {
        println!("No saved queries.");
        return Ok(());
    }
    println!("Saved queries ({}):", saved.len());
    println!();
    for query in saved {
        println!("  {} {}", query.name.cyan(), query.query);
    }
    Ok(())
}

fn cmd_progress(workspace: &Workspace, total: Option<usize>) -> anyhow::Result<()> {
    let tracker = ProgressTracker::new(workspace.store());
    let total = match total {
        Some(total) => total,
        None => catalog_size(workspace).unwrap_or_else(|e| {
            println!(
                "{} Could not count lessons ({}); pass --total",
                "!".yellow(),
                e
            );
            tracker.completed_lessons().len()
        }),
    };
    render::print_progress(&tracker.summary(total));
    Ok(())
}

fn catalog_size(workspace: &Workspace) -> anyhow::Result<usize> {
    let store = workspace.rowstore()?;
    Ok(published_lessons(&store)?.len())
}

fn cmd_complete(workspace: &Workspace, lesson_id: &str, score: u32) -> anyhow::Result<()> {
    let mut tracker = ProgressTracker::new(workspace.store());
    if tracker.is_completed(lesson_id) {
        println!("Lesson {} was already completed.", lesson_id.cyan());
        return Ok(());
    }
    let awarded = tracker.complete_lesson(lesson_id, score);
    println!(
        "{} Completed lesson {} (+{} points)",
        "✓".green(),
        lesson_id.cyan(),
        score
    );
    for badge in awarded {
        println!("  {} New badge: {}", "★".yellow(), badge.yellow().bold());
    }
    Ok(())
}

fn cmd_lessons(workspace: &Workspace) -> anyhow::Result<()> {
    let store = workspace.rowstore()?;
    let lessons = published_lessons(&store)?;
    let tracker = ProgressTracker::new(workspace.store());

    if lessons.is_empty() {
        println!("No published lessons.");
        return Ok(());
    }
    for lesson in lessons {
        let mark = if tracker.is_completed(&lesson.id.to_string()) {
            "✓".green()
        } else {
            "•".dimmed()
        };
        println!(
            "  {} {:>3} {} {}",
            mark,
            lesson.id,
            lesson.title.white(),
            lesson.difficulty.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}

fn cmd_login(workspace: &Workspace, email: &str, password: Option<String>) -> anyhow::Result<()> {
    let store = workspace.rowstore()?;

    let password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Password: ")?,
    };
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    println!("Signing in as {}...", email);
    let session = store.sign_in(email, &password)?;

    let mut flags = SessionFlags::new(workspace.store());
    flags.sign_in(&session.user_email);
    println!("{} Signed in as {}", "✓".green(), session.user_email.cyan());
    Ok(())
}

fn cmd_logout(workspace: &Workspace) -> anyhow::Result<()> {
    let mut flags = SessionFlags::new(workspace.store());
    if !flags.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    flags.sign_out();
    println!("{} Signed out", "✓".green());
    Ok(())
}

fn cmd_whoami(workspace: &Workspace) -> anyhow::Result<()> {
    let flags = SessionFlags::new(workspace.store());
    match flags.user_email() {
        Some(email) => println!("{}", email),
        None => println!("Not signed in."),
    }
    Ok(())
}
