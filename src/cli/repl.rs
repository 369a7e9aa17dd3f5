//! Interactive SQL playground.
//!
//! Lines ending in `\` continue onto the next line. Dot-commands manage
//! history and saved queries; anything else is run through the playground.

use colored::Colorize;
use querylab_core::{KeyValueStore, Playground, PlaygroundError};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow;
use std::path::PathBuf;

use super::render;

const KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "GROUP BY", "HAVING", "ORDER BY", "LIMIT", "OFFSET", "DISTINCT",
    "INSERT INTO", "VALUES", "UPDATE", "SET", "DELETE FROM", "CREATE TABLE", "DROP TABLE",
    "ALTER TABLE", "JOIN", "LEFT JOIN", "INNER JOIN", "ON", "AS", "AND", "OR", "NOT", "NULL",
    "COUNT", "AVG", "SUM", "MIN", "MAX", "ROW_NUMBER", "RANK", "OVER", "PARTITION BY",
    "WITH RECURSIVE", "EXPLAIN",
];

const TABLES: &[&str] = &["students", "courses", "enrollments", "employees", "sales"];

const DOT_COMMANDS: &[&str] = &[
    ".help", ".exit", ".clear", ".history", ".saved", ".save", ".load", ".plan",
];

/// Completion, hints and hint colouring for the line editor
struct SqlHelper {
    completions: Vec<String>,
}

impl SqlHelper {
    fn new() -> Self {
        let completions = KEYWORDS
            .iter()
            .chain(TABLES)
            .chain(DOT_COMMANDS)
            .map(|s| s.to_string())
            .collect();
        Self { completions }
    }

    fn candidates<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        let upper = word.to_ascii_uppercase();
        self.completions.iter().filter(move |c| {
            c.starts_with(word) || (c.chars().all(|ch| !ch.is_lowercase()) && c.starts_with(&upper))
        })
    }
}

fn word_start(line: &str) -> usize {
    line.rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
        .map(|i| i + 1)
        .unwrap_or(0)
}

impl Completer for SqlHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let start = word_start(&line[..pos]);
        let word = &line[start..pos];

        let matches: Vec<Pair> = self
            .candidates(word)
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for SqlHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }

        let word = &line[word_start(line)..];
        if word.is_empty() {
            return None;
        }

        self.candidates(word)
            .find(|c| c.len() > word.len())
            .map(|c| c[word.len()..].to_string())
    }
}

impl Highlighter for SqlHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.truecolor(100, 100, 100).to_string())
    }
}

impl Validator for SqlHelper {}

impl Helper for SqlHelper {}

/// What the loop should do after a dot-command
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

fn print_banner() {
    println!(
        "  {} {}",
        "querylab SQL playground".white().bold(),
        env!("CARGO_PKG_VERSION").dimmed()
    );
    println!(
        "  Type {} for help, {} to quit\n",
        ".help".yellow(),
        ".exit".yellow()
    );
}

fn print_help() {
    println!("\n{}", "Commands:".white().bold());
    println!("  {}              Show this help", ".help".yellow());
    println!("  {}              Exit the playground", ".exit".yellow());
    println!("  {}             Clear the screen", ".clear".yellow());
    println!("  {}           Show recent executions", ".history".yellow());
    println!("  {}             List saved queries", ".saved".yellow());
    println!("  {} <name> [query] Save a query (default: last run)", ".save".yellow());
    println!("  {} <name>         Run a saved query", ".load".yellow());
    println!("  {} [query]        Show the execution plan", ".plan".yellow());

    println!("\n{}", "Try:".white().bold());
    println!("  {}", "SELECT * FROM students;".green());
    println!("  {}", "SELECT course, COUNT(*) FROM students GROUP BY course;".green());
    println!(
        "  {}",
        "SELECT name, RANK() OVER (ORDER BY revenue DESC) FROM sales;".green()
    );
    println!();
}

fn history_file() -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(".querylab_history"))
        .unwrap_or_else(|_| PathBuf::from(".querylab_history"))
}

/// Run a query and print its outcome
pub fn run_and_print<S: KeyValueStore>(playground: &mut Playground<S>, query: &str) {
    match playground.run(query) {
        Ok(execution) => render::print_execution(&execution),
        Err(PlaygroundError::Rejected(validation)) => render::print_validation(&validation),
        Err(e) => println!("{} {}", "Error:".red().bold(), e),
    }
}

fn dot_command<S: KeyValueStore>(playground: &mut Playground<S>, input: &str) -> Flow {
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (input, ""),
    };

    match command {
        ".exit" | ".quit" | ".q" => return Flow::Exit,
        ".help" | ".h" | ".?" => print_help(),
        ".clear" => {
            print!("\x1B[2J\x1B[1;1H");
            print_banner();
        }
        ".history" => {
            if playground.history().is_empty() {
                println!("  {}", "No executions yet".dimmed());
            }
            for (i, entry) in playground.history().iter().enumerate() {
                println!(
                    "  {} {} {}",
                    format!("{:>2}.", i + 1).dimmed(),
                    entry.query.white(),
                    format!(
                        "({} rows, {})",
                        entry.results.len(),
                        entry.timestamp.format("%H:%M:%S")
                    )
                    .dimmed()
                );
            }
        }
        ".saved" => {
            if playground.saved_queries().is_empty() {
                println!("  {}", "No saved queries".dimmed());
            }
            for saved in playground.saved_queries() {
                println!("  {} {}", saved.name.cyan(), saved.query);
            }
        }
        ".save" => {
            let (name, query) = match rest.split_once(char::is_whitespace) {
                Some((n, q)) => (n, Some(q.trim().to_string())),
                None => (rest, None),
            };
            let query = query
                .filter(|q| !q.is_empty())
                .or_else(|| playground.history().latest().map(|e| e.query.clone()));
            match query {
                None => println!(
                    "  {}",
                    "Usage: .save <name> [query] (nothing run yet to save)".yellow()
                ),
                Some(query) => match playground.save(name, &query) {
                    Ok(()) => println!("  {} Saved {}", "✓".green(), name.trim().cyan()),
                    Err(e) => println!("  {} {}", "Error:".red().bold(), e),
                },
            }
        }
        ".load" => {
            if rest.is_empty() {
                println!("  {}", "Usage: .load <name>".yellow());
            } else {
                match playground.find_saved(rest).map(|s| s.query.clone()) {
                    Some(query) => {
                        println!("  {}", query.dimmed());
                        run_and_print(playground, &query);
                    }
                    None => println!("  {} {}", "No saved query named".red(), rest),
                }
            }
        }
        ".plan" => {
            let query = if rest.is_empty() {
                playground.history().latest().map(|e| e.query.clone())
            } else {
                Some(rest.to_string())
            };
            match query {
                Some(query) => render::print_plan(&playground.execution_plan(&query)),
                None => println!("  {}", "Usage: .plan [query] (nothing run yet)".yellow()),
            }
        }
        _ => {
            println!("  {} {}", "Unknown command:".red(), command);
            println!("  Type {} for help", ".help".yellow());
        }
    }
    Flow::Continue
}

/// Read-eval-print loop over `playground` until `.exit` or end of input
pub fn run<S: KeyValueStore>(playground: &mut Playground<S>) -> anyhow::Result<()> {
    print_banner();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(SqlHelper::new()));

    let history_path = history_file();
    let _ = rl.load_history(&history_path);

    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() {
            format!("{}{} ", "sql".cyan(), ">".white())
        } else {
            format!("{} ", "...".dimmed())
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim_end();

                if let Some(head) = line.strip_suffix('\\') {
                    buffer.push_str(head);
                    buffer.push('\n');
                    continue;
                }

                buffer.push_str(line);
                let input = std::mem::take(&mut buffer);
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(input);

                if input.starts_with('.') {
                    if dot_command(playground, input) == Flow::Exit {
                        println!("{}", "Goodbye!".dimmed());
                        break;
                    }
                    continue;
                }

                run_and_print(playground, input);
            }
            Err(ReadlineError::Interrupted) => {
                if buffer.is_empty() {
                    println!("{}", "Type .exit to quit".dimmed());
                } else {
                    println!("{}", "Cancelled".dimmed());
                    buffer.clear();
                }
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".dimmed());
                break;
            }
            Err(err) => {
                tracing::error!("Line editor failed: {:?}", err);
                break;
            }
        }
    }

    if let Err(e) = rl.save_history(&history_path) {
        tracing::debug!("Could not save line history: {}", e);
    }
    Ok(())
}
