//! Terminal output for results, warnings and progress.

use colored::Colorize;
use querylab_core::{QueryExecution, ResultSet, Scalar, ValidationResult};

use crate::progress::ProgressSummary;

fn cell_text(value: &Scalar) -> String {
    match value {
        Scalar::Float(f) => format!("{:.2}", f),
        other => other.to_string(),
    }
}

/// Column-aligned table with a header rule. Numbers are right-aligned.
///
/// Widths are measured before colouring so escape codes do not skew them.
pub fn format_table(results: &ResultSet) -> String {
    if results.columns().is_empty() {
        return String::new();
    }

    let cells: Vec<Vec<String>> = results
        .rows()
        .map(|row| row.values().iter().map(cell_text).collect())
        .collect();

    let widths: Vec<usize> = results
        .columns()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = results
        .columns()
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("{:<w$}", name, w = *w).cyan().bold().to_string())
        .collect();
    out.push_str(&header.join(" | "));
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-").dimmed().to_string());
    out.push('\n');

    for (row, texts) in results.rows().zip(&cells) {
        let line: Vec<String> = row
            .values()
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((value, text), w)| match value {
                Scalar::Null => format!("{:<w$}", text, w = *w).dimmed().to_string(),
                v if v.is_numeric() => format!("{:>w$}", text, w = *w).yellow().to_string(),
                _ => format!("{:<w$}", text, w = *w),
            })
            .collect();
        out.push_str(&line.join(" | "));
        out.push('\n');
    }
    out
}

pub fn print_execution(execution: &QueryExecution) {
    for warning in &execution.warnings {
        println!("{} {}", "Warning:".yellow().bold(), warning);
    }
    print!("{}", format_table(&execution.results));
    println!(
        "{}",
        format!(
            "  ({} row{}, {:.2}ms)",
            execution.results.len(),
            if execution.results.len() == 1 { "" } else { "s" },
            execution.execution_time_ms
        )
        .dimmed()
    );
}

pub fn print_validation(validation: &ValidationResult) {
    for error in validation.errors() {
        println!("{} {}", "Error:".red().bold(), error);
    }
    for warning in validation.warnings() {
        println!("{} {}", "Warning:".yellow().bold(), warning);
    }
}

pub fn print_plan(plan: &str) {
    println!("{}", "QUERY PLAN".white().bold());
    for line in plan.lines() {
        println!("  {}", line.dimmed());
    }
}

fn progress_bar(percent: f64, width: usize) -> String {
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

pub fn print_progress(summary: &ProgressSummary) {
    println!(
        "{} {} {}/{} lessons ({:.0}%)",
        "Progress:".white().bold(),
        progress_bar(summary.percent, 20).green(),
        summary.completed,
        summary.total,
        summary.percent
    );
    println!("{} {}", "Score:".white().bold(), summary.total_score);
    if summary.badges.is_empty() {
        println!("{} {}", "Badges:".white().bold(), "none yet".dimmed());
    } else {
        println!(
            "{} {}",
            "Badges:".white().bold(),
            summary.badges.join(", ").cyan()
        );
    }
}
