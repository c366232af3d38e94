// src/console.rs

//! User-facing status lines on stdout.
//!
//! Logs go to the log file; these are the short coloured notices a person
//! watching the terminal sees, interleaved with aria2c's own output.

use owo_colors::OwoColorize;

use crate::types::ProcessOutcome;

const RULE_WIDTH: usize = 50;

pub fn banner(links_file_name: &str) {
    let inner = 40;
    println!("{}", format!("╔{}╗", "═".repeat(inner)).magenta().bold());
    println!("{}", format!("║ {:<w$}║", "Aria2 Watcher & Launcher", w = inner - 1).magenta().bold());
    println!(
        "{}",
        format!("║ Monitoring: {:<w$}║", links_file_name, w = inner - 13).magenta().bold()
    );
    println!("{}", format!("╚{}╝", "═".repeat(inner)).magenta().bold());
    println!();
}

pub fn ok(msg: impl AsRef<str>) {
    println!("{} {}", "✓".green(), msg.as_ref().green());
}

pub fn info(msg: impl AsRef<str>) {
    println!("{}", msg.as_ref().blue());
}

pub fn warn(msg: impl AsRef<str>) {
    println!("{} {}", "⚠".yellow(), msg.as_ref().yellow());
}

pub fn error(msg: impl AsRef<str>) {
    println!("{} {}", "✗".red(), msg.as_ref().red());
}

pub fn change_detected(links_file_name: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    println!();
    println!("{}", rule.cyan());
    println!("{}", format!("Detected changes in {links_file_name}. Launching aria2c...").cyan());
    println!("{}", rule.cyan());
}

pub fn download_starting() {
    println!();
    println!(
        "{}",
        "Starting aria2c download (output below, press Ctrl+C to stop the monitor):".blue()
    );
}

pub fn outcome(outcome: &ProcessOutcome) {
    let rule = "=".repeat(RULE_WIDTH);
    println!();
    println!("{}", rule.blue());
    match outcome {
        ProcessOutcome::Success => ok(outcome.summary()),
        ProcessOutcome::PartialIoError | ProcessOutcome::OtherNonZero(_) => warn(outcome.summary()),
        ProcessOutcome::LaunchFailure(_) => error(outcome.summary()),
    }
    println!("{}", rule.blue());
}
