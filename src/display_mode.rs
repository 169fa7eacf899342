//! Operator-facing narration
//!
//! The installer narrates each step ("Downloading Miniconda...") and echoes
//! subprocess output verbatim. Operators watch this stream to follow
//! progress, so the wording is part of the tool's contract. Console mode
//! writes to the terminal; capture mode keeps a transcript for tests.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One narrated line, as recorded in capture mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Step(String),
    Info(String),
    Output(String),
    Error(String),
    Success(String),
}

impl Line {
    pub fn text(&self) -> &str {
        match self {
            Line::Step(s) | Line::Info(s) | Line::Output(s) | Line::Error(s) | Line::Success(s) => s,
        }
    }
}

/// Where narration goes
#[derive(Clone)]
pub enum DisplayMode {
    /// Terminal output with a spinner while a step runs
    Console {
        quiet: bool,
        spinner: Arc<Mutex<Option<ProgressBar>>>,
    },

    /// In-memory transcript
    Capture(Arc<Mutex<Vec<Line>>>),
}

impl DisplayMode {
    /// Console mode. `quiet` hides the spinner and subprocess output but
    /// keeps step narration.
    pub fn console(quiet: bool) -> Self {
        Self::Console {
            quiet,
            spinner: Arc::new(Mutex::new(None)),
        }
    }

    pub fn capture() -> Self {
        Self::Capture(Arc::new(Mutex::new(Vec::new())))
    }

    /// Announce the start of a step
    pub fn step(&self, message: &str) {
        match self {
            Self::Console { quiet, spinner } => {
                Self::clear_spinner(spinner);
                println!("{}", message.bold());
                if !*quiet {
                    let bar = ProgressBar::new_spinner();
                    bar.set_style(
                        ProgressStyle::default_spinner()
                            .template("{spinner:.cyan} {elapsed} {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                    );
                    bar.set_message(message.trim_end_matches('.').to_string());
                    bar.enable_steady_tick(Duration::from_millis(120));
                    *lock(spinner) = Some(bar);
                }
            }
            Self::Capture(lines) => lock(lines).push(Line::Step(message.to_string())),
        }
    }

    /// Echo captured subprocess output verbatim
    pub fn output(&self, text: &str) {
        match self {
            Self::Console { quiet, spinner } => {
                Self::clear_spinner(spinner);
                if !*quiet {
                    println!("{}", text);
                }
            }
            Self::Capture(lines) => lock(lines).push(Line::Output(text.to_string())),
        }
    }

    pub fn info(&self, message: &str) {
        match self {
            Self::Console { spinner, .. } => {
                Self::clear_spinner(spinner);
                println!("{}", message);
            }
            Self::Capture(lines) => lock(lines).push(Line::Info(message.to_string())),
        }
    }

    pub fn error(&self, message: &str) {
        match self {
            Self::Console { spinner, .. } => {
                Self::clear_spinner(spinner);
                println!("{}", message.red());
            }
            Self::Capture(lines) => lock(lines).push(Line::Error(message.to_string())),
        }
    }

    pub fn success(&self, message: &str) {
        match self {
            Self::Console { spinner, .. } => {
                Self::clear_spinner(spinner);
                println!("{}", message.green().bold());
            }
            Self::Capture(lines) => lock(lines).push(Line::Success(message.to_string())),
        }
    }

    /// Lines recorded so far (empty in console mode)
    pub fn transcript(&self) -> Vec<Line> {
        match self {
            Self::Console { .. } => Vec::new(),
            Self::Capture(lines) => lock(lines).clone(),
        }
    }

    /// Whether any recorded line contains `fragment`
    pub fn mentions(&self, fragment: &str) -> bool {
        self.transcript().iter().any(|line| line.text().contains(fragment))
    }

    fn clear_spinner(spinner: &Mutex<Option<ProgressBar>>) {
        if let Some(bar) = lock(spinner).take() {
            bar.finish_and_clear();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_in_order() {
        let display = DisplayMode::capture();
        display.step("Downloading Miniconda...");
        display.output("saved");
        display.error("Miniconda download failed. Aborting installation.");

        assert_eq!(
            display.transcript(),
            vec![
                Line::Step("Downloading Miniconda...".to_string()),
                Line::Output("saved".to_string()),
                Line::Error("Miniconda download failed. Aborting installation.".to_string()),
            ]
        );
        assert!(display.mentions("Aborting"));
    }

    #[test]
    fn test_console_has_no_transcript() {
        let display = DisplayMode::console(true);
        display.info("hello");
        assert!(display.transcript().is_empty());
    }
}
