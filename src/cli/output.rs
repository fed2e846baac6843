//! CLI output formatting utilities.

use crate::agent::Role;
use crate::session::ChatTurn;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print an assistant answer.
    pub fn answer(text: &str) {
        println!("\n{}\n", text);
    }

    /// Print the tools that contributed to an answer, if any.
    pub fn tools_used(tools: &[String]) {
        if tools.is_empty() {
            return;
        }
        println!(
            "{} {}",
            style("Tools used:").dim(),
            style(tools.join(", ")).cyan()
        );
    }

    /// Print one turn of a chat history.
    pub fn turn(turn: &ChatTurn) {
        let speaker = match turn.role {
            Role::User => style("You").green().bold(),
            Role::Assistant => style("Assistant").cyan().bold(),
        };
        println!("{} {}", speaker, style(turn.created_at.format("%H:%M")).dim());
        println!("{}", turn.content);
        Self::tools_used(&turn.tools_used);
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}
