//! Interactive study session.

use crate::assistant::StudyAssistant;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::session::{is_farewell, ChatSession};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, mut settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Query, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'studymate doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if let Some(model) = model {
        settings.llm.model = model;
    }

    let assistant = StudyAssistant::from_settings(&settings)?;
    let mut session = ChatSession::new(settings.chat.history_length);

    println!("\n{}", style("Studymate").bold().cyan());
    println!(
        "{}",
        style("Ask anything you are studying. 'history' shows the conversation, 'clear' resets it, 'exit' quits.").dim()
    );
    println!("{}", style("Available tools:").dim());
    for name in assistant.tool_names() {
        Output::list_item(name);
    }
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        if input.eq_ignore_ascii_case("history") {
            if session.is_empty() {
                Output::info("No messages yet.");
            }
            for turn in session.turns() {
                Output::turn(turn);
            }
            continue;
        }

        if is_farewell(input) {
            let turn = session.submit(&assistant, input).await;
            Output::info(&turn.content);
            break;
        }

        let spinner = Output::spinner("Thinking...");
        let turn = session.submit(&assistant, input).await;
        spinner.finish_and_clear();

        println!("\n{} {}\n", style("Studymate:").cyan().bold(), turn.content);
        Output::tools_used(&turn.tools_used);
        println!();
    }

    Ok(())
}
