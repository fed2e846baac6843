//! CLI module for Studymate.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Studymate - a study and research companion
///
/// Ask questions and let the assistant consult Wikipedia, web and scholarly
/// search, YouTube transcripts and study-advice tools to answer them.
#[derive(Parser, Debug)]
#[command(name = "studymate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive study session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Ask a single question
    Ask {
        /// The question to ask
        query: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the available study tools
    Tools,

    /// Run one tool directly
    Tool {
        /// Tool name, e.g. "Wikipedia Tool" or wikipedia_tool
        name: String,

        /// Free-text input (topic, question, or YouTube URL/ID)
        input: String,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_command() {
        let cli = Cli::parse_from(["studymate", "tool", "Wikipedia Tool", "photosynthesis"]);
        match cli.command {
            Commands::Tool { name, input } => {
                assert_eq!(name, "Wikipedia Tool");
                assert_eq!(input, "photosynthesis");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["studymate", "-vv", "ask", "What is DNA?", "-c", "custom.toml"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert!(matches!(cli.command, Commands::Ask { .. }));
    }
}
