//! Doctor command - verify credentials and configuration.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Studymate Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Keys").bold());
    for check in [check_llm_key(settings), check_search_key(settings)] {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![
        check_config_file(config_path),
        check_prompts_dir(settings),
    ];
    for check in config_checks.into_iter().flatten() {
        check.print();
        checks.push(check);
    }
    Output::kv("Model", &settings.llm.model);
    Output::kv("Endpoint", &settings.llm.api_base);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Studymate.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Studymate is ready to use.");
    }

    Ok(())
}

/// The LLM key is required for chat, ask and serve.
fn check_llm_key(settings: &Settings) -> CheckResult {
    let env = &settings.llm.api_key_env;
    match settings.llm.api_key() {
        Some(key) => CheckResult::ok(env, &format!("configured ({})", mask_key(&key))),
        None => CheckResult::error(
            env,
            "not set",
            &format!("Set with: export {}='...'", env),
        ),
    }
}

/// Search tools answer with a missing-key message instead of results without this.
fn check_search_key(settings: &Settings) -> CheckResult {
    let env = &settings.search.api_key_env;
    match settings.search.api_key() {
        Some(key) => CheckResult::ok(env, &format!("configured ({})", mask_key(&key))),
        None => CheckResult::warning(
            env,
            "not set (search-based tools will be unavailable)",
            &format!("Set with: export {}='...'", env),
        ),
    }
}

fn check_config_file(config_path: &Path) -> Option<CheckResult> {
    Some(if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: studymate config init",
        )
    })
}

fn check_prompts_dir(settings: &Settings) -> Option<CheckResult> {
    let dir = settings.prompts.custom_dir.as_deref()?;
    let path = Settings::expand_path(dir);
    Some(if path.join("agent.toml").exists() {
        CheckResult::ok("Custom prompts", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Custom prompts",
            &format!("{} has no agent.toml", path.display()),
            "Built-in prompts will be used",
        )
    })
}

/// Show only the ends of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
