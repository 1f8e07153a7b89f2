//! Turns configured items into palette items whose actions post effects.
//!
//! Item actions must be plain `Fn()` callbacks, so they only record what
//! should happen on a channel. The host drains the channel after each input
//! and performs the effect (show text, run a command).

use std::process::{Command, ExitStatus, Output, Stdio};
use std::sync::mpsc::Sender;

use anyhow::{anyhow, Context, Result};
use cmdpal_core::{Action, CloseReason, Item, ItemAction, PaletteConfig};
use tracing::{debug, warn};

/// Something a dispatched item (or the overlay itself) asks the host to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show text to the user
    Message { id: String, text: String },
    /// Execute a shell-style command line
    Run { id: String, command: String },
    /// The palette overlay closed
    PaletteClosed(CloseReason),
}

/// Build palette items from config, each bound to post its effect on `tx`
pub fn build_items(config: &PaletteConfig, tx: &Sender<Effect>) -> Vec<Item> {
    config.build_items(|cfg| {
        let effect = match cfg.action() {
            Some(ItemAction::Run(command)) => Effect::Run {
                id: cfg.id.clone(),
                command,
            },
            Some(ItemAction::Message(text)) => Effect::Message {
                id: cfg.id.clone(),
                text,
            },
            // Unreachable after validation; keep the item selectable anyway
            None => Effect::Message {
                id: cfg.id.clone(),
                text: format!("{} has no action", cfg.title),
            },
        };

        let tx = tx.clone();
        Action::new(move || {
            if tx.send(effect.clone()).is_err() {
                warn!("effect channel closed; dropping effect");
            }
        })
    })
}

fn parse_command_line(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = shlex::split(command)
        .ok_or_else(|| anyhow!("Unbalanced quotes in command: {}", command))?;
    if parts.is_empty() {
        return Err(anyhow!("Empty command"));
    }
    let program = parts.remove(0);
    Ok((program, parts))
}

/// Run a command with inherited stdio (for headless use)
pub fn run_inherited(command: &str) -> Result<ExitStatus> {
    let (program, args) = parse_command_line(command)?;
    debug!(%program, ?args, "running command");

    Command::new(&program)
        .args(&args)
        .status()
        .with_context(|| format!("Failed to execute: {}", program))
}

/// Run a command with captured output (while the TUI owns the terminal)
pub fn run_captured(command: &str) -> Result<Output> {
    let (program, args) = parse_command_line(command)?;
    debug!(%program, ?args, "running command (captured)");

    Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute: {}", program))
}

/// One-line summary of a finished command for the status bar
pub fn summarize(command: &str, output: &Output) -> String {
    let stream = if output.stdout.is_empty() {
        &output.stderr
    } else {
        &output.stdout
    };
    let first_line = String::from_utf8_lossy(stream)
        .lines()
        .find(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_string());

    match (output.status.success(), first_line) {
        (true, Some(line)) => format!("{}: {}", command, line),
        (true, None) => format!("{}: done", command),
        (false, Some(line)) => format!("{} failed ({}): {}", command, output.status, line),
        (false, None) => format!("{} failed ({})", command, output.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    const CONFIG: &str = r#"
[[items]]
id = "greet"
title = "Greet"
message = "hi"
order = 2

[[items]]
id = "echo"
title = "Echo"
run = "echo 'hello world'"
order = 1
"#;

    #[test]
    fn test_actions_post_effects() {
        let config = PaletteConfig::from_toml_str(CONFIG).unwrap();
        let (tx, rx) = mpsc::channel();
        let items = build_items(&config, &tx);

        assert_eq!(items[0].id, "echo");
        items[1].action.invoke();
        items[0].action.invoke();

        assert_eq!(
            rx.try_recv().unwrap(),
            Effect::Message {
                id: "greet".to_string(),
                text: "hi".to_string()
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            Effect::Run {
                id: "echo".to_string(),
                command: "echo 'hello world'".to_string()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_parse_command_line() {
        let (program, args) = parse_command_line("git commit -m 'two words'").unwrap();
        assert_eq!(program, "git");
        assert_eq!(args, vec!["commit", "-m", "two words"]);

        assert!(parse_command_line("echo 'unterminated").is_err());
        assert!(parse_command_line("   ").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captured_summary() {
        let output = run_captured("echo 'hello world'").unwrap();
        assert_eq!(summarize("echo", &output), "echo: hello world");

        let output = run_captured("false").unwrap();
        assert!(summarize("false", &output).starts_with("false failed"));
    }
}
