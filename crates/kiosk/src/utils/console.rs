//! Line-oriented console front end
//!
//! Reads one command per line from stdin and prints every published state
//! change. Commands run on their own tasks so state keeps rendering while a
//! scan is polling.

use std::io::Write;
use std::sync::Arc;

use rvm_core::ScanOutcome;
use rvm_domain::{impl_domain_status_conversions, PublishedState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::KioskContext;

/// Commands accepted on stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Scan,
    Confirm,
    Reject,
    Reset,
    Trigger,
    Health,
    Status,
    Help,
    Quit,
}

impl_domain_status_conversions!(ConsoleCommand {
    Scan => "scan",
    Confirm => "confirm",
    Reject => "reject",
    Reset => "reset",
    Trigger => "trigger",
    Health => "health",
    Status => "status",
    Help => "help",
    Quit => "quit",
});

const HELP: &str = "commands: scan | confirm | reject | reset | trigger | health | status | help | quit";

/// Run until `quit`, end of input, or Ctrl-C
///
/// # Errors
///
/// Fails only when stdin or stdout break.
pub async fn run(ctx: Arc<KioskContext>) -> anyhow::Result<()> {
    let mut updates = ctx.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_line(HELP)?;
    print_line(&render(&updates.borrow_and_update()))?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = render(&updates.borrow_and_update());
                print_line(&line)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(ConsoleCommand::Help) => print_line(HELP)?,
                    Ok(ConsoleCommand::Status) => print_line(&render(&ctx.snapshot()))?,
                    Ok(command) => {
                        tokio::spawn(execute(Arc::clone(&ctx), command));
                    }
                    Err(err) => print_line(&format!("{err}; {HELP}"))?,
                }
            }
        }
    }

    Ok(())
}

async fn execute(ctx: Arc<KioskContext>, command: ConsoleCommand) {
    let report = match command {
        ConsoleCommand::Scan => match ctx.scan().await {
            Ok(ScanOutcome::Completed(status)) => format!("scan finished: {}", status.state),
            Ok(ScanOutcome::BoundExceeded { attempts, last }) => {
                format!("scan gave up after {attempts} polls, service still {}", last.state)
            }
            Ok(ScanOutcome::Aborted(err)) => format!("scan aborted: {err}"),
            Ok(ScanOutcome::Cancelled) => "scan cancelled".to_string(),
            Err(err) => format!("scan failed: {err}"),
        },
        ConsoleCommand::Confirm => outcome("confirm", ctx.confirm().await.map(|s| s.state)),
        ConsoleCommand::Reject => outcome("reject", ctx.reject_invalid_item().await.map(|s| s.state)),
        ConsoleCommand::Reset => outcome("reset", ctx.reset().await.map(|s| s.state)),
        ConsoleCommand::Trigger => match ctx.trigger_actuator().await {
            Ok(report) => format!(
                "actuator: {} (trapdoor={}, coupon={})",
                report.message, report.trapdoor_triggered, report.coupon_triggered
            ),
            Err(err) => format!("actuator failed: {err}"),
        },
        ConsoleCommand::Health => format!("health: {}", ctx.check_health().await),
        ConsoleCommand::Status | ConsoleCommand::Help | ConsoleCommand::Quit => return,
    };

    if let Err(err) = print_line(&report) {
        warn!(error = %err, "Failed to write to stdout");
    }
}

fn outcome<T: std::fmt::Display>(name: &str, result: rvm_domain::Result<T>) -> String {
    match result {
        Ok(state) => format!("{name} accepted, service now {state}"),
        Err(err) => format!("{name} failed: {err}"),
    }
}

/// One-line summary of the published state
pub fn render(state: &PublishedState) -> String {
    let mut line = format!("[{}]", state.status.state);

    if let Some(item) = &state.status.item_detected {
        line.push_str(&format!(" {item} ({:.0}%)", state.status.confidence * 100.0));
    }
    if let Some(code) = &state.status.coupon_code {
        line.push_str(&format!(" coupon={code}"));
    }
    if let Some(message) = state.status.error_message.as_ref().or(state.status.message.as_ref()) {
        line.push_str(&format!(" \"{message}\""));
    }
    if state.loading {
        line.push_str(" loading");
    }
    let connection = state.connection();
    if connection.connected {
        line.push_str(" | online");
    } else {
        line.push_str(" | OFFLINE");
        if let Some(err) = &connection.last_error {
            line.push_str(&format!(": {err}"));
        }
    }
    if let Some(err) = &state.last_command_error {
        line.push_str(&format!(" | last command failed: {err}"));
    }

    line
}

fn print_line(line: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()
}
