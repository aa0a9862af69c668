//! Apply mode: resolve the intent CSV and push it to the directory.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use maildelegate_core::{DelegationIntent, Settings};
use maildelegate_directory::DirectoryClient;
use maildelegate_sync::{
    ApplyOutcome, ApplyReport, ApplyResult, AssumeYes, Confirm, Driver, Progress, RunState,
};

use crate::prompt::ConsoleConfirm;

pub fn run(settings: &Settings, input: &Path, assume_yes: bool) -> Result<()> {
    let client = DirectoryClient::from_settings(settings);
    let mut progress = ConsoleProgress;
    let mut driver = Driver::new(&client).with_progress(&mut progress);

    let mut confirm: Box<dyn Confirm> = if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(ConsoleConfirm::stdio())
    };

    let report = driver
        .run_apply(input, confirm.as_mut())
        .with_context(|| format!("delegation apply failed for '{}'", input.display()))?;

    print_summary(&report);
    Ok(())
}

/// Prints each unresolved row and apply outcome the moment it is known.
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn unresolved(&mut self, intent: &DelegationIntent) {
        println!(
            "{} {} -> {}",
            "No userId found for record:".yellow(),
            intent.resource_email,
            intent.actor_email
        );
    }

    fn applied(&mut self, result: &ApplyResult) {
        let status = match &result.outcome {
            ApplyOutcome::Applied { task_id } => format!("Ok. taskId: {task_id}").green(),
            ApplyOutcome::Failed { reason } => format!("Failed: {reason}").red(),
        };
        println!(
            "Processing record: {} {} | {}",
            result.delegation, result.delegation.intent.rights, status
        );
    }
}

fn print_summary(report: &ApplyReport) {
    match report.state {
        RunState::NothingToDo => println!("Nothing to do..."),
        RunState::Aborted => println!("Cancelled; no changes were made."),
        RunState::Applied => {
            let failed = report.results.iter().filter(|r| !r.is_applied()).count();
            if failed > 0 {
                println!("{}", format!("{failed} record(s) not applied").red().bold());
            }
            println!("Done");
        }
        other => tracing::debug!(state = %other, "apply run ended in non-terminal state"),
    }
}
