//! Console confirmation for apply mode.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use maildelegate_sync::{ApplyPlan, Confirm, SyncError};

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "resource")]
    resource: String,
    #[tabled(rename = "actor")]
    actor: String,
    #[tabled(rename = "imap full access")]
    imap_full_access: bool,
    #[tabled(rename = "send as")]
    send_as: bool,
    #[tabled(rename = "send on behalf")]
    send_on_behalf: bool,
    #[tabled(rename = "existing")]
    existing: &'static str,
}

/// Shows the plan on `output` and reads a y/n answer from `input`.
///
/// Only `y` (any case) approves; end of input counts as no.
pub struct ConsoleConfirm<R, W> {
    input: R,
    output: W,
}

impl ConsoleConfirm<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, plan: &ApplyPlan<'_>) -> io::Result<bool> {
        writeln!(self.output, "Records ready to process: {}", plan.resolved.len())?;

        let rows: Vec<PlanRow> = plan
            .resolved
            .iter()
            .map(|d| PlanRow {
                resource: format!("{} ({})", d.intent.resource_email, d.resource_id),
                actor: format!("{} ({})", d.intent.actor_email, d.actor_id),
                imap_full_access: d.intent.rights.imap_full_access,
                send_as: d.intent.rights.send_as,
                send_on_behalf: d.intent.rights.send_on_behalf,
                existing: if plan.is_duplicate(d) { "replace" } else { "" },
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        writeln!(self.output, "{table}")?;

        let message = plan.message();
        let (notice, question) = message
            .rsplit_once('\n')
            .map_or(("", message.as_str()), |(n, q)| (n, q));
        if !notice.is_empty() {
            writeln!(self.output, "{}", notice.yellow().bold())?;
        }
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

impl<R: BufRead, W: Write> Confirm for ConsoleConfirm<R, W> {
    fn confirm(&mut self, plan: &ApplyPlan<'_>) -> Result<bool, SyncError> {
        self.ask(plan).map_err(SyncError::Prompt)
    }
}
