//! # Approvals Subcommand
//!
//! The reviewer's queue: submitted assessments awaiting a decision, and the
//! approve / reject actions on them.

use std::fmt::Write as _;

use anyhow::Result;
use clap::{Args, Subcommand};

use cdd_client::{ApprovalItem, Decision};
use cdd_core::AssessmentId;

use crate::{api_error, CliContext};

/// Arguments for `cdd approvals`.
#[derive(Args, Debug)]
pub struct ApprovalsArgs {
    #[command(subcommand)]
    pub command: ApprovalsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ApprovalsCommand {
    /// List submitted assessments.
    List {
        /// Print the queue as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Approve a submitted assessment.
    Approve {
        /// Assessment id.
        id: AssessmentId,
    },
    /// Reject a submitted assessment.
    Reject {
        /// Assessment id.
        id: AssessmentId,
    },
}

pub async fn run_approvals(args: &ApprovalsArgs, ctx: &CliContext) -> Result<u8> {
    let client = ctx.client()?;
    let result = match &args.command {
        ApprovalsCommand::List { json } => match client.pending_approvals().await {
            Ok(queue) if *json => Ok(serde_json::to_string_pretty(&queue)?),
            Ok(queue) => Ok(render_queue(&queue)),
            Err(e) => Err(e),
        },
        ApprovalsCommand::Approve { id } => decide(&client, *id, Decision::Approve).await,
        ApprovalsCommand::Reject { id } => decide(&client, *id, Decision::Reject).await,
    };
    ctx.save_session(&client).await?;
    let out = result.map_err(api_error)?;
    println!("{}", out.trim_end());
    Ok(0)
}

async fn decide(
    client: &cdd_client::CddClient,
    id: AssessmentId,
    decision: Decision,
) -> Result<String, cdd_client::ApiError> {
    let record = client.decide(id, decision).await?;
    Ok(format!("OK: assessment {} is now {}", record.id, record.status))
}

fn render_queue(queue: &[ApprovalItem]) -> String {
    if queue.is_empty() {
        return "No assessments awaiting approval.".to_string();
    }
    let mut out = format!("Awaiting approval ({}):\n", queue.len());
    let _ = writeln!(
        out,
        "  {:>5}  {:<24} {:<16} {:<16} {:<7} {:>5}",
        "ID", "CLIENT", "SUBMITTED BY", "SUBMITTED", "RISK", "SCORE"
    );
    for item in queue {
        let _ = writeln!(
            out,
            "  {:>5}  {:<24} {:<16} {:<16} {:<7} {:>5}",
            item.assessment.get(),
            item.client_name,
            item.submitted_by,
            item.submitted_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
            item.risk_level.map(|l| l.as_str()).unwrap_or("-"),
            item.total_score
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into()),
        );
    }
    out
}
