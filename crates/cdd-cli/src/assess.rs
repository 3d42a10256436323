//! # Assess Subcommand
//!
//! Edits one client's questionnaire through the local draft cache, then
//! saves or submits it to the backend.
//!
//! ## Subcommands
//!
//! - `show`: print the draft, per-question scores and the summary.
//! - `answer`: select an option for a question.
//! - `clear`: remove the answer for a question.
//! - `save`: save as draft (status `pending`).
//! - `submit`: submit for approval and drop the local draft.
//! - `view`: print a saved assessment with its stored answers.
//! - `list`: every assessment, grouped into drafts, submitted, approved
//!   and rejected. Draft rows show the locally cached total.
//! - `push`: send an approved or rejected assessment to the external
//!   system.
//!
//! `show`, `answer` and `clear` work offline when `--catalog` is given.
//! `cdd score` scores a draft file or a cached draft without touching the
//! cache.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use cdd_assessment::{
    breakdown, score, DraftPayload, DraftSession, DraftSource, KeyValueStore, ScoreSummary,
};
use cdd_client::{AssessmentRow, AssessmentTabs, AssessmentView, SaveIntent, SaveOutcome};
use cdd_core::{AssessmentId, Catalog, ClientId, QuestionId};
use cdd_state::AssessmentStatus;

use crate::catalog::load_catalog;
use crate::{api_error, load_catalog_file, CliContext};

/// Arguments for `cdd assess`.
#[derive(Args, Debug)]
pub struct AssessArgs {
    #[command(subcommand)]
    pub command: AssessCommand,
}

/// Assessment subcommands.
#[derive(Subcommand, Debug)]
pub enum AssessCommand {
    /// Print the client's draft and its score.
    Show {
        #[arg(long)]
        client: ClientId,
        /// Catalog file. Fetched from the backend when omitted.
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Print the score summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Select an option for a question.
    Answer {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        question: QuestionId,
        /// Option text exactly as listed in the catalog.
        #[arg(long)]
        option: String,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Remove the answer for a question.
    Clear {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        question: QuestionId,
    },

    /// Save the draft to the backend with status `pending`.
    Save {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Submit the draft for approval. The local draft is deleted afterwards.
    Submit {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Print a saved assessment with its stored answers.
    View {
        /// Assessment id.
        id: AssessmentId,
    },

    /// List assessments by status.
    List {
        /// Only this tab: `drafts`, `submitted`, `approved` or `rejected`.
        #[arg(long)]
        status: Option<AssessmentStatus>,
        /// Print the rows as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Push a decided assessment to the external system.
    Push {
        /// Assessment id.
        id: AssessmentId,
    },
}

/// Tab order and the line printed when a tab is empty.
const TABS: [(AssessmentStatus, &str, &str); 4] = [
    (AssessmentStatus::Pending, "Drafts", "No drafts saved yet."),
    (AssessmentStatus::Submitted, "Submitted", "No submitted assessments."),
    (AssessmentStatus::Approved, "Approved", "No approved assessments."),
    (AssessmentStatus::Rejected, "Rejected", "No rejected assessments."),
];

/// Arguments for `cdd score`.
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Catalog file (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    pub catalog: PathBuf,

    /// Score the cached draft of this client.
    #[arg(long, conflicts_with = "answers", required_unless_present = "answers")]
    pub client: Option<ClientId>,

    /// Score a stored draft document (`{"responses": {...}}`).
    #[arg(long)]
    pub answers: Option<PathBuf>,
}

pub async fn run_assess(args: &AssessArgs, ctx: &CliContext) -> Result<u8> {
    match &args.command {
        AssessCommand::Show {
            client,
            catalog,
            json,
        } => {
            let catalog = load_catalog(catalog.as_deref(), ctx).await?;
            let session = DraftSession::open(ctx.drafts(), *client);
            if *json {
                println!("{}", serde_json::to_string_pretty(&session.summary(&catalog))?);
            } else {
                print!("{}", render_session(&session, &catalog));
            }
            Ok(0)
        }

        AssessCommand::Answer {
            client,
            question,
            option,
            catalog,
        } => {
            let catalog = load_catalog(catalog.as_deref(), ctx).await?;
            let mut session = DraftSession::open(ctx.drafts(), *client);
            let answer = session.select(&catalog, *question, option)?;
            println!(
                "OK: question {} answered {:?} (+{})",
                answer.question, answer.selected_text, answer.score
            );
            println!("{}", summary_line(&session.summary(&catalog)));
            Ok(0)
        }

        AssessCommand::Clear { client, question } => {
            let mut session = DraftSession::open(ctx.drafts(), *client);
            match session.clear(*question) {
                Some(removed) => {
                    println!(
                        "OK: cleared question {} (was {:?}, {})",
                        removed.question, removed.selected_text, removed.score
                    );
                    println!("Total score: {}", session.draft().total_score());
                }
                None => println!("Question {question} was not answered."),
            }
            Ok(0)
        }

        AssessCommand::Save { client, catalog } => {
            save(ctx, *client, catalog.as_deref(), SaveIntent::Draft).await
        }

        AssessCommand::Submit { client, catalog } => {
            save(ctx, *client, catalog.as_deref(), SaveIntent::Submit).await
        }

        AssessCommand::View { id } => {
            let client = ctx.client()?;
            let result = client.view(*id).await;
            ctx.save_session(&client).await?;
            print!("{}", render_view(&result.map_err(api_error)?));
            Ok(0)
        }

        AssessCommand::List { status, json } => {
            let client = ctx.client()?;
            let result = client.assessments_by_status(&ctx.drafts()).await;
            ctx.save_session(&client).await?;
            let tabs = result.map_err(api_error)?;
            match (status, *json) {
                (Some(status), true) => {
                    println!("{}", serde_json::to_string_pretty(tabs.tab(*status))?)
                }
                (None, true) => println!("{}", serde_json::to_string_pretty(&tabs)?),
                (status, false) => print!("{}", render_tabs(&tabs, *status)),
            }
            Ok(0)
        }

        AssessCommand::Push { id } => {
            let client = ctx.client()?;
            let result = client.push(*id).await;
            ctx.save_session(&client).await?;
            let pushed = result.map_err(api_error)?;
            println!(
                "OK: pushed assessment {id} (external: {})",
                if pushed.external_pushed { "yes" } else { "no" }
            );
            Ok(0)
        }
    }
}

/// Score a draft offline and print the summary as JSON.
pub fn run_score(args: &ScoreArgs, ctx: &CliContext) -> Result<u8> {
    let catalog = load_catalog_file(&args.catalog)?;
    let draft = match (&args.answers, args.client) {
        (Some(path), _) => read_draft_file(path)?.into_draft(),
        (None, Some(client)) => ctx.drafts().load(client).draft,
        (None, None) => anyhow::bail!("either --client or --answers is required"),
    };
    let summary = score(&draft, &catalog.questions);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(0)
}

fn read_draft_file(path: &Path) -> Result<DraftPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read draft: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid draft: {}", path.display()))
}

async fn save(
    ctx: &CliContext,
    client_id: ClientId,
    catalog: Option<&Path>,
    intent: SaveIntent,
) -> Result<u8> {
    let client = ctx.client()?;
    let catalog = match catalog {
        Some(path) => load_catalog_file(path)?,
        None => client.catalog().load().await.map_err(api_error)?,
    };
    let mut session = DraftSession::open(ctx.drafts(), client_id);
    let had_answers = !session.draft().is_empty();

    let result = client.save(&mut session, &catalog, intent).await;
    ctx.save_session(&client).await?;
    let outcome = result.map_err(api_error)?;

    if had_answers && !outcome.answers_replaced {
        tracing::warn!(
            assessment = %outcome.assessment,
            "answers could not be stored; the assessment record was saved"
        );
        eprintln!("WARNING: answers were not stored on the server");
    }
    println!("{}", outcome_line(&outcome, intent));
    println!("{}", summary_line(&outcome.summary));
    Ok(0)
}

fn outcome_line(outcome: &SaveOutcome, intent: SaveIntent) -> String {
    let verb = match (intent, outcome.created) {
        (SaveIntent::Draft, true) => "created draft assessment",
        (SaveIntent::Draft, false) => "updated draft assessment",
        (SaveIntent::Submit, _) => "submitted assessment",
    };
    format!("OK: {verb} {} ({})", outcome.assessment, outcome.status)
}

fn summary_line(summary: &ScoreSummary) -> String {
    format!(
        "Total score: {} / {} ({:.1}%)  Risk: {}  Answered: {}/{}",
        summary.total_score,
        summary.max_score,
        summary.progress_percent(),
        summary.risk_level,
        summary.answered,
        summary.scorable
    )
}

fn render_session<S: KeyValueStore>(session: &DraftSession<S>, catalog: &Catalog) -> String {
    let mut out = String::new();
    let source = match session.source() {
        DraftSource::Assessment(id) => format!("resumed from assessment {id}"),
        DraftSource::Client => "resumed from client draft".to_string(),
        DraftSource::Empty => "new draft".to_string(),
    };
    let _ = writeln!(out, "Client {} ({source})", session.client());
    if let Some(id) = session.assessment() {
        let _ = writeln!(out, "Saved as assessment {id}");
    }
    for row in breakdown(session.draft(), &catalog.questions) {
        let text = catalog
            .question(row.question)
            .map(|q| q.question_text.as_str())
            .unwrap_or_default();
        match row.answer {
            Some(a) => {
                let _ = writeln!(
                    out,
                    "  [{}] {text}: {} ({}/{})",
                    row.question, a.selected_text, a.score, row.max_score
                );
            }
            None => {
                let _ = writeln!(out, "  [{}] {text}: - (0/{})", row.question, row.max_score);
            }
        }
    }
    let _ = writeln!(out, "{}", summary_line(&session.summary(catalog)));
    out
}

fn render_tabs(tabs: &AssessmentTabs, only: Option<AssessmentStatus>) -> String {
    let mut out = String::new();
    for (status, title, empty) in TABS {
        if only.is_some_and(|o| o != status) {
            continue;
        }
        let rows = tabs.tab(status);
        let _ = writeln!(out, "{title} ({}):", rows.len());
        if rows.is_empty() {
            let _ = writeln!(out, "  {empty}");
        }
        for row in rows {
            let _ = writeln!(out, "{}", row_line(row));
        }
    }
    out
}

fn row_line(row: &AssessmentRow) -> String {
    format!(
        "  {:>5}  {:<24} {:<16} {:<16} {:<7} {:>5}",
        row.assessment.get(),
        row.client_name,
        row.submitted_by,
        row.submitted_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".into()),
        row.risk_level.map(|l| l.as_str()).unwrap_or("-"),
        row.total_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "N/A".into()),
    )
}

fn render_view(view: &AssessmentView) -> String {
    let mut out = String::new();
    let r = &view.record;
    let _ = writeln!(out, "Assessment {} for {}", r.id, view.client_name());
    let _ = writeln!(out, "  Status: {}", r.status);
    let _ = writeln!(
        out,
        "  Risk: {}",
        r.risk_level.map(|l| l.to_string()).unwrap_or_else(|| "-".into())
    );
    let _ = writeln!(
        out,
        "  Total score: {}",
        r.total_score.map(|s| s.to_string()).unwrap_or_else(|| "-".into())
    );
    if let Some(at) = r.submitted_at {
        let _ = writeln!(out, "  Submitted: {}", at.format("%Y-%m-%d %H:%M"));
    }
    if let Some(by) = r.submitted_by_name.as_deref().filter(|n| !n.is_empty()) {
        let _ = writeln!(out, "  Submitted by: {by}");
    }
    let _ = writeln!(out, "  Answers ({}):", view.answers.len());
    for a in &view.answers {
        let _ = writeln!(
            out,
            "    [{}] {} ({})",
            a.question, a.selected_text, a.score_value
        );
    }
    out
}
