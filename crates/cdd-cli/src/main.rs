//! # cdd CLI entry point
//!
//! Parses command-line arguments, resolves the state directory and backend
//! configuration, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cdd_cli::account::{
    run_channel, run_clients, run_company, run_login, run_logout, ChannelArgs, ClientsArgs,
    CompanyArgs, LoginArgs,
};
use cdd_cli::approvals::{run_approvals, ApprovalsArgs};
use cdd_cli::assess::{run_assess, run_score, AssessArgs, ScoreArgs};
use cdd_cli::catalog::{run_catalog, CatalogArgs};
use cdd_cli::CliContext;

/// CDD risk assessment CLI.
///
/// Fills in a client's due-diligence questionnaire, scores it, saves and
/// submits it to the backend, and reviews submitted assessments.
#[derive(Parser, Debug)]
#[command(name = "cdd", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Backend base URL. Overrides `CDD_API_URL`.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// State directory for the session and draft cache. Overrides
    /// `CDD_STATE_DIR`.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Obtain backend tokens for an account.
    Login(LoginArgs),

    /// Drop the stored tokens.
    Logout,

    /// Select the company requests act for, or clear the selection.
    Company(CompanyArgs),

    /// Select or list the distribution channel you work through.
    Channel(ChannelArgs),

    /// List client records.
    Clients(ClientsArgs),

    /// Print the questionnaire.
    Catalog(CatalogArgs),

    /// Edit, save and submit a client's assessment.
    Assess(AssessArgs),

    /// Score a draft offline against a catalog file.
    Score(ScoreArgs),

    /// Review submitted assessments.
    Approvals(ApprovalsArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let ctx = match CliContext::resolve(cli.api_url.as_deref(), cli.state_dir) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    tracing::debug!(
        state_dir = %ctx.state_dir.display(),
        api = %ctx.api.base_url,
        "cdd CLI starting"
    );

    let result = match cli.command {
        Commands::Login(args) => run_login(&args, &ctx).await,
        Commands::Logout => run_logout(&ctx).await,
        Commands::Company(args) => run_company(&args, &ctx).await,
        Commands::Channel(args) => run_channel(&args, &ctx).await,
        Commands::Clients(args) => run_clients(&args, &ctx).await,
        Commands::Catalog(args) => run_catalog(&args, &ctx).await,
        Commands::Assess(args) => run_assess(&args, &ctx).await,
        Commands::Score(args) => run_score(&args, &ctx),
        Commands::Approvals(args) => run_approvals(&args, &ctx).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
