//! # Catalog Subcommand
//!
//! Prints the questionnaire grouped by category, with each option's score
//! and each question's maximum.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use cdd_assessment::scoring::max_score;
use cdd_core::{Catalog, Question};

use crate::{load_catalog_file, resolve_catalog, CliContext};

/// Arguments for `cdd catalog`.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Read the catalog from a YAML or JSON file instead of the backend.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Print the catalog as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run_catalog(args: &CatalogArgs, ctx: &CliContext) -> Result<u8> {
    let catalog = load_catalog(args.catalog.as_deref(), ctx).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print!("{}", render_catalog(&catalog));
    }
    Ok(0)
}

/// Catalog from a file when given, else from the backend. The session is
/// written back after a backend fetch.
pub async fn load_catalog(path: Option<&std::path::Path>, ctx: &CliContext) -> Result<Catalog> {
    if let Some(path) = path {
        return load_catalog_file(path);
    }
    let client = ctx.client()?;
    let result = resolve_catalog(None, Some(&client)).await;
    ctx.save_session(&client).await?;
    result
}

pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    for category in &catalog.categories {
        let _ = writeln!(out, "{}", category.name);
        if let Some(description) = category.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "  {description}");
        }
        for q in catalog.questions_in(category.id) {
            render_question(&mut out, q);
        }
    }
    let orphans: Vec<&Question> = catalog.uncategorized().collect();
    if !orphans.is_empty() {
        let _ = writeln!(out, "(uncategorized)");
        for q in orphans {
            render_question(&mut out, q);
        }
    }
    let _ = writeln!(
        out,
        "Questions: {}  Maximum score: {}",
        catalog.questions.len(),
        max_score(&catalog.questions)
    );
    out
}

fn render_question(out: &mut String, q: &Question) {
    let _ = writeln!(out, "  [{}] {} (max {})", q.id, q.question_text, q.max_score());
    if q.options.is_empty() {
        let _ = writeln!(out, "      (no options)");
    }
    for o in &q.options {
        let _ = writeln!(out, "      - {} ({})", o.option_text, o.score_value);
    }
}
