//! # Account Subcommands
//!
//! `login`, `logout`, `company`, `channel` and `clients`: everything that
//! touches the stored session rather than a questionnaire.

use anyhow::{bail, Result};
use clap::Args;

use cdd_client::{ChannelRecord, Credentials};
use cdd_core::{ChannelId, ClientRecord, CompanyId};

use crate::{api_error, CliContext};

/// Environment variable consulted when `--password` is not given.
pub const PASSWORD_ENV: &str = "CDD_PASSWORD";

/// Arguments for `cdd login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email.
    #[arg(long)]
    pub email: String,

    /// Account password. Falls back to `CDD_PASSWORD`.
    #[arg(long)]
    pub password: Option<String>,
}

/// Arguments for `cdd company`.
#[derive(Args, Debug)]
pub struct CompanyArgs {
    /// Company to act for. Omit to clear the selection.
    pub id: Option<CompanyId>,
}

/// Arguments for `cdd channel`.
#[derive(Args, Debug)]
pub struct ChannelArgs {
    /// Channel to work through. Omit to clear the selection.
    #[arg(conflicts_with = "list")]
    pub id: Option<ChannelId>,

    /// List the available channels instead.
    #[arg(long)]
    pub list: bool,
}

/// Arguments for `cdd clients`.
#[derive(Args, Debug)]
pub struct ClientsArgs {
    /// Print the records as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Exchange credentials for a token pair and store it.
pub async fn run_login(args: &LoginArgs, ctx: &CliContext) -> Result<u8> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => match std::env::var(PASSWORD_ENV) {
            Ok(p) => p,
            Err(_) => bail!("no password given: pass --password or set {PASSWORD_ENV}"),
        },
    };
    let client = ctx.client()?;
    client
        .login(&Credentials::new(args.email.clone(), password))
        .await
        .map_err(api_error)?;
    ctx.save_session(&client).await?;

    let session = client.session().await;
    if session.is_superuser() {
        println!("OK: logged in as {} (superuser)", args.email);
    } else {
        println!("OK: logged in as {}", args.email);
    }
    if session.needs_channel() {
        println!("No distribution channel selected: run `cdd channel --list`.");
    }
    Ok(0)
}

/// Drop the stored tokens. The company and channel selections are kept.
pub async fn run_logout(ctx: &CliContext) -> Result<u8> {
    let client = ctx.client()?;
    client.logout().await;
    ctx.save_session(&client).await?;
    println!("OK: logged out");
    Ok(0)
}

/// Select or clear the company sent with each request.
pub async fn run_company(args: &CompanyArgs, ctx: &CliContext) -> Result<u8> {
    let client = ctx.client()?;
    client.select_company(args.id).await;
    ctx.save_session(&client).await?;
    match args.id {
        Some(id) => println!("OK: acting for company {id}"),
        None => println!("OK: company selection cleared"),
    }
    Ok(0)
}

/// Select, clear or list distribution channels. The selection is kept in
/// the session file only.
pub async fn run_channel(args: &ChannelArgs, ctx: &CliContext) -> Result<u8> {
    let client = ctx.client()?;
    if args.list {
        let result = client.channels().list().await;
        ctx.save_session(&client).await?;
        let channels = result.map_err(api_error)?;
        print!("{}", render_channels(&channels, client.session().await.channel()));
        return Ok(0);
    }

    client.select_channel(args.id).await;
    ctx.save_session(&client).await?;
    match args.id {
        Some(id) => println!("OK: working through channel {id}"),
        None => println!("OK: channel selection cleared"),
    }
    Ok(0)
}

fn render_channels(channels: &[ChannelRecord], selected: Option<ChannelId>) -> String {
    if channels.is_empty() {
        return "No distribution channels available.\n".to_string();
    }
    let mut out = format!("Distribution channels ({}):\n", channels.len());
    for c in channels {
        let mark = if Some(c.id) == selected { '*' } else { ' ' };
        out.push_str(&format!(
            "{mark} {:>5}  {} ({})\n",
            c.id.get(),
            c.name,
            c.type_label()
        ));
    }
    out
}

/// List client records visible to the session.
pub async fn run_clients(args: &ClientsArgs, ctx: &CliContext) -> Result<u8> {
    let client = ctx.client()?;
    let result = client.clients().list().await;
    ctx.save_session(&client).await?;
    let clients = result.map_err(api_error)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&clients)?);
    } else {
        print!("{}", render_clients(&clients));
    }
    Ok(0)
}

fn render_clients(clients: &[ClientRecord]) -> String {
    if clients.is_empty() {
        return "No clients found.\n".to_string();
    }
    let mut out = format!("Clients ({}):\n", clients.len());
    for c in clients {
        let reference = if c.reference.is_empty() { "-" } else { &c.reference };
        out.push_str(&format!(
            "  {:>5}  {:<12} {}\n",
            c.id.get(),
            reference,
            c.display_name()
        ));
    }
    out
}
